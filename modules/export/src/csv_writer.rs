//! In-core CSV production (spec §6): UTF-8 with a leading BOM, `,`
//! separated, RFC4180-style quoting — a field containing `,`, `"`, or a
//! newline is wrapped in quotes with internal quotes doubled.

const BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

#[derive(Debug, Default)]
pub struct CsvWriter {
    buffer: String,
}

impl CsvWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_row<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut first = true;
        for field in fields {
            if !first {
                self.buffer.push(',');
            }
            first = false;
            self.buffer.push_str(&quote_field(field.as_ref()));
        }
        self.buffer.push_str("\r\n");
    }

    pub fn finish(self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(BOM.len() + self.buffer.len());
        bytes.extend_from_slice(&BOM);
        bytes.extend_from_slice(self.buffer.as_bytes());
        bytes
    }
}

fn needs_quoting(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn quote_field(field: &str) -> String {
    if needs_quoting(field) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(bytes: &[u8]) -> String {
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn output_starts_with_a_utf8_bom() {
        let mut writer = CsvWriter::new();
        writer.write_row(["a", "b"]);
        let bytes = writer.finish();
        assert_eq!(&bytes[..3], &BOM);
    }

    #[test]
    fn plain_fields_are_not_quoted() {
        let mut writer = CsvWriter::new();
        writer.write_row(["account_code", "amount_minor"]);
        writer.write_row(["1000", "500"]);
        let text = rows(&writer.finish());
        assert!(text.contains("account_code,amount_minor\r\n"));
        assert!(text.contains("1000,500\r\n"));
    }

    #[test]
    fn a_field_with_a_comma_is_quoted() {
        let mut writer = CsvWriter::new();
        writer.write_row(["Acme, Inc."]);
        let text = rows(&writer.finish());
        assert!(text.contains("\"Acme, Inc.\"\r\n"));
    }

    #[test]
    fn internal_quotes_are_doubled() {
        let mut writer = CsvWriter::new();
        writer.write_row([r#"Say "hi""#]);
        let text = rows(&writer.finish());
        assert!(text.contains("\"Say \"\"hi\"\"\"\r\n"));
    }

    #[test]
    fn a_field_with_an_embedded_newline_is_quoted() {
        let mut writer = CsvWriter::new();
        writer.write_row(["line one\nline two"]);
        let text = rows(&writer.finish());
        assert!(text.contains("\"line one\nline two\"\r\n"));
    }
}
