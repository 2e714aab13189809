use export::{CsvWriter, ExportRenderer, NullRenderer, RenderOptions};

#[test]
fn a_generated_csv_round_trips_through_the_bom_and_quoting_rules() {
    let mut writer = CsvWriter::new();
    writer.write_row(["account_code", "name", "amount_minor"]);
    writer.write_row(["4000", "Revenue, Net", "(2,000.00)"]);
    let bytes = writer.finish();

    assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);
    let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
    assert_eq!(text, "account_code,name,amount_minor\r\n4000,\"Revenue, Net\",\"(2,000.00)\"\r\n");
}

#[tokio::test]
async fn the_null_renderer_satisfies_the_export_renderer_port() {
    let renderer = NullRenderer;
    assert!(renderer.ready());
    let out = renderer.render_html("<p>board pack</p>", &RenderOptions::default()).await.unwrap();
    assert_eq!(out, b"<p>board pack</p>");
}
