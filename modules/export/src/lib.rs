pub mod csv_writer;
pub mod renderer;

pub use csv_writer::CsvWriter;
pub use renderer::{ExportRenderer, HttpRenderer, NullRenderer, RenderError, RenderOptions};
