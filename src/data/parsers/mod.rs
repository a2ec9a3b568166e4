//! One parser per supported source format.
//!
//! Each parser turns a single file into a [`RecordBatch`] whose rows follow
//! the file's own order and already carry the declared [`Record`] types.
//! Parsers never recover from bad input: the first malformed file or row is
//! returned as an error and aborts the extraction.
//!
//! [`Record`]: crate::data::Record

mod csv;
mod json;
mod xml;

pub use self::csv::CsvParser;
pub use self::json::JsonParser;
pub use self::xml::XmlParser;

use crate::data::record::{RecordBatch, SourceFormat};
use crate::error::Result;
use std::path::Path;

/// Converts one source file into normalized records.
pub trait FormatParser {
    /// The format this parser understands.
    fn format(&self) -> SourceFormat;

    /// Parses the file at `path`.
    ///
    /// # Errors
    /// Returns `SourceRead` if the file cannot be read or is not valid for
    /// the format, and `Schema` if a row lacks one of the four fields or a
    /// value cannot be coerced.
    fn parse(&self, path: &Path) -> Result<RecordBatch>;
}

/// Returns the parser registered for `format`.
pub fn parser_for(format: SourceFormat) -> Box<dyn FormatParser> {
    match format {
        SourceFormat::Csv => Box::new(CsvParser),
        SourceFormat::Json => Box::new(JsonParser),
        SourceFormat::Xml => Box::new(XmlParser),
    }
}
