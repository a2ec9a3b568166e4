use super::FormatParser;
use crate::data::record::{coerce_price, coerce_year, Record, RecordBatch, SourceFormat, FIELD_NAMES};
use crate::error::{EtlError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs;
use std::path::Path;

const ROW_TAG: &[u8] = b"row";

/// Child element text collected for one `<row>`, indexed like [`FIELD_NAMES`].
#[derive(Debug, Default)]
struct RowFields {
    values: [Option<String>; 4],
}

impl RowFields {
    /// Keeps the first occurrence of a field; later duplicates are ignored.
    fn fill(&mut self, index: usize, value: String) {
        if self.values[index].is_none() {
            self.values[index] = Some(value);
        }
    }

    fn into_record(self, path: &Path, ordinal: usize) -> Result<Record> {
        let [car_model, year, price, fuel] = self.values;
        let require = |value: Option<String>, field: &str| {
            value.ok_or_else(|| {
                EtlError::schema(path, format!("row {} is missing <{}>", ordinal, field))
            })
        };
        let invalid = |reason: String| EtlError::schema(path, format!("row {}: {}", ordinal, reason));

        let car_model = require(car_model, FIELD_NAMES[0])?;
        let year = require(year, FIELD_NAMES[1])?;
        let price = require(price, FIELD_NAMES[2])?;
        let fuel = require(fuel, FIELD_NAMES[3])?;

        Ok(Record {
            car_model,
            year_of_manufacture: coerce_year(&year).map_err(invalid)?,
            price: coerce_price(&price).map_err(invalid)?,
            fuel,
        })
    }
}

fn field_slot(name: &[u8]) -> Option<usize> {
    FIELD_NAMES.iter().position(|field| field.as_bytes() == name)
}

/// Reads XML documents whose root holds `<row>` elements.
///
/// Only `<row>` elements that are direct children of the root are read.
/// Within a row the four fields are found by element name, in any order;
/// unrelated elements are skipped and a repeated field keeps its first
/// value. Anything after the root element other than whitespace, comments
/// or processing instructions makes the document malformed.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlParser;

impl FormatParser for XmlParser {
    fn format(&self) -> SourceFormat {
        SourceFormat::Xml
    }

    fn parse(&self, path: &Path) -> Result<RecordBatch> {
        let content = fs::read_to_string(path).map_err(|e| EtlError::source_read(path, e))?;
        parse_document(path, &content)
    }
}

fn parse_document(path: &Path, content: &str) -> Result<RecordBatch> {
    // Text is kept as written; a field is trimmed once when it closes.
    let mut reader = Reader::from_str(content);

    let mut batch = RecordBatch::new();
    let mut depth = 0usize;
    let mut saw_root = false;
    let mut root_closed = false;
    let mut row: Option<RowFields> = None;
    let mut slot: Option<usize> = None;
    let mut text = String::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            EtlError::source_read(
                path,
                format!("malformed XML at byte {}: {}", reader.error_position(), e),
            )
        })?;

        match event {
            Event::Start(_) | Event::Empty(_) if root_closed => {
                return Err(junk_after_root(path, reader.buffer_position()));
            }
            Event::Start(element) => {
                depth += 1;
                match depth {
                    1 => saw_root = true,
                    2 if element.name().as_ref() == ROW_TAG => row = Some(RowFields::default()),
                    3 if row.is_some() => {
                        slot = field_slot(element.name().as_ref());
                        text.clear();
                    }
                    _ => {}
                }
            }
            Event::Empty(element) => match depth {
                0 => {
                    saw_root = true;
                    root_closed = true;
                }
                1 if element.name().as_ref() == ROW_TAG => {
                    let ordinal = batch.len();
                    batch.push(RowFields::default().into_record(path, ordinal)?);
                }
                2 => {
                    if let (Some(fields), Some(index)) = (row.as_mut(), field_slot(element.name().as_ref())) {
                        fields.fill(index, String::new());
                    }
                }
                _ => {}
            },
            Event::Text(content) if depth == 0 => {
                if !content.iter().all(u8::is_ascii_whitespace) {
                    return Err(junk_after_root(path, reader.buffer_position()));
                }
            }
            Event::Text(content) if depth == 3 && slot.is_some() => {
                let unescaped = content.unescape().map_err(|e| {
                    EtlError::source_read(path, format!("bad text content: {}", e))
                })?;
                text.push_str(&unescaped);
            }
            Event::CData(content) if depth == 3 && slot.is_some() => {
                text.push_str(&String::from_utf8_lossy(&content));
            }
            Event::End(_) => {
                match depth {
                    3 => {
                        if let (Some(fields), Some(index)) = (row.as_mut(), slot.take()) {
                            fields.fill(index, text.trim().to_string());
                        }
                    }
                    2 => {
                        if let Some(fields) = row.take() {
                            let ordinal = batch.len();
                            batch.push(fields.into_record(path, ordinal)?);
                        }
                    }
                    1 => root_closed = true,
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(EtlError::source_read(path, "document has no root element"));
    }
    if depth != 0 {
        return Err(EtlError::source_read(path, "document ended before the root element closed"));
    }

    Ok(batch)
}

fn junk_after_root(path: &Path, position: u64) -> EtlError {
    EtlError::source_read(
        path,
        format!("junk outside the document element at byte {}", position),
    )
}
