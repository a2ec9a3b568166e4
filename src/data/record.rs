use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use std::fmt;

/// Canonical column order shared by every source format and the output file.
pub const FIELD_NAMES: [&str; 4] = ["car_model", "year_of_manufacture", "price", "fuel"];

/// A single car listing, normalized from any source format.
///
/// All parsers coerce into these declared types at parse time, so rows that
/// came from XML text carry the same numeric `year_of_manufacture` and
/// `price` as rows read from CSV or JSON.
///
/// # Fields
/// * `car_model`: Model name, taken verbatim from the source
/// * `year_of_manufacture`: Four-digit model year
/// * `price`: Listing price
/// * `fuel`: Fuel type (e.g. "Petrol", "Diesel", "Electric")
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub car_model: String,
    pub year_of_manufacture: i32,
    pub price: f64,
    pub fuel: String,
}

/// Rows parsed from one source file, in the file's own order.
pub type RecordBatch = Vec<Record>;

/// Source file formats, in the order the extractor visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Json,
    Xml,
}

impl SourceFormat {
    pub const ALL: [SourceFormat; 3] = [SourceFormat::Csv, SourceFormat::Json, SourceFormat::Xml];

    /// File extension (without the dot) that identifies this format.
    pub fn extension(self) -> &'static str {
        match self {
            SourceFormat::Csv => "csv",
            SourceFormat::Json => "json",
            SourceFormat::Xml => "xml",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Parses a model year from source text.
///
/// Accepts plain integers ("2019") and integral decimals ("2019.0"), which
/// is how numeric columns often come out of spreadsheets.
pub fn coerce_year(raw: &str) -> Result<i32, String> {
    let trimmed = raw.trim();
    if let Ok(year) = trimmed.parse::<i32>() {
        return Ok(year);
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.fract() == 0.0 && value.abs() <= i32::MAX as f64 => Ok(value as i32),
        _ => Err(format!("year_of_manufacture {:?} is not an integer", raw)),
    }
}

/// Parses a price from source text.
pub fn coerce_price(raw: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite())
        .ok_or_else(|| format!("price {:?} is not a number", raw))
}

/// Every record from every source file of a run, in extraction order.
///
/// Batches are appended in place; nothing is rebuilt when a new file is
/// merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnifiedDataset {
    records: Vec<Record>,
}

impl UnifiedDataset {
    /// Creates an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one file's rows after everything already collected.
    ///
    /// # Arguments
    /// * `batch` - Rows from a single source file, in file order
    pub fn append_batch(&mut self, batch: RecordBatch) {
        self.records.extend(batch);
    }

    /// Number of records collected so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the records in extraction order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Mutable access for in-place transformation. The record count and
    /// order cannot change through this slice.
    pub fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }
}

impl From<Vec<Record>> for UnifiedDataset {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

/// Renders the dataset as a table with a leading positional index column.
///
/// Prices are shown with two decimals. An empty dataset renders the header
/// followed by `(no records)`.
impl fmt::Display for UnifiedDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(std::iter::once("").chain(FIELD_NAMES));

        for (index, record) in self.records.iter().enumerate() {
            table.add_row(vec![
                index.to_string(),
                record.car_model.clone(),
                record.year_of_manufacture.to_string(),
                format!("{:.2}", record.price),
                record.fuel.clone(),
            ]);
        }

        write!(f, "{}", table)?;
        if self.records.is_empty() {
            write!(f, "\n(no records)")?;
        }
        Ok(())
    }
}
