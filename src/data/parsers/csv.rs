use super::FormatParser;
use crate::data::record::{coerce_price, coerce_year, Record, RecordBatch, SourceFormat, FIELD_NAMES};
use crate::error::{EtlError, Result};
use serde::Deserialize;
use std::path::Path;

/// Raw CSV row, matched to the header by column name.
#[derive(Debug, Deserialize)]
struct CsvRow {
    car_model: String,
    year_of_manufacture: String,
    price: String,
    fuel: String,
}

/// Reads comma-delimited files with a header row.
///
/// Columns are looked up by header name, so their order in the file does not
/// matter and extra columns are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvParser;

impl FormatParser for CsvParser {
    fn format(&self) -> SourceFormat {
        SourceFormat::Csv
    }

    fn parse(&self, path: &Path) -> Result<RecordBatch> {
        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|e| EtlError::source_read(path, e))?;

        let headers = reader
            .headers()
            .map_err(|e| EtlError::source_read(path, format!("invalid header row: {}", e)))?
            .clone();

        if let Some(missing) = FIELD_NAMES
            .into_iter()
            .find(|field| !headers.iter().any(|h| h == *field))
        {
            return Err(EtlError::schema(
                path,
                format!("header row is missing column {:?}", missing),
            ));
        }

        let mut batch = RecordBatch::new();

        for result in reader.records() {
            let row = result.map_err(|e| EtlError::source_read(path, e))?;
            let line = row.position().map(|p| p.line()).unwrap_or_default();

            let raw: CsvRow = row
                .deserialize(Some(&headers))
                .map_err(|e| EtlError::schema(path, format!("line {}: {}", line, e)))?;

            batch.push(Record {
                year_of_manufacture: coerce_year(&raw.year_of_manufacture)
                    .map_err(|e| EtlError::schema(path, format!("line {}: {}", line, e)))?,
                price: coerce_price(&raw.price)
                    .map_err(|e| EtlError::schema(path, format!("line {}: {}", line, e)))?,
                car_model: raw.car_model,
                fuel: raw.fuel,
            });
        }

        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::fs;
    use tempfile::TempDir;

    fn write_fixture(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_rows_in_order() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(
            &dir,
            "used_car_prices1.csv",
            "car_model,year_of_manufacture,price,fuel\n\
             ritz,2014,5000.0,Petrol\n\
             sx4,2013,7089.552238805969,Diesel\n\
             \"Toyota Corolla\",2019,19999.999,Petrol\n",
        );

        let batch = CsvParser.parse(&path).unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0].car_model, "ritz");
        assert_eq!(batch[0].year_of_manufacture, 2014);
        assert_eq!(batch[1].price, 7089.552238805969);
        assert_eq!(batch[1].fuel, "Diesel");
        assert_eq!(batch[2].car_model, "Toyota Corolla");
        assert_eq!(batch[2].price, 19999.999);
    }

    #[test]
    fn test_columns_matched_by_name() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(
            &dir,
            "reordered.csv",
            "fuel,price,dealer,car_model,year_of_manufacture\n\
             Electric,44999.5,north,Tesla Model 3,2021\n",
        );

        let batch = CsvParser.parse(&path).unwrap();
        assert_eq!(
            batch,
            vec![Record {
                car_model: "Tesla Model 3".to_string(),
                year_of_manufacture: 2021,
                price: 44999.5,
                fuel: "Electric".to_string(),
            }]
        );
    }

    #[test]
    fn test_header_only_file_is_empty_batch() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir, "empty.csv", "car_model,year_of_manufacture,price,fuel\n");
        assert!(CsvParser.parse(&path).unwrap().is_empty());
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir, "no_fuel.csv", "car_model,year_of_manufacture,price\nritz,2014,5000\n");
        let err = CsvParser.parse(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert!(err.to_string().contains("fuel"));
    }

    #[test]
    fn test_ragged_row_is_source_error() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(
            &dir,
            "ragged.csv",
            "car_model,year_of_manufacture,price,fuel\nritz,2014,5000.0\n",
        );
        assert_eq!(CsvParser.parse(&path).unwrap_err().kind(), ErrorKind::SourceRead);
    }

    #[test]
    fn test_bad_price_is_schema_error() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(
            &dir,
            "bad_price.csv",
            "car_model,year_of_manufacture,price,fuel\nritz,2014,call us,Petrol\n",
        );
        let err = CsvParser.parse(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_missing_file_is_source_error() {
        let dir = TempDir::new().unwrap();
        let err = CsvParser.parse(&dir.path().join("absent.csv")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceRead);
    }
}
