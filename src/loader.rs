use crate::data::record::{UnifiedDataset, FIELD_NAMES};
use crate::error::{EtlError, Result};
use std::path::PathBuf;
use tracing::info;

/// Writes the transformed dataset to a CSV file.
///
/// The file starts with a header naming every column, led by an unnamed
/// positional index column, then holds one line per record in dataset
/// order. An existing file at the target path is overwritten.
pub struct CsvLoader {
    target_file: PathBuf,
    price_decimals: u32,
}

impl CsvLoader {
    /// Creates a new `CsvLoader`.
    ///
    /// # Arguments
    /// * `target_file` - Output path; created or truncated on every load
    /// * `price_decimals` - Digits printed after the decimal point of `price`
    pub fn new(target_file: impl Into<PathBuf>, price_decimals: u32) -> Self {
        Self {
            target_file: target_file.into(),
            price_decimals,
        }
    }

    /// Serializes `dataset` to the target file.
    ///
    /// # Errors
    /// Returns `SinkWrite` if the file cannot be created or written.
    pub fn load(&self, dataset: &UnifiedDataset) -> Result<()> {
        let path = self.target_file.as_path();
        let sink_error = |e: ::csv::Error| EtlError::sink_write(path, e);

        let mut writer = ::csv::Writer::from_path(path).map_err(sink_error)?;

        let mut header = vec![""];
        header.extend(FIELD_NAMES);
        writer.write_record(&header).map_err(sink_error)?;

        for (index, record) in dataset.records().iter().enumerate() {
            writer
                .write_record([
                    index.to_string(),
                    record.car_model.clone(),
                    record.year_of_manufacture.to_string(),
                    format!("{:.*}", self.price_decimals as usize, record.price),
                    record.fuel.clone(),
                ])
                .map_err(sink_error)?;
        }

        writer.flush().map_err(|e| EtlError::sink_write(path, e))?;
        info!(path = %path.display(), rows = dataset.len(), "wrote output file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::Record;
    use crate::error::ErrorKind;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_record(model: &str, year: i32, price: f64, fuel: &str) -> Record {
        Record {
            car_model: model.to_string(),
            year_of_manufacture: year,
            price,
            fuel: fuel.to_string(),
        }
    }

    #[test]
    fn test_load_writes_header_and_indexed_rows() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("transformed_data.csv");
        let dataset = UnifiedDataset::from(vec![
            create_test_record("ritz", 2014, 5000.0, "Petrol"),
            create_test_record("Ford, Focus", 2012, 4500.5, "Diesel"),
        ]);

        CsvLoader::new(&target, 2).load(&dataset).unwrap();

        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            ",car_model,year_of_manufacture,price,fuel\n\
             0,ritz,2014,5000.00,Petrol\n\
             1,\"Ford, Focus\",2012,4500.50,Diesel\n"
        );
    }

    #[test]
    fn test_empty_dataset_writes_header_only() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.csv");

        CsvLoader::new(&target, 2).load(&UnifiedDataset::new()).unwrap();

        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            ",car_model,year_of_manufacture,price,fuel\n"
        );
    }

    #[test]
    fn test_load_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.csv");
        fs::write(&target, "stale contents that are longer than the new file\n".repeat(10)).unwrap();

        CsvLoader::new(&target, 2).load(&UnifiedDataset::new()).unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_unwritable_target_is_sink_error() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("missing_dir").join("out.csv");

        let err = CsvLoader::new(&target, 2).load(&UnifiedDataset::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SinkWrite);
    }
}
