use super::parsers::{parser_for, FormatParser};
use super::record::{SourceFormat, UnifiedDataset};
use crate::error::{EtlError, Result};
use std::io;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Extracts car listings from every supported file in a source directory.
///
/// Formats are visited in a fixed order (CSV, then JSON, then XML) and the
/// files of each format in lexical path order, so two runs over the same
/// directory produce identically ordered datasets.
///
/// # Key Features
/// * Discovers source files by extension (`*.csv`, `*.json`, `*.xml`)
/// * Dispatches each file to the matching [`FormatParser`]
/// * Appends each file's batch to a single accumulator
/// * Stops at the first file that fails to parse
pub struct DataIngestion {
    source_dir: PathBuf,
    parsers: Vec<Box<dyn FormatParser>>,
}

impl DataIngestion {
    /// Creates a new `DataIngestion` reading from `source_dir`.
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            parsers: SourceFormat::ALL.into_iter().map(parser_for).collect(),
        }
    }

    /// Extracts every source file into one dataset.
    ///
    /// # Errors
    /// Returns the first error raised while listing the directory or parsing
    /// a file. No partial dataset is returned.
    ///
    /// # Returns
    /// The unified dataset, which is empty when no source files exist
    pub fn extract(&self) -> Result<UnifiedDataset> {
        let mut dataset = UnifiedDataset::new();

        for parser in &self.parsers {
            let format = parser.format();
            let files = self.discover(format)?;
            debug!(%format, files = files.len(), "discovered source files");

            for path in files {
                let batch = parser.parse(&path)?;
                info!(path = %path.display(), %format, rows = batch.len(), "parsed source file");
                dataset.append_batch(batch);
            }
        }

        if dataset.is_empty() {
            warn!(dir = %self.source_dir.display(), "no source records found");
        }

        Ok(dataset)
    }

    /// Lists the regular files directly inside the source directory that
    /// carry `format`'s extension, sorted by path.
    ///
    /// Subdirectories are not descended and the extension match is
    /// case-sensitive, like a `*.csv` glob. A missing source directory lists
    /// as empty.
    ///
    /// # Errors
    /// Returns [`EtlError::SourceRead`] if the directory exists but cannot
    /// be listed.
    pub fn discover(&self, format: SourceFormat) -> Result<Vec<PathBuf>> {
        let walker = WalkDir::new(&self.source_dir).min_depth(1).max_depth(1);

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 && is_not_found(&e) => {
                    debug!(dir = %self.source_dir.display(), "source directory does not exist");
                    return Ok(Vec::new());
                }
                Err(e) => return Err(EtlError::source_read(&self.source_dir, e)),
            };

            let path = entry.path();
            let matches_extension = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == format.extension());

            // is_file follows symlinks, so linked source files still count
            if matches_extension && path.is_file() {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        Ok(files)
    }
}

fn is_not_found(err: &walkdir::Error) -> bool {
    err.io_error()
        .is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
}
