use std::path::PathBuf;

pub const DEFAULT_SOURCE_DIR: &str = "./data_source/";
pub const DEFAULT_TARGET_FILE: &str = "transformed_data.csv";
pub const DEFAULT_LOG_FILE: &str = "log_file.txt";
pub const DEFAULT_PRICE_DECIMALS: u32 = 2;

/// Paths and settings for a single ETL run.
///
/// Built once at startup and handed to [`crate::pipeline::EtlPipeline`].
/// The job has no configuration surface: no flags and no environment
/// variables are read. [`Config::default`] always yields the fixed relative
/// paths `./data_source/`, `transformed_data.csv` and `log_file.txt`.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub source_dir: PathBuf,
    pub target_file: PathBuf,
    pub log_file: PathBuf,
    pub price_decimals: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            target_file: PathBuf::from(DEFAULT_TARGET_FILE),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            price_decimals: DEFAULT_PRICE_DECIMALS,
        }
    }
}

#[cfg(test)]
impl Config {
    /// Resolves the default relative paths under `root`, so tests can run
    /// inside a scratch directory.
    pub fn with_root(root: impl AsRef<std::path::Path>) -> Self {
        let root = root.as_ref();
        Self {
            source_dir: root.join(DEFAULT_SOURCE_DIR),
            target_file: root.join(DEFAULT_TARGET_FILE),
            log_file: root.join(DEFAULT_LOG_FILE),
            ..Self::default()
        }
    }
}
