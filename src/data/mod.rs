pub mod ingestion;
pub mod parsers;
pub mod processing;
pub mod record;

pub use ingestion::DataIngestion;
pub use processing::DataProcessor;
pub use record::UnifiedDataset;
