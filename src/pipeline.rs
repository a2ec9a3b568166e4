use crate::config::Config;
use crate::data::{DataIngestion, DataProcessor, UnifiedDataset};
use crate::error::Result;
use crate::loader::CsvLoader;
use crate::progress::ProgressLogger;
use std::fmt;
use tracing::{debug, error, info};

/// Where a run currently is. `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Start,
    Extracting,
    Transforming,
    Loading,
    Done,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Runs one extract, transform and load pass, bracketing each phase with a
/// progress log entry.
///
/// The transformed table is printed to stdout once prices are rounded,
/// before the load starts. The first error from any component stops the
/// run; it is logged and returned unchanged. Nothing is retried.
pub struct EtlPipeline {
    ingestion: DataIngestion,
    processor: DataProcessor,
    loader: CsvLoader,
    progress: ProgressLogger,
    state: PipelineState,
}

impl EtlPipeline {
    /// Creates a new `EtlPipeline` from the run configuration.
    ///
    /// # Arguments
    /// * `config` - Source directory, output and log paths, and price precision
    ///
    /// # Returns
    /// A pipeline in [`PipelineState::Start`]
    pub fn new(config: Config) -> Self {
        Self {
            ingestion: DataIngestion::new(config.source_dir),
            processor: DataProcessor::new(config.price_decimals),
            loader: CsvLoader::new(config.target_file, config.price_decimals),
            progress: ProgressLogger::new(config.log_file),
            state: PipelineState::Start,
        }
    }

    /// Current phase, or the terminal state after [`EtlPipeline::run`].
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Executes the run and returns the transformed dataset.
    ///
    /// # Errors
    /// Returns the first `SourceRead`, `Schema` or `SinkWrite` error raised
    /// by a phase or by the progress log itself. The pipeline is left in
    /// [`PipelineState::Failed`].
    pub fn run(&mut self) -> Result<UnifiedDataset> {
        self.state = PipelineState::Start;
        let result = self.run_phases();

        match &result {
            Ok(dataset) => {
                self.state = PipelineState::Done;
                info!(rows = dataset.len(), "ETL run finished");
            }
            Err(e) => {
                let failed_in = self.state;
                self.state = PipelineState::Failed;
                error!(kind = %e.kind(), state = %failed_in, "ETL run failed: {}", e);
            }
        }

        result
    }

    fn run_phases(&mut self) -> Result<UnifiedDataset> {
        self.progress.log("ETL Job Started")?;

        self.enter(PipelineState::Extracting);
        self.progress.log("Extract Phase Started")?;
        let extracted = self.ingestion.extract()?;
        self.progress.log("Extract Phase Ended")?;

        self.enter(PipelineState::Transforming);
        self.progress.log("Transformation Phase Started")?;
        let transformed = self.processor.process(extracted);
        println!("Transformed Data");
        println!("{}", transformed);
        self.progress.log("Transformation Phase Ended")?;

        self.enter(PipelineState::Loading);
        self.progress.log("Load Phase Started")?;
        self.loader.load(&transformed)?;
        self.progress.log("Load Phase Ended")?;

        self.progress.log("ETL Job Ended")?;
        Ok(transformed)
    }

    fn enter(&mut self, state: PipelineState) {
        debug!(from = %self.state, to = %state, "pipeline state change");
        self.state = state;
    }
}
