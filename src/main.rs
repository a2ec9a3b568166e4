mod config;
mod data;
mod error;
mod loader;
mod pipeline;
mod progress;

use config::Config;
use pipeline::EtlPipeline;
use tracing::{debug, info};

/// Main entry point for the car listings ETL job.
///
/// This function runs a single extract, transform and load pass:
/// 1. Initialize logging
/// 2. Build the fixed run configuration
/// 3. Extract every CSV, JSON and XML file in the source directory
/// 4. Round prices to two decimal places and print the transformed table
/// 5. Write the result to the target CSV file
///
/// Progress is appended to the log file around every phase.
///
/// # Returns
/// Returns `Ok(())` if the run completes, otherwise the first error
/// encountered, which ends the process with a non-zero exit code
fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = Config::default();
    info!(
        source_dir = %config.source_dir.display(),
        target_file = %config.target_file.display(),
        log_file = %config.log_file.display(),
        "starting ETL run"
    );

    let mut pipeline = EtlPipeline::new(config);
    let transformed = pipeline.run()?;
    debug!(state = %pipeline.state(), rows = transformed.len(), "pipeline finished");

    Ok(())
}
