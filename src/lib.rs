//! # fpds-task-orders
//!
//! Resumable batch retrieval of task orders from the FPDS ATOM feed.
//!
//! For every contract vehicle (IDV) in a contractor list, the library queries
//! the feed for awards that reference it, flattens the verbose FPDS schema
//! into [`FlatRecord`]s, and persists the results incrementally so an
//! interrupted run can be resumed.
//!
//! ## Quick Start
//!
//! ```no_run
//! use fpds_task_orders::{BatchRunner, CheckpointStore, Config, FpdsClient, Reporter};
//! use fpds_task_orders::batch::load_contractors;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_project_dir(".");
//!     let contractors = load_contractors(&config.paths.input_file).await?;
//!
//!     let client = FpdsClient::new(config.feed.clone(), config.retry.clone())?;
//!     let checkpoint =
//!         CheckpointStore::resume(&config.paths.output_file, &config.paths.progress_file).await?;
//!
//!     let mut runner = BatchRunner::new(client, &config, checkpoint, Reporter::stdout());
//!     let aggregate = runner.run(&contractors).await?;
//!     println!("{} task orders", aggregate.total_task_orders);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Batch loop and console reporting
pub mod batch;
/// Resume checkpoints
pub mod checkpoint;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// FPDS feed access
pub mod feed;
/// Record normalization
pub mod normalize;
/// Consolidated output and raw archive
pub mod output;
/// Retry logic with exponential backoff
pub mod retry;
/// Core types
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use batch::{Aggregate, BatchRunner, Reporter};
pub use checkpoint::{CheckpointStore, ResumeSource, ResumeState};
pub use config::Config;
pub use error::{Error, Result};
pub use feed::{FpdsClient, TaskOrderSource};
pub use normalize::{RecordVariant, normalize_record};
pub use output::{OutputWriter, RawArchive};
pub use types::{ConsolidatedOutput, Contractor, FetchErrorEntry, FlatRecord, IdvResult, RawRecord};
