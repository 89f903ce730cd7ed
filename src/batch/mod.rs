//! Resumable batch fetch over the contractor list
//!
//! [`BatchRunner`] walks contractors in input order. Each one is either reused
//! from a previous run, skipped, or fetched through a [`TaskOrderSource`];
//! a failed fetch is recorded and the batch moves on. Running totals live in
//! an [`Aggregate`] that is threaded through [`BatchRunner::step`] and
//! flushed to the consolidated output every `flush_every` contractors.

use crate::checkpoint::{CheckpointStore, ResumeState};
use crate::config::{BatchConfig, Config};
use crate::error::Result;
use crate::feed::TaskOrderSource;
use crate::normalize::normalize_record;
use crate::output::{OutputWriter, RawArchive};
use crate::types::{Contractor, FetchErrorEntry, FlatRecord, IdvResult};
use serde_json::json;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

pub mod report;

pub use report::Reporter;

/// Running totals for one batch run
#[derive(Clone, Debug, Default)]
pub struct Aggregate {
    /// Per-vehicle results in processing order, cached ones included
    pub idvs: Vec<IdvResult>,
    /// Every task order across `idvs`
    pub task_orders: Vec<FlatRecord>,
    /// Sum of `task_order_count` over `idvs`
    pub total_task_orders: usize,
    /// Sum of `total_obligated` over `idvs`
    pub total_obligated: f64,
    /// Fetch failures from this run only
    pub errors: Vec<FetchErrorEntry>,
}

impl Aggregate {
    /// Append one vehicle's result and fold it into the totals
    pub fn push(&mut self, result: IdvResult) {
        self.total_task_orders += result.task_order_count;
        self.total_obligated += result.total_obligated;
        self.task_orders.extend(result.task_orders.iter().cloned());
        self.idvs.push(result);
    }

    /// Record a fetch failure for `contractor`
    pub fn record_error(&mut self, contractor: &Contractor, message: impl Into<String>) {
        self.errors.push(FetchErrorEntry {
            name: contractor.name.clone(),
            idv_piid: contractor.award_number.clone(),
            error: message.into(),
        });
    }

    /// Vehicles with at least one task order
    pub fn idvs_with_task_orders(&self) -> usize {
        self.idvs.iter().filter(|r| r.task_order_count > 0).count()
    }
}

/// Load the contractor list from a JSON array file
///
/// # Errors
///
/// A missing or malformed input file is fatal.
pub async fn load_contractors(path: &Path) -> Result<Vec<Contractor>> {
    let bytes = tokio::fs::read(path).await?;
    let contractors: Vec<Contractor> = serde_json::from_slice(&bytes)?;
    debug!(path = %path.display(), count = contractors.len(), "Loaded contractors");
    Ok(contractors)
}

/// Sequential, checkpointed fetch loop
pub struct BatchRunner<S, W: Write = std::io::Stdout> {
    source: S,
    checkpoint: CheckpointStore,
    writer: OutputWriter,
    archive: RawArchive,
    batch: BatchConfig,
    reporter: Reporter<W>,
}

impl<S: TaskOrderSource, W: Write> BatchRunner<S, W> {
    /// Build a runner writing to the paths in `config`
    pub fn new(
        source: S,
        config: &Config,
        checkpoint: CheckpointStore,
        reporter: Reporter<W>,
    ) -> Self {
        Self {
            source,
            checkpoint,
            writer: OutputWriter::new(&config.paths.output_file, config.metadata.clone()),
            archive: RawArchive::new(&config.paths.raw_dir),
            batch: config.batch.clone(),
            reporter,
        }
    }

    /// Checkpoint state, updated as contractors complete
    pub fn checkpoint(&self) -> &CheckpointStore {
        &self.checkpoint
    }

    /// Console reporter
    pub fn reporter(&self) -> &Reporter<W> {
        &self.reporter
    }

    /// Give back the console reporter
    pub fn into_reporter(self) -> Reporter<W> {
        self.reporter
    }

    /// Process every contractor, flush the output, then print the summary
    /// and ranked listing
    ///
    /// # Errors
    ///
    /// Only local file failures end the run early. Fetch failures are
    /// recorded in the returned aggregate.
    pub async fn run(&mut self, contractors: &[Contractor]) -> Result<Aggregate> {
        let total = contractors.len();
        let flush_every = self.batch.flush_every.max(1);
        let mut aggregate = Aggregate::default();

        info!(
            contractors = total,
            already_done = self.checkpoint.completed_count(),
            "Starting batch"
        );

        for (index, contractor) in contractors.iter().enumerate() {
            let position = index + 1;
            aggregate = self.step(position, total, contractor, aggregate).await?;

            if position % flush_every == 0 {
                self.reporter.saving(aggregate.total_task_orders)?;
                self.writer.write(&aggregate).await?;
            }
        }

        self.writer.write(&aggregate).await?;
        info!(
            idvs = aggregate.idvs.len(),
            task_orders = aggregate.total_task_orders,
            errors = aggregate.errors.len(),
            path = %self.writer.path().display(),
            "Batch complete"
        );

        self.reporter.summary(&aggregate, self.writer.path())?;
        self.reporter.ranked_listing(&aggregate)?;
        self.reporter.flush()?;
        Ok(aggregate)
    }

    /// Handle contractor `position` of `total` and return the updated totals
    ///
    /// # Errors
    ///
    /// Archive, progress-file and console write failures.
    pub async fn step(
        &mut self,
        position: usize,
        total: usize,
        contractor: &Contractor,
        mut aggregate: Aggregate,
    ) -> Result<Aggregate> {
        let idv_piid = contractor.award_number.as_str();

        match self.checkpoint.status(idv_piid) {
            ResumeState::Cached(previous) => {
                self.reporter
                    .cached(position, total, contractor, previous.task_order_count)?;
                aggregate.push(previous.clone());
                return Ok(aggregate);
            }
            ResumeState::Skip => {
                self.reporter.skipped(position, total, contractor)?;
                return Ok(aggregate);
            }
            ResumeState::Fresh => {}
        }

        self.reporter.fetching(position, total, contractor)?;
        self.reporter.flush()?;

        if !self.batch.request_delay.is_zero() {
            tokio::time::sleep(self.batch.request_delay).await;
        }

        match self.source.fetch_by_ref_idv(idv_piid).await {
            Ok(raw_records) => {
                if !raw_records.is_empty() {
                    self.archive
                        .save(
                            &format!("fpds_ref_idv_{idv_piid}"),
                            &json!({ "REF_IDV_PIID": idv_piid }),
                            &raw_records,
                        )
                        .await?;
                }

                let task_orders = raw_records.iter().map(normalize_record).collect();
                let result = IdvResult::fetched(contractor, task_orders);
                debug!(
                    idv_piid,
                    task_orders = result.task_order_count,
                    obligated = result.total_obligated,
                    "Fetched task orders"
                );
                self.reporter.fetched(&result)?;
                aggregate.push(result);
            }
            Err(e) => {
                let message = e.to_string();
                warn!(idv_piid, error = %e, "Fetch failed, continuing with next contractor");
                self.reporter.error(&message)?;
                aggregate.record_error(contractor, message.as_str());
                aggregate.push(IdvResult::failed(contractor, message));
            }
        }

        self.checkpoint.mark_completed(idv_piid).await?;
        Ok(aggregate)
    }
}
