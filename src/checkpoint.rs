//! Resume state: which contract vehicles are already done
//!
//! Two sources, in priority order, when resuming:
//!
//! 1. the consolidated output of a previous run: every listed vehicle is done
//!    and its full result is reused;
//! 2. otherwise the progress file: listed vehicles are skipped outright, with
//!    no result carried into this run.
//!
//! The progress file is rewritten after every contractor so a crash loses at
//! most the vehicle in flight.

use crate::error::Result;
use crate::output::{read_consolidated, write_replacing};
use crate::types::IdvResult;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What to do with one contractor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResumeState<'a> {
    /// Done in a previous run with a saved result
    Cached(&'a IdvResult),
    /// Done according to the progress file, but no result survives
    Skip,
    /// Needs fetching
    Fresh,
}

/// Where the initial completed set came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeSource {
    /// Not resuming
    None,
    /// Prior consolidated output file
    Output,
    /// Progress file only
    Progress,
}

/// Completed-identifier tracking with optional prior results
#[derive(Debug)]
pub struct CheckpointStore {
    progress_path: PathBuf,
    completed: BTreeSet<String>,
    prior: HashMap<String, IdvResult>,
    source: ResumeSource,
}

impl CheckpointStore {
    /// Empty store; nothing is considered done
    pub fn fresh(progress_path: impl Into<PathBuf>) -> Self {
        Self {
            progress_path: progress_path.into(),
            completed: BTreeSet::new(),
            prior: HashMap::new(),
            source: ResumeSource::None,
        }
    }

    /// Load resume state from the output file, falling back to the progress
    /// file. Neither existing is not an error: the run starts empty.
    ///
    /// # Errors
    ///
    /// An existing file that cannot be read or parsed is fatal.
    pub async fn resume(output_path: &Path, progress_path: impl Into<PathBuf>) -> Result<Self> {
        let mut store = Self::fresh(progress_path);

        if tokio::fs::try_exists(output_path).await? {
            let previous = read_consolidated(output_path).await?;
            for entry in previous.idvs {
                if entry.idv_piid.is_empty() {
                    continue;
                }
                store.completed.insert(entry.idv_piid.clone());
                store.prior.insert(entry.idv_piid.clone(), entry);
            }
            store.source = ResumeSource::Output;
            info!(
                completed = store.completed.len(),
                path = %output_path.display(),
                "Resuming from prior output"
            );
        } else if tokio::fs::try_exists(&store.progress_path).await? {
            let bytes = tokio::fs::read(&store.progress_path).await?;
            let ids: Vec<String> = serde_json::from_slice(&bytes)?;
            store.completed.extend(ids);
            store.source = ResumeSource::Progress;
            info!(
                completed = store.completed.len(),
                path = %store.progress_path.display(),
                "Resuming from progress file"
            );
        } else {
            debug!("Nothing to resume from; starting empty");
        }

        Ok(store)
    }

    /// Which resume source populated this store
    pub fn source(&self) -> ResumeSource {
        self.source
    }

    /// Number of identifiers considered done
    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    /// Whether `idv_piid` is done
    pub fn is_completed(&self, idv_piid: &str) -> bool {
        self.completed.contains(idv_piid)
    }

    /// Classify one contractor
    pub fn status(&self, idv_piid: &str) -> ResumeState<'_> {
        if !self.completed.contains(idv_piid) {
            return ResumeState::Fresh;
        }
        match self.prior.get(idv_piid) {
            Some(result) => ResumeState::Cached(result),
            None => ResumeState::Skip,
        }
    }

    /// Mark `idv_piid` done and rewrite the progress file
    pub async fn mark_completed(&mut self, idv_piid: &str) -> Result<()> {
        self.completed.insert(idv_piid.to_string());
        let ids: Vec<&String> = self.completed.iter().collect();
        let json = serde_json::to_vec(&ids)?;
        write_replacing(&self.progress_path, &json).await
    }
}
