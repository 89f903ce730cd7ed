//! Consolidated output and raw-response archive
//!
//! The consolidated file is rewritten wholesale on every flush and read back
//! on resume. Raw responses are archived once per fetch, before
//! normalization, and never touched again.

use crate::batch::Aggregate;
use crate::config::MetadataConfig;
use crate::error::Result;
use crate::types::{ConsolidatedOutput, RawRecord, RunMetadata};
use crate::utils::get_unique_path;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Timestamp format used in every written document
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Writes the consolidated `{metadata, errors, idvs}` document
pub struct OutputWriter {
    path: PathBuf,
    metadata: MetadataConfig,
}

impl OutputWriter {
    /// Create a writer for `path`
    pub fn new(path: impl Into<PathBuf>, metadata: MetadataConfig) -> Self {
        Self {
            path: path.into(),
            metadata,
        }
    }

    /// Target file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Build the document for an aggregate. Only `generated_at` depends on
    /// anything but the aggregate itself.
    pub fn document(&self, aggregate: &Aggregate, generated_at: DateTime<Utc>) -> ConsolidatedOutput {
        ConsolidatedOutput {
            metadata: RunMetadata {
                description: self.metadata.description.clone(),
                source: self.metadata.source.clone(),
                query_method: self.metadata.query_method.clone(),
                generated_at: generated_at.format(TIMESTAMP_FORMAT).to_string(),
                idv_count: aggregate.idvs.len(),
                idvs_with_task_orders: aggregate.idvs_with_task_orders(),
                total_task_orders: aggregate.total_task_orders,
                total_obligated: aggregate.total_obligated,
            },
            errors: aggregate.errors.clone(),
            idvs: aggregate.idvs.clone(),
        }
    }

    /// Serialize the aggregate and replace the output file
    pub async fn write(&self, aggregate: &Aggregate) -> Result<()> {
        let document = self.document(aggregate, Utc::now());
        let json = serde_json::to_vec_pretty(&document)?;
        write_replacing(&self.path, &json).await?;
        debug!(
            path = %self.path.display(),
            idvs = document.idvs.len(),
            "Wrote consolidated output"
        );
        Ok(())
    }
}

/// Read a consolidated output file written by a previous run
pub async fn read_consolidated(path: &Path) -> Result<ConsolidatedOutput> {
    let bytes = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Replace `path` with `contents` via a temporary sibling and a rename, so an
/// interrupted write leaves the previous file intact
pub(crate) async fn write_replacing(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    tokio::fs::write(&tmp, contents).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[derive(Serialize)]
struct ArchivedResponse<'a> {
    source: &'a str,
    query_params: &'a serde_json::Value,
    fetched_at: String,
    record_count: usize,
    data: &'a [RawRecord],
}

/// Write-once archive of raw feed responses
pub struct RawArchive {
    dir: PathBuf,
}

impl RawArchive {
    /// Archive into `dir` (created on first save)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Archive one response as `<source>_<unix_ts>.json`
    ///
    /// An existing file is never overwritten; a colliding name gets a
    /// numeric suffix instead.
    pub async fn save(
        &self,
        source: &str,
        query_params: &serde_json::Value,
        data: &[RawRecord],
    ) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let now = Utc::now();
        let payload = ArchivedResponse {
            source,
            query_params,
            fetched_at: now.format(TIMESTAMP_FORMAT).to_string(),
            record_count: data.len(),
            data,
        };
        let json = serde_json::to_vec_pretty(&payload)?;

        let path = get_unique_path(&self.dir.join(format!("{}_{}.json", source, now.timestamp())))?;
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(&json).await?;
        file.flush().await?;

        debug!(path = %path.display(), records = data.len(), "Archived raw response");
        Ok(path)
    }
}
