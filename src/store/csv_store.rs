//! Flat-file CSV report log.
//!
//! One row appended per completed report. Named and anonymous reports go to
//! separate files. The writer is plain sync `csv` on a blocking task — rows
//! are tiny and appends must happen in submission order per file handle open.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use crate::error::StoreError;
use crate::store::{IncidentReport, ReportStore};

/// Append-only CSV store with a named/anonymous file split.
pub struct CsvStore {
    named_path: PathBuf,
    anonymous_path: PathBuf,
}

impl CsvStore {
    pub fn new(named_path: impl Into<PathBuf>, anonymous_path: impl Into<PathBuf>) -> Self {
        Self {
            named_path: named_path.into(),
            anonymous_path: anonymous_path.into(),
        }
    }

    /// The file a report will land in.
    pub fn path_for(&self, report: &IncidentReport) -> &Path {
        if report.anonymous {
            &self.anonymous_path
        } else {
            &self.named_path
        }
    }
}

fn append_record(path: &Path, record: &[String]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| StoreError::Append {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(record).map_err(|e| StoreError::Append {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    writer.flush()?;
    Ok(())
}

#[async_trait]
impl ReportStore for CsvStore {
    async fn append(&self, report: &IncidentReport) -> Result<(), StoreError> {
        let path = self.path_for(report).to_path_buf();
        let record = report.to_record();

        let join_path = path.clone();
        tokio::task::spawn_blocking(move || append_record(&path, &record))
            .await
            .map_err(|e| StoreError::Append {
                path: join_path,
                message: format!("writer task failed: {e}"),
            })??;

        info!(
            report_id = %report.id,
            category = %report.category,
            anonymous = report.anonymous,
            "Report appended"
        );
        Ok(())
    }
}
