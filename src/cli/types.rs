//! Outcome reports returned by the workflow commands.
use log::*;
use std::path::PathBuf;

/// A file or asset name that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub name: String,
    pub reason: String,
}

impl Failure {
    pub fn new(name: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

/// Common behaviour of workflow reports.
pub trait Report {
    fn failures(&self) -> &[Failure];

    /// Log the counters at the end of a run.
    fn log_summary(&self);

    fn is_success(&self) -> bool {
        self.failures().is_empty()
    }
}

fn log_failures(failures: &[Failure]) {
    for failure in failures {
        error!("  {}: {}", failure.name, failure.reason);
    }
}

/// Result of `generate-lists`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingReport {
    /// Rows written to the manifest.
    pub records: usize,
    /// Release the manifest was uploaded to, `None` when nothing matched.
    pub uploaded_to: Option<String>,
    pub local_copy: Option<PathBuf>,
}

impl Report for ListingReport {
    fn failures(&self) -> &[Failure] {
        &[]
    }

    fn log_summary(&self) {
        match &self.uploaded_to {
            Some(tag) => info!(
                "listing with {} assets uploaded to release {tag}",
                self.records
            ),
            None => info!("no matching assets: listing not uploaded"),
        }

        if let Some(path) = &self.local_copy {
            info!("local copy of listing: {}", path.display());
        }
    }
}

/// Result of `upload-to-release`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub uploaded: Vec<String>,
    pub overwritten: Vec<String>,
    pub skipped: Vec<String>,
    pub created_releases: Vec<String>,
    pub failed: Vec<Failure>,
}

impl Report for UploadReport {
    fn failures(&self) -> &[Failure] {
        &self.failed
    }

    fn log_summary(&self) {
        info!(
            "upload complete: uploaded: {}, overwritten: {}, skipped: {}, failed: {}",
            self.uploaded.len(),
            self.overwritten.len(),
            self.skipped.len(),
            self.failed.len()
        );

        if !self.created_releases.is_empty() {
            info!("created releases: {}", self.created_releases.join(", "));
        }

        if !self.failed.is_empty() {
            error!("failed uploads:");
            log_failures(&self.failed);
        }
    }
}

/// Result of `download-from-release`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    pub downloaded: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<Failure>,
}

impl Report for DownloadReport {
    fn failures(&self) -> &[Failure] {
        &self.failed
    }

    fn log_summary(&self) {
        info!(
            "download complete: downloaded: {}, skipped: {}, failed: {}",
            self.downloaded.len(),
            self.skipped.len(),
            self.failed.len()
        );

        if !self.failed.is_empty() {
            error!("failed downloads:");
            log_failures(&self.failed);
        }
    }
}

/// Result of `delete-from-release`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    /// `(tag, asset)` pairs removed.
    pub deleted: Vec<(String, String)>,
    pub not_found: Vec<String>,
    pub failed: Vec<Failure>,
}

impl Report for DeleteReport {
    fn failures(&self) -> &[Failure] {
        &self.failed
    }

    fn log_summary(&self) {
        info!(
            "delete complete: deleted: {}, not found: {}, failed: {}",
            self.deleted.len(),
            self.not_found.len(),
            self.failed.len()
        );

        if !self.not_found.is_empty() {
            warn!("not found in any release: {}", self.not_found.join(", "));
        }

        if !self.failed.is_empty() {
            error!("failed deletions:");
            log_failures(&self.failed);
        }
    }
}
