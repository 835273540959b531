//! Best-effort persistence of generated reports as markdown artifacts.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;

use crate::sectors::title_case;

#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Store one artifact. Failures are the caller's to swallow.
    async fn store(&self, filename: &str, content: &str) -> Result<()>;
}

/// Writes reports under a fixed directory, creating it on demand.
pub struct FileReportSink {
    dir: PathBuf,
}

impl FileReportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ReportSink for FileReportSink {
    async fn store(&self, filename: &str, content: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("creating report dir {}", self.dir.display()))?;
        let path = self.dir.join(filename);
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("writing report to {}", path.display()))?;
        tracing::info!(path = %path.display(), "analysis report saved");
        Ok(())
    }
}

/// `analysis_{sector}_{YYYYMMDD_HHMMSS}.md`
pub fn artifact_filename(sector: &str, now: chrono::DateTime<chrono::Utc>) -> String {
    format!("analysis_{sector}_{}.md", now.format("%Y%m%d_%H%M%S"))
}

/// Report text with a short metadata header.
pub fn artifact_content(
    sector: &str,
    session_id: &str,
    data_sources: usize,
    report: &str,
    now: chrono::DateTime<chrono::Utc>,
) -> String {
    format!(
        "# Market Analysis Report: {} Sector\n\n\
         **Generated on:** {}\n\
         **Session ID:** {session_id}\n\
         **Data Sources:** {data_sources}\n\n\
         ---\n\n{report}",
        title_case(sector),
        now.format("%Y-%m-%d %H:%M:%S")
    )
}

// --- Test helpers ---

/// In-memory sink recording stored artifacts; can be told to fail.
pub struct MemorySink {
    pub stored: std::sync::Mutex<Vec<(String, String)>>,
    pub fail: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            stored: std::sync::Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            stored: std::sync::Mutex::new(Vec::new()),
            fail: true,
        }
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReportSink for MemorySink {
    async fn store(&self, filename: &str, content: &str) -> Result<()> {
        if self.fail {
            anyhow::bail!("disk full");
        }
        self.stored
            .lock()
            .unwrap()
            .push((filename.to_string(), content.to_string()));
        Ok(())
    }
}
