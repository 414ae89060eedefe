// ── CSV export sinks ──
//
// Where an exported CSV ends up. The controller fetches the stream; a
// sink decides how to persist it under the conventional filename.

use std::future::Future;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::gateway::ExportStream;

/// `<collection>-export-<YYYY-MM-DD>.csv`
pub fn export_filename(collection: &str, date: NaiveDate) -> String {
    format!("{collection}-export-{}.csv", date.format("%Y-%m-%d"))
}

/// Destination for an export.
pub trait ExportSink: Send + Sync {
    /// Persist the stream under `filename`. Returns bytes written.
    fn save(
        &self,
        filename: &str,
        stream: ExportStream,
    ) -> impl Future<Output = Result<u64, CoreError>> + Send;
}

/// Writes exports into a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn io_error(path: &Path, err: &std::io::Error) -> CoreError {
    CoreError::Export {
        message: format!("{}: {err}", path.display()),
    }
}

impl ExportSink for DirectorySink {
    async fn save(&self, filename: &str, mut stream: ExportStream) -> Result<u64, CoreError> {
        let path = self.dir.join(filename);
        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| io_error(&path, &e))?;

        let mut written = 0u64;
        let result: Result<(), CoreError> = async {
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                file.write_all(&chunk)
                    .await
                    .map_err(|e| io_error(&path, &e))?;
                written += chunk.len() as u64;
            }
            file.flush().await.map_err(|e| io_error(&path, &e))
        }
        .await;

        if let Err(e) = result {
            warn!(path = %path.display(), error = %e, "export interrupted, removing partial file");
            drop(file);
            let _ = tokio::fs::remove_file(&path).await;
            return Err(e);
        }

        debug!(path = %path.display(), bytes = written, "export saved");
        Ok(written)
    }
}
