// Append-only file sink for consumer records
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::info;

use bufferline_core::domain::Record;
use bufferline_core::port::{RecordSink, SinkError};

/// Appends one line per record to a file that is never truncated
pub struct FileRecordSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileRecordSink {
    /// Open (or create) `path` in append mode
    ///
    /// # Errors
    /// - SinkError::Io if the file cannot be opened
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        info!(path = %path.display(), "Record sink opened");
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordSink for FileRecordSink {
    async fn append(&self, record: &Record) -> Result<(), SinkError> {
        let line = format!("{}\n", record);

        // One writer at a time keeps every line whole
        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
