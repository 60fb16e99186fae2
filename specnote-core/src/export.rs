//! Export-sink collaborator: delivers a formatted prompt to the user.

use std::path::PathBuf;

use crate::error::ExportError;

/// Receives exported prompt text. A successful `deliver` is what allows the
/// coordinator to purge the exported comments.
pub trait ExportSink {
    fn deliver(&mut self, text: &str) -> Result<(), ExportError>;
}

/// Writes the prompt to a file, creating parent directories as needed.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ExportSink for FileSink {
    fn deliver(&mut self, text: &str) -> Result<(), ExportError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, text)?;
        tracing::info!(path = %self.path.display(), bytes = text.len(), "prompt written");
        Ok(())
    }
}
