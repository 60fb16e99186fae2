//! Export sinks used by the binary.

use specnote_core::error::ExportError;
use specnote_core::export::{ExportSink, FileSink};

use crate::config::{Config, ExportTarget};

/// Delivers the prompt to the system clipboard.
///
/// The `arboard::Clipboard` handle is created on first use and kept for the
/// life of the sink, since on X11 the owning process serves the contents.
#[derive(Default)]
pub struct ClipboardSink {
    clipboard: Option<arboard::Clipboard>,
}

impl ExportSink for ClipboardSink {
    fn deliver(&mut self, text: &str) -> Result<(), ExportError> {
        if self.clipboard.is_none() {
            let cb = arboard::Clipboard::new()
                .map_err(|e| ExportError::Clipboard(e.to_string()))?;
            self.clipboard = Some(cb);
        }
        let Some(cb) = self.clipboard.as_mut() else {
            return Err(ExportError::Clipboard("clipboard not initialised".to_owned()));
        };
        cb.set_text(text.to_owned())
            .map_err(|e| ExportError::Clipboard(e.to_string()))?;
        tracing::info!(bytes = text.len(), "prompt copied to clipboard");
        Ok(())
    }
}

/// The sink selected by configuration.
pub enum Sink {
    Clipboard(ClipboardSink),
    File(FileSink),
}

impl Sink {
    pub fn from_config(config: &Config) -> Self {
        match config.export {
            ExportTarget::Clipboard => Sink::Clipboard(ClipboardSink::default()),
            ExportTarget::File => Sink::File(FileSink::new(&config.export_path)),
        }
    }

    /// Human-readable destination for the status bar.
    pub fn describe(&self) -> &'static str {
        match self {
            Sink::Clipboard(_) => "clipboard",
            Sink::File(_) => "export file",
        }
    }
}

impl ExportSink for Sink {
    fn deliver(&mut self, text: &str) -> Result<(), ExportError> {
        match self {
            Sink::Clipboard(sink) => sink.deliver(text),
            Sink::File(sink) => sink.deliver(text),
        }
    }
}
