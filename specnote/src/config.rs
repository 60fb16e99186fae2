//! Configuration for the specnote binary.
//!
//! Values come from `$XDG_CONFIG_HOME/specnote/config.toml` (falling back to
//! `~/.config/specnote/config.toml`), then command-line flags override them.
//! A missing file means defaults; a malformed one is reported on stderr and
//! also falls back to defaults.

use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;

/// Where an exported prompt is delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportTarget {
    /// System clipboard.
    #[default]
    Clipboard,
    /// The file at `export_path`.
    File,
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Folder scanned for markdown specs and watched for changes.
    pub folder: PathBuf,
    /// SQLite database holding comment collections.
    pub db_path: PathBuf,
    pub export: ExportTarget,
    /// Target file when `export = "file"`.
    pub export_path: PathBuf,
    /// Directory for `specnote.log`.
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("./specs"),
            db_path: PathBuf::from(".specnote/annotations.db"),
            export: ExportTarget::Clipboard,
            export_path: PathBuf::from(".specnote/prompt.md"),
            log_dir: PathBuf::from(".specnote"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Command-line flags. Every flag overrides the matching config key.
#[derive(Debug, Default, Parser)]
#[command(name = "specnote", version, about = "Annotate markdown specs and export the notes as agent instructions")]
pub struct Cli {
    /// Folder containing the markdown specs.
    #[arg(short, long)]
    pub folder: Option<PathBuf>,

    /// Document to open at start, relative to the folder.
    #[arg(long)]
    pub file: Option<String>,

    /// Path of the annotation database.
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Export target.
    #[arg(long, value_enum)]
    pub export: Option<ExportTarget>,
}

impl Config {
    /// Applies command-line overrides on top of file values.
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(folder) = &cli.folder {
            self.folder = folder.clone();
        }
        if let Some(db) = &cli.db {
            self.db_path = db.clone();
        }
        if let Some(export) = cli.export {
            self.export = export;
        }
        self
    }
}

/// Returns the path to the specnote config file.
pub fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join("specnote").join("config.toml")
}

/// Parses config file contents. Keys that are absent keep their defaults.
///
/// # Errors
///
/// Returns `ConfigError::Parse` for invalid TOML or mistyped values.
pub fn parse_config(raw: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(raw)?)
}

/// Reads the config file at `path`; a missing file yields `Ok(None)`.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn read_config(path: &std::path::Path) -> Result<Option<Config>, ConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_owned(),
                source,
            })
        }
    };
    parse_config(&raw).map(Some)
}

/// Loads the config file, never failing. Errors are printed to stderr before
/// the terminal is taken over, and defaults are used instead.
pub fn load_config() -> Config {
    let path = config_path();
    match read_config(&path) {
        Ok(Some(config)) => config,
        Ok(None) => Config::default(),
        Err(e) => {
            eprintln!("specnote: config error in {:?}: {}", path, e);
            Config::default()
        }
    }
}
