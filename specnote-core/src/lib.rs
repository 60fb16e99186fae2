//! specnote-core: annotation anchoring and reconciliation for rendered specs.
//!
//! Comments attach to top-level document blocks through a content-derived
//! anchor (index + text preview). When the document is regenerated the
//! [`reconcile`] pass moves each comment back onto the block that still holds
//! its content; [`prompt`] turns the collection into instructions for an
//! external editing agent.
//!
//! The [`lifecycle::Coordinator`] wires the pieces together and is the only
//! writer of the persisted store.

pub mod blocks;
pub mod catalog;
pub mod db;
pub mod error;
pub mod events;
pub mod export;
pub mod kv;
pub mod lifecycle;
pub mod live;
pub mod markers;
pub mod prompt;
pub mod reconcile;
pub mod render;
pub mod schema;
pub mod store;
pub mod types;

pub use blocks::Document;
pub use events::{EventBus, Notification};
pub use kv::{KvStore, MemoryKv, SqliteKv};
pub use lifecycle::{Coordinator, ExportOutcome, LiveUpdateOutcome};
pub use live::{DocumentSource, FsSource, Trigger};
pub use types::{Block, BlockKind, Comment, MarkerState};
