//! Snapshot persistence for game sessions

mod db;
mod models;

pub use db::{MemoryStore, SnapshotStore, SqliteStore};
pub use models::GameSnapshot;
