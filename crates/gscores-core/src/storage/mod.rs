//! # Storage Backends
//!
//! Persistent implementations of [`crate::store::ScoreStore`].

mod redb_store;

pub use redb_store::RedbStore;
