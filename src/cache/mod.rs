//! Local caching module for offline feed access.
//!
//! This module provides the snapshot store used when the network is down:
//! one durable snapshot per feed collection, keyed by item id.
//!
//! The store is best-effort by contract: any underlying storage failure is
//! logged and swallowed, and callers must tolerate that a write silently did
//! not happen. It is a durability layer, not a transactional one.

pub mod store;

pub use store::{FileStore, MemoryStore, SnapshotStore};
