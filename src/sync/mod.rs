//! Feed synchronization between the remote backend and the local cache.
//!
//! This module provides the `FeedController`, the state machine that keeps
//! an in-memory feed consistent with the network and the snapshot cache:
//!
//! - refresh: fetch from the network, falling back to cache when offline
//! - toggle like: optimistic update with rollback on network failure

pub mod controller;

pub use controller::{FeedController, FeedSource, PendingToggle, SyncState};
