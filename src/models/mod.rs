//! Data models for feed content.
//!
//! This module contains the data structures shared by the API, cache, and
//! sync layers:
//!
//! - `FeedItem`: a single post or reel as shown in a feed
//! - `FeedKind`: which of the two collections an item belongs to,
//!   together with that collection's wire-format quirks

pub mod feed;

pub use feed::{sort_by_id, FeedItem, FeedKind};
