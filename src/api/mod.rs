//! REST API client module for the feed backend.
//!
//! This module provides the `FeedClient` for communicating with the mock
//! social backend: fetching a collection's full feed and submitting
//! like/dislike mutations.
//!
//! There are no retries at this layer - degrading to cache or rolling back
//! an optimistic update is the sync layer's job.

pub mod client;
pub mod error;

pub use client::FeedClient;
pub use error::ApiError;
