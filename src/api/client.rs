//! API client for communicating with the feed backend.
//!
//! This module provides the `FeedClient` struct for fetching one feed
//! collection and submitting like/dislike mutations against it.

use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::models::{FeedItem, FeedKind};
use crate::sync::FeedSource;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Endpoint path for like mutations
const LIKE_PATH: &str = "/user/like";

/// Endpoint path for dislike mutations
const DISLIKE_PATH: &str = "/user/dislike";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for one feed collection.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct FeedClient {
    http: Client,
    base_url: String,
    kind: FeedKind,
}

impl FeedClient {
    /// Create a new client for `kind`, rooted at `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>, kind: FeedKind) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            kind,
        })
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Fetch the full current collection from the backend.
    ///
    /// Any transport error, non-2xx status, or decode failure fails the call;
    /// falling back to cache is the caller's concern.
    pub async fn fetch_all(&self) -> Result<Vec<FeedItem>, ApiError> {
        let url = format!("{}{}", self.base_url, self.kind.feed_path());

        let response = self.http.get(&url).send().await?;
        let response = Self::check_response(response).await?;

        let text = response.text().await?;
        debug!(kind = %self.kind, "Feed response received");

        let items = match self.kind {
            FeedKind::Posts => {
                let envelope: FeedEnvelope = serde_json::from_str(&text)?;
                envelope.feed.into_iter().map(FeedItem::from).collect()
            }
            FeedKind::Reels => {
                let envelope: ReelsEnvelope = serde_json::from_str(&text)?;
                envelope.reels.into_iter().map(FeedItem::from).collect()
            }
        };

        Ok(items)
    }

    /// Submit a like for `id` (POST /user/like).
    pub async fn submit_like(&self, id: &str) -> Result<(), ApiError> {
        self.submit(true, id).await
    }

    /// Withdraw a like for `id` (DELETE /user/dislike).
    pub async fn submit_dislike(&self, id: &str) -> Result<(), ApiError> {
        self.submit(false, id).await
    }

    async fn submit(&self, like: bool, id: &str) -> Result<(), ApiError> {
        let (path, request) = if like {
            (LIKE_PATH, self.http.post(format!("{}{}", self.base_url, LIKE_PATH)))
        } else {
            (DISLIKE_PATH, self.http.delete(format!("{}{}", self.base_url, DISLIKE_PATH)))
        };

        // The id field name depends on the collection kind (post_id / reels_id)
        let mut body = Map::new();
        body.insert("like".to_string(), Value::Bool(like));
        body.insert(
            self.kind.mutation_id_field().to_string(),
            Value::String(id.to_string()),
        );

        let response = request.json(&Value::Object(body)).send().await?;
        Self::check_response(response).await?;

        debug!(kind = %self.kind, id, like, path, "Like mutation accepted");
        Ok(())
    }
}

impl FeedSource for FeedClient {
    async fn fetch_all(&self) -> Result<Vec<FeedItem>, ApiError> {
        FeedClient::fetch_all(self).await
    }

    async fn submit_like(&self, id: &str) -> Result<(), ApiError> {
        FeedClient::submit_like(self, id).await
    }

    async fn submit_dislike(&self, id: &str) -> Result<(), ApiError> {
        FeedClient::submit_dislike(self, id).await
    }
}

// Internal wire types for parsing - use FeedItem for domain code

#[derive(Debug, Deserialize)]
struct FeedEnvelope {
    feed: Vec<PostWire>,
}

#[derive(Debug, Deserialize)]
struct ReelsEnvelope {
    reels: Vec<ReelWire>,
}

#[derive(Debug, Deserialize)]
struct PostWire {
    post_id: String,
    user_name: String,
    user_image: String,
    post_image: String,
    like_count: i64,
    liked_by_user: bool,
}

impl From<PostWire> for FeedItem {
    fn from(wire: PostWire) -> Self {
        FeedItem {
            id: wire.post_id,
            author_name: wire.user_name,
            author_avatar: wire.user_image,
            media: wire.post_image,
            like_count: wire.like_count,
            liked_by_viewer: wire.liked_by_user,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReelWire {
    reel_id: String,
    user_name: String,
    user_image: String,
    reel_video: String,
    like_count: i64,
    liked_by_user: bool,
}

impl From<ReelWire> for FeedItem {
    fn from(wire: ReelWire) -> Self {
        FeedItem {
            id: wire.reel_id,
            author_name: wire.user_name,
            author_avatar: wire.user_image,
            media: wire.reel_video,
            like_count: wire.like_count,
            liked_by_viewer: wire.liked_by_user,
        }
    }
}
