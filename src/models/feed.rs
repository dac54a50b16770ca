use std::fmt;

use serde::{Deserialize, Serialize};

/// A single item in a feed - either an image post or a video reel.
///
/// `like_count` and `liked_by_viewer` always change together through the
/// toggle protocol in `sync::FeedController`; mutating one without the other
/// lets the count drift from the flag. The count has no zero floor: a toggle
/// on an already-inconsistent snapshot can drive it negative, matching the
/// backend's behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Unique, stable id. Used as the cache key and the sort key.
    pub id: String,
    pub author_name: String,
    /// Avatar image URI.
    pub author_avatar: String,
    /// Image URI for posts, video URI for reels.
    pub media: String,
    pub like_count: i64,
    pub liked_by_viewer: bool,
}

/// The two symmetric feed collections served by the backend.
///
/// Each kind carries its own wire-format quirks: endpoint path, envelope
/// field, and - awkwardly - a different id field name in mutation bodies
/// (`post_id` vs `reels_id`, with an `s`). These must match the mock backend
/// exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Posts,
    Reels,
}

impl FeedKind {
    /// Endpoint path for fetching the full collection.
    pub fn feed_path(&self) -> &'static str {
        match self {
            FeedKind::Posts => "/user/feed",
            FeedKind::Reels => "/user/reels",
        }
    }

    /// Id field name in like/dislike request bodies.
    /// Note the backend expects `reels_id` here even though reel items
    /// arrive as `reel_id`.
    pub fn mutation_id_field(&self) -> &'static str {
        match self {
            FeedKind::Posts => "post_id",
            FeedKind::Reels => "reels_id",
        }
    }

    /// File stem for this collection's cache snapshot.
    pub fn cache_name(&self) -> &'static str {
        match self {
            FeedKind::Posts => "posts",
            FeedKind::Reels => "reels",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cache_name())
    }
}

/// Sort a snapshot ascending by id.
///
/// Every published or cached snapshot goes through this so presentation
/// order is deterministic regardless of where the items came from.
pub fn sort_by_id(items: &mut [FeedItem]) {
    items.sort_by(|a, b| a.id.cmp(&b.id));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, like_count: i64, liked: bool) -> FeedItem {
        FeedItem {
            id: id.to_string(),
            author_name: "Test User".to_string(),
            author_avatar: "https://example.com/user.jpg".to_string(),
            media: "https://example.com/media.jpg".to_string(),
            like_count,
            liked_by_viewer: liked,
        }
    }

    #[test]
    fn test_sort_by_id_is_ascending() {
        let mut items = vec![item("3", 0, false), item("1", 0, false), item("2", 0, false)];
        sort_by_id(&mut items);
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_feed_kind_wire_quirks() {
        assert_eq!(FeedKind::Posts.feed_path(), "/user/feed");
        assert_eq!(FeedKind::Reels.feed_path(), "/user/reels");
        // The mutation id field for reels is "reels_id", not "reel_id"
        assert_eq!(FeedKind::Posts.mutation_id_field(), "post_id");
        assert_eq!(FeedKind::Reels.mutation_id_field(), "reels_id");
    }

    #[test]
    fn test_feed_item_serde_round_trip() {
        let original = item("p1", 42, true);
        let json = serde_json::to_string(&original).expect("serialize feed item");
        let parsed: FeedItem = serde_json::from_str(&json).expect("parse feed item");
        assert_eq!(parsed, original);
    }
}
