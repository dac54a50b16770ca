//! The feed sync state machine: fetch-with-fallback and optimistic likes.

// Allow dead code: observer/notice methods are API surface for an embedding UI
#![allow(dead_code)]

use std::collections::HashSet;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::ApiError;
use crate::cache::SnapshotStore;
use crate::models::{sort_by_id, FeedItem, FeedKind};

// ============================================================================
// Constants
// ============================================================================

/// Notice shown when a fetch failed and cached data is displayed instead
const STALE_NOTICE: &str = "No network. Showing cached data.";

/// Notice shown when a like mutation failed and was rolled back
const LIKE_FAILED_NOTICE: &str = "Unable to update like. Please try again";

/// Network boundary for one feed collection.
///
/// The controller talks to the backend only through this trait, so tests can
/// substitute a scripted fake for `api::FeedClient`.
#[allow(async_fn_in_trait)]
pub trait FeedSource {
    async fn fetch_all(&self) -> Result<Vec<FeedItem>, ApiError>;
    async fn submit_like(&self, id: &str) -> Result<(), ApiError>;
    async fn submit_dislike(&self, id: &str) -> Result<(), ApiError>;
}

impl<S: FeedSource + ?Sized> FeedSource for &S {
    async fn fetch_all(&self) -> Result<Vec<FeedItem>, ApiError> {
        (**self).fetch_all().await
    }

    async fn submit_like(&self, id: &str) -> Result<(), ApiError> {
        (**self).submit_like(id).await
    }

    async fn submit_dislike(&self, id: &str) -> Result<(), ApiError> {
        (**self).submit_dislike(id).await
    }
}

/// Published view of one feed.
///
/// `items` is always sorted ascending by id, no matter whether it came from
/// the network or the cache.
#[derive(Debug, Clone, Default)]
pub struct SyncState {
    pub items: Vec<FeedItem>,
    pub loading: bool,
    /// Set only when a fetch failed and the cache was empty too
    pub error_message: Option<String>,
    /// Set while the displayed items are a cache fallback
    pub stale_notice: Option<String>,
    /// Transient toast (failed like mutation)
    pub notice: Option<String>,
}

/// An optimistic like toggle that has been applied locally but not yet
/// confirmed by the backend. Returned by `begin_toggle`, consumed by
/// `finish_toggle`.
#[derive(Debug)]
pub struct PendingToggle {
    id: String,
    old_liked: bool,
    old_count: i64,
    new_liked: bool,
    generation: u64,
}

impl PendingToggle {
    /// Whether the optimistic state is "liked" (decides like vs dislike call)
    pub fn is_like(&self) -> bool {
        self.new_liked
    }
}

/// Orchestrates one feed collection: owns the published `SyncState`, the
/// remote source, and the snapshot cache.
///
/// All state transitions go through `&mut self`, which serializes refresh and
/// toggle onto one logical actor. The network calls are the only suspension
/// points; cache operations are synchronous.
///
/// A refresh that completes while a toggle is in flight publishes a new
/// snapshot generation; the toggle's eventual result is then dropped as stale
/// instead of clobbering the fresher data.
pub struct FeedController<S, C> {
    kind: FeedKind,
    source: S,
    store: C,
    state: SyncState,
    /// Bumped every time a full snapshot is published (fresh or cached)
    generation: u64,
    /// Item ids with an unconfirmed optimistic toggle
    pending: HashSet<String>,
    updates: watch::Sender<SyncState>,
}

impl<S: FeedSource, C: SnapshotStore> FeedController<S, C> {
    pub fn new(kind: FeedKind, source: S, store: C) -> Self {
        let state = SyncState {
            loading: true,
            ..SyncState::default()
        };
        let (updates, _) = watch::channel(state.clone());
        Self {
            kind,
            source,
            store,
            state,
            generation: 0,
            pending: HashSet::new(),
            updates,
        }
    }

    /// Current published state.
    pub fn state(&self) -> &SyncState {
        &self.state
    }

    /// Observe published snapshots. Receivers see every state transition
    /// made after they subscribe.
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.updates.subscribe()
    }

    fn publish(&mut self) {
        self.updates.send_replace(self.state.clone());
    }

    /// Fetch the collection from the network, falling back to the cache.
    ///
    /// On success the cache is replaced *before* the list is published, so a
    /// crash between the two only risks a stale cache, never a
    /// published-but-uncached state. On failure a non-empty cache is published
    /// with a stale notice; an empty cache leaves `items` untouched and sets
    /// `error_message`. Never fails past this boundary.
    pub async fn refresh(&mut self) {
        self.state.loading = true;
        self.state.error_message = None;
        self.publish();

        match self.source.fetch_all().await {
            Ok(mut items) => {
                sort_by_id(&mut items);
                self.store.replace_all(&items);
                self.state.items = items;
                self.state.stale_notice = None;
                self.generation += 1;
            }
            Err(e) => {
                warn!(kind = %self.kind, error = %e, "Feed fetch failed, trying cache");
                let cached = self.store.fetch_all();
                if !cached.is_empty() {
                    self.state.items = cached;
                    self.state.stale_notice = Some(STALE_NOTICE.to_string());
                    self.generation += 1;
                } else {
                    self.state.error_message = Some(format!("Failed to load {}: {}", self.kind, e));
                }
            }
        }

        self.state.loading = false;
        self.publish();
    }

    /// Toggle like/unlike for `id`: optimistic update, then the network call,
    /// then rollback if the backend refused. Never fails past this boundary.
    pub async fn toggle_like(&mut self, id: &str) {
        let Some(pending) = self.begin_toggle(id) else {
            return;
        };

        let outcome = if pending.is_like() {
            self.source.submit_like(id).await
        } else {
            self.source.submit_dislike(id).await
        };

        self.finish_toggle(pending, outcome);
    }

    /// Apply the optimistic half of a toggle: flip the flag, move the count
    /// by one, write both to the published list and the cache.
    ///
    /// Returns `None` when `id` is not in the current list (it may have been
    /// removed by a concurrent refresh) or when a toggle for it is already in
    /// flight - rapid re-taps are rejected until the first one settles.
    pub fn begin_toggle(&mut self, id: &str) -> Option<PendingToggle> {
        let item = self.state.items.iter().find(|item| item.id == id)?;
        if self.pending.contains(id) {
            debug!(kind = %self.kind, id, "Toggle already in flight, ignoring");
            return None;
        }

        let old_liked = item.liked_by_viewer;
        let old_count = item.like_count;
        let new_liked = !old_liked;
        // No floor at zero: an inconsistent starting state can go negative,
        // matching the backend
        let new_count = old_count + if new_liked { 1 } else { -1 };

        self.apply_like_state(id, new_liked, new_count);
        self.pending.insert(id.to_string());

        Some(PendingToggle {
            id: id.to_string(),
            old_liked,
            old_count,
            new_liked,
            generation: self.generation,
        })
    }

    /// Settle a toggle with the backend's verdict. On success the optimistic
    /// state stands; on failure it is rolled back in both the list and the
    /// cache, and a transient notice is set. A result arriving after a newer
    /// snapshot generation was published is dropped as stale.
    pub fn finish_toggle(&mut self, pending: PendingToggle, outcome: Result<(), ApiError>) {
        self.pending.remove(&pending.id);

        let Err(e) = outcome else {
            return;
        };

        if pending.generation != self.generation {
            debug!(kind = %self.kind, id = %pending.id, "Dropping stale toggle result after refresh");
            return;
        }

        warn!(kind = %self.kind, id = %pending.id, error = %e, "Like mutation failed, rolling back");
        self.state.notice = Some(LIKE_FAILED_NOTICE.to_string());
        self.apply_like_state(&pending.id, pending.old_liked, pending.old_count);
    }

    /// Dismiss the transient notice once it has been shown.
    pub fn clear_notice(&mut self) {
        if self.state.notice.take().is_some() {
            self.publish();
        }
    }

    fn apply_like_state(&mut self, id: &str, liked: bool, count: i64) {
        if let Some(item) = self.state.items.iter_mut().find(|item| item.id == id) {
            item.liked_by_viewer = liked;
            item.like_count = count;
            let updated = item.clone();
            self.store.update_one(&updated);
        }
        self.publish();
    }
}
