// Allow dead code: Infrastructure methods for future use
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{sort_by_id, FeedItem, FeedKind};

/// Durable keyed storage of one feed snapshot per collection kind.
///
/// All operations are best-effort: implementations log storage failures and
/// return as if nothing happened. Controllers never branch on cache errors.
pub trait SnapshotStore {
    /// Atomically replace the stored snapshot with `items`.
    /// All-or-nothing: a failed write leaves the previous snapshot intact.
    fn replace_all(&self, items: &[FeedItem]);

    /// Return the stored snapshot, ordered by id ascending.
    /// Empty when nothing is stored or the snapshot cannot be read.
    fn fetch_all(&self) -> Vec<FeedItem>;

    /// Overwrite the stored item with `item.id`, if present.
    /// Absent ids are a no-op - this never inserts.
    fn update_one(&self, item: &FeedItem);

    /// Remove the stored snapshot. Idempotent.
    fn clear_all(&self);
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedData<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }

    fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }
}

/// JSON-file snapshot store, one document per collection kind.
pub struct FileStore {
    cache_dir: PathBuf,
    kind: FeedKind,
}

impl FileStore {
    pub fn new(cache_dir: PathBuf, kind: FeedKind) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache directory: {}", cache_dir.display()))?;
        Ok(Self { cache_dir, kind })
    }

    fn snapshot_path(&self) -> PathBuf {
        self.cache_dir.join(format!("{}.json", self.kind.cache_name()))
    }

    fn load(&self) -> Result<Option<CachedData<Vec<FeedItem>>>> {
        let path = self.snapshot_path();
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", path.display()))?;

        let cached: CachedData<Vec<FeedItem>> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", path.display()))?;

        Ok(Some(cached))
    }

    /// Write through a temp file and rename, so a crash mid-write never
    /// leaves a half-written snapshot behind.
    fn save(&self, cached: CachedData<Vec<FeedItem>>) -> Result<()> {
        let contents = serde_json::to_string_pretty(&cached)?;

        let path = self.snapshot_path();
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, contents)
            .with_context(|| format!("Failed to write cache file: {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &path)
            .with_context(|| format!("Failed to commit cache file: {}", path.display()))?;
        Ok(())
    }

    fn try_update_one(&self, item: &FeedItem) -> Result<()> {
        let Some(mut cached) = self.load()? else {
            return Ok(());
        };
        match cached.data.iter_mut().find(|stored| stored.id == item.id) {
            Some(stored) => *stored = item.clone(),
            // Absent id: no-op, never insert
            None => return Ok(()),
        }
        // Keep the original cached_at: a like correction does not make the
        // snapshot any fresher
        self.save(cached)
    }

    fn try_clear_all(&self) -> Result<()> {
        let path = self.snapshot_path();
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove cache file: {}", path.display()))?;
        }
        Ok(())
    }
}

impl SnapshotStore for FileStore {
    fn replace_all(&self, items: &[FeedItem]) {
        if let Err(e) = self.save(CachedData::new(items.to_vec())) {
            warn!(kind = %self.kind, error = %e, "Cache write failed");
        }
    }

    fn fetch_all(&self) -> Vec<FeedItem> {
        match self.load() {
            Ok(Some(cached)) => {
                debug!(kind = %self.kind, age = %cached.age_display(), count = cached.data.len(), "Loaded cached snapshot");
                let mut items = cached.data;
                sort_by_id(&mut items);
                items
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(kind = %self.kind, error = %e, "Cache read failed");
                Vec::new()
            }
        }
    }

    fn update_one(&self, item: &FeedItem) {
        if let Err(e) = self.try_update_one(item) {
            warn!(kind = %self.kind, id = %item.id, error = %e, "Cache update failed");
        }
    }

    fn clear_all(&self) {
        if let Err(e) = self.try_clear_all() {
            warn!(kind = %self.kind, error = %e, "Cache clear failed");
        }
    }
}

/// In-memory snapshot store.
///
/// Stands in for `FileStore` in tests and anywhere durability is not wanted;
/// controllers take the store as an injected dependency precisely so this
/// substitution needs no global state.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<Vec<FeedItem>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn replace_all(&self, items: &[FeedItem]) {
        *self.items.lock().unwrap() = items.to_vec();
    }

    fn fetch_all(&self) -> Vec<FeedItem> {
        let mut items = self.items.lock().unwrap().clone();
        sort_by_id(&mut items);
        items
    }

    fn update_one(&self, item: &FeedItem) {
        let mut items = self.items.lock().unwrap();
        if let Some(stored) = items.iter_mut().find(|stored| stored.id == item.id) {
            *stored = item.clone();
        }
    }

    fn clear_all(&self) {
        self.items.lock().unwrap().clear();
    }
}

/// Forwarding impls so controllers can borrow a store owned elsewhere.
impl<S: SnapshotStore + ?Sized> SnapshotStore for &S {
    fn replace_all(&self, items: &[FeedItem]) {
        (**self).replace_all(items)
    }

    fn fetch_all(&self) -> Vec<FeedItem> {
        (**self).fetch_all()
    }

    fn update_one(&self, item: &FeedItem) {
        (**self).update_one(item)
    }

    fn clear_all(&self) {
        (**self).clear_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, like_count: i64, liked: bool) -> FeedItem {
        FeedItem {
            id: id.to_string(),
            author_name: "Test User".to_string(),
            author_avatar: "https://example.com/user.jpg".to_string(),
            media: "https://example.com/post.jpg".to_string(),
            like_count,
            liked_by_viewer: liked,
        }
    }

    fn file_store(dir: &tempfile::TempDir) -> FileStore {
        FileStore::new(dir.path().to_path_buf(), FeedKind::Posts).expect("create store")
    }

    #[test]
    fn test_replace_then_fetch_round_trips_sorted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = file_store(&dir);

        store.replace_all(&[item("2", 20, false), item("1", 10, true)]);

        let fetched = store.fetch_all();
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched[0].id, "1");
        assert_eq!(fetched[1].id, "2");
        assert_eq!(fetched[0].like_count, 10);
        assert!(fetched[0].liked_by_viewer);
    }

    #[test]
    fn test_replace_all_discards_previous_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = file_store(&dir);

        store.replace_all(&[item("1", 1, false), item("2", 2, false)]);
        store.replace_all(&[item("3", 3, false)]);

        let fetched = store.fetch_all();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].id, "3");
    }

    #[test]
    fn test_fetch_all_empty_when_nothing_stored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = file_store(&dir);
        assert!(store.fetch_all().is_empty());
    }

    #[test]
    fn test_update_one_overwrites_stored_item() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = file_store(&dir);

        store.replace_all(&[item("1", 10, false)]);
        store.update_one(&item("1", 11, true));

        let fetched = store.fetch_all();
        assert_eq!(fetched[0].like_count, 11);
        assert!(fetched[0].liked_by_viewer);
    }

    #[test]
    fn test_update_one_preserves_snapshot_timestamp() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = file_store(&dir);

        store.replace_all(&[item("1", 10, false)]);

        // Backdate the snapshot, then apply a like correction
        let mut cached = store.load().expect("load").expect("snapshot exists");
        cached.cached_at = Utc::now() - chrono::Duration::minutes(90);
        store.save(cached).expect("save backdated snapshot");

        store.update_one(&item("1", 11, true));

        let cached = store.load().expect("load").expect("snapshot exists");
        assert_eq!(cached.data[0].like_count, 11);
        // The correction must not make the snapshot look fresh again
        assert!(cached.age_minutes() >= 90);
    }

    #[test]
    fn test_update_one_absent_id_does_not_insert() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = file_store(&dir);

        store.replace_all(&[item("1", 10, false)]);
        store.update_one(&item("ghost", 99, true));

        let fetched = store.fetch_all();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].id, "1");
    }

    #[test]
    fn test_clear_all_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = file_store(&dir);

        store.replace_all(&[item("1", 10, false)]);
        store.clear_all();
        assert!(store.fetch_all().is_empty());

        // Second clear on an already-empty store must be a quiet no-op
        store.clear_all();
        assert!(store.fetch_all().is_empty());
    }

    #[test]
    fn test_kinds_use_disjoint_snapshots() {
        let dir = tempfile::tempdir().expect("tempdir");
        let posts = FileStore::new(dir.path().to_path_buf(), FeedKind::Posts).expect("posts store");
        let reels = FileStore::new(dir.path().to_path_buf(), FeedKind::Reels).expect("reels store");

        posts.replace_all(&[item("p1", 1, false)]);
        reels.replace_all(&[item("r1", 2, false)]);

        assert_eq!(posts.fetch_all()[0].id, "p1");
        assert_eq!(reels.fetch_all()[0].id, "r1");

        posts.clear_all();
        assert!(posts.fetch_all().is_empty());
        assert_eq!(reels.fetch_all().len(), 1);
    }

    #[test]
    fn test_corrupt_cache_file_reads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = file_store(&dir);

        std::fs::write(dir.path().join("posts.json"), "not json").expect("write garbage");
        assert!(store.fetch_all().is_empty());
    }

    #[test]
    fn test_memory_store_matches_contract() {
        let store = MemoryStore::new();

        store.replace_all(&[item("2", 2, false), item("1", 1, false)]);
        assert_eq!(store.fetch_all()[0].id, "1");

        store.update_one(&item("2", 3, true));
        assert_eq!(store.fetch_all()[1].like_count, 3);

        store.update_one(&item("ghost", 9, true));
        assert_eq!(store.fetch_all().len(), 2);

        store.clear_all();
        store.clear_all();
        assert!(store.fetch_all().is_empty());
    }
}
