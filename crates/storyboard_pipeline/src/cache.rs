//! In-memory cache of successful decompositions.

use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use storyboard_core::{PipelineConfig, ScenePrompt, StoryInput};
use tokio::sync::Mutex;

/// Stories kept by [`DecompositionCache::new`].
pub const DEFAULT_MAX_CACHED_STORIES: usize = 32;

/// Lifetime of an entry created by [`DecompositionCache::new`].
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug)]
struct CachedScenes {
    scenes: Vec<ScenePrompt>,
    stored_at: Instant,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CachedScenes>,
    // Least recently used first
    access_order: VecDeque<String>,
}

impl CacheState {
    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.access_order.iter().position(|k| k == key) {
            self.access_order.remove(pos);
        }
        self.access_order.push_back(key.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        if let Some(pos) = self.access_order.iter().position(|k| k == key) {
            self.access_order.remove(pos);
        }
    }

    fn evict_lru(&mut self) -> bool {
        match self.access_order.pop_front() {
            Some(key) => {
                tracing::debug!(key = %key, "Evicting least recently used decomposition");
                self.entries.remove(&key);
                true
            }
            None => false,
        }
    }
}

/// Decompositions keyed by the SHA-256 of the story text.
///
/// Only successful results are stored, so a retried run never reuses a
/// failure. The cache holds at most `max_entries` stories, evicting the least
/// recently used, and entries older than `ttl` are dropped on lookup. Clones
/// share the same entries.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use storyboard_pipeline::DecompositionCache;
///
/// let cache = DecompositionCache::with_limits(2, Duration::from_secs(60));
/// assert_eq!(cache.max_entries(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct DecompositionCache {
    state: Arc<Mutex<CacheState>>,
    max_entries: usize,
    ttl: Duration,
}

impl Default for DecompositionCache {
    fn default() -> Self {
        Self::with_limits(DEFAULT_MAX_CACHED_STORIES, DEFAULT_CACHE_TTL)
    }
}

impl DecompositionCache {
    /// Create an empty cache with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache holding at most `max_entries` stories (minimum 1).
    pub fn with_limits(max_entries: usize, ttl: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState::default())),
            max_entries: max_entries.max(1),
            ttl,
        }
    }

    /// Create an empty cache sized by `max_cached_stories` and `cache_ttl_secs`.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::with_limits(*config.max_cached_stories(), config.cache_ttl())
    }

    /// Capacity in stories.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Entry lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Hex SHA-256 of the story text.
    pub fn key(story: &StoryInput) -> String {
        let mut hasher = Sha256::new();
        hasher.update(story.text().as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Cached prompts for this story, if present and not expired.
    pub async fn get(&self, story: &StoryInput) -> Option<Vec<ScenePrompt>> {
        let key = Self::key(story);
        let mut state = self.state.lock().await;

        let expired = state
            .entries
            .get(&key)
            .map(|entry| entry.stored_at.elapsed() > self.ttl)?;
        if expired {
            tracing::debug!(key = %key, "Cached decomposition expired");
            state.remove(&key);
            return None;
        }

        state.touch(&key);
        state.entries.get(&key).map(|entry| entry.scenes.clone())
    }

    /// Store the prompts for this story, evicting the least recently used
    /// story when full.
    pub async fn insert(&self, story: &StoryInput, scenes: Vec<ScenePrompt>) {
        let key = Self::key(story);
        let mut state = self.state.lock().await;

        if !state.entries.contains_key(&key) {
            while state.entries.len() >= self.max_entries && state.evict_lru() {}
        }

        state.touch(&key);
        state.entries.insert(
            key,
            CachedScenes {
                scenes,
                stored_at: Instant::now(),
            },
        );
    }

    /// Number of cached stories, expired ones included until looked up.
    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    /// Whether nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.entries.is_empty()
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.entries.clear();
        state.access_order.clear();
    }
}
