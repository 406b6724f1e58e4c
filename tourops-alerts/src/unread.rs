use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tourops_core::{CoreResult, KeyValueStore};
use tracing::warn;

use crate::models::AlertFeed;

/// Seen ids kept per user; oldest are dropped first
pub const SEEN_CAPACITY: usize = 500;

/// Tracks which alert ids each user has already looked at.
///
/// Updates are read-merge-write, so they run one at a time within a process.
#[derive(Clone)]
pub struct SeenTracker {
    store: Arc<dyn KeyValueStore>,
    writes: Arc<Mutex<()>>,
}

impl SeenTracker {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            writes: Arc::new(Mutex::new(())),
        }
    }

    fn key(user_id: &str) -> String {
        format!("tourops:seen-alerts:{}", user_id)
    }

    async fn load(&self, user_id: &str) -> CoreResult<Vec<String>> {
        match self.store.get(&Self::key(user_id)).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Alerts in the feed (including the ones cut off for display) the user
    /// has not marked seen. Counts everything if the store is unreachable.
    pub async fn unread_count(&self, user_id: &str, feed: &AlertFeed) -> usize {
        let seen = match self.load(user_id).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(user_id, error = %e, "Seen alerts unavailable, treating all as unread");
                return feed.total;
            }
        };
        let seen: HashSet<&str> = seen.iter().map(String::as_str).collect();
        feed.ids.iter().filter(|id| !seen.contains(id.as_str())).count()
    }

    /// Remember `ids` as seen. Returns how many ids are now stored.
    pub async fn mark_seen(&self, user_id: &str, ids: &[String]) -> CoreResult<usize> {
        let _write = self.writes.lock().await;
        let mut stored = match self.load(user_id).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(user_id, error = %e, "Discarding unreadable seen alerts");
                Vec::new()
            }
        };

        let mut present: HashSet<String> = stored.iter().cloned().collect();
        for id in ids {
            if present.insert(id.clone()) {
                stored.push(id.clone());
            }
        }
        if stored.len() > SEEN_CAPACITY {
            stored.drain(..stored.len() - SEEN_CAPACITY);
        }

        self.store
            .set(&Self::key(user_id), &serde_json::to_string(&stored)?)
            .await?;
        Ok(stored.len())
    }
}
