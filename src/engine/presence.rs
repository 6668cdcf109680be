use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::engine::clock::Clock;
use crate::error::StoreError;
use crate::model::Heartbeat;
use crate::store::{keys, load_json, save_json, KvStore};

/// Heartbeats older than this no longer count as present.
pub const PRESENCE_WINDOW_MS: i64 = 10 * 60 * 1000;

/// How often the engine prunes stale heartbeats.
pub const PRESENCE_CLEANUP_MS: i64 = 30 * 1000;

pub struct PresenceTracker {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
}

impl PresenceTracker {
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn heartbeats(&self) -> Result<Vec<Heartbeat>, StoreError> {
        Ok(load_json(self.store.as_ref(), keys::HEARTBEATS)?.unwrap_or_default())
    }

    /// Replace `user_id`'s heartbeat with a fresh one and return the active count.
    pub fn update_presence(&self, user_id: &str) -> Result<usize, StoreError> {
        let now = self.clock.now_ms();
        let mut heartbeats = self.heartbeats()?;
        heartbeats.retain(|h| h.user_id != user_id);
        heartbeats.push(Heartbeat {
            user_id: user_id.to_string(),
            timestamp: now,
        });
        save_json(self.store.as_ref(), keys::HEARTBEATS, &heartbeats)?;

        Ok(count_active(&heartbeats, now))
    }

    pub fn cleanup_expired(&self) -> Result<usize, StoreError> {
        let now = self.clock.now_ms();
        let mut heartbeats = self.heartbeats()?;
        let before = heartbeats.len();
        heartbeats.retain(|h| h.timestamp > now - PRESENCE_WINDOW_MS);

        if heartbeats.len() != before {
            debug!(dropped = before - heartbeats.len(), "pruned stale heartbeats");
            save_json(self.store.as_ref(), keys::HEARTBEATS, &heartbeats)?;
        }
        Ok(count_active(&heartbeats, now))
    }

    pub fn active_users(&self) -> Result<usize, StoreError> {
        Ok(count_active(&self.heartbeats()?, self.clock.now_ms()))
    }
}

fn count_active(heartbeats: &[Heartbeat], now: i64) -> usize {
    heartbeats
        .iter()
        .filter(|h| h.timestamp > now - PRESENCE_WINDOW_MS)
        .map(|h| h.user_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}
