use std::collections::HashMap;
use std::sync::mpsc::Receiver;
use std::sync::{Mutex, PoisonError};

use super::{KvStore, StoreChange, Subscribers};
use crate::error::StoreError;

/// In-process store. Cloned `Arc`s of one `MemoryStore` behave like several
/// views sharing one device's storage.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    subscribers: Subscribers,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        self.subscribers.notify(key, Some(value));
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let removed = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        if removed.is_some() {
            self.subscribers.notify(key, None);
        }
        Ok(())
    }

    fn subscribe(&self) -> Receiver<StoreChange> {
        self.subscribers.add()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_delete() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "1").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("1"));

        store.delete("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn subscribers_see_writes_and_deletes() {
        let store = MemoryStore::new();
        let rx = store.subscribe();

        store.set("k", "\"v\"").unwrap();
        store.delete("k").unwrap();
        // Deleting a missing key is silent.
        store.delete("k").unwrap();

        let changes: Vec<StoreChange> = rx.try_iter().collect();
        assert_eq!(
            changes,
            vec![
                StoreChange {
                    key: "k".into(),
                    value: Some("\"v\"".into()),
                },
                StoreChange {
                    key: "k".into(),
                    value: None,
                },
            ]
        );
    }

    #[test]
    fn dropped_subscriber_is_pruned() {
        let store = MemoryStore::new();
        drop(store.subscribe());
        let live = store.subscribe();

        store.set("k", "1").unwrap();
        assert_eq!(live.try_iter().count(), 1);
    }
}
