mod file;
mod json;
mod memory;

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, PoisonError};

use crate::error::StoreError;

pub use file::FileStore;
pub use json::{load_json, save_json};
pub use memory::MemoryStore;

/// Keys owned by the storytelling core. The `mehfil-` prefix keeps them apart
/// from keys written by other screens of the app.
pub mod keys {
    pub const ROUND: &str = "mehfil-qissaActive";
    pub const ARCHIVE: &str = "mehfil-qissaArchive";
    pub const QISSAS: &str = "mehfil-qissas";
    pub const PARTICIPANTS: &str = "mehfil-participants";
    pub const CURRENT_TURN: &str = "mehfil-current-turn";
    pub const NOTIFICATION: &str = "mehfil-qissa-notification";
    pub const HEARTBEATS: &str = "mehfil-heartbeats";
    pub const COUSIN_ID: &str = "mehfil-cousinId";
    pub const USER_PROFILE: &str = "mehfil-userProfile";

    /// Keys whose changes should trigger a fresh snapshot.
    pub const WATCHED: &[&str] = &[
        ROUND,
        ARCHIVE,
        QISSAS,
        PARTICIPANTS,
        CURRENT_TURN,
        NOTIFICATION,
        HEARTBEATS,
    ];
}

/// A key changed. `value` is `None` when the key was deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    pub key: String,
    pub value: Option<String>,
}

/// String-keyed store of JSON text.
///
/// There is no transaction or compare-and-swap: callers do full
/// read-modify-write cycles and the last writer wins.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Every later `set`/`delete` through this store is delivered on the
    /// returned channel, including the subscriber's own writes.
    fn subscribe(&self) -> Receiver<StoreChange>;
}

/// Fan-out list shared by the store implementations.
#[derive(Default)]
pub(crate) struct Subscribers {
    senders: Mutex<Vec<Sender<StoreChange>>>,
}

impl Subscribers {
    pub(crate) fn add(&self) -> Receiver<StoreChange> {
        let (tx, rx) = mpsc::channel();
        self.senders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    pub(crate) fn notify(&self, key: &str, value: Option<&str>) {
        let change = StoreChange {
            key: key.to_string(),
            value: value.map(str::to_string),
        };
        // Dropped receivers are pruned here.
        self.senders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|tx| tx.send(change.clone()).is_ok());
    }
}
