use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;

use uuid::Uuid;

use super::{KvStore, StoreChange, Subscribers};
use crate::error::StoreError;

/// One `<key>.json` file per key under a data directory.
///
/// Writes go to a temp file first and are renamed into place, so a reader
/// never sees half a value. Change notification only reaches subscribers of
/// this handle; other processes pick changes up by polling.
pub struct FileStore {
    root: PathBuf,
    subscribers: Subscribers,
}

impl FileStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StoreError::Io {
            key: root.display().to_string(),
            source,
        })?;

        Ok(Self {
            root,
            subscribers: Subscribers::default(),
        })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

fn io_err(key: &str) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        key: key.to_string(),
        source,
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_err(key)(err)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        // Own staging file per write; concurrent handles must not share one.
        let tmp = self.root.join(format!(".{key}.{}.tmp", Uuid::new_v4().simple()));

        if let Err(err) = fs::write(&tmp, value).and_then(|()| fs::rename(&tmp, &path)) {
            fs::remove_file(&tmp).ok();
            return Err(io_err(key)(err));
        }

        self.subscribers.notify(key, Some(value));
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(path) {
            Ok(()) => {
                self.subscribers.notify(key, None);
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_err(key)(err)),
        }
    }

    fn subscribe(&self) -> Receiver<StoreChange> {
        self.subscribers.add()
    }
}
