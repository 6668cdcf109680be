use tracing::info;
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{CousinProfile, ParticipantId};
use crate::store::{keys, load_json, save_json, KvStore};

/// The device's participant id, created on first use.
pub fn load_or_create_id(store: &dyn KvStore) -> Result<ParticipantId, StoreError> {
    if let Some(id) = store.get(keys::COUSIN_ID)?.filter(|id| !id.trim().is_empty()) {
        return Ok(id);
    }

    let id = Uuid::new_v4().to_string();
    store.set(keys::COUSIN_ID, &id)?;
    info!(%id, "created participant id");
    Ok(id)
}

pub fn load_profile(store: &dyn KvStore) -> Result<Option<CousinProfile>, StoreError> {
    load_json(store, keys::USER_PROFILE)
}

/// Saving a profile also makes its id the device's participant id.
pub fn save_profile(store: &dyn KvStore, profile: &CousinProfile) -> Result<(), StoreError> {
    save_json(store, keys::USER_PROFILE, profile)?;
    store.set(keys::COUSIN_ID, &profile.id)
}

/// Drop the local identity. The next `load_or_create_id` mints a new one.
pub fn forget(store: &dyn KvStore) -> Result<(), StoreError> {
    store.delete(keys::COUSIN_ID)?;
    store.delete(keys::USER_PROFILE)
}
