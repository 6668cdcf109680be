use serde::{Deserialize, Serialize};

use crate::model::profile::ParticipantId;

/// A finished round. Entries are only ever appended to the archive log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveEntry {
    pub id: String,
    pub created_at: i64,
    pub participant_ids: Vec<ParticipantId>,
    pub story: String,
}
