use serde::{Deserialize, Serialize};

use crate::model::profile::ParticipantId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Heartbeat {
    pub user_id: ParticipantId,
    pub timestamp: i64,
}
