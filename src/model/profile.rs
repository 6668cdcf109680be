use serde::{Deserialize, Serialize};

/// Opaque per-device identifier, generated once and kept forever.
pub type ParticipantId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CousinProfile {
    pub id: ParticipantId,
    pub preferred_name: String,
    pub age: u32,
    pub gender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_complete: Option<bool>,
}
