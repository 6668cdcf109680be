use serde::{Deserialize, Serialize};

use crate::model::profile::ParticipantId;

/// One contribution to a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub id: String,
    pub author_id: ParticipantId,
    pub text: String,
    pub timestamp: i64,
}

/// The live round, stored as a single JSON blob.
///
/// Join order of `participants` is turn order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundState {
    pub active: bool,
    pub participants: Vec<ParticipantId>,
    pub lines: Vec<Line>,
    #[serde(default)]
    pub round_start: Option<i64>,
}

impl RoundState {
    /// Whoever is positionally due to write the next line.
    pub fn next_author(&self) -> Option<&ParticipantId> {
        if self.participants.is_empty() {
            return None;
        }
        self.participants
            .get(self.lines.len() % self.participants.len())
    }
}
