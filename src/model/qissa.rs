use serde::{Deserialize, Serialize};

use crate::model::profile::ParticipantId;
use crate::model::round::Line;

/// A titled story of the turn-timed variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Qissa {
    pub id: String,
    pub title: String,
    pub lines: Vec<Line>,
    pub timestamp: i64,
    pub completed: bool,
}

/// Who holds the pen, and since when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QissaTurn {
    pub qissa_id: String,
    pub user_id: ParticipantId,
    pub start_time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QissaNotification {
    pub is_new: bool,
    pub title: String,
}
