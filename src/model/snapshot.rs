use crate::model::{
    ArchiveEntry, ParticipantId, Qissa, QissaNotification, QissaTurn, RoundState,
};

/// Turn-timer view derived on every poll. Never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnStatus {
    pub turn: Option<QissaTurn>,
    pub is_my_turn: bool,
    pub time_remaining: u32,
    pub participants: Vec<ParticipantId>,
}

/// Everything the front end renders, read fresh from the store.
/// This is READ-ONLY outside the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QissaSnapshot {
    pub local_id: ParticipantId,

    pub round: RoundState,
    pub current_author: Option<ParticipantId>,
    pub archive: Vec<ArchiveEntry>,

    pub qissas: Vec<Qissa>,
    pub active_qissa: Option<Qissa>,
    pub turn: TurnStatus,
    pub notification: Option<QissaNotification>,

    pub active_users: usize,
}
