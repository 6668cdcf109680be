use crate::model::{ArchiveEntry, ParticipantId, QissaSnapshot};

#[derive(Debug)]
pub enum EngineCommand {
    StartRound(Vec<ParticipantId>),
    AddLine(String),
    FinishRound,

    StartNewQissa(String),
    CompleteQissa(String),
    JoinActiveQissa,
    SubmitTurnLine(String),
    NextTurn,
    DismissNotification,

    Heartbeat,
    /// A watched key changed under us.
    StoreChanged(String),
    Refresh,
    Shutdown,
}

#[derive(Debug)]
pub enum EngineResponse {
    Snapshot(Box<QissaSnapshot>),

    RoundArchived(ArchiveEntry),

    NotEnoughCousins {
        active: usize,
    },

    StoreFailed(String),
}
