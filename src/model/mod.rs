pub mod archive;
pub mod presence;
pub mod profile;
pub mod qissa;
pub mod round;
pub mod snapshot;

pub use archive::ArchiveEntry;
pub use presence::Heartbeat;
pub use profile::{CousinProfile, ParticipantId};
pub use qissa::{Qissa, QissaNotification, QissaTurn};
pub use round::{Line, RoundState};
pub use snapshot::{QissaSnapshot, TurnStatus};
