pub mod clock;
pub mod engine;
pub mod identity;
pub mod presence;
pub mod protocol;
pub mod round;
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{Engine, PollSettings};
pub use presence::PresenceTracker;
pub use protocol::{EngineCommand, EngineResponse};
pub use round::{LineOutcome, RoundCoordinator};
pub use session::{StartOutcome, StorySession};

/// Cut `text` to at most `max` characters.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
