use std::sync::Arc;

use tracing::{debug, info};

use crate::engine::clock::Clock;
use crate::engine::truncate_chars;
use crate::error::StoreError;
use crate::model::{ArchiveEntry, Line, ParticipantId, RoundState};
use crate::store::{keys, load_json, save_json, KvStore};

/// A round archives itself once it holds this many lines.
pub const LINES_PER_ROUND: usize = 5;

/// Longer lines are cut, not rejected.
pub const MAX_LINE_CHARS: usize = 90;

/// What `add_line` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// No active round, or nobody in it.
    Ignored,
    Added(Line),
    /// The line completed the round, which is now archived and reset.
    Completed { line: Line, entry: ArchiveEntry },
}

/// Lifecycle of the one collaborative-writing round.
///
/// Holds no state of its own: every call loads the round blob, changes it and
/// writes it back whole, so two views writing at once can lose an update.
///
/// Authorship is positional. The author of a new line is
/// `participants[lines.len() % participants.len()]`, whoever actually calls
/// `add_line`.
pub struct RoundCoordinator {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    local_id: ParticipantId,
}

impl RoundCoordinator {
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>, local_id: ParticipantId) -> Self {
        Self {
            store,
            clock,
            local_id,
        }
    }

    pub fn local_id(&self) -> &ParticipantId {
        &self.local_id
    }

    /// Current round, or the inactive default when nothing valid is stored.
    pub fn state(&self) -> Result<RoundState, StoreError> {
        Ok(load_json(self.store.as_ref(), keys::ROUND)?.unwrap_or_default())
    }

    pub fn archive(&self) -> Result<Vec<ArchiveEntry>, StoreError> {
        Ok(load_json(self.store.as_ref(), keys::ARCHIVE)?.unwrap_or_default())
    }

    pub fn start_round(&self, participants: Vec<ParticipantId>) -> Result<RoundState, StoreError> {
        // Solo mode.
        let participants = if participants.is_empty() {
            vec![self.local_id.clone()]
        } else {
            participants
        };

        let state = RoundState {
            active: true,
            participants,
            lines: Vec::new(),
            round_start: Some(self.clock.now_ms()),
        };
        save_json(self.store.as_ref(), keys::ROUND, &state)?;

        info!(participants = state.participants.len(), "qissa round started");
        Ok(state)
    }

    /// Empty or whitespace-only text is the caller's to reject.
    pub fn add_line(&self, text: &str) -> Result<LineOutcome, StoreError> {
        let mut state = self.state()?;
        let Some(author_id) = state.next_author().cloned().filter(|_| state.active) else {
            debug!("ignoring line: no active round");
            return Ok(LineOutcome::Ignored);
        };

        let now = self.clock.now_ms();
        let line = Line {
            id: format!("line-{now}-{}", state.lines.len()),
            author_id,
            text: truncate_chars(text, MAX_LINE_CHARS),
            timestamp: now,
        };
        state.lines.push(line.clone());
        debug!(author = %line.author_id, count = state.lines.len(), "qissa line added");

        if state.lines.len() == LINES_PER_ROUND {
            let lines = std::mem::take(&mut state.lines);
            return Ok(match self.archive_round(state, lines)? {
                Some(entry) => LineOutcome::Completed { line, entry },
                None => LineOutcome::Added(line),
            });
        }

        save_json(self.store.as_ref(), keys::ROUND, &state)?;
        Ok(LineOutcome::Added(line))
    }

    /// Archive the round early. `final_lines` overrides the stored lines.
    pub fn finish_round(
        &self,
        final_lines: Option<Vec<Line>>,
    ) -> Result<Option<ArchiveEntry>, StoreError> {
        let mut state = self.state()?;
        let lines = final_lines.unwrap_or_else(|| std::mem::take(&mut state.lines));
        self.archive_round(state, lines)
    }

    fn archive_round(
        &self,
        state: RoundState,
        lines: Vec<Line>,
    ) -> Result<Option<ArchiveEntry>, StoreError> {
        if !state.active || lines.is_empty() {
            return Ok(None);
        }

        let story = lines
            .iter()
            .map(|line| line.text.trim())
            .collect::<Vec<_>>()
            .join(" ");

        let entry = ArchiveEntry {
            id: format!("qissa-{}", uuid::Uuid::new_v4().simple()),
            created_at: self.clock.now_ms(),
            participant_ids: state.participants,
            story,
        };

        let mut archive = self.archive()?;
        archive.push(entry.clone());
        save_json(self.store.as_ref(), keys::ARCHIVE, &archive)?;

        // Finished rounds leave no blob behind.
        self.store.delete(keys::ROUND)?;

        info!(id = %entry.id, lines = lines.len(), "qissa round archived");
        Ok(Some(entry))
    }
}
