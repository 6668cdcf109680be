use std::sync::Arc;

use tracing::{debug, info};

use crate::engine::clock::Clock;
use crate::engine::round::MAX_LINE_CHARS;
use crate::engine::truncate_chars;
use crate::error::StoreError;
use crate::model::{Line, ParticipantId, Qissa, QissaNotification, QissaTurn, TurnStatus};
use crate::store::{keys, load_json, save_json, KvStore};

/// Length of one turn before it passes to the next participant.
pub const TURN_SECONDS: u32 = 30;

/// A titled Qissa only starts with at least this many cousins around.
pub const MIN_ACTIVE_COUSINS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started(Qissa),
    NotEnoughCousins { active: usize },
}

/// Titled stories with an explicit turn holder and a per-turn deadline.
///
/// The deadline is cooperative: `tick` only passes the turn on when it runs in
/// the turn holder's own view. If that view is gone, nobody advances the turn
/// and the Qissa stalls until someone calls `next_turn`.
pub struct StorySession {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    local_id: ParticipantId,
}

impl StorySession {
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>, local_id: ParticipantId) -> Self {
        Self {
            store,
            clock,
            local_id,
        }
    }

    /// Newest first. An empty store gets one sample Qissa.
    pub fn qissas(&self) -> Result<Vec<Qissa>, StoreError> {
        if let Some(qissas) = load_json(self.store.as_ref(), keys::QISSAS)? {
            return Ok(qissas);
        }

        let seeded = vec![self.sample_qissa()];
        save_json(self.store.as_ref(), keys::QISSAS, &seeded)?;
        Ok(seeded)
    }

    pub fn active_qissa(&self) -> Result<Option<Qissa>, StoreError> {
        Ok(self.qissas()?.into_iter().find(|q| !q.completed))
    }

    pub fn participants(&self) -> Result<Vec<ParticipantId>, StoreError> {
        Ok(load_json(self.store.as_ref(), keys::PARTICIPANTS)?.unwrap_or_default())
    }

    pub fn current_turn(&self) -> Result<Option<QissaTurn>, StoreError> {
        load_json(self.store.as_ref(), keys::CURRENT_TURN)
    }

    pub fn notification(&self) -> Result<Option<QissaNotification>, StoreError> {
        load_json(self.store.as_ref(), keys::NOTIFICATION)
    }

    pub fn start_new_qissa(
        &self,
        title: &str,
        active_users: usize,
    ) -> Result<StartOutcome, StoreError> {
        if active_users < MIN_ACTIVE_COUSINS {
            debug!(active_users, "not enough cousins to start a qissa");
            return Ok(StartOutcome::NotEnoughCousins {
                active: active_users,
            });
        }

        if let Some(active) = self.active_qissa()? {
            self.complete_qissa(&active.id)?;
        }

        let now = self.clock.now_ms();
        let qissa = Qissa {
            id: format!("qissa-{now}"),
            title: title.to_string(),
            lines: Vec::new(),
            timestamp: now,
            completed: false,
        };

        let mut qissas = self.qissas()?;
        qissas.insert(0, qissa.clone());
        save_json(self.store.as_ref(), keys::QISSAS, &qissas)?;

        save_json(self.store.as_ref(), keys::PARTICIPANTS, &[&self.local_id])?;
        save_json(
            self.store.as_ref(),
            keys::NOTIFICATION,
            &QissaNotification {
                is_new: true,
                title: qissa.title.clone(),
            },
        )?;
        // No turn until a second cousin joins.
        self.store.delete(keys::CURRENT_TURN)?;

        info!(id = %qissa.id, title = %qissa.title, "qissa started");
        Ok(StartOutcome::Started(qissa))
    }

    /// Returns false when no Qissa has that id.
    pub fn complete_qissa(&self, qissa_id: &str) -> Result<bool, StoreError> {
        let was_active = self
            .active_qissa()?
            .is_some_and(|active| active.id == qissa_id);

        let mut qissas = self.qissas()?;
        let Some(qissa) = qissas.iter_mut().find(|q| q.id == qissa_id) else {
            return Ok(false);
        };
        qissa.completed = true;
        save_json(self.store.as_ref(), keys::QISSAS, &qissas)?;

        if was_active {
            self.store.delete(keys::CURRENT_TURN)?;
            self.store.delete(keys::PARTICIPANTS)?;
        }

        info!(id = qissa_id, "qissa completed");
        Ok(true)
    }

    /// Returns true when the local participant was newly added.
    pub fn join_active_qissa(&self) -> Result<bool, StoreError> {
        let Some(active) = self.active_qissa()? else {
            return Ok(false);
        };

        let mut participants = self.participants()?;
        let joined = !participants.contains(&self.local_id);
        if joined {
            participants.push(self.local_id.clone());
            save_json(self.store.as_ref(), keys::PARTICIPANTS, &participants)?;

            // The first cousin to join goes first once there is someone to pass to.
            if participants.len() == 2 {
                let first = QissaTurn {
                    qissa_id: active.id.clone(),
                    user_id: participants[0].clone(),
                    start_time: self.clock.now_ms(),
                };
                save_json(self.store.as_ref(), keys::CURRENT_TURN, &first)?;
            }
            info!(id = %active.id, participants = participants.len(), "joined qissa");
        }

        self.dismiss_notification()?;
        Ok(joined)
    }

    /// Write the local participant's line and pass the turn on. Ignored unless
    /// the local participant holds the turn of the active Qissa.
    pub fn add_line(&self, text: &str) -> Result<Option<Line>, StoreError> {
        let Some(active) = self.active_qissa()? else {
            return Ok(None);
        };
        let my_turn = self
            .current_turn()?
            .is_some_and(|turn| turn.user_id == self.local_id);
        if !my_turn {
            debug!("ignoring qissa line: not our turn");
            return Ok(None);
        }

        let now = self.clock.now_ms();
        let mut qissas = self.qissas()?;
        let Some(qissa) = qissas.iter_mut().find(|q| q.id == active.id) else {
            return Ok(None);
        };
        let line = Line {
            id: format!("line-{now}-{}", qissa.lines.len()),
            author_id: self.local_id.clone(),
            text: truncate_chars(text, MAX_LINE_CHARS),
            timestamp: now,
        };
        qissa.lines.push(line.clone());
        save_json(self.store.as_ref(), keys::QISSAS, &qissas)?;

        self.next_turn()?;
        Ok(Some(line))
    }

    /// Pass the turn to whoever joined after the current holder, wrapping
    /// around. Needs an active Qissa and at least two participants.
    pub fn next_turn(&self) -> Result<Option<QissaTurn>, StoreError> {
        let Some(active) = self.active_qissa()? else {
            return Ok(None);
        };
        let participants = self.participants()?;
        if participants.len() < 2 {
            return Ok(None);
        }

        let current = self.current_turn()?;
        let next_index = current
            .as_ref()
            .and_then(|turn| participants.iter().position(|id| *id == turn.user_id))
            .map_or(0, |index| (index + 1) % participants.len());

        let turn = QissaTurn {
            qissa_id: active.id,
            user_id: participants[next_index].clone(),
            start_time: self.clock.now_ms(),
        };
        save_json(self.store.as_ref(), keys::CURRENT_TURN, &turn)?;

        info!(user = %turn.user_id, "qissa turn advanced");
        Ok(Some(turn))
    }

    /// One poll of the turn timer.
    pub fn tick(&self) -> Result<TurnStatus, StoreError> {
        let participants = self.participants()?;
        let mut status = TurnStatus {
            turn: None,
            is_my_turn: false,
            time_remaining: TURN_SECONDS,
            participants,
        };

        if self.active_qissa()?.is_none() {
            return Ok(status);
        }
        let Some(turn) = self.current_turn()? else {
            return Ok(status);
        };

        let elapsed_secs = (self.clock.now_ms() - turn.start_time).max(0) / 1000;
        let remaining = (i64::from(TURN_SECONDS) - elapsed_secs).max(0) as u32;

        if remaining == 0 && turn.user_id == self.local_id {
            debug!("turn deadline passed");
            if let Some(next) = self.next_turn()? {
                status.is_my_turn = next.user_id == self.local_id;
                status.turn = Some(next);
                status.time_remaining = TURN_SECONDS;
                return Ok(status);
            }
        }

        status.is_my_turn = turn.user_id == self.local_id;
        status.turn = Some(turn);
        status.time_remaining = remaining;
        Ok(status)
    }

    pub fn dismiss_notification(&self) -> Result<(), StoreError> {
        self.store.delete(keys::NOTIFICATION)
    }

    fn sample_qissa(&self) -> Qissa {
        let yesterday = self.clock.now_ms() - 24 * 60 * 60 * 1000;
        Qissa {
            id: "initial-qissa".into(),
            title: "वो रात जो चाँदनी थी".into(),
            lines: vec![Line {
                id: "line-1".into(),
                author_id: "ancestor".into(),
                text: "वो रात जो चाँदनी थी, हम दोनों थे अकेले".into(),
                timestamp: yesterday,
            }],
            timestamp: yesterday,
            completed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::clock::ManualClock;
    use crate::store::MemoryStore;

    struct Cousins {
        clock: Arc<ManualClock>,
        a: StorySession,
        b: StorySession,
    }

    fn cousins() -> Cousins {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(1_000_000));
        Cousins {
            a: StorySession::new(store.clone(), clock.clone(), "a".into()),
            b: StorySession::new(store, clock.clone(), "b".into()),
            clock,
        }
    }

    fn started(c: &Cousins) -> Qissa {
        let StartOutcome::Started(qissa) = c.a.start_new_qissa("Chand", 2).unwrap() else {
            panic!("qissa should start");
        };
        qissa
    }

    #[test]
    fn empty_store_is_seeded() {
        let c = cousins();
        let qissas = c.a.qissas().unwrap();
        assert_eq!(qissas.len(), 1);
        assert_eq!(c.a.active_qissa().unwrap().unwrap().id, "initial-qissa");
    }

    #[test]
    fn starting_needs_two_active_cousins() {
        let c = cousins();
        assert_eq!(
            c.a.start_new_qissa("Akela", 1).unwrap(),
            StartOutcome::NotEnoughCousins { active: 1 }
        );
    }

    #[test]
    fn start_completes_previous_and_announces() {
        let c = cousins();
        let qissa = started(&c);

        let qissas = c.a.qissas().unwrap();
        assert_eq!(qissas[0].id, qissa.id);
        assert!(qissas[1].completed, "seed qissa should be completed");
        assert_eq!(c.a.participants().unwrap(), vec!["a".to_string()]);
        assert_eq!(c.a.current_turn().unwrap(), None);
        assert_eq!(
            c.b.notification().unwrap(),
            Some(QissaNotification {
                is_new: true,
                title: "Chand".into(),
            })
        );
    }

    #[test]
    fn second_joiner_starts_first_turn() {
        let c = cousins();
        started(&c);

        assert!(c.b.join_active_qissa().unwrap());
        assert!(!c.b.join_active_qissa().unwrap());

        let turn = c.a.current_turn().unwrap().unwrap();
        assert_eq!(turn.user_id, "a");
        assert_eq!(c.b.notification().unwrap(), None);
    }

    #[test]
    fn only_the_turn_holder_can_write() {
        let c = cousins();
        let qissa = started(&c);
        c.b.join_active_qissa().unwrap();

        assert_eq!(c.b.add_line("not yet").unwrap(), None);

        let line = c.a.add_line("pehli baat").unwrap().unwrap();
        assert_eq!(line.author_id, "a");
        assert_eq!(c.a.current_turn().unwrap().unwrap().user_id, "b");

        let stored = c.a.qissas().unwrap();
        let stored = stored.iter().find(|q| q.id == qissa.id).unwrap();
        assert_eq!(stored.lines.len(), 1);
    }

    #[test]
    fn turn_rotates_circularly() {
        let c = cousins();
        started(&c);
        c.b.join_active_qissa().unwrap();

        assert_eq!(c.a.next_turn().unwrap().unwrap().user_id, "b");
        assert_eq!(c.a.next_turn().unwrap().unwrap().user_id, "a");
    }

    #[test]
    fn next_turn_needs_two_participants() {
        let c = cousins();
        started(&c);
        assert_eq!(c.a.next_turn().unwrap(), None);
    }

    #[test]
    fn tick_counts_down_then_holder_passes_turn() {
        let c = cousins();
        started(&c);
        c.b.join_active_qissa().unwrap();

        c.clock.advance_ms(12_500);
        let status = c.a.tick().unwrap();
        assert!(status.is_my_turn);
        assert_eq!(status.time_remaining, 18);

        c.clock.advance_ms(20_000);
        // Not b's deadline to enforce.
        let status = c.b.tick().unwrap();
        assert_eq!(status.time_remaining, 0);
        assert_eq!(status.turn.unwrap().user_id, "a");

        let status = c.a.tick().unwrap();
        assert!(!status.is_my_turn);
        assert_eq!(status.time_remaining, TURN_SECONDS);
        assert_eq!(status.turn.unwrap().user_id, "b");
    }

    #[test]
    fn completing_active_qissa_clears_turn_state() {
        let c = cousins();
        let qissa = started(&c);
        c.b.join_active_qissa().unwrap();

        assert!(c.a.complete_qissa(&qissa.id).unwrap());
        assert!(c.a.participants().unwrap().is_empty());
        assert_eq!(c.a.current_turn().unwrap(), None);
        assert!(!c.a.complete_qissa("missing").unwrap());
    }

    #[test]
    fn unknown_or_missing_holder_passes_to_first_participant() {
        let c = cousins();
        let qissa = started(&c);
        c.b.join_active_qissa().unwrap();

        let stranger = QissaTurn {
            qissa_id: qissa.id.clone(),
            user_id: "gone".into(),
            start_time: 0,
        };
        save_json(c.a.store.as_ref(), keys::CURRENT_TURN, &stranger).unwrap();
        assert_eq!(c.b.next_turn().unwrap().unwrap().user_id, "a");

        c.a.store.delete(keys::CURRENT_TURN).unwrap();
        let turn = c.b.next_turn().unwrap().unwrap();
        assert_eq!(turn.user_id, "a");
        assert_eq!(turn.qissa_id, qissa.id);
    }

    #[test]
    fn expired_turn_with_nobody_to_pass_to_stays_expired() {
        let c = cousins();
        let qissa = started(&c);
        let lone = QissaTurn {
            qissa_id: qissa.id,
            user_id: "a".into(),
            start_time: c.clock.now_ms(),
        };
        save_json(c.a.store.as_ref(), keys::CURRENT_TURN, &lone).unwrap();

        c.clock.advance_ms(45_000);
        let status = c.a.tick().unwrap();
        assert_eq!(status.time_remaining, 0);
        assert!(status.is_my_turn);
        assert_eq!(status.turn, Some(lone));
    }
}
