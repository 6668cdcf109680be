use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use crate::engine::clock::Clock;
use crate::engine::presence::{PresenceTracker, PRESENCE_CLEANUP_MS};
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::engine::round::{LineOutcome, RoundCoordinator};
use crate::engine::session::{StartOutcome, StorySession};
use crate::error::StoreError;
use crate::model::{ParticipantId, QissaSnapshot};
use crate::store::{keys, KvStore, StoreChange};

/// Fixed-interval store polling with random jitter on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub jitter: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            jitter: Duration::from_millis(250),
        }
    }
}

impl PollSettings {
    pub fn next_delay<R: Rng>(&self, rng: &mut R) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        self.interval + Duration::from_millis(rng.gen_range(0..=jitter_ms))
    }
}

/// Owns the story state machines for one view and polls the shared store so
/// other views' writes show up.
pub struct Engine {
    rx: Receiver<EngineCommand>,
    tx: Sender<EngineResponse>,

    rounds: RoundCoordinator,
    session: StorySession,
    presence: PresenceTracker,

    clock: Arc<dyn Clock>,
    local_id: ParticipantId,
    poll: PollSettings,

    last_snapshot: Option<QissaSnapshot>,
    last_cleanup: i64,
}

impl Engine {
    pub fn new(
        rx: Receiver<EngineCommand>,
        tx: Sender<EngineResponse>,
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
        local_id: ParticipantId,
        poll: PollSettings,
    ) -> Self {
        Self {
            rx,
            tx,
            rounds: RoundCoordinator::new(store.clone(), clock.clone(), local_id.clone()),
            session: StorySession::new(store.clone(), clock.clone(), local_id.clone()),
            presence: PresenceTracker::new(store, clock.clone()),
            last_cleanup: clock.now_ms(),
            clock,
            local_id,
            poll,
            last_snapshot: None,
        }
    }

    /// Start the engine thread plus a thread that turns store change
    /// notifications into `StoreChanged` commands.
    pub fn spawn(
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
        local_id: ParticipantId,
        poll: PollSettings,
    ) -> (Sender<EngineCommand>, Receiver<EngineResponse>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();

        let changes = store.subscribe();
        let bridge_tx = cmd_tx.clone();
        thread::spawn(move || forward_store_changes(changes, bridge_tx));

        thread::spawn(move || {
            let mut engine = Engine::new(cmd_rx, resp_tx, store, clock, local_id, poll);
            engine.run();
        });

        (cmd_tx, resp_rx)
    }

    pub fn run(&mut self) {
        self.handle(EngineCommand::Heartbeat);

        let mut rng = rand::thread_rng();
        loop {
            match self.rx.recv_timeout(self.poll.next_delay(&mut rng)) {
                Ok(cmd) => {
                    if !self.handle(cmd) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => self.poll_store(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        debug!("engine stopped");
    }

    /// Returns false once the engine should stop.
    pub fn handle(&mut self, cmd: EngineCommand) -> bool {
        if matches!(cmd, EngineCommand::Shutdown) {
            return false;
        }

        if let Err(err) = self.apply(cmd) {
            self.report(err);
        }
        self.publish();
        true
    }

    /// One poll interval elapsed. Every `PRESENCE_CLEANUP_MS` this also
    /// refreshes our own heartbeat and prunes stale ones.
    pub fn poll_store(&mut self) {
        let now = self.clock.now_ms();
        if now - self.last_cleanup >= PRESENCE_CLEANUP_MS {
            self.last_cleanup = now;
            let refreshed = self
                .presence
                .update_presence(&self.local_id)
                .and_then(|_| self.presence.cleanup_expired());
            if let Err(err) = refreshed {
                self.report(err);
            }
        }
        self.publish();
    }

    /// Read everything the front end shows. Runs one turn-timer tick.
    pub fn snapshot(&self) -> Result<QissaSnapshot, StoreError> {
        let round = self.rounds.state()?;
        let turn = self.session.tick()?;
        let qissas = self.session.qissas()?;

        Ok(QissaSnapshot {
            local_id: self.local_id.clone(),
            current_author: round.next_author().filter(|_| round.active).cloned(),
            round,
            archive: self.rounds.archive()?,
            active_qissa: qissas.iter().find(|q| !q.completed).cloned(),
            qissas,
            turn,
            notification: self.session.notification()?,
            active_users: self.presence.active_users()?,
        })
    }

    fn apply(&mut self, cmd: EngineCommand) -> Result<(), StoreError> {
        match cmd {
            EngineCommand::StartRound(participants) => {
                self.rounds.start_round(participants)?;
            }

            EngineCommand::AddLine(text) => {
                if let LineOutcome::Completed { entry, .. } = self.rounds.add_line(&text)? {
                    let _ = self.tx.send(EngineResponse::RoundArchived(entry));
                }
            }

            EngineCommand::FinishRound => {
                if let Some(entry) = self.rounds.finish_round(None)? {
                    let _ = self.tx.send(EngineResponse::RoundArchived(entry));
                }
            }

            EngineCommand::StartNewQissa(title) => {
                let active = self.presence.active_users()?;
                if let StartOutcome::NotEnoughCousins { active } =
                    self.session.start_new_qissa(&title, active)?
                {
                    let _ = self.tx.send(EngineResponse::NotEnoughCousins { active });
                }
            }

            EngineCommand::CompleteQissa(id) => {
                self.session.complete_qissa(&id)?;
            }

            EngineCommand::JoinActiveQissa => {
                self.session.join_active_qissa()?;
            }

            EngineCommand::SubmitTurnLine(text) => {
                self.session.add_line(&text)?;
            }

            EngineCommand::NextTurn => {
                self.session.next_turn()?;
            }

            EngineCommand::DismissNotification => {
                self.session.dismiss_notification()?;
            }

            EngineCommand::Heartbeat => {
                self.presence.update_presence(&self.local_id)?;
            }

            EngineCommand::StoreChanged(key) => {
                debug!(%key, "store changed");
            }

            // Handled by the caller.
            EngineCommand::Refresh | EngineCommand::Shutdown => {}
        }
        Ok(())
    }

    /// Send a snapshot if it differs from the last one sent.
    fn publish(&mut self) {
        let snapshot = match self.snapshot() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                self.report(err);
                return;
            }
        };

        if self.last_snapshot.as_ref() == Some(&snapshot) {
            return;
        }
        self.last_snapshot = Some(snapshot.clone());
        let _ = self.tx.send(EngineResponse::Snapshot(Box::new(snapshot)));
    }

    fn report(&self, err: StoreError) {
        warn!(error = %err, "store operation failed");
        let _ = self.tx.send(EngineResponse::StoreFailed(err.to_string()));
    }
}

fn forward_store_changes(changes: Receiver<StoreChange>, commands: Sender<EngineCommand>) {
    for change in changes {
        if !keys::WATCHED.contains(&change.key.as_str()) {
            continue;
        }
        if commands.send(EngineCommand::StoreChanged(change.key)).is_err() {
            break;
        }
    }
}
