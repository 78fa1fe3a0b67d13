//! Room actor: an isolated Tokio task owning one head-to-head match.
//!
//! All room state — seats, match state, the current problem, the health
//! ledger — is confined to the actor task. Both players' dispatch tasks
//! and the garbage collector talk to it through a cloneable
//! [`RoomHandle`] over a command channel, so every state transition is
//! serialized without a lock.
//!
//! The one long-running operation, judging a submission, deliberately
//! happens *outside* the actor: the submitter's dispatch task takes a
//! [`Snapshot`] (which problem is current), awaits the judge on its own
//! time, and feeds the [`JudgeOutcome`] back as a command. A stale
//! snapshot epoch means the problem rotated mid-judging and the verdict
//! no longer counts.

use std::sync::Arc;

use codeduel_problems::Deck;
use codeduel_protocol::{JoinOutcome, PlayerId, RoomId, ServerMessage};
use codeduel_session::Session;
use tokio::sync::{mpsc, oneshot};

use crate::{MAX_SEATS, MatchState, RoomConfig, RoomError};

/// Command channel capacity per room actor.
const COMMAND_CHANNEL_SIZE: usize = 64;

/// Fired exactly once when the room closes. The registry hands one in to
/// unindex the room.
pub type DisposeFn = Box<dyn FnOnce() + Send>;

/// Result of a successful attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    /// First seat taken; waiting for an opponent.
    Waiting,
    /// Second seat taken; the match just started.
    Started,
}

/// What a submitter needs to know before running the judge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
    /// The match isn't running; submissions are out of phase.
    NotActive,
    /// The match is running but the catalogue is empty.
    NoProblem,
    /// Judge away; quote `epoch` back with the verdict.
    Current { epoch: u64 },
}

/// The judge's raw outcome for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JudgeOutcome {
    /// The program ran; here is what it printed.
    Output(String),
    /// The judge failed (timeout, sandbox fault); display text inside.
    Error(String),
}

/// A snapshot of one seat, for sweeps and diagnostics.
#[derive(Debug, Clone)]
pub struct SeatInfo {
    pub player_id: PlayerId,
    pub name: String,
    pub health: u32,
    pub alive: bool,
}

/// A snapshot of room metadata.
#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub state: MatchState,
    pub seats: Vec<SeatInfo>,
}

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    Attach {
        session: Arc<Session>,
        reply: oneshot::Sender<Result<AttachOutcome, RoomError>>,
    },
    Detach {
        player_id: PlayerId,
    },
    PeerCode {
        sender: PlayerId,
        code: String,
    },
    Snapshot {
        reply: oneshot::Sender<Snapshot>,
    },
    ApplyVerdict {
        submitter: PlayerId,
        epoch: u64,
        outcome: JudgeOutcome,
    },
    NextProblem {
        epoch: u64,
    },
    Info {
        reply: oneshot::Sender<RoomInfo>,
    },
    ForceClose,
}

/// Handle to a running room actor. Cheap to clone.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Returns the room's unique ID.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Requests a seat for `session`.
    pub async fn attach(
        &self,
        session: Arc<Session>,
    ) -> Result<AttachOutcome, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Attach {
                session,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?
    }

    /// Gives up a seat. Fire-and-forget; a vanished room needs no detach.
    pub async fn detach(&self, player_id: PlayerId) {
        let _ = self.sender.send(RoomCommand::Detach { player_id }).await;
    }

    /// Relays live editor contents toward the opponent.
    pub async fn peer_code(&self, sender: PlayerId, code: String) {
        let _ = self
            .sender
            .send(RoomCommand::PeerCode { sender, code })
            .await;
    }

    /// Asks which problem is current, so the caller can judge against it.
    pub async fn snapshot(&self) -> Result<Snapshot, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    /// Feeds a judged outcome back into the room. Fire-and-forget: if
    /// the room closed while the judge ran, the verdict is moot.
    pub async fn apply_verdict(
        &self,
        submitter: PlayerId,
        epoch: u64,
        outcome: JudgeOutcome,
    ) {
        let _ = self
            .sender
            .send(RoomCommand::ApplyVerdict {
                submitter,
                epoch,
                outcome,
            })
            .await;
    }

    /// Requests current room metadata.
    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Info { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    /// Closes the room unconditionally (garbage collector, room kill).
    pub async fn force_close(&self) {
        let _ = self.sender.send(RoomCommand::ForceClose).await;
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room_id: RoomId,
    config: RoomConfig,
    state: MatchState,
    /// Seats in join order. Never more than [`MAX_SEATS`].
    seats: Vec<Arc<Session>>,
    deck: Deck,
    current: Option<codeduel_problems::Problem>,
    /// Bumped on every problem rotation; guards stale verdicts.
    epoch: u64,
    dispose: Option<DisposeFn>,
    receiver: mpsc::Receiver<RoomCommand>,
    /// For self-addressed commands (the delayed problem rotation).
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(room_id = %self.room_id, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Attach { session, reply } => {
                    let result = self.handle_attach(session);
                    let _ = reply.send(result);
                }
                RoomCommand::Detach { player_id } => {
                    self.handle_detach(&player_id);
                }
                RoomCommand::PeerCode { sender, code } => {
                    self.handle_peer_code(&sender, code);
                }
                RoomCommand::Snapshot { reply } => {
                    let _ = reply.send(self.snapshot());
                }
                RoomCommand::ApplyVerdict {
                    submitter,
                    epoch,
                    outcome,
                } => {
                    self.handle_apply_verdict(&submitter, epoch, outcome);
                }
                RoomCommand::NextProblem { epoch } => {
                    self.handle_next_problem(epoch);
                }
                RoomCommand::Info { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::ForceClose => {
                    self.broadcast(ServerMessage::Info {
                        message: "room closed by server".to_owned(),
                    });
                    self.close();
                }
            }

            if self.state.is_closed() {
                break;
            }
        }

        // All handles dropped without an explicit close still disposes.
        self.close();
        tracing::info!(room_id = %self.room_id, "room actor stopped");
    }

    fn handle_attach(
        &mut self,
        session: Arc<Session>,
    ) -> Result<AttachOutcome, RoomError> {
        if self.seat(session.player_id()).is_some() {
            return Err(RoomError::AlreadyAttached(
                session.player_id().clone(),
                self.room_id.clone(),
            ));
        }

        match self.state {
            MatchState::Closed => {
                return Err(RoomError::Closed(self.room_id.clone()));
            }
            MatchState::Ready | MatchState::Active => {
                // The caller keeps its connection; it just doesn't get a seat.
                session.enqueue(ServerMessage::JoinStatus {
                    status: JoinOutcome::GameFull,
                });
                return Err(RoomError::MatchStarted(self.room_id.clone()));
            }
            MatchState::Waiting => {}
        }

        if self.seats.len() >= MAX_SEATS {
            session.enqueue(ServerMessage::JoinStatus {
                status: JoinOutcome::GameFull,
            });
            return Err(RoomError::RoomFull(self.room_id.clone()));
        }

        self.seats.push(Arc::clone(&session));
        tracing::info!(
            room_id = %self.room_id,
            player_id = %session.player_id(),
            seats = self.seats.len(),
            "player joined"
        );

        if self.seats.len() < MAX_SEATS {
            session.enqueue(ServerMessage::JoinStatus {
                status: JoinOutcome::NotEnoughPlayers,
            });
            Ok(AttachOutcome::Waiting)
        } else {
            session.enqueue(ServerMessage::JoinStatus {
                status: JoinOutcome::Success,
            });
            self.start_match();
            Ok(AttachOutcome::Started)
        }
    }

    /// Both seats filled: deal health, draw the first problem, tell
    /// everyone. Waiting → Ready → Active in one step; Ready never rests.
    fn start_match(&mut self) {
        self.state = MatchState::Ready;
        for seat in &self.seats {
            seat.deal_health(self.config.initial_health);
        }
        self.state = MatchState::Active;

        tracing::info!(room_id = %self.room_id, "match started");

        self.broadcast(ServerMessage::Starting {});
        self.rotate_problem();

        // Introduce the opponents to each other.
        for seat in &self.seats {
            for other in self.seats.iter().filter(|o| o.player_id() != seat.player_id()) {
                seat.enqueue(ServerMessage::OpponentInfo {
                    name: other.name(),
                    language: self.config.language.clone(),
                    health: other.health(),
                    console: String::new(),
                });
            }
        }
    }

    fn handle_detach(&mut self, player_id: &PlayerId) {
        let before = self.seats.len();
        self.seats.retain(|s| s.player_id() != player_id);
        if self.seats.len() == before {
            return;
        }

        tracing::info!(
            room_id = %self.room_id,
            %player_id,
            seats = self.seats.len(),
            "player left"
        );

        if self.seats.is_empty() {
            self.close();
        } else if self.state.is_active() {
            self.broadcast(ServerMessage::Info {
                message: "your opponent disconnected".to_owned(),
            });
        }
    }

    fn handle_peer_code(&mut self, sender: &PlayerId, code: String) {
        if !self.state.is_active() {
            if let Some(seat) = self.seat(sender) {
                seat.enqueue(ServerMessage::Info {
                    message: "the match hasn't started yet".to_owned(),
                });
            }
            return;
        }
        for other in self.others(sender) {
            other.enqueue(ServerMessage::OpponentCode { code: code.clone() });
        }
    }

    fn snapshot(&self) -> Snapshot {
        if !self.state.is_active() {
            Snapshot::NotActive
        } else if self.current.is_none() {
            Snapshot::NoProblem
        } else {
            Snapshot::Current { epoch: self.epoch }
        }
    }

    fn handle_apply_verdict(
        &mut self,
        submitter: &PlayerId,
        epoch: u64,
        outcome: JudgeOutcome,
    ) {
        if !self.state.is_active() {
            tracing::debug!(
                room_id = %self.room_id,
                %submitter,
                "dropping verdict for inactive room"
            );
            return;
        }
        let Some(sub) = self.seat(submitter).map(Arc::clone) else {
            return;
        };

        let output = match outcome {
            JudgeOutcome::Error(message) => {
                sub.enqueue(ServerMessage::SubmissionResult {
                    success: false,
                    message: format!("Execution error: {message}"),
                });
                return;
            }
            JudgeOutcome::Output(output) => output,
        };

        let Some(problem) = self.current.as_ref().filter(|_| epoch == self.epoch) else {
            // The opponent solved it first; this verdict is for a
            // problem that is no longer on the table.
            sub.enqueue(ServerMessage::SubmissionResult {
                success: false,
                message: format!(
                    "Too slow, the problem has already changed\n Output: {output}"
                ),
            });
            return;
        };

        let success = output.trim_end() == problem.solution.trim_end();
        let message = if success {
            format!("Correct Answer\n Output: {output}")
        } else {
            format!("Incorrect Answer\n Output: {output}")
        };

        let mut eliminated = false;
        if success {
            for other in self.others(submitter) {
                let new_health = other.take_damage();
                other.enqueue(ServerMessage::HealthUpdate { new_health });
                if new_health == 0 {
                    eliminated = true;
                }
            }
        }

        // The opponent's view of the submitter, judge console included.
        for other in self.others(submitter) {
            other.enqueue(ServerMessage::OpponentInfo {
                name: sub.name(),
                language: self.config.language.clone(),
                health: sub.health(),
                console: message.clone(),
            });
        }

        sub.enqueue(ServerMessage::SubmissionResult { success, message });

        if eliminated {
            // Eliminations are serialized through this actor, so the
            // submitter of the decrementing verdict is the survivor.
            tracing::info!(
                room_id = %self.room_id,
                winner = %sub.name(),
                "match decided"
            );
            self.broadcast(ServerMessage::GameOver { winner: sub.name() });
            self.close();
        } else if success {
            self.schedule_rotation();
        }
    }

    /// After the respite, rotate — unless someone already did.
    fn schedule_rotation(&self) {
        let sender = self.sender.clone();
        let epoch = self.epoch;
        let respite = self.config.respite;
        tokio::spawn(async move {
            tokio::time::sleep(respite).await;
            let _ = sender.send(RoomCommand::NextProblem { epoch }).await;
        });
    }

    fn handle_next_problem(&mut self, epoch: u64) {
        if !self.state.is_active() || epoch != self.epoch {
            return;
        }
        self.rotate_problem();
    }

    fn rotate_problem(&mut self) {
        self.epoch += 1;
        self.current = self.deck.draw();
        match &self.current {
            Some(problem) => {
                self.broadcast(ServerMessage::Problem {
                    description: problem.description.clone(),
                    starter_code: problem.starter_code.clone(),
                });
            }
            None => {
                tracing::warn!(
                    room_id = %self.room_id,
                    "problem catalogue is empty, match has nothing to serve"
                );
            }
        }
    }

    /// Tears the room down. Idempotent; the disposal callback fires once.
    fn close(&mut self) {
        if self.state.is_closed() {
            return;
        }
        for seat in &self.seats {
            seat.close_mailbox();
        }
        self.seats.clear();
        self.state = MatchState::Closed;
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
        tracing::info!(room_id = %self.room_id, "room closed");
    }

    fn seat(&self, player_id: &PlayerId) -> Option<&Arc<Session>> {
        self.seats.iter().find(|s| s.player_id() == player_id)
    }

    fn others<'a>(
        &'a self,
        player_id: &'a PlayerId,
    ) -> impl Iterator<Item = &'a Arc<Session>> {
        self.seats.iter().filter(move |s| s.player_id() != player_id)
    }

    fn broadcast(&self, msg: ServerMessage) {
        for seat in &self.seats {
            seat.enqueue(msg.clone());
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room_id.clone(),
            state: self.state,
            seats: self
                .seats
                .iter()
                .map(|s| SeatInfo {
                    player_id: s.player_id().clone(),
                    name: s.name(),
                    health: s.health(),
                    alive: s.is_alive(),
                })
                .collect(),
        }
    }
}

/// Spawns a new room actor task and returns a handle to it.
pub(crate) fn spawn_room(
    room_id: RoomId,
    config: RoomConfig,
    deck: Deck,
    dispose: DisposeFn,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);

    let actor = RoomActor {
        room_id: room_id.clone(),
        config,
        state: MatchState::Waiting,
        seats: Vec::new(),
        deck,
        current: None,
        epoch: 0,
        dispose: Some(dispose),
        receiver: rx,
        sender: tx.clone(),
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
