//! Player actor implementation.

use super::{state::PlayerState, suggest::Suggester};
use crate::{
    cards::{PlayerId, Slot},
    config::GameConfig,
    dealer::messages::{Claim, ClaimSender, Verdict},
    presentation::Presentation,
    table::{Table, TokenToggle},
};
use std::{ops::ControlFlow, sync::Arc, time::Duration};
use tokio::{sync::mpsc, task::JoinHandle, time::sleep};
use tokio_util::sync::CancellationToken;

/// Outstanding key presses a player buffers before new ones are dropped.
pub const INPUT_QUEUE_CAPACITY: usize = 3;

/// Freeze countdown reporting step.
const FREEZE_STEP: Duration = Duration::from_secs(1);

/// Handle to a running (or not yet spawned) player.
#[derive(Clone)]
pub struct PlayerHandle {
    state: Arc<PlayerState>,
    input: mpsc::Sender<Slot>,
    cancel: CancellationToken,
    table_size: usize,
    human: bool,
}

impl PlayerHandle {
    pub fn id(&self) -> PlayerId {
        self.state.id()
    }

    pub fn state(&self) -> &Arc<PlayerState> {
        &self.state
    }

    pub fn is_human(&self) -> bool {
        self.human
    }

    /// Queue a key press for `slot`.
    ///
    /// Presses beyond the queue capacity, or for slots off the board, are
    /// dropped. Returns whether the press was queued.
    pub fn key_pressed(&self, slot: Slot) -> bool {
        if slot >= self.table_size {
            log::debug!("Player {}: ignoring press on slot {}", self.id(), slot);
            return false;
        }
        self.input.try_send(slot).is_ok()
    }

    /// Ask the player to stop. Interrupts every wait it is in.
    pub fn terminate(&self) {
        self.cancel.cancel();
    }

    pub fn is_terminated(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// One participant's control loop.
pub struct PlayerActor {
    state: Arc<PlayerState>,
    table: Arc<Table>,
    claims: ClaimSender,
    ui: Arc<dyn Presentation>,
    inbox: mpsc::Receiver<Slot>,
    /// Kept for the suggestion loop, if any.
    input: mpsc::Sender<Slot>,
    cancel: CancellationToken,
    human: bool,
    point_freeze: Duration,
    penalty_freeze: Duration,
    ai_interval: Duration,
    table_size: usize,
}

impl PlayerActor {
    /// Create a new player actor
    ///
    /// # Arguments
    ///
    /// * `id` - Player ID
    /// * `config` - Game configuration
    /// * `table` - Shared board
    /// * `claims` - Sending half of the dealer's claim channel
    /// * `ui` - Presentation sink
    /// * `cancel` - Token that terminates this player
    ///
    /// # Returns
    ///
    /// * `(PlayerActor, PlayerHandle)` - Actor and handle for input and termination
    pub fn new(
        id: PlayerId,
        config: &GameConfig,
        table: Arc<Table>,
        claims: ClaimSender,
        ui: Arc<dyn Presentation>,
        cancel: CancellationToken,
    ) -> (Self, PlayerHandle) {
        let (input, inbox) = mpsc::channel(INPUT_QUEUE_CAPACITY);
        let state = Arc::new(PlayerState::new(id, config.feature_size));
        let human = config.is_human(id);

        let handle = PlayerHandle {
            state: Arc::clone(&state),
            input: input.clone(),
            cancel: cancel.clone(),
            table_size: config.table_size,
            human,
        };

        let actor = Self {
            state,
            table,
            claims,
            ui,
            inbox,
            input,
            cancel,
            human,
            point_freeze: config.point_freeze(),
            penalty_freeze: config.penalty_freeze(),
            ai_interval: config.ai_interval(),
            table_size: config.table_size,
        };

        (actor, handle)
    }

    /// Spawn the player loop on the runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Run the player until terminated.
    pub async fn run(mut self) {
        let id = self.state.id();
        log::info!("Player {} starting", id);

        let suggester = (!self.human).then(|| {
            tokio::spawn(
                Suggester::new(
                    id,
                    self.table_size,
                    self.input.clone(),
                    self.ai_interval,
                    self.cancel.child_token(),
                )
                .run(),
            )
        });

        while !self.cancel.is_cancelled() {
            let slot = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                slot = self.inbox.recv() => match slot {
                    Some(slot) => slot,
                    None => break,
                },
            };

            if self.handle_press(slot).await.is_break() {
                break;
            }
        }

        // The suggestion loop runs on a child token; make sure it stops even
        // when the loop ended for another reason.
        self.cancel.cancel();
        if let Some(task) = suggester
            && let Err(e) = task.await
        {
            log::warn!("Player {}: suggestion task failed: {}", id, e);
        }

        log::info!("Player {} terminated", id);
    }

    /// Apply one key press to the board.
    async fn handle_press(&mut self, slot: Slot) -> ControlFlow<()> {
        let id = self.state.id();
        let may_place = self.state.tokens_in_hand() > 0;

        match self.table.toggle_token(id, slot, may_place).await {
            TokenToggle::Ignored => ControlFlow::Continue(()),
            TokenToggle::Removed => {
                self.state.return_token();
                ControlFlow::Continue(())
            }
            TokenToggle::Placed => {
                self.state.take_token();
                if self.state.has_full_set() {
                    self.claim().await
                } else {
                    ControlFlow::Continue(())
                }
            }
        }
    }

    /// Submit the placed tokens and wait for the dealer's verdict.
    async fn claim(&mut self) -> ControlFlow<()> {
        let id = self.state.id();
        self.state.record_claim();
        let (claim, verdict) = Claim::new(id);

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return ControlFlow::Break(()),
            sent = self.claims.send(claim) => {
                if sent.is_err() {
                    log::debug!("Player {}: dealer is gone, claim dropped", id);
                    return ControlFlow::Break(());
                }
            }
        }

        let verdict = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return ControlFlow::Break(()),
            verdict = verdict => match verdict {
                Ok(verdict) => verdict,
                Err(_) => return ControlFlow::Break(()),
            },
        };
        log::debug!("Player {}: verdict {:?}", id, verdict);

        let freeze = match verdict {
            Verdict::Point { .. } => self.point_freeze,
            Verdict::Penalty => self.penalty_freeze,
            Verdict::Stale => Duration::ZERO,
        };
        self.freeze(freeze).await?;

        // Presses made while waiting are stale.
        while self.inbox.try_recv().is_ok() {}
        ControlFlow::Continue(())
    }

    /// Count a freeze down in whole-second steps.
    async fn freeze(&self, duration: Duration) -> ControlFlow<()> {
        if duration.is_zero() {
            return ControlFlow::Continue(());
        }

        let id = self.state.id();
        self.state.set_frozen(true);
        let mut remaining = duration;
        while !remaining.is_zero() {
            self.ui.set_freeze(id, remaining);
            let step = remaining.min(FREEZE_STEP);
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    self.state.set_frozen(false);
                    return ControlFlow::Break(());
                }
                _ = sleep(step) => {}
            }
            remaining -= step;
        }
        self.ui.set_freeze(id, Duration::ZERO);
        self.state.set_frozen(false);
        ControlFlow::Continue(())
    }
}
