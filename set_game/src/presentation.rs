//! Presentation sink.
//!
//! Every board, score, countdown and freeze change is mirrored to a
//! [`Presentation`]. Calls are fire-and-forget and happen from whichever
//! actor made the change, so implementations must not block.

use crate::cards::{Card, PlayerId, Slot};
use std::{sync::Mutex, time::Duration};

/// Receiver of display updates.
pub trait Presentation: Send + Sync {
    fn show_card(&self, card: Card, slot: Slot);
    fn hide_card(&self, slot: Slot);
    fn show_token(&self, player: PlayerId, slot: Slot);
    fn hide_token(&self, player: PlayerId, slot: Slot);
    fn set_score(&self, player: PlayerId, score: u32);
    fn set_countdown(&self, remaining: Duration, warn: bool);
    fn set_freeze(&self, player: PlayerId, remaining: Duration);
    fn announce_winners(&self, winners: &[PlayerId]);
}

/// Discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresentation;

impl Presentation for NullPresentation {
    fn show_card(&self, _card: Card, _slot: Slot) {}
    fn hide_card(&self, _slot: Slot) {}
    fn show_token(&self, _player: PlayerId, _slot: Slot) {}
    fn hide_token(&self, _player: PlayerId, _slot: Slot) {}
    fn set_score(&self, _player: PlayerId, _score: u32) {}
    fn set_countdown(&self, _remaining: Duration, _warn: bool) {}
    fn set_freeze(&self, _player: PlayerId, _remaining: Duration) {}
    fn announce_winners(&self, _winners: &[PlayerId]) {}
}

const UI_TARGET: &str = "set_game::ui";

/// Writes updates through the `log` facade.
///
/// Token and countdown traffic goes to `trace`, board changes to `debug`,
/// scores and winners to `info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPresentation;

impl Presentation for LogPresentation {
    fn show_card(&self, card: Card, slot: Slot) {
        log::debug!(target: UI_TARGET, "slot {slot}: card {card}");
    }

    fn hide_card(&self, slot: Slot) {
        log::debug!(target: UI_TARGET, "slot {slot}: empty");
    }

    fn show_token(&self, player: PlayerId, slot: Slot) {
        log::trace!(target: UI_TARGET, "player {player} token on slot {slot}");
    }

    fn hide_token(&self, player: PlayerId, slot: Slot) {
        log::trace!(target: UI_TARGET, "player {player} token off slot {slot}");
    }

    fn set_score(&self, player: PlayerId, score: u32) {
        log::info!(target: UI_TARGET, "player {player} score {score}");
    }

    fn set_countdown(&self, remaining: Duration, warn: bool) {
        if warn {
            log::trace!(target: UI_TARGET, "countdown {}ms (hurry!)", remaining.as_millis());
        } else {
            log::trace!(target: UI_TARGET, "countdown {}s", remaining.as_secs());
        }
    }

    fn set_freeze(&self, player: PlayerId, remaining: Duration) {
        log::debug!(target: UI_TARGET, "player {player} frozen for {}s", remaining.as_secs());
    }

    fn announce_winners(&self, winners: &[PlayerId]) {
        match winners {
            [single] => log::info!(target: UI_TARGET, "THE WINNER IS: player {single}"),
            _ => log::info!(target: UI_TARGET, "IT IS A DRAW: players {winners:?}"),
        }
    }
}

/// One recorded display update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    ShowCard { card: Card, slot: Slot },
    HideCard { slot: Slot },
    ShowToken { player: PlayerId, slot: Slot },
    HideToken { player: PlayerId, slot: Slot },
    Score { player: PlayerId, score: u32 },
    Countdown { remaining: Duration, warn: bool },
    Freeze { player: PlayerId, remaining: Duration },
    Winners(Vec<PlayerId>),
}

/// Keeps every update in memory, for embedding and tests.
#[derive(Debug, Default)]
pub struct RecordingPresentation {
    events: Mutex<Vec<UiEvent>>,
}

impl RecordingPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the updates so far.
    pub fn events(&self) -> Vec<UiEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// The last announced winners, if the game has finished.
    pub fn winners(&self) -> Option<Vec<PlayerId>> {
        self.events().into_iter().rev().find_map(|event| match event {
            UiEvent::Winners(winners) => Some(winners),
            _ => None,
        })
    }

    fn push(&self, event: UiEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl Presentation for RecordingPresentation {
    fn show_card(&self, card: Card, slot: Slot) {
        self.push(UiEvent::ShowCard { card, slot });
    }

    fn hide_card(&self, slot: Slot) {
        self.push(UiEvent::HideCard { slot });
    }

    fn show_token(&self, player: PlayerId, slot: Slot) {
        self.push(UiEvent::ShowToken { player, slot });
    }

    fn hide_token(&self, player: PlayerId, slot: Slot) {
        self.push(UiEvent::HideToken { player, slot });
    }

    fn set_score(&self, player: PlayerId, score: u32) {
        self.push(UiEvent::Score { player, score });
    }

    fn set_countdown(&self, remaining: Duration, warn: bool) {
        self.push(UiEvent::Countdown { remaining, warn });
    }

    fn set_freeze(&self, player: PlayerId, remaining: Duration) {
        self.push(UiEvent::Freeze { player, remaining });
    }

    fn announce_winners(&self, winners: &[PlayerId]) {
        self.push(UiEvent::Winners(winners.to_vec()));
    }
}
