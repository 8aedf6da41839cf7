//! Per-player counters shared between a player and the dealer.

use crate::cards::PlayerId;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

/// Score and token bookkeeping for one player.
///
/// Only the owning player takes tokens out of its hand. The dealer gives
/// tokens back when it clears a slot and raises the score when a claim is
/// valid.
#[derive(Debug)]
pub struct PlayerState {
    id: PlayerId,
    feature_size: usize,
    score: AtomicU32,
    in_hand: AtomicUsize,
    claims: AtomicU32,
    frozen: AtomicBool,
}

impl PlayerState {
    pub fn new(id: PlayerId, feature_size: usize) -> Self {
        Self {
            id,
            feature_size,
            score: AtomicU32::new(0),
            in_hand: AtomicUsize::new(feature_size),
            claims: AtomicU32::new(0),
            frozen: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn score(&self) -> u32 {
        self.score.load(Ordering::Acquire)
    }

    /// Tokens not on the board.
    pub fn tokens_in_hand(&self) -> usize {
        self.in_hand.load(Ordering::Acquire)
    }

    /// Tokens on the board.
    pub fn placed_tokens(&self) -> usize {
        self.feature_size.saturating_sub(self.tokens_in_hand())
    }

    /// Whether every token is on the board, i.e. a claim is complete.
    pub fn has_full_set(&self) -> bool {
        self.tokens_in_hand() == 0
    }

    /// Number of claims submitted so far.
    pub fn claims(&self) -> u32 {
        self.claims.load(Ordering::Acquire)
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// Take a token out of the hand after placing it.
    pub(crate) fn take_token(&self) {
        let taken = self
            .in_hand
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        if taken.is_err() {
            log::warn!("Player {} placed a token with none in hand", self.id);
        }
    }

    /// Give a token back after it left the board.
    pub fn return_token(&self) {
        let now = self.in_hand.fetch_add(1, Ordering::AcqRel) + 1;
        if now > self.feature_size {
            log::warn!(
                "Token counter of player {} is {}, more than the {} it can have",
                self.id,
                now,
                self.feature_size
            );
        }
    }

    /// Raise the score by one and return the new score.
    pub fn award_point(&self) -> u32 {
        self.score.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub(crate) fn record_claim(&self) {
        self.claims.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn set_frozen(&self, frozen: bool) {
        self.frozen.store(frozen, Ordering::Release);
    }
}
