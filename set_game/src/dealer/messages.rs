//! Claim channel message types.

use crate::cards::PlayerId;
use tokio::sync::{mpsc, oneshot};

/// A player's request to have its placed tokens checked.
///
/// The player blocks on the receiving half of `verdict` until the dealer
/// has resolved the claim.
#[derive(Debug)]
pub struct Claim {
    pub player: PlayerId,
    pub verdict: oneshot::Sender<Verdict>,
}

impl Claim {
    /// Create a claim together with the receiver its verdict arrives on.
    pub fn new(player: PlayerId) -> (Self, oneshot::Receiver<Verdict>) {
        let (verdict, receiver) = oneshot::channel();
        (Self { player, verdict }, receiver)
    }
}

/// Dealer's answer to a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Valid combination; the cards are gone and the score was raised.
    Point { score: u32 },

    /// Invalid combination.
    Penalty,

    /// The player no longer held a full token set when the claim was
    /// reached, so nothing was checked.
    Stale,
}

/// Sending half of the claim channel, one clone per player.
pub type ClaimSender = mpsc::Sender<Claim>;

/// Receiving half of the claim channel, owned by the dealer.
pub type ClaimReceiver = mpsc::Receiver<Claim>;

/// Bounded FIFO claim channel; at most one live claim per player.
pub fn claim_channel(players: usize) -> (ClaimSender, ClaimReceiver) {
    mpsc::channel(players.max(1))
}
