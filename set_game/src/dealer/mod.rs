//! The dealer: deck owner, round timer and sole judge of claims.
//!
//! ## Round lifecycle
//!
//! - **Dealing**: every empty slot gets a random card from the deck
//! - **Counting down**: the dealer sleeps until the next display refresh or
//!   the next claim, resolves all queued claims and refills the board
//! - **Sweeping**: when the round times out, every card goes back to the
//!   deck and every token back to its owner
//! - **Finished**: no combination left in the deck, or the game was
//!   terminated; winners are announced and all players are joined
//!
//! Claims are resolved one at a time in arrival order, so two players racing
//! for the same cards cannot both score: the second claim finds its tokens
//! gone and gets a stale verdict.

pub mod actor;
pub mod countdown;
pub mod messages;

pub use actor::{Dealer, GameSummary};
pub use countdown::Countdown;
pub use messages::{Claim, ClaimReceiver, ClaimSender, Verdict, claim_channel};
