//! # Set Game
//!
//! A concurrent simulation of the Set card game: one dealer and any number
//! of players (human or computer) race over a shared board.
//!
//! ## Architecture
//!
//! Every participant is a Tokio task:
//!
//! - **Dealer**: owns the deck and the round countdown, deals cards, and is
//!   the only one that validates claims
//! - **Player**: turns key presses into tokens on the table; placing its last
//!   token submits a claim and blocks until the dealer answers
//! - **Suggester**: per computer player, produces random key presses
//!
//! The [`Table`] is the only shared mutable state. Claims travel on a
//! bounded FIFO channel, and each claim carries a oneshot sender for its
//! [`Verdict`]. Shutdown propagates through a tree of cancellation tokens
//! (game, then each player, then each suggester), so every wait can be
//! interrupted.
//!
//! ## Core Modules
//!
//! - [`table`]: shared board with atomic card and token operations
//! - [`player`]: player actor, its counters, and the suggestion loop
//! - [`dealer`]: dealer actor, countdown, and claim messages
//! - [`game`]: wiring and the running-game handle
//! - [`rules`]: combination validity ([`SetRules`], [`FeatureRules`])
//! - [`presentation`]: display sink ([`Presentation`])
//!
//! ## Example
//!
//! ```no_run
//! use set_game::{Game, GameConfig, LogPresentation};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let game = Game::with_feature_rules(GameConfig::default(), Arc::new(LogPresentation))
//!         .unwrap();
//!     let summary = game.start().join().await.unwrap();
//!     println!("Winners: {:?}", summary.winners);
//! }
//! ```

pub mod cards;
pub mod config;
pub mod dealer;
pub mod game;
pub mod player;
pub mod presentation;
pub mod rules;
pub mod table;

pub use cards::{Card, Deck, PlayerId, Slot};
pub use config::{ConfigError, GameConfig};
pub use dealer::{Claim, Dealer, GameSummary, Verdict};
pub use game::{Game, GameError, GameHandle};
pub use player::{PlayerActor, PlayerHandle, PlayerState};
pub use presentation::{
    LogPresentation, NullPresentation, Presentation, RecordingPresentation, UiEvent,
};
pub use rules::{FeatureRules, SetRules};
pub use table::{Table, TableError, TokenToggle};
