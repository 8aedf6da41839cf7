//! Game wiring: builds the table, dealer and players and runs them.

use crate::{
    cards::{Deck, PlayerId, Slot},
    config::{ConfigError, GameConfig},
    dealer::{Dealer, GameSummary},
    player::PlayerHandle,
    presentation::Presentation,
    rules::{FeatureRules, SetRules},
    table::Table,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Errors starting or finishing a game
#[derive(Debug, Error)]
pub enum GameError {
    /// Rejected configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The dealer task panicked or was aborted
    #[error("Dealer task failed: {0}")]
    Dealer(#[from] tokio::task::JoinError),
}

/// A game that has been set up but not started.
pub struct Game {
    dealer: Dealer,
    players: Vec<PlayerHandle>,
    table: Arc<Table>,
    cancel: CancellationToken,
}

impl Game {
    /// Set up a game with custom rules.
    pub fn new(
        config: GameConfig,
        rules: Arc<dyn SetRules>,
        ui: Arc<dyn Presentation>,
    ) -> Result<Self, GameError> {
        config.validate()?;

        let table = Arc::new(
            Table::new(
                config.table_size,
                config.deck_size,
                config.players,
                Arc::clone(&ui),
            )
            .with_delay(config.table_delay()),
        );
        let cancel = CancellationToken::new();
        let (dealer, players) =
            Dealer::new(config, Arc::clone(&table), rules, ui, cancel.clone());

        Ok(Self {
            dealer,
            players,
            table,
            cancel,
        })
    }

    /// Set up a game with the classic feature rules.
    pub fn with_feature_rules(
        config: GameConfig,
        ui: Arc<dyn Presentation>,
    ) -> Result<Self, GameError> {
        let rules = FeatureRules::from_config(&config)?;
        Self::new(config, Arc::new(rules), ui)
    }

    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    pub fn players(&self) -> &[PlayerHandle] {
        &self.players
    }

    /// Deal from `deck` instead of the full deck.
    pub fn with_deck(mut self, deck: Deck) -> Self {
        self.dealer = self.dealer.with_deck(deck);
        self
    }

    /// Spawn the dealer, which spawns every player.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(self) -> GameHandle {
        let task = tokio::spawn(self.dealer.run());
        GameHandle {
            players: self.players,
            table: self.table,
            cancel: self.cancel,
            task,
        }
    }
}

/// A running game.
pub struct GameHandle {
    players: Vec<PlayerHandle>,
    table: Arc<Table>,
    cancel: CancellationToken,
    task: JoinHandle<GameSummary>,
}

impl GameHandle {
    pub fn players(&self) -> &[PlayerHandle] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerHandle> {
        self.players.get(id)
    }

    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    /// Route a key press to a player. Returns whether it was queued.
    pub fn key_pressed(&self, player: PlayerId, slot: Slot) -> bool {
        self.players
            .get(player)
            .is_some_and(|handle| handle.key_pressed(slot))
    }

    /// Stop the game. The dealer stops its countdown, terminates every
    /// player and waits for them before [`GameHandle::join`] returns.
    pub fn terminate(&self) {
        self.cancel.cancel();
    }

    /// A token that terminates the game when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the game to end.
    pub async fn join(self) -> Result<GameSummary, GameError> {
        Ok(self.task.await?)
    }
}
