//! Dealer actor implementation.

use super::{
    countdown::Countdown,
    messages::{Claim, ClaimReceiver, Verdict, claim_channel},
};
use crate::{
    cards::{Deck, PlayerId},
    config::GameConfig,
    player::{PlayerActor, PlayerHandle},
    presentation::Presentation,
    rules::SetRules,
    table::Table,
};
use rand::{SeedableRng, rngs::StdRng};
use std::{collections::VecDeque, sync::Arc};
use tokio::{
    sync::mpsc::error::TryRecvError,
    task::JoinHandle,
    time::{Instant, sleep_until},
};
use tokio_util::sync::CancellationToken;

/// Final standings of a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    /// Score per player id.
    pub scores: Vec<u32>,
    /// Claims submitted per player id.
    pub claims: Vec<u32>,
    /// Every player with the top score.
    pub winners: Vec<PlayerId>,
    /// Whether the game was stopped from outside rather than running out of
    /// combinations.
    pub terminated: bool,
}

/// The single authority over the deck, the countdown and claim validation.
pub struct Dealer {
    config: GameConfig,
    table: Arc<Table>,
    rules: Arc<dyn SetRules>,
    ui: Arc<dyn Presentation>,

    players: Vec<PlayerHandle>,
    /// Player loops not spawned yet.
    idle_players: Vec<PlayerActor>,
    player_tasks: Vec<JoinHandle<()>>,

    claims: ClaimReceiver,
    claims_closed: bool,
    /// Claims taken off the channel while waiting, not resolved yet.
    pending: VecDeque<Claim>,

    deck: Deck,
    rng: StdRng,
    countdown: Countdown,
    set_exists: bool,
    cancel: CancellationToken,
}

impl Dealer {
    /// Create the dealer and its players
    ///
    /// # Arguments
    ///
    /// * `config` - Game configuration
    /// * `table` - Shared board
    /// * `rules` - Combination validity and search
    /// * `ui` - Presentation sink
    /// * `cancel` - Terminates the game; every player gets a child token
    ///
    /// # Returns
    ///
    /// * `(Dealer, Vec<PlayerHandle>)` - Dealer and one handle per player, by id
    pub fn new(
        config: GameConfig,
        table: Arc<Table>,
        rules: Arc<dyn SetRules>,
        ui: Arc<dyn Presentation>,
        cancel: CancellationToken,
    ) -> (Self, Vec<PlayerHandle>) {
        let (claims_tx, claims) = claim_channel(config.players);

        let (idle_players, players): (Vec<_>, Vec<_>) = (0..config.players)
            .map(|id| {
                PlayerActor::new(
                    id,
                    &config,
                    Arc::clone(&table),
                    claims_tx.clone(),
                    Arc::clone(&ui),
                    cancel.child_token(),
                )
            })
            .unzip();

        let countdown = Countdown::new(
            config.turn_timeout(),
            config.turn_timeout_warning(),
            config.warning_tick(),
        );

        let dealer = Self {
            deck: Deck::new(config.deck_size),
            config,
            table,
            rules,
            ui,
            players: players.clone(),
            idle_players,
            player_tasks: Vec::new(),
            claims,
            claims_closed: false,
            pending: VecDeque::new(),
            rng: StdRng::from_rng(&mut rand::rng()),
            countdown,
            set_exists: true,
            cancel,
        };

        (dealer, players)
    }

    /// Replace the deck, e.g. to deal a known subset of cards.
    pub fn with_deck(mut self, deck: Deck) -> Self {
        self.deck = deck;
        self
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn players(&self) -> &[PlayerHandle] {
        &self.players
    }

    pub fn is_terminated(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Ask the dealer to wind the game down.
    pub fn terminate(&self) {
        self.cancel.cancel();
    }

    /// Start every player loop that is not running yet.
    pub fn spawn_players(&mut self) {
        for actor in self.idle_players.drain(..) {
            self.player_tasks.push(actor.spawn());
        }
    }

    /// Run the game to the end.
    pub async fn run(mut self) -> GameSummary {
        log::info!(
            "Dealer starting with {} players, {} cards",
            self.players.len(),
            self.deck.len()
        );
        self.spawn_players();

        if let Some(timeout) = self.config.turn_timeout() {
            self.ui.set_countdown(timeout, false);
        }

        while !self.should_finish() {
            self.deal().await;
            self.update_timer_display(true);
            self.timer_loop().await;
            // Skipped on termination for faster shutdown.
            if !self.is_terminated() {
                self.update_timer_display(true);
                self.sweep().await;
            }
        }

        self.finish().await
    }

    /// Whether the game is over: terminated, or no combination left in the
    /// deck.
    pub fn should_finish(&self) -> bool {
        self.is_terminated() || !self.rules.any_set(self.deck.cards())
    }

    /// Count down the round while servicing claims.
    async fn timer_loop(&mut self) {
        while !self.is_terminated()
            && !self.countdown.expired(Instant::now())
            && self.set_exists
        {
            if self.board_is_stuck().await {
                log::debug!("Dealer: no set on the table, reshuffling");
                break;
            }
            self.sleep_until_woken_or_timeout().await;
            self.update_timer_display(false);
            self.resolve_claims().await;
            self.deal().await;
        }
    }

    /// Without a countdown nothing else ends a round whose board holds no
    /// set.
    async fn board_is_stuck(&self) -> bool {
        !self.countdown.is_enabled() && !self.rules.any_set(&self.table.cards().await)
    }

    /// Wait for the next display refresh, a claim, or termination.
    async fn sleep_until_woken_or_timeout(&mut self) {
        let wake = self.countdown.next_wake();
        let claims_open = !self.claims_closed;

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {}
            claim = self.claims.recv(), if claims_open => match claim {
                Some(claim) => self.pending.push_back(claim),
                None => {
                    log::warn!("Dealer: every player hung up on the claim channel");
                    self.claims_closed = true;
                }
            },
            _ = async {
                match wake {
                    Some(at) => sleep_until(at).await,
                    None => std::future::pending().await,
                }
            } => {}
        }
    }

    /// Resolve every queued claim, oldest first.
    pub async fn resolve_claims(&mut self) {
        while !self.is_terminated() {
            let claim = match self.pending.pop_front() {
                Some(claim) => claim,
                None => match self.claims.try_recv() {
                    Ok(claim) => claim,
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        self.claims_closed = true;
                        break;
                    }
                },
            };
            self.resolve(claim).await;
        }
    }

    /// Wait for the next claim and queue it for [`Dealer::resolve_claims`].
    /// Returns false once every player has hung up.
    pub async fn wait_for_claim(&mut self) -> bool {
        match self.claims.recv().await {
            Some(claim) => {
                self.pending.push_back(claim);
                true
            }
            None => {
                self.claims_closed = true;
                false
            }
        }
    }

    async fn resolve(&mut self, claim: Claim) {
        let Claim { player, verdict } = claim;
        let Some(state) = self.players.get(player).map(|p| Arc::clone(p.state())) else {
            log::warn!("Dealer: claim from unknown player {}", player);
            return;
        };

        let outcome = if !state.has_full_set() {
            log::debug!("Dealer: stale claim from player {}", player);
            Verdict::Stale
        } else {
            let cards = self.table.player_cards(player).await;
            if cards.len() != self.config.feature_size {
                log::debug!(
                    "Dealer: player {} claimed with {} cards, treating as stale",
                    player,
                    cards.len()
                );
                Verdict::Stale
            } else if self.rules.is_valid(&cards) {
                let score = state.award_point();
                self.ui.set_score(player, score);
                log::debug!("Dealer: player {} found a set {:?}", player, cards);

                for card in cards {
                    let Some(slot) = self.table.slot_of(card).await else {
                        continue;
                    };
                    if let Err(e) = self.table.remove_card(slot).await {
                        log::error!("Dealer: removing claimed card {}: {}", card, e);
                    }
                    self.remove_tokens(slot).await;
                    self.update_timer_display(true);
                }
                Verdict::Point { score }
            } else {
                log::debug!("Dealer: player {} claimed a non-set {:?}", player, cards);
                Verdict::Penalty
            }
        };

        if verdict.send(outcome).is_err() {
            log::debug!("Dealer: player {} left before its verdict", player);
        }
    }

    /// Clear every token on `slot` and give each one back to its owner.
    pub async fn remove_tokens(&self, slot: usize) {
        for player in self.table.remove_tokens(slot).await {
            if let Some(handle) = self.players.get(player) {
                handle.state().return_token();
            }
        }
    }

    /// Fill every empty slot from the deck.
    pub async fn deal(&mut self) {
        let mut placed = false;
        for slot in self.table.empty_slots().await {
            if self.is_terminated() {
                return;
            }
            let Some(card) = self.deck.draw(&mut self.rng) else {
                break;
            };
            match self.table.place_card(card, slot).await {
                Ok(()) => placed = true,
                Err(e) => {
                    log::error!("Dealer: cannot deal {} to slot {}: {}", card, slot, e);
                    self.deck.put_back(card);
                }
            }
        }

        if self.deck.is_empty() && self.set_exists {
            let board = self.table.cards().await;
            if !self.rules.any_set(&board) {
                log::info!("Dealer: deck is empty and no set is left on the table");
                self.set_exists = false;
            }
        }

        if placed && self.config.hints {
            self.table.hints(self.rules.as_ref()).await;
        }
    }

    /// Return every card on the table to the deck.
    pub async fn sweep(&mut self) {
        for slot in 0..self.table.table_size() {
            if self.is_terminated() {
                return;
            }
            if self.table.card_at(slot).await.is_none() {
                continue;
            }
            match self.table.remove_card(slot).await {
                Ok(card) => self.deck.put_back(card),
                Err(e) => log::error!("Dealer: sweeping slot {}: {}", slot, e),
            }
            self.remove_tokens(slot).await;
        }
    }

    fn update_timer_display(&mut self, reset: bool) {
        let now = Instant::now();
        let shown = if reset {
            self.countdown.reset(now)
        } else {
            self.countdown.tick(now)
        };
        if let Some((remaining, warn)) = shown {
            self.ui.set_countdown(remaining, warn);
        }
    }

    /// Every player sharing the top score.
    pub fn winners(&self) -> Vec<PlayerId> {
        let Some(max) = self.players.iter().map(|p| p.state().score()).max() else {
            return Vec::new();
        };
        self.players
            .iter()
            .filter(|p| p.state().score() == max)
            .map(PlayerHandle::id)
            .collect()
    }

    async fn finish(mut self) -> GameSummary {
        let terminated = self.is_terminated();
        let winners = self.winners();

        if !terminated {
            for player in &self.players {
                log::info!(
                    "Player {} claimed a set {} times and has {} points",
                    player.id(),
                    player.state().claims(),
                    player.state().score()
                );
            }
            self.ui.announce_winners(&winners);
        }

        for player in &self.players {
            player.terminate();
        }
        for task in self.player_tasks.drain(..) {
            if let Err(e) = task.await {
                log::warn!("Dealer: player task failed: {}", e);
            }
        }

        log::info!("Dealer terminated");
        GameSummary {
            scores: self.players.iter().map(|p| p.state().score()).collect(),
            claims: self.players.iter().map(|p| p.state().claims()).collect(),
            winners,
            terminated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cards::Card,
        presentation::{NullPresentation, RecordingPresentation},
        rules::FeatureRules,
    };
    use std::time::Duration;

    fn dealer_with(config: GameConfig, ui: Arc<dyn Presentation>) -> (Dealer, Vec<PlayerHandle>) {
        let table = Arc::new(Table::new(
            config.table_size,
            config.deck_size,
            config.players,
            Arc::clone(&ui),
        ));
        Dealer::new(
            config,
            table,
            Arc::new(FeatureRules::default()),
            ui,
            CancellationToken::new(),
        )
    }

    #[tokio::test]
    async fn test_deal_fills_every_slot() {
        let (mut dealer, _) = dealer_with(GameConfig::default(), Arc::new(NullPresentation));
        dealer.deal().await;
        assert_eq!(dealer.table.count_cards().await, 12);
        assert_eq!(dealer.deck().len(), 81 - 12);
        assert!(dealer.table.check_invariants().await);
    }

    #[tokio::test]
    async fn test_sweep_returns_cards_to_deck() {
        let (mut dealer, _) = dealer_with(GameConfig::default(), Arc::new(NullPresentation));
        dealer.deal().await;
        dealer.sweep().await;
        assert_eq!(dealer.table.count_cards().await, 0);
        assert_eq!(dealer.deck().len(), 81);
    }

    #[tokio::test]
    async fn test_deal_from_short_deck_detects_no_set() {
        // 0000, 0001, 0010, 0011 hold no set.
        let deck = Deck::from(vec![Card(0), Card(1), Card(3), Card(4)]);
        let (dealer, _) = dealer_with(GameConfig::default(), Arc::new(NullPresentation));
        let mut dealer = dealer.with_deck(deck);
        assert!(dealer.should_finish());
        dealer.deal().await;
        assert_eq!(dealer.table.count_cards().await, 4);
        assert!(!dealer.set_exists);
    }

    #[tokio::test]
    async fn test_winners_include_ties() {
        let config = GameConfig {
            players: 3,
            ..GameConfig::default()
        };
        let (dealer, players) = dealer_with(config, Arc::new(NullPresentation));
        players[0].state().award_point();
        players[2].state().award_point();
        assert_eq!(dealer.winners(), vec![0, 2]);
    }

    #[tokio::test]
    async fn test_no_points_means_everyone_wins() {
        let (dealer, _) = dealer_with(GameConfig::default(), Arc::new(NullPresentation));
        assert_eq!(dealer.winners(), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_terminated_dealer_joins_players() {
        let config = GameConfig {
            players: 3,
            human_players: 1,
            ..GameConfig::default()
        };
        let ui = Arc::new(RecordingPresentation::new());
        let (dealer, players) = dealer_with(config, ui.clone());
        let cancel = dealer.cancel.clone();
        let task = tokio::spawn(dealer.run());

        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();

        let summary = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("dealer did not shut down")
            .unwrap();
        assert!(summary.terminated);
        assert!(players.iter().all(PlayerHandle::is_terminated));
        assert_eq!(ui.winners(), None);
    }
}
