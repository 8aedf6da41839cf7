//! Table storage and its atomic operations.

use super::errors::{TableError, TableResult};
use crate::{
    cards::{Card, PlayerId, Slot},
    presentation::Presentation,
    rules::SetRules,
};
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;

/// Outcome of [`Table::toggle_token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenToggle {
    /// A token was placed.
    Placed,
    /// The player's token was taken back.
    Removed,
    /// Nothing changed: the slot is empty, or placing was not allowed.
    Ignored,
}

/// Board contents guarded by the table lock.
#[derive(Debug)]
struct Board {
    slot_to_card: Vec<Option<Card>>,
    card_to_slot: Vec<Option<Slot>>,
    /// `tokens[slot][player]`
    tokens: Vec<Vec<bool>>,
}

impl Board {
    fn new(table_size: usize, deck_size: usize, players: usize) -> Self {
        Self {
            slot_to_card: vec![None; table_size],
            card_to_slot: vec![None; deck_size],
            tokens: vec![vec![false; players]; table_size],
        }
    }

    fn token_mut(&mut self, player: PlayerId, slot: Slot) -> Option<&mut bool> {
        self.tokens.get_mut(slot)?.get_mut(player)
    }

    fn is_consistent(&self) -> bool {
        let forward = self.slot_to_card.iter().enumerate().all(|(slot, card)| {
            card.is_none_or(|card| self.card_to_slot.get(card.index()) == Some(&Some(slot)))
        });
        let backward = self.card_to_slot.iter().enumerate().all(|(card, slot)| {
            slot.is_none_or(|slot| self.slot_to_card.get(slot) == Some(&Some(Card(card as u32))))
        });
        forward && backward
    }
}

/// Thread-safe board shared by the dealer and all players.
pub struct Table {
    board: Mutex<Board>,
    ui: Arc<dyn Presentation>,
    delay: Duration,
    table_size: usize,
}

impl Table {
    /// Create an empty table
    ///
    /// # Arguments
    ///
    /// * `table_size` - Number of slots
    /// * `deck_size` - Number of distinct cards
    /// * `players` - Number of players that may hold tokens
    /// * `ui` - Sink for card and token updates
    pub fn new(
        table_size: usize,
        deck_size: usize,
        players: usize,
        ui: Arc<dyn Presentation>,
    ) -> Self {
        Self {
            board: Mutex::new(Board::new(table_size, deck_size, players)),
            ui,
            delay: Duration::ZERO,
            table_size,
        }
    }

    /// Sleep for `delay` inside every card placement and removal.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn table_size(&self) -> usize {
        self.table_size
    }

    /// Place `card` on the empty `slot`.
    pub async fn place_card(&self, card: Card, slot: Slot) -> TableResult<()> {
        let mut board = self.board.lock().await;
        self.pause().await;

        match board.slot_to_card.get(slot) {
            None => return Err(TableError::SlotOutOfRange(slot)),
            Some(Some(existing)) => {
                return Err(TableError::SlotOccupied {
                    slot,
                    card: *existing,
                });
            }
            Some(None) => {}
        }
        match board.card_to_slot.get(card.index()) {
            None => return Err(TableError::CardOutOfRange(card)),
            Some(Some(at)) => return Err(TableError::CardOnBoard { card, slot: *at }),
            Some(None) => {}
        }

        board.slot_to_card[slot] = Some(card);
        board.card_to_slot[card.index()] = Some(slot);
        self.ui.show_card(card, slot);
        Ok(())
    }

    /// Take the card off `slot`. Tokens on the slot are left alone; callers
    /// clear them with [`Table::remove_tokens`].
    pub async fn remove_card(&self, slot: Slot) -> TableResult<Card> {
        let mut board = self.board.lock().await;
        self.pause().await;

        let card = board
            .slot_to_card
            .get_mut(slot)
            .ok_or(TableError::SlotOutOfRange(slot))?
            .take()
            .ok_or(TableError::SlotEmpty(slot))?;
        board.card_to_slot[card.index()] = None;
        self.ui.hide_card(slot);
        Ok(card)
    }

    /// Returns true iff a token was placed.
    pub async fn place_token(&self, player: PlayerId, slot: Slot) -> bool {
        let mut board = self.board.lock().await;
        match board.token_mut(player, slot) {
            Some(token) if !*token => {
                *token = true;
                self.ui.show_token(player, slot);
                true
            }
            _ => false,
        }
    }

    /// Returns true iff a token was removed.
    pub async fn remove_token(&self, player: PlayerId, slot: Slot) -> bool {
        let mut board = self.board.lock().await;
        match board.token_mut(player, slot) {
            Some(token) if *token => {
                *token = false;
                self.ui.hide_token(player, slot);
                true
            }
            _ => false,
        }
    }

    /// Toggle the token and return whether the slot now holds one.
    pub async fn flip_token(&self, player: PlayerId, slot: Slot) -> bool {
        let mut board = self.board.lock().await;
        let Some(token) = board.token_mut(player, slot) else {
            return false;
        };
        *token = !*token;
        let placed = *token;
        if placed {
            self.ui.show_token(player, slot);
        } else {
            self.ui.hide_token(player, slot);
        }
        placed
    }

    /// A player's key press, decided in one critical section: empty slots
    /// are ignored, an existing token is removed, and a new token is only
    /// placed when `may_place` is set.
    pub async fn toggle_token(&self, player: PlayerId, slot: Slot, may_place: bool) -> TokenToggle {
        let mut board = self.board.lock().await;
        if !matches!(board.slot_to_card.get(slot), Some(Some(_))) {
            return TokenToggle::Ignored;
        }
        let Some(token) = board.token_mut(player, slot) else {
            return TokenToggle::Ignored;
        };
        if *token {
            *token = false;
            self.ui.hide_token(player, slot);
            TokenToggle::Removed
        } else if may_place {
            *token = true;
            self.ui.show_token(player, slot);
            TokenToggle::Placed
        } else {
            TokenToggle::Ignored
        }
    }

    /// Clear every player's token on `slot` and return whose were removed.
    pub async fn remove_tokens(&self, slot: Slot) -> Vec<PlayerId> {
        let mut board = self.board.lock().await;
        let Some(row) = board.tokens.get_mut(slot) else {
            return Vec::new();
        };
        let mut removed = Vec::new();
        for (player, token) in row.iter_mut().enumerate() {
            if *token {
                *token = false;
                self.ui.hide_token(player, slot);
                removed.push(player);
            }
        }
        removed
    }

    pub async fn has_token(&self, player: PlayerId, slot: Slot) -> bool {
        let board = self.board.lock().await;
        board
            .tokens
            .get(slot)
            .and_then(|row| row.get(player))
            .copied()
            .unwrap_or(false)
    }

    /// Slots holding `player`'s tokens, ascending.
    pub async fn player_slots(&self, player: PlayerId) -> Vec<Slot> {
        let board = self.board.lock().await;
        board
            .tokens
            .iter()
            .enumerate()
            .filter(|(_, row)| row.get(player).copied().unwrap_or(false))
            .map(|(slot, _)| slot)
            .collect()
    }

    /// Cards under `player`'s tokens, in slot order.
    pub async fn player_cards(&self, player: PlayerId) -> Vec<Card> {
        let board = self.board.lock().await;
        board
            .tokens
            .iter()
            .zip(&board.slot_to_card)
            .filter(|(row, _)| row.get(player).copied().unwrap_or(false))
            .filter_map(|(_, card)| *card)
            .collect()
    }

    pub async fn card_at(&self, slot: Slot) -> Option<Card> {
        let board = self.board.lock().await;
        board.slot_to_card.get(slot).copied().flatten()
    }

    pub async fn slot_of(&self, card: Card) -> Option<Slot> {
        let board = self.board.lock().await;
        board.card_to_slot.get(card.index()).copied().flatten()
    }

    /// Cards on the board, in slot order.
    pub async fn cards(&self) -> Vec<Card> {
        let board = self.board.lock().await;
        board.slot_to_card.iter().flatten().copied().collect()
    }

    /// The whole slot mapping.
    pub async fn slots(&self) -> Vec<Option<Card>> {
        self.board.lock().await.slot_to_card.clone()
    }

    pub async fn empty_slots(&self) -> Vec<Slot> {
        let board = self.board.lock().await;
        board
            .slot_to_card
            .iter()
            .enumerate()
            .filter(|(_, card)| card.is_none())
            .map(|(slot, _)| slot)
            .collect()
    }

    /// Count the number of cards currently on the table.
    pub async fn count_cards(&self) -> usize {
        let board = self.board.lock().await;
        board.slot_to_card.iter().filter(|card| card.is_some()).count()
    }

    /// Whether both mapping directions agree.
    pub async fn check_invariants(&self) -> bool {
        self.board.lock().await.is_consistent()
    }

    /// Log every valid combination currently on the board.
    pub async fn hints(&self, rules: &dyn SetRules) {
        let (cards, card_to_slot) = {
            let board = self.board.lock().await;
            let cards: Vec<Card> = board.slot_to_card.iter().flatten().copied().collect();
            (cards, board.card_to_slot.clone())
        };
        for set in rules.find_sets(&cards, usize::MAX) {
            let mut slots: Vec<Slot> = set
                .iter()
                .filter_map(|card| card_to_slot.get(card.index()).copied().flatten())
                .collect();
            slots.sort_unstable();
            let features = rules.cards_to_features(&set);
            log::info!("Hint: Set found: slots: {slots:?} features: {features:?}");
        }
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}
