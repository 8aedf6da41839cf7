//! Card identifiers and the dealer-owned deck.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque card identifier in `[0, deck_size)`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub u32);

impl Card {
    /// Index of this card in per-card lookup tables.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Board position. A slot holds at most one card.
pub type Slot = usize;

/// Player identifier, starting from 0.
pub type PlayerId = usize;

/// Undrawn cards. Only the dealer holds one.
///
/// Draws are uniform and remove the card in O(1) by swapping it with the
/// last element, so the order of the remaining cards is not meaningful.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Full deck of `size` cards, `0..size`.
    pub fn new(size: usize) -> Self {
        Self {
            cards: (0..size as u32).map(Card).collect(),
        }
    }

    /// Draw a uniformly random card.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Card> {
        if self.cards.is_empty() {
            return None;
        }
        let idx = rng.random_range(0..self.cards.len());
        Some(self.cards.swap_remove(idx))
    }

    /// Return a card swept off the board.
    pub fn put_back(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

impl From<Vec<Card>> for Deck {
    fn from(cards: Vec<Card>) -> Self {
        Self { cards }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_deck_initialization() {
        let deck = Deck::new(81);
        assert_eq!(deck.len(), 81);
        assert_eq!(deck.cards()[0], Card(0));
        assert_eq!(deck.cards()[80], Card(80));
    }

    #[test]
    fn test_draw_until_empty_yields_every_card_once() {
        let mut deck = Deck::new(12);
        let mut rng = rand::rng();
        let mut drawn = BTreeSet::new();
        while let Some(card) = deck.draw(&mut rng) {
            assert!(drawn.insert(card), "card {card} drawn twice");
        }
        assert_eq!(drawn.len(), 12);
        assert!(deck.is_empty());
        assert_eq!(deck.draw(&mut rng), None);
    }

    #[test]
    fn test_put_back_makes_card_drawable() {
        let mut deck = Deck::new(0);
        deck.put_back(Card(7));
        assert_eq!(deck.draw(&mut rand::rng()), Some(Card(7)));
    }

    #[test]
    fn test_card_display() {
        assert_eq!(Card(42).to_string(), "#42");
    }
}
