//! Error types for table operations

use crate::cards::{Card, Slot};
use thiserror::Error;

/// Result type for table operations
pub type TableResult<T> = Result<T, TableError>;

/// Misuse of the board mapping. Token operations never fail; they report
/// whether anything changed instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Slot index outside the board
    #[error("Slot {0} is not on the table")]
    SlotOutOfRange(Slot),

    /// Card id outside the deck
    #[error("Card {0} is not part of the deck")]
    CardOutOfRange(Card),

    /// Placement onto an occupied slot
    #[error("Slot {slot} already holds card {card}")]
    SlotOccupied { slot: Slot, card: Card },

    /// Removal from an empty slot
    #[error("Slot {0} is empty")]
    SlotEmpty(Slot),

    /// Placement of a card that is already on the board
    #[error("Card {card} is already on slot {slot}")]
    CardOnBoard { card: Card, slot: Slot },
}
