//! Shared board state.
//!
//! The [`Table`] is the only state mutated by more than one actor. It holds
//! the slot/card bijection and the per-slot, per-player token matrix behind
//! a single lock, so a card placement or removal can never interleave with a
//! token write on the same slot.
//!
//! The table knows nothing about game rules or token budgets: players keep
//! their own counters, and the dealer decides which cards leave the board.

pub mod board;
pub mod errors;

pub use board::{Table, TokenToggle};
pub use errors::{TableError, TableResult};
