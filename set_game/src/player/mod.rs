//! Player actors.
//!
//! Each player runs its own task:
//!
//! - key presses arrive on a bounded queue (manual input through
//!   [`PlayerHandle::key_pressed`], or a [`Suggester`] task for computer
//!   players)
//! - each press toggles a token on the [`Table`](crate::table::Table)
//! - placing the last token submits a claim to the dealer and blocks until
//!   the verdict arrives
//! - a verdict may freeze the player for a while; presses made meanwhile
//!   are discarded
//!
//! Every wait is raced against the player's cancellation token, so a
//! terminated player exits from whichever wait it is in.

pub mod actor;
pub mod state;
pub mod suggest;

pub use actor::{INPUT_QUEUE_CAPACITY, PlayerActor, PlayerHandle};
pub use state::PlayerState;
pub use suggest::Suggester;
