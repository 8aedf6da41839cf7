//! Autonomous input for non-human players.

use crate::cards::{PlayerId, Slot};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::time::Duration;
use tokio::{sync::mpsc, time::sleep};
use tokio_util::sync::CancellationToken;

/// Feeds random slot presses into a player's input queue.
///
/// It shares nothing with the player except the queue sender, and it waits
/// for room when the queue is full instead of dropping presses.
pub struct Suggester {
    player: PlayerId,
    table_size: usize,
    input: mpsc::Sender<Slot>,
    interval: Duration,
    cancel: CancellationToken,
}

impl Suggester {
    pub fn new(
        player: PlayerId,
        table_size: usize,
        input: mpsc::Sender<Slot>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            player,
            table_size,
            input,
            interval,
            cancel,
        }
    }

    pub async fn run(self) {
        log::info!("Suggester for player {} starting", self.player);
        let mut rng = StdRng::from_rng(&mut rand::rng());

        while !self.cancel.is_cancelled() {
            let slot = rng.random_range(0..self.table_size);

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                sent = self.input.send(slot) => {
                    if sent.is_err() {
                        break;
                    }
                }
            }

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = sleep(self.interval) => {}
            }
        }

        log::info!("Suggester for player {} terminated", self.player);
    }
}
