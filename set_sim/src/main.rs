//! Command-line Set game simulation.
//!
//! Runs one game with the log presentation. Computer players play on their
//! own; human players read `PLAYER SLOT` lines from stdin.

use std::{
    io::{self, BufRead, BufReader},
    sync::Arc,
    thread,
};

use anyhow::{Context, Error};
use ctrlc::set_handler;
use log::{info, warn};
use pico_args::Arguments;
use set_game::{
    Game, GameConfig, GameHandle, GameSummary, LogPresentation, PlayerHandle, PlayerId, Slot,
};

const HELP: &str = "\
Run a Set card game simulation

USAGE:
  set_sim [OPTIONS]

OPTIONS:
  --config     FILE        JSON game configuration     [default: env SET_* or built-in defaults]
  --players    N           Number of players
  --humans     N           How many of the players read key presses from stdin

FLAGS:
  --hints                  Log every set on the board after each deal
  -h, --help               Print help information

INPUT:
  Human players press keys by writing `PLAYER SLOT` lines to stdin, e.g. `0 5`.

ENVIRONMENT:
  RUST_LOG                 Log filter [default: info]
  SET_PLAYERS, SET_TABLE_SIZE, SET_TURN_TIMEOUT_MS, ...
  (See GameConfig::from_env for all configuration variables)
";

struct Args {
    config: Option<String>,
    players: Option<usize>,
    humans: Option<usize>,
    hints: bool,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        config: pargs.opt_value_from_str("--config")?,
        players: pargs.opt_value_from_str("--players")?,
        humans: pargs.opt_value_from_str("--humans")?,
        hints: pargs.contains("--hints"),
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let config = load_config(&args)?;
    config.validate()?;
    info!(
        "Starting Set game: {} player(s) ({} human), {} slots, {} cards",
        config.players, config.human_players, config.table_size, config.deck_size
    );

    let game = Game::with_feature_rules(config.clone(), Arc::new(LogPresentation))?;
    let handle = game.start();

    // Catching signals for a graceful stop.
    let cancel = handle.cancellation_token();
    set_handler(move || cancel.cancel())?;

    if config.human_players > 0 {
        spawn_input_reader(BufReader::new(io::stdin()), &handle);
    }

    let summary = handle.join().await?;
    print_summary(&summary);
    Ok(())
}

fn load_config(args: &Args) -> Result<GameConfig, Error> {
    let mut config = match &args.config {
        Some(path) => GameConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config from {path}"))?,
        None => GameConfig::from_env()?,
    };

    if let Some(players) = args.players {
        config.players = players;
    }
    if let Some(humans) = args.humans {
        config.human_players = humans;
    }
    if args.hints {
        config.hints = true;
    }
    Ok(config)
}

/// Forward `PLAYER SLOT` lines to the running game.
///
/// Reads on a plain thread rather than a runtime blocking task, so a read
/// that never completes cannot hold up runtime shutdown.
fn spawn_input_reader<R>(input: R, handle: &GameHandle) -> thread::JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    let players = handle.players().to_vec();
    let cancel = handle.cancellation_token();

    thread::spawn(move || {
        for line in input.lines() {
            if cancel.is_cancelled() {
                break;
            }
            let Ok(line) = line else {
                break;
            };
            forward_press(&players, &line);
        }
    })
}

fn parse_press(line: &str) -> Option<(PlayerId, Slot)> {
    let mut parts = line.split_whitespace();
    let player = parts.next()?.parse().ok()?;
    let slot = parts.next()?.parse().ok()?;
    parts.next().is_none().then_some((player, slot))
}

fn forward_press(players: &[PlayerHandle], line: &str) {
    let Some((player, slot)) = parse_press(line) else {
        warn!("Expected `PLAYER SLOT`, got {line:?}");
        return;
    };

    match players.get(player) {
        Some(p) if p.is_human() => {
            if !p.key_pressed(slot) {
                info!("Key press for player {player} on slot {slot} dropped");
            }
        }
        Some(_) => warn!("Player {player} is not a human player"),
        None => warn!("No player {player}"),
    }
}

fn print_summary(summary: &GameSummary) {
    if summary.terminated {
        println!("Game terminated.");
    }
    for (player, (score, claims)) in summary.scores.iter().zip(&summary.claims).enumerate() {
        println!("Player {player}: {score} point(s) from {claims} claim(s)");
    }
    match summary.winners.as_slice() {
        [] => {}
        [winner] => println!("THE WINNER IS: player {winner}!!!"),
        winners => {
            let names: Vec<String> = winners.iter().map(|w| format!("player {w}")).collect();
            println!("IT IS A DRAW: {} WON!!!", names.join(" AND "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use set_game::NullPresentation;
    use std::{io::Read, sync::mpsc, time::Duration};

    fn human_game() -> Game {
        let config = GameConfig {
            players: 1,
            human_players: 1,
            ..GameConfig::default()
        };
        Game::with_feature_rules(config, Arc::new(NullPresentation)).unwrap()
    }

    /// Input that never arrives while its sender is alive.
    struct Silent(mpsc::Receiver<()>);

    impl Read for Silent {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            let _ = self.0.recv();
            Ok(0)
        }
    }

    #[test]
    fn test_parse_press() {
        assert_eq!(parse_press("0 5"), Some((0, 5)));
        assert_eq!(parse_press("  2\t11 "), Some((2, 11)));
        assert_eq!(parse_press("0"), None);
        assert_eq!(parse_press("a 1"), None);
        assert_eq!(parse_press("0 -1"), None);
        assert_eq!(parse_press("0 1 2"), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_reader_forwards_presses_to_humans() {
        let handle = human_game().start();
        while handle.table().count_cards().await < 12 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let input = io::Cursor::new("0 3\n0 7\nnonsense\n1 4\n0 99\n");
        spawn_input_reader(input, &handle).join().unwrap();

        tokio::time::timeout(Duration::from_secs(1), async {
            while handle.table().player_slots(0).await != vec![3, 7] {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("presses never reached the human player");

        handle.terminate();
        handle.join().await.unwrap();
    }

    #[test]
    fn test_blocked_reader_does_not_hold_up_shutdown() {
        let (_keep_open, silent) = mpsc::channel::<()>();
        let (done_tx, done_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            runtime.block_on(async {
                let handle = human_game().start();
                spawn_input_reader(BufReader::new(Silent(silent)), &handle);
                handle.terminate();
                handle.join().await.unwrap();
            });
            drop(runtime);
            done_tx.send(()).unwrap();
        });

        done_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("runtime shutdown waited on the input reader");
    }
}
