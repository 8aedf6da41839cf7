/// Integration tests for claim resolution
///
/// These tests drive the dealer step by step (deal, wait for claims,
/// resolve) against real player actors fed with scripted key presses, so
/// every verdict is deterministic.
use set_game::{
    Card, Dealer, Deck, GameConfig, PlayerHandle, RecordingPresentation, SetRules, Table,
    UiEvent,
};
use std::{future::Future, sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;

/// Rules where only the listed combinations are valid.
struct ScriptedRules {
    sets: Vec<Vec<Card>>,
}

impl ScriptedRules {
    fn new(sets: &[[u32; 3]]) -> Self {
        let sets = sets
            .iter()
            .map(|set| {
                let mut cards: Vec<Card> = set.iter().copied().map(Card).collect();
                cards.sort();
                cards
            })
            .collect();
        Self { sets }
    }
}

impl SetRules for ScriptedRules {
    fn is_valid(&self, cards: &[Card]) -> bool {
        let mut cards = cards.to_vec();
        cards.sort();
        self.sets.contains(&cards)
    }

    fn find_sets(&self, cards: &[Card], max: usize) -> Vec<Vec<Card>> {
        self.sets
            .iter()
            .filter(|set| set.iter().all(|card| cards.contains(card)))
            .take(max)
            .cloned()
            .collect()
    }

    fn cards_to_features(&self, cards: &[Card]) -> Vec<Vec<u32>> {
        cards.iter().map(|card| vec![card.0]).collect()
    }
}

fn config(players: usize) -> GameConfig {
    GameConfig {
        players,
        human_players: players,
        table_size: 12,
        deck_size: 12,
        point_freeze_ms: 10,
        penalty_freeze_ms: 5_000,
        ..GameConfig::default()
    }
}

struct Fixture {
    dealer: Dealer,
    players: Vec<PlayerHandle>,
    table: Arc<Table>,
    ui: Arc<RecordingPresentation>,
    cancel: CancellationToken,
}

impl Drop for Fixture {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// A dealer with a full board of cards 0..12 and running player loops.
async fn dealt(config: GameConfig, rules: ScriptedRules) -> Fixture {
    let ui = Arc::new(RecordingPresentation::new());
    let table = Arc::new(Table::new(
        config.table_size,
        config.deck_size,
        config.players,
        ui.clone(),
    ));
    let cancel = CancellationToken::new();
    let (dealer, players) = Dealer::new(
        config,
        Arc::clone(&table),
        Arc::new(rules),
        ui.clone(),
        cancel.clone(),
    );
    let mut dealer = dealer.with_deck(Deck::new(12));
    dealer.deal().await;
    dealer.spawn_players();
    assert_eq!(table.count_cards().await, 12);

    Fixture {
        dealer,
        players,
        table,
        ui,
        cancel,
    }
}

/// Poll `check` until it holds or a second passes.
async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    tokio::time::timeout(Duration::from_secs(1), async {
        while !check().await {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

async fn press_cards(table: &Table, player: &PlayerHandle, cards: &[u32]) {
    for &card in cards {
        let slot = table.slot_of(Card(card)).await.unwrap();
        assert!(player.key_pressed(slot));
    }
}

async fn next_claim(dealer: &mut Dealer) {
    let received = tokio::time::timeout(Duration::from_secs(1), dealer.wait_for_claim())
        .await
        .expect("no claim arrived");
    assert!(received);
}

#[tokio::test]
async fn test_valid_claim_scores_and_clears_cards() {
    let mut fx = dealt(config(1), ScriptedRules::new(&[[0, 1, 2]])).await;
    let slots = [
        fx.table.slot_of(Card(0)).await.unwrap(),
        fx.table.slot_of(Card(1)).await.unwrap(),
        fx.table.slot_of(Card(2)).await.unwrap(),
    ];

    press_cards(&fx.table, &fx.players[0], &[0, 1, 2]).await;
    next_claim(&mut fx.dealer).await;
    fx.dealer.resolve_claims().await;

    assert_eq!(fx.table.count_cards().await, 9);
    for card in 0..3 {
        assert_eq!(fx.table.slot_of(Card(card)).await, None);
    }
    for slot in slots {
        assert!(!fx.table.has_token(0, slot).await);
    }
    assert!(fx.table.player_slots(0).await.is_empty());

    let state = fx.players[0].state();
    assert_eq!(state.score(), 1);
    assert_eq!(state.claims(), 1);
    assert_eq!(state.tokens_in_hand(), 3);
    assert!(fx.ui.events().contains(&UiEvent::Score {
        player: 0,
        score: 1
    }));
    assert!(fx.table.check_invariants().await);
}

#[tokio::test]
async fn test_invalid_claim_is_penalized() {
    let mut fx = dealt(config(1), ScriptedRules::new(&[[0, 1, 2]])).await;
    let before = fx.table.slots().await;

    press_cards(&fx.table, &fx.players[0], &[3, 4, 5]).await;
    next_claim(&mut fx.dealer).await;
    fx.dealer.resolve_claims().await;

    assert_eq!(fx.table.slots().await, before);
    assert_eq!(fx.players[0].state().score(), 0);

    let player = fx.players[0].clone();
    eventually(|| {
        let player = player.clone();
        async move { player.state().is_frozen() }
    })
    .await;
    let ui = fx.ui.clone();
    eventually(|| {
        let ui = ui.clone();
        async move {
            ui.events().contains(&UiEvent::Freeze {
                player: 0,
                remaining: Duration::from_millis(5_000),
            })
        }
    })
    .await;

    // Penalized tokens stay until the player lifts them.
    assert_eq!(fx.table.player_cards(0).await.len(), 3);
    assert!(!fx.ui.events().iter().any(|e| matches!(e, UiEvent::Score { .. })));
}

#[tokio::test]
async fn test_remove_tokens_returns_them_to_owners() {
    let fx = dealt(config(3), ScriptedRules::new(&[[0, 1, 2]])).await;
    let slot = fx.table.slot_of(Card(7)).await.unwrap();

    assert!(fx.players[0].key_pressed(slot));
    assert!(fx.players[1].key_pressed(slot));
    let table = Arc::clone(&fx.table);
    eventually(|| {
        let table = Arc::clone(&table);
        async move { table.has_token(0, slot).await && table.has_token(1, slot).await }
    })
    .await;
    assert_eq!(fx.players[0].state().tokens_in_hand(), 2);
    assert_eq!(fx.players[1].state().tokens_in_hand(), 2);

    fx.dealer.remove_tokens(slot).await;

    for player in 0..3 {
        assert!(!fx.table.has_token(player, slot).await);
        assert_eq!(fx.players[player].state().tokens_in_hand(), 3);
    }
    assert_eq!(fx.table.card_at(slot).await, Some(Card(7)));
}

#[tokio::test]
async fn test_disjoint_claims_resolved_exactly_once() {
    let sets = [[0, 1, 2], [3, 4, 5], [6, 7, 8], [9, 10, 11]];
    let mut fx = dealt(config(4), ScriptedRules::new(&sets)).await;

    for (player, set) in fx.players.iter().zip(sets) {
        press_cards(&fx.table, player, &set).await;
    }
    for _ in 0..4 {
        next_claim(&mut fx.dealer).await;
    }
    fx.dealer.resolve_claims().await;

    assert_eq!(fx.table.count_cards().await, 0);
    for player in &fx.players {
        assert_eq!(player.state().score(), 1);
        assert_eq!(player.state().claims(), 1);
        assert_eq!(player.state().tokens_in_hand(), 3);
    }
    let scores = fx
        .ui
        .events()
        .into_iter()
        .filter(|e| matches!(e, UiEvent::Score { .. }))
        .count();
    assert_eq!(scores, 4);
}

#[tokio::test]
async fn test_overlapping_claim_goes_stale() {
    let mut fx = dealt(config(2), ScriptedRules::new(&[[0, 1, 2]])).await;

    press_cards(&fx.table, &fx.players[0], &[0, 1, 2]).await;
    press_cards(&fx.table, &fx.players[1], &[0, 1, 2]).await;
    next_claim(&mut fx.dealer).await;
    next_claim(&mut fx.dealer).await;
    fx.dealer.resolve_claims().await;

    let scores: Vec<u32> = fx.players.iter().map(|p| p.state().score()).collect();
    assert_eq!(scores.iter().sum::<u32>(), 1);
    for player in &fx.players {
        assert_eq!(player.state().claims(), 1);
        assert_eq!(player.state().tokens_in_hand(), 3);
        assert!(fx.table.player_slots(player.id()).await.is_empty());
    }
    assert_eq!(fx.table.count_cards().await, 9);
}

#[tokio::test]
async fn test_held_tokens_stay_in_bounds() {
    let fx = dealt(config(1), ScriptedRules::new(&[])).await;
    let player = &fx.players[0];

    // Place two, lift one, place it again, lift both.
    let a = fx.table.slot_of(Card(0)).await.unwrap();
    let b = fx.table.slot_of(Card(1)).await.unwrap();
    for slot in [a, b, a] {
        assert!(player.key_pressed(slot));
    }
    let table = Arc::clone(&fx.table);
    eventually(|| {
        let table = Arc::clone(&table);
        async move { table.player_slots(0).await == vec![b] }
    })
    .await;
    assert_eq!(player.state().tokens_in_hand(), 2);

    for slot in [a, b] {
        assert!(player.key_pressed(slot));
    }
    let table = Arc::clone(&fx.table);
    eventually(|| {
        let table = Arc::clone(&table);
        async move { table.player_slots(0).await == vec![a] }
    })
    .await;
    let held = player.state().tokens_in_hand();
    assert!(held <= 3);
    assert_eq!(held, 2);
}

#[tokio::test]
async fn test_presses_beyond_queue_capacity_are_dropped() {
    let mut fx = dealt(config(1), ScriptedRules::new(&[])).await;

    // Off-board slots never reach the queue.
    assert!(!fx.players[0].key_pressed(12));
    assert!(!fx.players[0].key_pressed(usize::MAX));

    // A frozen player does not read its queue.
    press_cards(&fx.table, &fx.players[0], &[3, 4, 5]).await;
    next_claim(&mut fx.dealer).await;
    fx.dealer.resolve_claims().await;
    let player = fx.players[0].clone();
    eventually(|| {
        let player = player.clone();
        async move { player.state().is_frozen() }
    })
    .await;

    let accepted = (0..10).filter(|&slot| player.key_pressed(slot)).count();
    assert_eq!(accepted, set_game::player::INPUT_QUEUE_CAPACITY);
}
