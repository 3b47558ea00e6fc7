//! Integration tests for the room store and room actors.
//!
//! Room actors push their events before replying, so by the time an
//! awaited store or handle call returns, every resulting event is already
//! sitting in the members' channels.

use hearts_engine::{Card, CardId, HAND_SIZE};
use hearts_protocol::{ConnectionId, RoomCode, RoomId};
use hearts_room::{
    GameError, GameState, Room, RoomConfig, RoomError, RoomEvent, RoomStore,
};
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

type Inbox = mpsc::UnboundedReceiver<RoomEvent>;

fn conn(id: u64) -> ConnectionId {
    ConnectionId::new(id)
}

/// Everything currently queued for one member.
fn drain(rx: &mut Inbox) -> Vec<RoomEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Wire names of `events`, in order.
fn names(events: &[RoomEvent]) -> Vec<String> {
    events
        .iter()
        .map(|e| serde_json::to_value(e).unwrap()["event"].as_str().unwrap().to_owned())
        .collect()
}

/// Creates a room hosted by connection 1 and seats connections 2..=4.
async fn full_table(store: &mut RoomStore) -> (Room, Vec<Inbox>) {
    let mut inboxes = Vec::new();

    let (tx, rx) = mpsc::unbounded_channel();
    let room = store.create_room(conn(1), "Ana", tx).unwrap();
    inboxes.push(rx);

    for (id, name) in [(2, "Ben"), (3, "Cy"), (4, "Dee")] {
        let (tx, rx) = mpsc::unbounded_channel();
        store.join_room(&room.code, conn(id), name, tx).await.unwrap();
        inboxes.push(rx);
    }
    for rx in &mut inboxes {
        drain(rx);
    }
    (room, inboxes)
}

async fn snapshot(store: &RoomStore, room_id: RoomId) -> Room {
    store.get(room_id).unwrap().snapshot().await.unwrap()
}

async fn ready_all(store: &RoomStore) {
    for id in 1..=4 {
        store.handle_for(conn(id)).unwrap().set_ready(conn(id), true).await.unwrap();
    }
}

fn first_three(room: &Room, seat: usize) -> Vec<CardId> {
    room.players[seat].hand[..3].iter().map(Card::id).collect()
}

// =========================================================================
// Creating and joining
// =========================================================================

#[tokio::test]
async fn test_create_room_returns_unique_ids_and_codes() {
    let mut store = RoomStore::default();
    let r1 = store.create_room(conn(1), "Ana", mpsc::unbounded_channel().0).unwrap();
    let r2 = store.create_room(conn(2), "Ben", mpsc::unbounded_channel().0).unwrap();

    assert_ne!(r1.id, r2.id);
    assert_ne!(r1.code, r2.code);
    assert_eq!(store.room_count(), 2);

    let mut ids = store.room_ids();
    ids.sort_by_key(|r| r.0);
    assert_eq!(ids, vec![r1.id, r2.id]);
}

#[tokio::test]
async fn test_host_receives_room_created() {
    let mut store = RoomStore::default();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let room = store.create_room(conn(1), "Ana", tx).unwrap();

    // Any round trip to the actor guarantees it has started.
    let current = snapshot(&store, room.id).await;
    assert_eq!(current, room);

    match drain(&mut rx).as_slice() {
        [RoomEvent::RoomCreated { room: r, player }] => {
            assert_eq!(r.code, room.code);
            assert_eq!(player.name, "Ana");
            assert!(player.is_host);
        }
        other => panic!("expected roomCreated, got {other:?}"),
    }
}

#[tokio::test]
async fn test_join_sends_room_joined_then_player_joined() {
    let mut store = RoomStore::default();
    let (host_tx, mut host_rx) = mpsc::unbounded_channel();
    let room = store.create_room(conn(1), "Ana", host_tx).unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let lowercase = RoomCode::new(room.code.as_str().to_lowercase());
    let player = store.join_room(&lowercase, conn(2), "Ben", tx).await.unwrap();

    assert_eq!(player.name, "Ben");
    assert!(!player.is_host);
    assert_eq!(store.room_of(conn(2)), Some(room.id));

    assert_eq!(names(&drain(&mut rx)), vec!["roomJoined", "playerJoined"]);
    assert_eq!(names(&drain(&mut host_rx)), vec!["roomCreated", "playerJoined"]);
}

#[tokio::test]
async fn test_join_unknown_code() {
    let mut store = RoomStore::default();
    let result = store
        .join_room(&RoomCode::new("NOPE00"), conn(1), "Ana", mpsc::unbounded_channel().0)
        .await;
    assert!(matches!(result, Err(RoomError::CodeNotFound(_))));
}

#[tokio::test]
async fn test_join_full_room() {
    let mut store = RoomStore::default();
    let (room, _inboxes) = full_table(&mut store).await;

    let result = store
        .join_room(&room.code, conn(5), "Eve", mpsc::unbounded_channel().0)
        .await;
    assert!(matches!(result, Err(RoomError::Game(GameError::RoomFull))));
    assert_eq!(store.room_of(conn(5)), None);
}

#[tokio::test]
async fn test_join_is_idempotent_for_same_connection() {
    let mut store = RoomStore::default();
    let room = store.create_room(conn(1), "Ana", mpsc::unbounded_channel().0).unwrap();

    store.join_room(&room.code, conn(2), "Ben", mpsc::unbounded_channel().0).await.unwrap();
    store.join_room(&room.code, conn(2), "Ben", mpsc::unbounded_channel().0).await.unwrap();

    assert_eq!(snapshot(&store, room.id).await.players.len(), 2);
}

#[tokio::test]
async fn test_one_room_at_a_time() {
    let mut store = RoomStore::default();
    let r1 = store.create_room(conn(1), "Ana", mpsc::unbounded_channel().0).unwrap();
    let r2 = store.create_room(conn(2), "Ben", mpsc::unbounded_channel().0).unwrap();

    let result = store
        .join_room(&r2.code, conn(1), "Ana", mpsc::unbounded_channel().0)
        .await;
    assert!(matches!(result, Err(RoomError::AlreadyInRoom(c, id)) if c == conn(1) && id == r1.id));
}

#[tokio::test]
async fn test_cannot_join_after_game_started() {
    let mut store = RoomStore::default();
    let (room, _inboxes) = full_table(&mut store).await;
    ready_all(&store).await;

    store.remove_player(conn(4)).await.unwrap();
    let result = store
        .join_room(&room.code, conn(5), "Eve", mpsc::unbounded_channel().0)
        .await;
    assert!(matches!(result, Err(RoomError::Game(GameError::GameInProgress))));
}

// =========================================================================
// Readiness and game start
// =========================================================================

#[tokio::test]
async fn test_ready_broadcasts_and_all_ready_starts_game() {
    let mut store = RoomStore::default();
    let (room, mut inboxes) = full_table(&mut store).await;

    let handle = store.handle_for(conn(2)).unwrap();
    handle.set_ready(conn(2), true).await.unwrap();
    for rx in &mut inboxes {
        match drain(rx).as_slice() {
            [RoomEvent::PlayerReady { player_id, is_ready, room }] => {
                assert_eq!(*player_id, conn(2));
                assert!(*is_ready);
                assert!(room.players[1].is_ready);
            }
            other => panic!("expected playerReady, got {other:?}"),
        }
    }
    assert!(!store.all_ready(room.id).await.unwrap());

    ready_all(&store).await;

    let events = drain(&mut inboxes[0]);
    let Some(RoomEvent::GameStarted { room: started }) = events.last() else {
        panic!("expected gameStarted last, got {:?}", names(&events));
    };
    assert_eq!(started.game_state, GameState::Passing);
    for player in &started.players {
        assert_eq!(player.hand.len(), HAND_SIZE);
    }
    assert!(store.all_ready(room.id).await.unwrap());
}

#[tokio::test]
async fn test_set_ready_outside_lobby_is_rejected() {
    let mut store = RoomStore::default();
    let (room, _inboxes) = full_table(&mut store).await;
    ready_all(&store).await;

    let result = store.handle_for(conn(1)).unwrap().set_ready(conn(1), false).await;
    assert!(matches!(
        result,
        Err(RoomError::Game(GameError::WrongPhase { .. }))
    ));
    assert_eq!(snapshot(&store, room.id).await.game_state, GameState::Passing);
}

// =========================================================================
// Passing and playing through the actor
// =========================================================================

#[tokio::test]
async fn test_pass_then_exchange_then_first_lead() {
    let mut store = RoomStore::default();
    let (room, mut inboxes) = full_table(&mut store).await;
    ready_all(&store).await;
    for rx in &mut inboxes {
        drain(rx);
    }

    let dealt = snapshot(&store, room.id).await;
    let handle = store.get(room.id).unwrap();
    for seat in 0..4 {
        let outcome = handle
            .pass_cards(conn(seat as u64 + 1), first_three(&dealt, seat))
            .await
            .unwrap();
        assert_eq!(outcome.exchanged, seat == 3);
    }

    let events = drain(&mut inboxes[2]);
    assert_eq!(
        names(&events),
        vec!["cardsPassed", "cardsPassed", "cardsPassed", "cardsPassed", "cardsExchanged"]
    );

    let playing = snapshot(&store, room.id).await;
    assert_eq!(playing.game_state, GameState::Playing);
    let leader = &playing.players[playing.current_turn];
    let two = leader.hand.iter().find(|c| c.is_two_of_clubs()).unwrap();

    let outcome = handle.play_card(leader.id, two.id()).await.unwrap();
    assert!(outcome.card.is_two_of_clubs());
    for rx in &mut inboxes {
        match drain(rx).as_slice() {
            [RoomEvent::CardPlayed { player_id, card, room }] => {
                assert_eq!(*player_id, leader.id);
                assert!(card.is_two_of_clubs());
                assert_eq!(room.current_trick.len(), 1);
            }
            other => panic!("expected cardPlayed, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_rejected_action_changes_nothing_and_broadcasts_nothing() {
    let mut store = RoomStore::default();
    let (room, mut inboxes) = full_table(&mut store).await;
    ready_all(&store).await;

    let dealt = snapshot(&store, room.id).await;
    let handle = store.get(room.id).unwrap();
    for seat in 0..4 {
        handle
            .pass_cards(conn(seat as u64 + 1), first_three(&dealt, seat))
            .await
            .unwrap();
    }
    for rx in &mut inboxes {
        drain(rx);
    }

    let before = snapshot(&store, room.id).await;
    let off_turn = &before.players[(before.current_turn + 1) % 4];
    let result = handle.play_card(off_turn.id, off_turn.hand[0].id()).await;
    assert!(matches!(result, Err(RoomError::Game(GameError::NotYourTurn))));

    let again = handle.pass_cards(conn(1), first_three(&before, 0)).await;
    assert!(matches!(again, Err(RoomError::Game(GameError::WrongPhase { .. }))));

    assert_eq!(snapshot(&store, room.id).await, before);
    for rx in &mut inboxes {
        assert!(drain(rx).is_empty());
    }
}

// =========================================================================
// End point
// =========================================================================

#[tokio::test]
async fn test_update_end_point_host_only() {
    let mut store = RoomStore::default();
    let (room, mut inboxes) = full_table(&mut store).await;
    let handle = store.get(room.id).unwrap();

    let result = handle.update_end_point(conn(2), 50).await;
    assert!(matches!(result, Err(RoomError::Game(GameError::NotHost))));

    let result = handle.update_end_point(conn(1), 501).await;
    assert!(matches!(
        result,
        Err(RoomError::Game(GameError::EndPointOutOfRange { value: 501, max: 500 }))
    ));

    assert_eq!(handle.update_end_point(conn(1), 50).await.unwrap(), 50);
    for rx in &mut inboxes {
        match drain(rx).as_slice() {
            [RoomEvent::EndPointUpdated { end_point, room }] => {
                assert_eq!(*end_point, 50);
                assert_eq!(room.end_point, 50);
            }
            other => panic!("expected endPointUpdated, got {other:?}"),
        }
    }
}

// =========================================================================
// Concurrent requests
// =========================================================================

/// Every card in the room, wherever it currently sits.
fn card_count(room: &Room) -> usize {
    room.current_trick.len()
        + room
            .players
            .iter()
            .map(|p| p.hand.len() + p.passed_cards.len() + p.tricks.len() * 4)
            .sum::<usize>()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_are_applied_one_at_a_time() {
    let mut store = RoomStore::default();
    let (room, _inboxes) = full_table(&mut store).await;
    ready_all(&store).await;
    let dealt = snapshot(&store, room.id).await;
    let handle = store.get(room.id).unwrap();

    // All four passes at once: each lands, exactly one triggers the exchange.
    let passes: Vec<_> = (0..4)
        .map(|seat| {
            let handle = handle.clone();
            let ids = first_three(&dealt, seat);
            let player = dealt.players[seat].id;
            tokio::spawn(async move { handle.pass_cards(player, ids).await })
        })
        .collect();
    let mut exchanges = 0;
    for pass in passes {
        if pass.await.unwrap().unwrap().exchanged {
            exchanges += 1;
        }
    }
    assert_eq!(exchanges, 1);

    let playing = snapshot(&store, room.id).await;
    assert_eq!(playing.game_state, GameState::Playing);
    assert_eq!(card_count(&playing), 52);

    // The leader and a seat two places later race. Whichever lands first,
    // the other is out of turn.
    let leader = playing.current_turn;
    let rival = (leader + 2) % 4;
    let lead = playing.players[leader]
        .hand
        .iter()
        .find(|c| c.is_two_of_clubs())
        .unwrap()
        .id();
    let rival_card = playing.players[rival].hand[0].id();

    let (a, b) = tokio::join!(
        tokio::spawn({
            let handle = handle.clone();
            let player = playing.players[leader].id;
            async move { handle.play_card(player, lead).await }
        }),
        tokio::spawn({
            let handle = handle.clone();
            let player = playing.players[rival].id;
            async move { handle.play_card(player, rival_card).await }
        }),
    );
    let results = [a.unwrap(), b.unwrap()];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(matches!(
        results[1],
        Err(RoomError::Game(GameError::NotYourTurn))
    ));

    let after = snapshot(&store, room.id).await;
    assert_eq!(card_count(&after), 52);
    assert_eq!(after.current_trick.len(), 1);
    assert_eq!(after.led_suit.is_some(), !after.current_trick.is_empty());
    assert_eq!(after.current_turn, (leader + 1) % 4);
}

// =========================================================================
// Leaving
// =========================================================================

#[tokio::test]
async fn test_host_leaving_transfers_host() {
    let mut store = RoomStore::default();
    let (room, mut inboxes) = full_table(&mut store).await;

    let departure = store.remove_player(conn(1)).await.unwrap().unwrap();
    assert!(departure.left());
    assert_eq!(departure.remaining, 3);
    assert_eq!(store.room_of(conn(1)), None);

    match drain(&mut inboxes[1]).as_slice() {
        [RoomEvent::PlayerLeft { player_id, room }] => {
            assert_eq!(*player_id, conn(1));
            assert_eq!(room.players.len(), 3);
            assert!(room.players[0].is_host);
            assert_eq!(room.players[0].name, "Ben");
        }
        other => panic!("expected playerLeft, got {other:?}"),
    }
    assert!(drain(&mut inboxes[0]).is_empty());

    let current = snapshot(&store, room.id).await;
    assert_eq!(current.players.iter().filter(|p| p.is_host).count(), 1);
}

#[tokio::test]
async fn test_last_player_leaving_destroys_room() {
    let mut store = RoomStore::default();
    let room = store.create_room(conn(1), "Ana", mpsc::unbounded_channel().0).unwrap();
    let handle = store.get(room.id).unwrap();

    let departure = store.remove_player(conn(1)).await.unwrap().unwrap();
    assert_eq!(departure.remaining, 0);
    assert_eq!(store.room_count(), 0);
    assert!(store.find_by_code(&room.code).is_none());
    assert!(matches!(
        handle.snapshot().await,
        Err(RoomError::Unavailable(id)) if id == room.id
    ));
}

#[tokio::test]
async fn test_remove_unknown_connection() {
    let mut store = RoomStore::default();
    assert!(store.remove_player(conn(42)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_leaving_mid_game_finishes_table() {
    let mut store = RoomStore::default();
    let (room, mut inboxes) = full_table(&mut store).await;
    ready_all(&store).await;

    for rx in &mut inboxes {
        drain(rx);
    }

    store.remove_player(conn(3)).await.unwrap();
    assert_eq!(snapshot(&store, room.id).await.game_state, GameState::Finished);

    let events = drain(&mut inboxes[0]);
    assert_eq!(names(&events), vec!["playerLeft", "gameOver"]);
    let RoomEvent::GameOver { winner, room: last } = &events[1] else {
        unreachable!()
    };
    assert_eq!(last.players.len(), 3);
    assert!(last.players.iter().all(|p| p.id != conn(3)));
    assert_eq!(winner.score, 0);
    assert!(drain(&mut inboxes[2]).is_empty());
}

#[tokio::test]
async fn test_leaving_the_lobby_sends_no_game_over() {
    let mut store = RoomStore::default();
    let (_room, mut inboxes) = full_table(&mut store).await;

    store.remove_player(conn(2)).await.unwrap();
    assert_eq!(names(&drain(&mut inboxes[0])), vec!["playerLeft"]);
}

#[tokio::test]
async fn test_left_member_stops_receiving() {
    let mut store = RoomStore::default();
    let (room, mut inboxes) = full_table(&mut store).await;

    store.remove_player(conn(4)).await.unwrap();
    drain(&mut inboxes[3]);

    store.get(room.id).unwrap().set_ready(conn(1), true).await.unwrap();
    assert!(drain(&mut inboxes[3]).is_empty());
    assert_eq!(names(&drain(&mut inboxes[1])), vec!["playerLeft", "playerReady"]);
}

// =========================================================================
// Reconnecting
// =========================================================================

#[tokio::test]
async fn test_get_room_data_rebinds_seat_by_name() {
    let mut store = RoomStore::default();
    let (room, mut inboxes) = full_table(&mut store).await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let rebound = store
        .get_room_data(&room.code, conn(20), Some("Ben".into()), tx)
        .await
        .unwrap();

    assert_eq!(rebound.previous, conn(2));
    assert_eq!(rebound.player.id, conn(20));
    assert_eq!(store.room_of(conn(2)), None);
    assert_eq!(store.room_of(conn(20)), Some(room.id));
    assert_eq!(names(&drain(&mut rx)), vec!["roomDataReceived"]);

    // The new connection now acts for the seat and gets the broadcasts.
    store.handle_for(conn(20)).unwrap().set_ready(conn(20), true).await.unwrap();
    assert_eq!(names(&drain(&mut rx)), vec!["playerReady"]);
    assert!(drain(&mut inboxes[1]).is_empty());
    assert!(snapshot(&store, room.id).await.players[1].is_ready);
}

#[tokio::test]
async fn test_get_room_data_for_own_seat_keeps_binding() {
    let mut store = RoomStore::default();
    let (room, _inboxes) = full_table(&mut store).await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let rebound = store.get_room_data(&room.code, conn(3), None, tx).await.unwrap();
    assert_eq!(rebound.previous, conn(3));
    assert_eq!(rebound.player.name, "Cy");
    assert_eq!(names(&drain(&mut rx)), vec!["roomDataReceived"]);
}

#[tokio::test]
async fn test_get_room_data_unknown_player() {
    let mut store = RoomStore::default();
    let (room, _inboxes) = full_table(&mut store).await;

    let result = store
        .get_room_data(&room.code, conn(30), Some("Zed".into()), mpsc::unbounded_channel().0)
        .await;
    assert!(matches!(result, Err(RoomError::Game(GameError::PlayerNotFound))));
    assert_eq!(store.room_of(conn(30)), None);
}

#[tokio::test]
async fn test_get_room_data_host_fallback_when_enabled() {
    let mut store = RoomStore::new(RoomConfig {
        host_fallback_on_lookup: true,
        ..RoomConfig::default()
    });
    let (room, _inboxes) = full_table(&mut store).await;

    let rebound = store
        .get_room_data(&room.code, conn(30), None, mpsc::unbounded_channel().0)
        .await
        .unwrap();
    assert_eq!(rebound.previous, conn(1));
    assert!(rebound.player.is_host);
}

#[tokio::test]
async fn test_reassign_connection() {
    let mut store = RoomStore::default();
    let (room, _inboxes) = full_table(&mut store).await;

    let player = store
        .reassign_connection(room.id, conn(4), conn(40), mpsc::unbounded_channel().0)
        .await
        .unwrap();
    assert_eq!(player.name, "Dee");
    assert_eq!(store.room_of(conn(40)), Some(room.id));
    assert_eq!(store.room_of(conn(4)), None);
}

// =========================================================================
// Teardown
// =========================================================================

#[tokio::test]
async fn test_destroy_room() {
    let mut store = RoomStore::default();
    let (room, _inboxes) = full_table(&mut store).await;

    store.destroy_room(room.id).await.unwrap();
    assert_eq!(store.room_count(), 0);
    assert_eq!(store.room_of(conn(2)), None);
    assert!(matches!(
        store.destroy_room(room.id).await,
        Err(RoomError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_shutdown_stops_every_room() {
    let mut store = RoomStore::default();
    let r1 = store.create_room(conn(1), "Ana", mpsc::unbounded_channel().0).unwrap();
    let _r2 = store.create_room(conn(2), "Ben", mpsc::unbounded_channel().0).unwrap();
    let handle = store.get(r1.id).unwrap();

    store.shutdown().await;
    assert_eq!(store.room_count(), 0);
    assert!(handle.snapshot().await.is_err());
}
