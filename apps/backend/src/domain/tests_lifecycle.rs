//! Seating, round flow, pause/resume and the `apply_action` entry point.

use crate::domain::dice::DieType;
use crate::domain::engine::{apply_action, GameAction};
use crate::domain::events::DomainEvent;
use crate::domain::lobby::{first_free_seat, seat_human, try_advance};
use crate::domain::rules::RuleSet;
use crate::domain::state::{Difficulty, GameState, Phase};
use crate::domain::test_state_helpers::{die, game_with_dice, seated_lobby};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};

fn started(humans: u8) -> GameState {
    let mut state = seated_lobby(humans);
    for seat in 0..humans {
        apply_action(&mut state, seat, &GameAction::ReadyForRound).unwrap();
    }
    state
}

#[test]
fn game_starts_once_every_human_is_ready() {
    let mut state = seated_lobby(2);
    let events = apply_action(&mut state, 0, &GameAction::ReadyForRound).unwrap();
    assert!(events.is_empty());
    assert_eq!(state.phase, Phase::Lobby);

    let events = apply_action(&mut state, 1, &GameAction::ReadyForRound).unwrap();
    assert_eq!(events[0], DomainEvent::GameStarted);
    assert!(matches!(
        events[1],
        DomainEvent::RoundStarted {
            round_no: 1,
            starter: 0,
            total_dice: 10
        }
    ));
    assert_eq!(state.phase, Phase::Bidding);
    assert_eq!(state.turn, Some(0));
    for p in &state.players {
        assert_eq!(p.dice.len(), 5);
        assert!(p.dice.iter().all(|d| d.die_type == DieType::D6));
        assert_eq!(p.hand.len(), 1);
    }
    let drawn = events
        .iter()
        .filter(|e| matches!(e, DomainEvent::CardDrawn { .. }))
        .count();
    assert_eq!(drawn, 2);
}

#[test]
fn one_player_is_not_enough() {
    let mut state = seated_lobby(1);
    apply_action(&mut state, 0, &GameAction::ReadyForRound).unwrap();
    assert_eq!(state.phase, Phase::Lobby);
}

#[test]
fn ai_seats_are_always_ready() {
    let mut state = seated_lobby(1);
    apply_action(
        &mut state,
        0,
        &GameAction::AddAiPlayer {
            slot: 3,
            difficulty: Difficulty::Hard,
        },
    )
    .unwrap();
    assert_eq!(state.players.iter().map(|p| p.id).collect::<Vec<_>>(), vec![0, 3]);
    assert!(state.players[1].ready);

    apply_action(&mut state, 0, &GameAction::ReadyForRound).unwrap();
    assert_eq!(state.phase, Phase::Bidding);
}

#[test]
fn seats_cannot_be_taken_twice() {
    let mut state = seated_lobby(2);
    let err = apply_action(
        &mut state,
        0,
        &GameAction::AddAiPlayer {
            slot: 1,
            difficulty: Difficulty::Easy,
        },
    )
    .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(ConflictKind::SeatTaken, _)));

    assert_eq!(first_free_seat(&state), Some(2));
    let (seat, _) = seat_human(&mut state, "late", None).unwrap();
    assert_eq!(seat, 2);
}

#[test]
fn full_lobby_rejects_more_humans() {
    let mut state = GameState::new(
        RuleSet {
            max_players: 2,
            ..RuleSet::default()
        },
        Some(3),
    );
    seat_human(&mut state, "a", None).unwrap();
    seat_human(&mut state, "b", None).unwrap();
    let err = seat_human(&mut state, "c", None).unwrap_err();
    assert!(matches!(err, DomainError::Conflict(ConflictKind::LobbyFull, _)));
}

#[test]
fn removing_an_ai_frees_the_lobby_seat() {
    let mut state = seated_lobby(1);
    let add = GameAction::AddAiPlayer {
        slot: 1,
        difficulty: Difficulty::Normal,
    };
    apply_action(&mut state, 0, &add).unwrap();
    let err = apply_action(&mut state, 0, &GameAction::RemoveAiPlayer { player_id: 0 }).unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::NotAnAi, _)));

    let events = apply_action(&mut state, 0, &GameAction::RemoveAiPlayer { player_id: 1 }).unwrap();
    assert_eq!(events, vec![DomainEvent::PlayerKicked { player: 1 }]);
    assert_eq!(state.players.len(), 1);
}

#[test]
fn round_end_waits_for_humans_then_rerolls() {
    let mut state = game_with_dice(&[&[3, 1], &[3, 5]]);
    state.players[1].dice[0] = die(7000, DieType::D8, 3);
    apply_action(&mut state, 0, &GameAction::MakeBid { quantity: 3, face: 3 }).unwrap();
    apply_action(&mut state, 1, &GameAction::CallDudo { late: false }).unwrap();
    crate::domain::engine::resolve_pending(&mut state).unwrap();
    assert_eq!(state.phase, Phase::RoundEnd);
    assert!(state.players.iter().all(|p| !p.ready));

    apply_action(&mut state, 0, &GameAction::ReadyForRound).unwrap();
    assert_eq!(state.phase, Phase::RoundEnd);
    let events = apply_action(&mut state, 1, &GameAction::ReadyForRound).unwrap();
    assert!(matches!(events[0], DomainEvent::RoundStarted { round_no: 2, starter: 1, .. }));

    // Seat 1 lost its D6 and kept the D8, re-rolled under a fresh id.
    assert_eq!(state.players[1].dice.len(), 1);
    assert_eq!(state.players[1].dice[0].die_type, DieType::D8);
    assert_ne!(state.players[1].dice[0].id, 7000);
    assert_eq!(state.turn, Some(1));
    assert!(state.current_bid.is_none());
    assert!(state.last_outcome.is_none());
}

#[test]
fn round_start_clears_effects_and_knowledge() {
    let mut state = started(2);
    state.players[0].effects.insurance = true;
    state.players[1].effects.phantom_bid = true;
    state.phase = Phase::RoundEnd;
    state.next_starter = Some(1);
    try_advance(&mut state).unwrap();
    assert!(state.players.iter().all(|p| !p.effects.any()));
    assert!(state.players.iter().all(|p| p.knowledge.is_empty()));
}

#[test]
fn pause_blocks_everything_but_resume_and_restores_the_phase() {
    let mut state = started(2);
    let version = state.version;
    apply_action(&mut state, 1, &GameAction::PauseGame).unwrap();
    assert_eq!(state.phase, Phase::Paused);
    assert_eq!(state.paused_from, Some(Phase::Bidding));

    for action in [
        GameAction::MakeBid { quantity: 1, face: 2 },
        GameAction::CallJonti,
        GameAction::PauseGame,
        GameAction::ReadyForRound,
    ] {
        let err = apply_action(&mut state, 0, &action).unwrap_err();
        assert!(matches!(err, DomainError::Validation(ValidationKind::GamePaused, _)));
    }

    apply_action(&mut state, 0, &GameAction::ResumeGame).unwrap();
    assert_eq!(state.phase, Phase::Bidding);
    assert_eq!(state.turn, Some(0));
    assert_eq!(state.version, version + 2);
}

#[test]
fn lobby_cannot_be_paused() {
    let mut state = seated_lobby(2);
    let err = apply_action(&mut state, 0, &GameAction::PauseGame).unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::PhaseMismatch, _)));
}

#[test]
fn rejected_actions_do_not_bump_the_version() {
    let mut state = started(2);
    let version = state.version;
    assert!(apply_action(&mut state, 1, &GameAction::CallJonti).is_err());
    assert_eq!(state.version, version);
}

#[test]
fn new_game_resets_a_finished_table() {
    let mut state = game_with_dice(&[&[2], &[4, 4]]);
    apply_action(&mut state, 0, &GameAction::MakeBid { quantity: 3, face: 6 }).unwrap();
    apply_action(&mut state, 1, &GameAction::CallDudo { late: false }).unwrap();
    let events = crate::domain::engine::resolve_pending(&mut state).unwrap();
    assert!(events.contains(&DomainEvent::GameOver { winner: 1 }));

    let err = apply_action(&mut state, 0, &GameAction::MakeBid { quantity: 1, face: 2 }).unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::PhaseMismatch, _)));

    apply_action(&mut state, 0, &GameAction::NewGame).unwrap();
    assert_eq!(state.phase, Phase::Lobby);
    assert_eq!(state.players.len(), 2);
    assert!(state.players.iter().all(|p| p.dice.is_empty() && !p.eliminated));
    assert!(state.winner.is_none());
}

#[test]
fn actions_round_trip_through_json() {
    let json = r#"{"type":"make_bid","quantity":3,"faceValue":4}"#;
    let action: GameAction = serde_json::from_str(json).unwrap();
    assert_eq!(action, GameAction::MakeBid { quantity: 3, face: 4 });

    let action: GameAction = serde_json::from_str(r#"{"type":"call_dudo"}"#).unwrap();
    assert_eq!(action, GameAction::CallDudo { late: false });

    let json = r#"{"type":"play_card","cardId":7,"targetPlayerId":2,"targetDieIndex":1}"#;
    let GameAction::PlayCard(play) = serde_json::from_str(json).unwrap() else {
        panic!("expected play_card");
    };
    assert_eq!(play.card_id, 7);
    assert_eq!(play.target_die_index, Some(1));

    let json = r#"{"type":"add_ai_player","slot":2,"difficulty":"chuck_norris"}"#;
    let action: GameAction = serde_json::from_str(json).unwrap();
    assert_eq!(
        action,
        GameAction::AddAiPlayer {
            slot: 2,
            difficulty: Difficulty::ChuckNorris
        }
    );
}
