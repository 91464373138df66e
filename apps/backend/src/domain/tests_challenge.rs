use crate::domain::bidding::place_bid;
use crate::domain::challenge::{call_dudo, call_jonti, resolve_pending_call, RoundOutcome};
use crate::domain::dice::DieType;
use crate::domain::events::DomainEvent;
use crate::domain::state::{GameState, Phase};
use crate::domain::test_state_helpers::{d6, game_with_dice};
use crate::errors::domain::{DomainError, ValidationKind};

/// Seat 0 bids, seat 1 calls Dudo, the call resolves.
fn bid_then_dudo(state: &mut GameState, quantity: u8, face: u8) -> Vec<DomainEvent> {
    place_bid(state, 0, quantity, face).unwrap();
    call_dudo(state, 1, false).unwrap();
    resolve_pending_call(state).unwrap()
}

fn dudo_result(state: &GameState) -> crate::domain::challenge::ChallengeResult {
    match state.last_outcome.clone() {
        Some(RoundOutcome::Dudo(r)) => r,
        other => panic!("expected a dudo outcome, got {other:?}"),
    }
}

#[test]
fn three_threes_hold_with_a_wild_and_the_caller_loses() {
    // [3, 1] + [3, 5]: two 3s plus one wild 1.
    let mut state = game_with_dice(&[&[3, 1], &[3, 5]]);
    bid_then_dudo(&mut state, 3, 3);

    let r = dudo_result(&state);
    assert_eq!(r.true_count, 3);
    assert!(!r.success);
    assert_eq!(r.loser, 1);
    assert_eq!(r.dice_lost, 1);
    assert_eq!(state.players[1].dice.len(), 1);
    assert_eq!(state.players[0].dice.len(), 2);
    assert_eq!(state.phase, Phase::RoundEnd);
    assert_eq!(state.next_starter, Some(1));
}

#[test]
fn reveal_covers_every_die() {
    let mut state = game_with_dice(&[&[3, 1], &[3, 5], &[6, 6, 6]]);
    bid_then_dudo(&mut state, 2, 3);
    let r = dudo_result(&state);
    let revealed: usize = r.reveal.iter().map(|h| h.dice.len()).sum();
    assert_eq!(revealed, 7);
}

#[test]
fn bluff_costs_the_bidder() {
    let mut state = game_with_dice(&[&[2, 2], &[4, 5]]);
    bid_then_dudo(&mut state, 2, 6);
    let r = dudo_result(&state);
    assert!(r.success);
    assert_eq!(r.loser, 0);
    assert_eq!(state.players[0].dice.len(), 1);
}

#[test]
fn bid_on_ones_counts_only_literal_ones() {
    let mut state = game_with_dice(&[&[1, 4], &[1, 4]]);
    bid_then_dudo(&mut state, 3, 1);
    let r = dudo_result(&state);
    assert_eq!(r.true_count, 2);
    assert!(r.success);
}

#[test]
fn insurance_absorbs_one_failed_challenge_only() {
    let mut state = game_with_dice(&[&[3, 3, 3], &[3, 3, 3]]);
    state.players[1].effects.insurance = true;
    bid_then_dudo(&mut state, 2, 3);

    let r = dudo_result(&state);
    assert!(r.insurance_used);
    assert_eq!(r.dice_lost, 0);
    assert_eq!(state.players[1].dice.len(), 3);
    assert!(!state.players[1].effects.insurance);

    // Same situation again, without re-acquiring insurance.
    state.phase = Phase::Bidding;
    state.turn = Some(0);
    state.current_bid = None;
    state.previous_bid = None;
    bid_then_dudo(&mut state, 2, 3);
    assert_eq!(state.players[1].dice.len(), 2);
}

#[test]
fn insurance_is_kept_when_the_caller_wins() {
    let mut state = game_with_dice(&[&[2, 2], &[4, 4]]);
    state.players[1].effects.insurance = true;
    bid_then_dudo(&mut state, 3, 6);
    assert!(state.players[1].effects.insurance);
    assert_eq!(state.players[0].dice.len(), 1);
}

#[test]
fn double_challenge_doubles_both_directions_before_insurance() {
    // Bid holds: caller would lose two, insurance absorbs all of it.
    let mut state = game_with_dice(&[&[3, 3, 3], &[3, 3, 3]]);
    state.players[0].effects.double_challenge = true;
    state.players[1].effects.insurance = true;
    bid_then_dudo(&mut state, 2, 3);
    let r = dudo_result(&state);
    assert!(r.doubled && r.insurance_used);
    assert_eq!(r.dice_lost, 0);
    assert!(!state.players[0].effects.double_challenge);

    // Bluff: the bidder pays double.
    let mut state = game_with_dice(&[&[2, 2, 2], &[4, 4, 4]]);
    state.players[0].effects.double_challenge = true;
    bid_then_dudo(&mut state, 4, 6);
    let r = dudo_result(&state);
    assert_eq!((r.loser, r.dice_lost), (0, 2));
    assert_eq!(state.players[0].dice.len(), 1);
}

#[test]
fn calls_need_a_bid_that_is_not_your_own() {
    let mut state = game_with_dice(&[&[2, 2], &[4, 4]]);
    let err = call_dudo(&mut state, 0, false).unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::NoCurrentBid, _)));

    place_bid(&mut state, 0, 1, 2).unwrap();
    place_bid(&mut state, 1, 2, 2).unwrap();
    // A late challenge from seat 0 would land on seat 0's own bid.
    state.players[0].effects.late_challenge = true;
    let err = call_dudo(&mut state, 0, true).unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::SelfChallenge, _)));
    assert!(state.players[0].effects.late_challenge);

    let err = call_dudo(&mut state, 1, false).unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::OutOfTurn, _)));

    call_dudo(&mut state, 0, false).unwrap();
    assert_eq!(state.phase, Phase::DudoCalled);
}

#[test]
fn late_challenge_targets_the_previous_bid_and_is_consumed() {
    let mut state = game_with_dice(&[&[2, 2], &[4, 4], &[5, 5]]);
    place_bid(&mut state, 0, 1, 6).unwrap();
    place_bid(&mut state, 1, 2, 4).unwrap();

    let err = call_dudo(&mut state, 2, true).unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::EffectNotActive, _)));

    state.players[2].effects.late_challenge = true;
    call_dudo(&mut state, 2, true).unwrap();
    let pending = state.pending.unwrap();
    assert_eq!(pending.target, 0);
    assert_eq!(pending.bid.face, 6);
    assert!(pending.late);
    assert!(!state.players[2].effects.late_challenge);

    resolve_pending_call(&mut state).unwrap();
    let r = dudo_result(&state);
    assert!(r.success);
    assert_eq!(r.loser, 0);
}

#[test]
fn jonti_requires_an_exact_count() {
    for (quantity, expect) in [(2u8, true), (1, false), (3, false)] {
        let mut state = game_with_dice(&[&[3, 4, 5], &[3, 6, 6]]);
        state.rules.max_dice_per_player = 5;
        place_bid(&mut state, 0, quantity, 3).unwrap();
        call_jonti(&mut state, 1).unwrap();
        resolve_pending_call(&mut state).unwrap();
        let Some(RoundOutcome::Jonti(r)) = state.last_outcome.clone() else {
            panic!("expected jonti outcome");
        };
        assert_eq!(r.true_count, 2);
        assert_eq!(r.success, expect, "quantity {quantity}");
        let expected_dice = if expect { 4 } else { 2 };
        assert_eq!(state.players[1].dice.len(), expected_dice);
    }
}

#[test]
fn jonti_bonus_stops_at_the_ceiling_and_ignores_insurance() {
    let mut state = game_with_dice(&[&[3, 4], &[3, 6]]);
    state.rules.max_dice_per_player = 2;
    place_bid(&mut state, 0, 2, 3).unwrap();
    call_jonti(&mut state, 1).unwrap();
    resolve_pending_call(&mut state).unwrap();
    assert_eq!(state.players[1].dice.len(), 2);

    let mut state = game_with_dice(&[&[3, 4], &[3, 6]]);
    state.players[1].effects.insurance = true;
    place_bid(&mut state, 0, 1, 3).unwrap();
    call_jonti(&mut state, 1).unwrap();
    resolve_pending_call(&mut state).unwrap();
    assert_eq!(state.players[1].dice.len(), 1);
    assert!(state.players[1].effects.insurance);
}

#[test]
fn bonus_die_is_a_fresh_d6() {
    let mut state = game_with_dice(&[&[3, 4], &[3, 6]]);
    place_bid(&mut state, 0, 2, 3).unwrap();
    call_jonti(&mut state, 1).unwrap();
    resolve_pending_call(&mut state).unwrap();
    let added = state.players[1].dice.last().copied().unwrap();
    assert_eq!(added.die_type, DieType::D6);
    assert!(state.players.iter().flat_map(|p| p.dice.iter()).filter(|d| d.id == added.id).count() == 1);
}

#[test]
fn eliminated_seat_is_skipped_until_one_player_remains() {
    let mut state = game_with_dice(&[&[2, 2], &[4, 4], &[6], &[5, 5]]);
    state.turn = Some(1);
    place_bid(&mut state, 1, 1, 4).unwrap();
    assert_eq!(state.turn, Some(2));
    // Seat 2 bids a bluff and seat 3 calls it: seat 2 is out.
    place_bid(&mut state, 2, 4, 6).unwrap();
    call_dudo(&mut state, 3, false).unwrap();
    let events = resolve_pending_call(&mut state).unwrap();
    assert!(events.contains(&DomainEvent::PlayerEliminated { player: 2 }));
    assert!(state.players[2].eliminated);
    assert_eq!(state.phase, Phase::RoundEnd);
    assert_eq!(state.next_starter, Some(3));

    for from in 0..4 {
        assert_ne!(state.next_active_after(from), Some(2));
    }

    state.players[0].dice.clear();
    state.players[0].eliminated = true;
    state.players[3].dice = d6(400, &[2]);
    state.phase = Phase::Bidding;
    state.turn = Some(1);
    state.current_bid = None;
    place_bid(&mut state, 1, 1, 4).unwrap();
    assert_eq!(state.turn, Some(3));
    place_bid(&mut state, 3, 3, 4).unwrap();
    call_dudo(&mut state, 1, false).unwrap();
    let events = resolve_pending_call(&mut state).unwrap();
    assert_eq!(state.phase, Phase::GameOver);
    assert_eq!(state.winner, Some(1));
    assert!(events.contains(&DomainEvent::GameOver { winner: 1 }));
}
