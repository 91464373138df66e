use crate::domain::bidding::{bid_raises, legal_bid_options, min_quantity_for_face, place_bid};
use crate::domain::state::{Bid, Phase};
use crate::domain::test_state_helpers::game_with_dice;
use crate::errors::domain::{DomainError, ValidationKind};

fn bid(player: u8, quantity: u8, face: u8) -> Bid {
    Bid {
        player,
        quantity,
        face,
    }
}

#[test]
fn raises_after_two_fours() {
    let prev = bid(0, 2, 4);
    assert!(bid_raises(&prev, 2, 5));
    assert!(bid_raises(&prev, 3, 1));
    assert!(bid_raises(&prev, 3, 4));
    assert!(!bid_raises(&prev, 2, 4));
    assert!(!bid_raises(&prev, 1, 6));
}

#[test]
fn wild_conversions_use_half_and_double_plus_one() {
    assert_eq!(min_quantity_for_face(Some(&bid(0, 5, 3)), 1), 3);
    assert_eq!(min_quantity_for_face(Some(&bid(0, 4, 3)), 1), 2);
    assert_eq!(min_quantity_for_face(Some(&bid(0, 1, 6)), 1), 1);
    assert_eq!(min_quantity_for_face(Some(&bid(0, 2, 1)), 5), 5);
    assert_eq!(min_quantity_for_face(Some(&bid(0, 2, 1)), 1), 3);
    assert_eq!(min_quantity_for_face(None, 4), 1);
}

#[test]
fn legal_options_respect_table_size() {
    let options = legal_bid_options(Some(&bid(0, 9, 6)), 10);
    assert!(options.contains(&(10, 6)));
    assert!(options.contains(&(5, 1)));
    assert!(!options.contains(&(9, 6)));
    assert!(options.iter().all(|&(q, _)| q <= 10));
    // Nothing raises 10x6 on a 10-dice table except 1s.
    let options = legal_bid_options(Some(&bid(0, 10, 6)), 10);
    assert!(options.iter().all(|&(_, f)| f == 1));
}

#[test]
fn placing_bids_advances_the_turn_in_seat_order() {
    let mut state = game_with_dice(&[&[2, 2], &[3, 3], &[4, 4]]);
    place_bid(&mut state, 0, 1, 2).unwrap();
    assert_eq!(state.turn, Some(1));
    place_bid(&mut state, 1, 2, 2).unwrap();
    assert_eq!(state.turn, Some(2));
    place_bid(&mut state, 2, 2, 3).unwrap();
    assert_eq!(state.turn, Some(0));
    assert_eq!(state.previous_bid, Some(bid(1, 2, 2)));
    assert_eq!(state.current_bid, Some(bid(2, 2, 3)));
    assert_eq!(state.round_bids.len(), 3);
}

#[test]
fn out_of_turn_and_non_raise_are_rejected_without_mutation() {
    let mut state = game_with_dice(&[&[2, 2], &[3, 3]]);
    place_bid(&mut state, 0, 2, 4).unwrap();
    let before = state.current_bid;

    let err = place_bid(&mut state, 0, 3, 4).unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::OutOfTurn, _)));

    let err = place_bid(&mut state, 1, 1, 6).unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::InvalidBid, _)));
    assert_eq!(state.current_bid, before);
    assert_eq!(state.turn, Some(1));
}

#[test]
fn malformed_bids_are_rejected() {
    let mut state = game_with_dice(&[&[2, 2], &[3, 3]]);
    for (q, f) in [(0, 3), (5, 3), (2, 0), (2, 7)] {
        let err = place_bid(&mut state, 0, q, f).unwrap_err();
        assert!(
            matches!(err, DomainError::Validation(ValidationKind::InvalidBid, _)),
            "{q}x{f}"
        );
    }
}

#[test]
fn phantom_bid_lets_exactly_one_non_raise_through() {
    let mut state = game_with_dice(&[&[2, 2, 2], &[3, 3, 3]]);
    place_bid(&mut state, 0, 3, 4).unwrap();
    state.players[1].effects.phantom_bid = true;

    place_bid(&mut state, 1, 1, 6).unwrap();
    assert!(!state.players[1].effects.phantom_bid);

    place_bid(&mut state, 0, 2, 6).unwrap();
    let err = place_bid(&mut state, 1, 1, 6).unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::InvalidBid, _)));
}

#[test]
fn raising_bid_keeps_phantom_flag() {
    let mut state = game_with_dice(&[&[2, 2], &[3, 3]]);
    state.players[0].effects.phantom_bid = true;
    place_bid(&mut state, 0, 1, 3).unwrap();
    assert!(state.players[0].effects.phantom_bid);
}

#[test]
fn paused_and_wrong_phase_reject_bids() {
    let mut state = game_with_dice(&[&[2, 2], &[3, 3]]);
    state.paused_from = Some(Phase::Bidding);
    state.phase = Phase::Paused;
    let err = place_bid(&mut state, 0, 1, 3).unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::GamePaused, _)));

    state.phase = Phase::RoundEnd;
    let err = place_bid(&mut state, 0, 1, 3).unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::PhaseMismatch, _)));
}
