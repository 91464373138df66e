use crate::domain::bidding::place_bid;
use crate::domain::card_play::{play_card, CardExtra, CardPlay};
use crate::domain::cards_types::CardType;
use crate::domain::challenge::call_dudo;
use crate::domain::dice::DieType;
use crate::domain::events::{CardResult, DomainEvent};
use crate::domain::player_view::private_info;
use crate::domain::state::{GameState, Phase};
use crate::domain::test_state_helpers::{die, game_with_dice, set_hand};
use crate::errors::domain::{DomainError, TargetKind, ValidationKind};

fn at(card_id: u32, player: u8, index: usize) -> CardPlay {
    CardPlay {
        card_id,
        target_player_id: Some(player),
        target_die_index: Some(index),
        ..CardPlay::default()
    }
}

fn bare(card_id: u32) -> CardPlay {
    CardPlay {
        card_id,
        ..CardPlay::default()
    }
}

fn played(events: &[DomainEvent]) -> (CardType, Option<u8>, CardResult) {
    match events {
        [DomainEvent::CardPlayed {
            shown_as,
            shown_target,
            private,
            ..
        }] => (*shown_as, *shown_target, private.clone()),
        other => panic!("expected one CardPlayed, got {other:?}"),
    }
}

fn two_player() -> GameState {
    game_with_dice(&[&[2, 3, 4], &[5, 6, 1]])
}

#[test]
fn peek_reveals_one_face_to_the_caster_only() {
    let mut state = two_player();
    let cards = set_hand(&mut state, 0, &[CardType::Peek]);

    let events = play_card(&mut state, 0, &at(cards[0].id, 1, 1)).unwrap();
    let (shown, target, private) = played(&events);
    assert_eq!((shown, target), (CardType::Peek, Some(1)));
    assert_eq!(
        private,
        CardResult::Peeked {
            owner: 1,
            die_index: 1,
            die_type: DieType::D6,
            face: 6
        }
    );
    assert!(state.players[0].hand.is_empty());
    assert_eq!(state.deck.discarded(), 1);

    let mine = private_info(&state, 0).unwrap();
    assert_eq!(mine.knowledge.len(), 1);
    assert_eq!(mine.knowledge[0].face, Some(6));
    assert!(private_info(&state, 1).unwrap().knowledge.is_empty());
}

#[test]
fn opponent_dice_are_never_addressed_by_id() {
    let mut state = two_player();
    let cards = set_hand(&mut state, 0, &[CardType::Peek]);
    let play = CardPlay {
        card_id: cards[0].id,
        target_player_id: Some(1),
        target_die_id: Some(state.players[1].dice[0].id),
        ..CardPlay::default()
    };
    let err = play_card(&mut state, 0, &play).unwrap_err();
    assert!(matches!(
        err,
        DomainError::InvalidTarget(TargetKind::OpponentDieById, _)
    ));
    assert_eq!(state.players[0].hand.len(), 1);
    assert_eq!(state.deck.discarded(), 0);
}

#[test]
fn peek_rejects_self_eliminated_and_out_of_range_targets() {
    let mut state = game_with_dice(&[&[2, 3], &[5, 6], &[]]);
    let cards = set_hand(&mut state, 0, &[CardType::Peek]);
    let cases = [
        (at(cards[0].id, 0, 0), TargetKind::SelfTarget),
        (at(cards[0].id, 2, 0), TargetKind::PlayerEliminated),
        (at(cards[0].id, 1, 5), TargetKind::DieIndexOutOfRange),
        (bare(cards[0].id), TargetKind::MissingTarget),
    ];
    for (play, kind) in cases {
        let err = play_card(&mut state, 0, &play).unwrap_err();
        assert_eq!(err, DomainError::InvalidTarget(kind.clone(), err_detail(&err)));
    }
    assert_eq!(state.players[0].hand.len(), 1);
}

fn err_detail(err: &DomainError) -> String {
    match err {
        DomainError::InvalidTarget(_, d) | DomainError::Validation(_, d) => d.clone(),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn gauge_reveals_types_but_never_faces() {
    let mut state = two_player();
    state.players[1].dice[2] = die(5000, DieType::D8, 2);
    let cards = set_hand(&mut state, 0, &[CardType::Gauge]);
    let play = CardPlay {
        additional_data: Some(CardExtra {
            second_player_id: Some(1),
            second_die_index: Some(2),
            ..CardExtra::default()
        }),
        ..at(cards[0].id, 1, 0)
    };
    let events = play_card(&mut state, 0, &play).unwrap();
    let (_, _, private) = played(&events);
    let CardResult::Gauged { dice } = private else {
        panic!("expected gauge result");
    };
    assert_eq!(dice[0].die_type, DieType::D6);
    assert_eq!(dice[1].die_type, DieType::D8);
    let knowledge = private_info(&state, 0).unwrap().knowledge;
    assert_eq!(knowledge.len(), 2);
    assert!(knowledge.iter().all(|k| k.face.is_none()));
}

#[test]
fn gauge_needs_two_distinct_dice() {
    let mut state = two_player();
    let cards = set_hand(&mut state, 0, &[CardType::Gauge]);
    let play = CardPlay {
        additional_data: Some(CardExtra {
            second_player_id: Some(1),
            second_die_index: Some(0),
            ..CardExtra::default()
        }),
        ..at(cards[0].id, 1, 0)
    };
    let err = play_card(&mut state, 0, &play).unwrap_err();
    assert!(matches!(err, DomainError::InvalidTarget(TargetKind::DuplicateDie, _)));
}

#[test]
fn false_tell_looks_like_a_peek_and_reveals_nothing() {
    let mut state = two_player();
    let cards = set_hand(&mut state, 0, &[CardType::FalseTell]);
    let events = play_card(&mut state, 0, &bare(cards[0].id)).unwrap();
    let (shown, target, private) = played(&events);
    assert_eq!((shown, target), (CardType::Peek, Some(1)));
    assert_eq!(
        private,
        CardResult::FalseTell {
            shown_target: Some(1)
        }
    );
    assert!(state.players[0].knowledge.is_empty());
}

#[test]
fn inflation_is_a_reaction_and_caps_at_total_dice() {
    let mut state = two_player();
    place_bid(&mut state, 0, 5, 3).unwrap();
    let cards = set_hand(&mut state, 0, &[CardType::Inflation, CardType::Inflation]);

    play_card(&mut state, 0, &bare(cards[0].id)).unwrap();
    assert_eq!(state.current_bid.map(|b| b.quantity), Some(6));
    assert_eq!(state.round_bids.last().map(|b| b.quantity), Some(6));

    let events = play_card(&mut state, 0, &bare(cards[1].id)).unwrap();
    assert!(matches!(played(&events).2, CardResult::Fizzled { .. }));
    assert_eq!(state.current_bid.map(|b| b.quantity), Some(6));
    assert!(state.players[0].hand.is_empty());
}

#[test]
fn reaction_cards_cannot_be_played_on_your_own_turn() {
    let mut state = two_player();
    place_bid(&mut state, 0, 2, 3).unwrap();
    let cards = set_hand(&mut state, 1, &[CardType::Inflation]);
    let err = play_card(&mut state, 1, &bare(cards[0].id)).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::CardTimingMismatch, _)
    ));
}

#[test]
fn wild_shift_changes_only_the_face() {
    let mut state = two_player();
    place_bid(&mut state, 0, 2, 3).unwrap();
    let cards = set_hand(&mut state, 0, &[CardType::WildShift]);
    let with_face = |face| CardPlay {
        additional_data: Some(CardExtra {
            face: Some(face),
            ..CardExtra::default()
        }),
        ..bare(cards[0].id)
    };

    for face in [3, 0, 7] {
        let err = play_card(&mut state, 0, &with_face(face)).unwrap_err();
        assert!(
            matches!(err, DomainError::InvalidTarget(TargetKind::InvalidFace, _)),
            "{face}"
        );
    }
    play_card(&mut state, 0, &with_face(5)).unwrap();
    let bid = state.current_bid.unwrap();
    assert_eq!((bid.quantity, bid.face, bid.player), (2, 5, 0));
}

#[test]
fn bid_cards_need_a_current_bid() {
    let mut state = two_player();
    state.turn = Some(1);
    let cards = set_hand(&mut state, 0, &[CardType::Inflation]);
    let err = play_card(&mut state, 0, &bare(cards[0].id)).unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::NoCurrentBid, _)));
}

#[test]
fn polish_upgrades_with_a_fresh_id_and_fizzles_at_d10() {
    let mut state = two_player();
    state.players[0].dice[1] = die(5000, DieType::D10, 4);
    let cards = set_hand(&mut state, 0, &[CardType::Polish, CardType::Polish]);
    let old_id = state.players[0].dice[0].id;

    let play = CardPlay {
        card_id: cards[0].id,
        target_die_id: Some(old_id),
        ..CardPlay::default()
    };
    play_card(&mut state, 0, &play).unwrap();
    let new = state.players[0].dice[0];
    assert_eq!(new.die_type, DieType::D8);
    assert_ne!(new.id, old_id);

    let play = CardPlay {
        card_id: cards[1].id,
        target_die_id: Some(5000),
        ..CardPlay::default()
    };
    let events = play_card(&mut state, 0, &play).unwrap();
    assert!(matches!(played(&events).2, CardResult::Fizzled { .. }));
    assert_eq!(state.players[0].dice[1].id, 5000);
    assert!(state.players[0].hand.is_empty());
}

#[test]
fn reroll_only_touches_own_dice() {
    let mut state = two_player();
    let cards = set_hand(&mut state, 0, &[CardType::Reroll]);
    let play = CardPlay {
        card_id: cards[0].id,
        target_die_id: Some(state.players[1].dice[0].id),
        ..CardPlay::default()
    };
    let err = play_card(&mut state, 0, &play).unwrap_err();
    assert!(matches!(err, DomainError::InvalidTarget(TargetKind::DieNotOwned, _)));

    let play = CardPlay {
        card_id: cards[0].id,
        target_die_index: Some(2),
        ..CardPlay::default()
    };
    let before = state.players[0].dice[2];
    play_card(&mut state, 0, &play).unwrap();
    let after = state.players[0].dice[2];
    assert_eq!(after.die_type, before.die_type);
    assert_ne!(after.id, before.id);
}

#[test]
fn crack_downgrades_and_drops_stale_knowledge() {
    let mut state = two_player();
    let cards = set_hand(&mut state, 0, &[CardType::Peek, CardType::Crack]);
    play_card(&mut state, 0, &at(cards[0].id, 1, 0)).unwrap();
    assert_eq!(state.players[0].knowledge.len(), 1);

    let events = play_card(&mut state, 0, &at(cards[1].id, 1, 0)).unwrap();
    assert_eq!(
        played(&events).2,
        CardResult::OpponentDieChanged {
            owner: 1,
            die_index: 0,
            die_type: DieType::D4
        }
    );
    let cracked = state.players[1].dice[0];
    assert_eq!(cracked.die_type, DieType::D4);
    // The peeked face is stale; only the new type is known.
    assert_eq!(state.players[0].knowledge.len(), 1);
    let known = &state.players[0].knowledge[0];
    assert_eq!(known.owner, 1);
    assert_eq!(known.die_id, cracked.id);
    assert_eq!(known.die_type, DieType::D4);
    assert_eq!(known.face, None);
}

#[test]
fn crack_fizzles_on_a_d3() {
    let mut state = two_player();
    state.players[1].dice[0] = die(5000, DieType::D3, 2);
    let cards = set_hand(&mut state, 0, &[CardType::Crack]);
    let events = play_card(&mut state, 0, &at(cards[0].id, 1, 0)).unwrap();
    assert!(matches!(played(&events).2, CardResult::Fizzled { .. }));
    assert_eq!(state.players[1].dice[0].id, 5000);
}

#[test]
fn blind_swap_exchanges_dice_under_fresh_ids() {
    let mut state = two_player();
    state.players[1].dice[1] = die(5000, DieType::D10, 3);
    let cards = set_hand(&mut state, 0, &[CardType::BlindSwap]);
    let ids_before: Vec<u32> = state
        .players
        .iter()
        .flat_map(|p| p.dice.iter().map(|d| d.id))
        .collect();

    play_card(&mut state, 0, &at(cards[0].id, 1, 1)).unwrap();

    assert_eq!(state.players[0].dice.len(), 3);
    assert_eq!(state.players[1].dice.len(), 3);
    assert!(state.players[0].dice.iter().any(|d| d.die_type == DieType::D10 && d.face == 3));
    let moved = state.players[1].dice[1];
    assert_eq!(moved.die_type, DieType::D6);
    assert!(!ids_before.contains(&moved.id));
    let fresh = state.players[0]
        .dice
        .iter()
        .find(|d| d.die_type == DieType::D10)
        .unwrap();
    assert!(!ids_before.contains(&fresh.id));

    let known: Vec<_> = state.players[0]
        .knowledge
        .iter()
        .filter(|k| k.owner == 1)
        .collect();
    assert_eq!(known.len(), 1);
    assert_eq!(known[0].die_id, moved.id);
    assert_eq!(known[0].die_type, moved.die_type);
    assert_eq!(known[0].face, Some(moved.face));
}

#[test]
fn on_dudo_cards_belong_to_the_caller_and_target() {
    let mut state = game_with_dice(&[&[2, 3], &[5, 6], &[4, 4]]);
    place_bid(&mut state, 0, 2, 3).unwrap();
    call_dudo(&mut state, 1, false).unwrap();
    assert_eq!(state.phase, Phase::DudoCalled);

    let insurance = set_hand(&mut state, 1, &[CardType::Insurance]);
    play_card(&mut state, 1, &bare(insurance[0].id)).unwrap();
    assert!(state.players[1].effects.insurance);

    let bystander = set_hand(&mut state, 2, &[CardType::Insurance]);
    let err = play_card(&mut state, 2, &bare(bystander[0].id)).unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::PhaseMismatch, _)));
}

#[test]
fn unknown_card_and_paused_game_are_rejected() {
    let mut state = two_player();
    let err = play_card(&mut state, 0, &bare(12345)).unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::CardNotInHand, _)));

    let cards = set_hand(&mut state, 0, &[CardType::PhantomBid]);
    state.paused_from = Some(Phase::Bidding);
    state.phase = Phase::Paused;
    let err = play_card(&mut state, 0, &bare(cards[0].id)).unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::GamePaused, _)));
    assert!(!state.players[0].effects.phantom_bid);
}

#[test]
fn effect_cards_arm_flags_without_ending_the_turn() {
    let mut state = two_player();
    let cards = set_hand(
        &mut state,
        0,
        &[CardType::PhantomBid, CardType::LateChallenge],
    );
    play_card(&mut state, 0, &bare(cards[0].id)).unwrap();
    play_card(&mut state, 0, &bare(cards[1].id)).unwrap();
    let fx = state.players[0].effects;
    assert!(fx.phantom_bid && fx.late_challenge);
    assert_eq!(state.turn, Some(0));
}
