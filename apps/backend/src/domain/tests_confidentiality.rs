//! Nothing hidden leaks into the public snapshot before a reveal.

use proptest::prelude::*;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::ai::opponent_model::OpponentModel;
use crate::domain::engine::{apply_action, GameAction};
use crate::domain::player_view::AiGameContext;
use crate::domain::snapshot::public_state;
use crate::domain::state::Phase;
use crate::domain::test_prelude;
use crate::domain::test_state_helpers::seated_lobby;

fn assert_no_hidden_fields(json: &str) {
    for key in ["\"dice\"", "\"face\"", "\"dieType\"", "\"cardType\"", "\"hand\"", "\"effects\"", "\"knowledge\""] {
        assert!(!json.contains(key), "public state leaked {key}: {json}");
    }
}

#[test]
fn lobby_and_first_round_snapshots_carry_counts_only() {
    let mut state = seated_lobby(3);
    for seat in 0..3 {
        apply_action(&mut state, seat, &GameAction::ReadyForRound).unwrap();
    }
    let public = public_state(&state);
    assert!(public.players.iter().all(|p| p.dice_count == 5 && p.card_count == 1));
    assert_eq!(public.total_dice, 15);
    assert_no_hidden_fields(&serde_json::to_string(&public).unwrap());
}

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    /// Random legal play up to the first call: the snapshot never leaks.
    #[test]
    fn prop_public_state_never_leaks_before_a_call(seed in any::<u64>(), seats in 2u8..=6) {
        let mut state = seated_lobby(seats);
        for seat in 0..seats {
            apply_action(&mut state, seat, &GameAction::ReadyForRound).unwrap();
        }
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let models = OpponentModel::default();

        for _ in 0..40 {
            if state.phase != Phase::Bidding {
                break;
            }
            let json = serde_json::to_string(&public_state(&state)).unwrap();
            assert_no_hidden_fields(&json);

            let seat = state.turn.unwrap();
            let ctx = AiGameContext::build(&state, seat, &models).unwrap();
            let mut actions: Vec<GameAction> = ctx
                .legal_bids()
                .into_iter()
                .take(6)
                .map(|(quantity, face)| GameAction::MakeBid { quantity, face })
                .collect();
            actions.extend(ctx.legal_card_plays().into_iter().take(3).map(GameAction::PlayCard));
            let Some(action) = actions.choose(&mut rng).cloned() else {
                break;
            };
            prop_assert!(apply_action(&mut state, seat, &action).is_ok(), "{action:?}");
        }
    }
}
