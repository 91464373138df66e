//! Property tests for bid ordering (pure domain).
//!
//! Contract:
//! - Every option from `legal_bid_options` raises the current bid and fits the table
//! - Every well-formed bid that raises is among those options
//! - The raise relation never accepts the same bid twice in a row

use proptest::prelude::*;

use crate::domain::bidding::{bid_raises, is_well_formed, legal_bid_options, place_bid};
use crate::domain::state::Bid;
use crate::domain::test_prelude;
use crate::domain::test_state_helpers::game_with_dice;

fn any_bid(max_q: u8) -> impl Strategy<Value = Bid> {
    (1..=max_q, 1u8..=6).prop_map(|(quantity, face)| Bid {
        player: 0,
        quantity,
        face,
    })
}

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    #[test]
    fn prop_legal_options_all_raise(prev in any_bid(20), total in 1u8..=30) {
        for (q, f) in legal_bid_options(Some(&prev), total) {
            prop_assert!(is_well_formed(q, f, total));
            prop_assert!(bid_raises(&prev, q, f), "{q}x{f} after {prev:?}");
        }
    }

    #[test]
    fn prop_every_raise_is_listed(prev in any_bid(20), q in 1u8..=30, f in 1u8..=6, total in 1u8..=30) {
        let listed = legal_bid_options(Some(&prev), total).contains(&(q, f));
        let expected = is_well_formed(q, f, total) && bid_raises(&prev, q, f);
        prop_assert_eq!(listed, expected);
    }

    #[test]
    fn prop_no_bid_raises_itself(prev in any_bid(20)) {
        prop_assert!(!bid_raises(&prev, prev.quantity, prev.face));
    }

    /// Feeding the minimum raise repeatedly always succeeds until the table is exhausted.
    #[test]
    fn prop_min_raise_chain_is_accepted(start_face in 1u8..=6, steps in 1usize..12) {
        let mut state = game_with_dice(&[&[2, 3, 4, 5], &[6, 6, 1, 2], &[3, 3, 4, 4]]);
        let total = state.total_dice();
        let mut seat = 0u8;
        place_bid(&mut state, seat, 1, start_face).unwrap();
        for _ in 0..steps {
            seat = state.turn.unwrap();
            let options = legal_bid_options(state.current_bid.as_ref(), total);
            let Some(&(q, f)) = options.iter().min_by_key(|(q, f)| (*q, *f)) else {
                break;
            };
            prop_assert!(place_bid(&mut state, seat, q, f).is_ok());
        }
        prop_assert!(state.round_bids.windows(2).all(|w| bid_raises(&w[0], w[1].quantity, w[1].face)));
    }
}
