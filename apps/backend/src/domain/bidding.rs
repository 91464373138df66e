//! Bid ordering and bid placement.
//!
//! Raises follow standard Perudo math: a non-wild bid needs a higher quantity
//! or the same quantity on a higher face; switching to 1s needs half the
//! quantity (rounded up); switching away from 1s needs double plus one.

use tracing::debug;

use crate::domain::effects::Effect;
use crate::domain::events::DomainEvent;
use crate::domain::rules::{is_valid_face, MAX_FACE, WILD_FACE};
use crate::domain::state::{Bid, GameState, Phase, PlayerId};
use crate::errors::domain::{DomainError, ValidationKind};

/// Smallest quantity on `face` that raises `prev`.
///
/// With no previous bid any quantity of at least one opens the round.
pub fn min_quantity_for_face(prev: Option<&Bid>, face: u8) -> u8 {
    let Some(prev) = prev else {
        return 1;
    };
    let q = prev.quantity;
    match (prev.face == WILD_FACE, face == WILD_FACE) {
        (false, false) if face > prev.face => q,
        (false, false) => q.saturating_add(1),
        (false, true) => q.div_ceil(2).max(1),
        (true, true) => q.saturating_add(1),
        (true, false) => q.saturating_mul(2).saturating_add(1),
    }
}

/// Does `(quantity, face)` strictly exceed `prev`?
pub fn bid_raises(prev: &Bid, quantity: u8, face: u8) -> bool {
    quantity >= min_quantity_for_face(Some(prev), face)
}

/// Quantity within `1..=total_dice` and face within `1..=6`.
pub fn is_well_formed(quantity: u8, face: u8, total_dice: u8) -> bool {
    quantity >= 1 && quantity <= total_dice && is_valid_face(face)
}

/// Every `(quantity, face)` that would be accepted without a phantom bid.
pub fn legal_bid_options(current: Option<&Bid>, total_dice: u8) -> Vec<(u8, u8)> {
    let mut out = Vec::new();
    for face in WILD_FACE..=MAX_FACE {
        let min = min_quantity_for_face(current, face);
        for quantity in min.max(1)..=total_dice {
            out.push((quantity, face));
        }
    }
    out
}

/// Lowest legal quantity per face, skipping faces that cannot be raised.
pub fn minimal_raises(current: Option<&Bid>, total_dice: u8) -> Vec<(u8, u8)> {
    (WILD_FACE..=MAX_FACE)
        .filter_map(|face| {
            let q = min_quantity_for_face(current, face).max(1);
            (q <= total_dice).then_some((q, face))
        })
        .collect()
}

fn ensure_bidding_turn(state: &GameState, who: PlayerId) -> Result<(), DomainError> {
    match state.phase {
        Phase::Bidding => {}
        Phase::Paused => {
            return Err(DomainError::validation(
                ValidationKind::GamePaused,
                "Game is paused",
            ))
        }
        other => {
            return Err(DomainError::validation(
                ValidationKind::PhaseMismatch,
                format!("Cannot bid during {other:?}"),
            ))
        }
    }
    if state.turn != Some(who) {
        return Err(DomainError::validation(
            ValidationKind::OutOfTurn,
            format!("It is not seat {who}'s turn"),
        ));
    }
    Ok(())
}

/// Place a bid for `who`, advancing the turn.
///
/// A held phantom-bid flag lets exactly one non-raising (but well-formed)
/// bid through; a bid that raises anyway leaves the flag alone.
pub fn place_bid(
    state: &mut GameState,
    who: PlayerId,
    quantity: u8,
    face: u8,
) -> Result<Vec<DomainEvent>, DomainError> {
    ensure_bidding_turn(state, who)?;

    let total = state.total_dice();
    if !is_well_formed(quantity, face, total) {
        return Err(DomainError::validation(
            ValidationKind::InvalidBid,
            format!("Bid {quantity}x{face} is outside 1..={total} dice and faces 1..=6"),
        ));
    }

    let raises = state
        .current_bid
        .as_ref()
        .map(|prev| bid_raises(prev, quantity, face))
        .unwrap_or(true);

    let mut phantom = false;
    if !raises {
        let holds_phantom = state.player(who)?.effects.phantom_bid;
        if !holds_phantom {
            let min = min_quantity_for_face(state.current_bid.as_ref(), face);
            return Err(DomainError::validation(
                ValidationKind::InvalidBid,
                format!("Bid {quantity}x{face} must be at least {min}x{face}"),
            ));
        }
        state.player_mut(who)?.effects.consume(Effect::PhantomBid);
        phantom = true;
    }

    let bid = Bid {
        player: who,
        quantity,
        face,
    };
    state.previous_bid = state.current_bid.replace(bid);
    state.round_bids.push(bid);
    state.turn = state.next_active_after(who);

    debug!(seat = who, quantity, face, phantom, "Bid placed");
    Ok(vec![DomainEvent::BidMade { bid, phantom }])
}
