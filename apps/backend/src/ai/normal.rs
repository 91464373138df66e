//! Normal AI - naive binomial heuristic.
//!
//! Treats every hidden die as a fair d6: a non-wild face matches with 1/3
//! (the face or a wild), a bid on 1s with 1/6. Own dice count exactly; leaked
//! information and die sizes are ignored.

use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use async_trait::async_trait;

use super::decision::{AiAction, Decision};
use super::trait_def::{AiError, AiPlayer};
use crate::domain::bidding::min_quantity_for_face;
use crate::domain::card_play::CardPlay;
use crate::domain::cards_types::{CardType, Timing};
use crate::domain::dice::bid_faces;
use crate::domain::player_view::AiGameContext;
use crate::domain::rules::WILD_FACE;

/// Challenge when the bid exceeds the naive expectation by more than this.
pub const DUDO_MARGIN: f64 = 1.0;
/// Jonti is considered when the bid sits this close to the expectation.
const JONTI_WINDOW: f64 = 0.5;
const JONTI_CHANCE: f64 = 0.15;

/// Per-die match chance under the fair-d6 assumption.
pub fn naive_match_probability(face: u8) -> f64 {
    if face == WILD_FACE {
        1.0 / 6.0
    } else {
        1.0 / 3.0
    }
}

fn face_matches(die_face: u8, face: u8) -> bool {
    die_face == face || (face != WILD_FACE && die_face == WILD_FACE)
}

/// Own matches plus the naive expectation over `hidden` unseen dice.
pub fn naive_expected(own_faces: &[u8], hidden: usize, face: u8) -> f64 {
    let own = own_faces.iter().filter(|&&f| face_matches(f, face)).count();
    own as f64 + hidden as f64 * naive_match_probability(face)
}

/// What the naive heuristic does with a hand and a table.
///
/// Shared by the Normal tier and by ISMCTS rollouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NaiveMove {
    Raise { quantity: u8, face: u8 },
    Challenge,
}

/// `current` is `(quantity, face)`; `can_challenge` is false when there is no
/// bid or the bid is ours.
pub fn naive_move(
    own_faces: &[u8],
    total_dice: u8,
    current: Option<(u8, u8)>,
    can_challenge: bool,
) -> NaiveMove {
    let hidden = (total_dice as usize).saturating_sub(own_faces.len());
    let prev = current.map(|(quantity, face)| crate::domain::state::Bid {
        player: 0,
        quantity,
        face,
    });

    if let Some((quantity, face)) = current {
        let expected = naive_expected(own_faces, hidden, face);
        if can_challenge && quantity as f64 > expected + DUDO_MARGIN {
            return NaiveMove::Challenge;
        }
    }

    // Best face: the most headroom between expectation and the minimum raise.
    let best = bid_faces()
        .filter_map(|face| {
            let q = min_quantity_for_face(prev.as_ref(), face).max(1);
            (q <= total_dice).then(|| (q, face, naive_expected(own_faces, hidden, face) - q as f64))
        })
        .max_by(|a, b| a.2.total_cmp(&b.2).then(a.1.cmp(&b.1)));

    match best {
        Some((quantity, face, headroom)) if headroom > -DUDO_MARGIN || !can_challenge => {
            NaiveMove::Raise { quantity, face }
        }
        _ if can_challenge => NaiveMove::Challenge,
        _ => NaiveMove::Raise {
            quantity: 1,
            face: WILD_FACE,
        },
    }
}

pub struct Normal {
    rng: Mutex<ChaCha8Rng>,
}

impl Normal {
    pub const NAME: &'static str = "Normal";
    pub const VERSION: &'static str = "1.0.0";

    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    fn own_faces(ctx: &AiGameContext) -> Vec<u8> {
        ctx.my_dice().iter().map(|d| d.face).collect()
    }

    fn expected(ctx: &AiGameContext, face: u8) -> f64 {
        let own = Self::own_faces(ctx);
        let hidden = (ctx.total_dice() as usize).saturating_sub(own.len());
        naive_expected(&own, hidden, face)
    }

    fn find_play(ctx: &AiGameContext, card_type: CardType) -> Option<CardPlay> {
        let card = ctx
            .playable_cards()
            .into_iter()
            .find(|c| c.card_type == card_type)?;
        ctx.card_plays(&card).into_iter().next()
    }

    /// Cards played when a threshold is crossed, never speculatively.
    fn threshold_card(ctx: &AiGameContext) -> Option<Decision> {
        match ctx.private.timing? {
            Timing::OnTurn => {
                let bid = ctx.current_bid()?;
                let gap = bid.quantity as f64 - Self::expected(ctx, bid.face);
                // Too close to call: look before deciding.
                if gap.abs() <= DUDO_MARGIN {
                    if let Some(play) = Self::find_play(ctx, CardType::Peek) {
                        return Some(Decision::card(play, 0.5).because("bid is borderline; peek"));
                    }
                }
                None
            }
            Timing::OnDudo => {
                let pending = ctx.pending()?;
                if pending.caller == ctx.seat {
                    return Self::find_play(ctx, CardType::Insurance)
                        .map(|p| Decision::card(p, 0.6).because("insure the call"));
                }
                let gap = Self::expected(ctx, pending.bid.face) - pending.bid.quantity as f64;
                if pending.target == ctx.seat && gap >= DUDO_MARGIN {
                    return Self::find_play(ctx, CardType::DoubleChallenge)
                        .map(|p| Decision::card(p, 0.6).because("bid looks solid; double"));
                }
                None
            }
            Timing::Reaction | Timing::Any => None,
        }
    }
}

#[async_trait]
impl AiPlayer for Normal {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn make_decision(&self, ctx: &AiGameContext) -> Result<Decision, AiError> {
        if !ctx.is_my_turn() {
            return Err(AiError::InvalidMove("Not this seat's turn".into()));
        }
        if let Some(card) = Self::threshold_card(ctx) {
            return Ok(card);
        }

        let own = Self::own_faces(ctx);
        let current = ctx.current_bid().map(|b| (b.quantity, b.face));
        let can_challenge = ctx.can_call_dudo();

        if let Some(bid) = ctx.current_bid() {
            let gap = (bid.quantity as f64 - Self::expected(ctx, bid.face)).abs();
            if ctx.can_call_jonti()
                && gap <= JONTI_WINDOW
                && self.rng.lock().random_bool(JONTI_CHANCE)
            {
                return Ok(
                    Decision::new(AiAction::Jonti, 0.3).because("bid sits on the expectation")
                );
            }
        }

        match naive_move(&own, ctx.total_dice(), current, can_challenge) {
            NaiveMove::Challenge if can_challenge => {
                Ok(Decision::dudo(0.6).because("bid exceeds naive expectation"))
            }
            NaiveMove::Raise { quantity, face }
                if ctx.legal_bids().contains(&(quantity, face)) =>
            {
                Ok(Decision::bid(quantity, face, 0.5).because("best naive headroom"))
            }
            _ => {
                if can_challenge {
                    Ok(Decision::dudo(0.4).because("no sensible raise"))
                } else {
                    Err(AiError::InvalidMove("No legal action available".into()))
                }
            }
        }
    }

    async fn react(&self, ctx: &AiGameContext) -> Result<Option<Decision>, AiError> {
        Ok(Self::threshold_card(ctx))
    }
}
