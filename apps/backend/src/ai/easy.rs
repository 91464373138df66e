//! Easy AI - near-uniform random play.
//!
//! Picks among legal actions at random with a small pull toward faces it can
//! see in its own dice, and plays cards at random when a window is open.

use parking_lot::Mutex;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use async_trait::async_trait;

use super::decision::{AiAction, Decision};
use super::trait_def::{AiError, AiPlayer};
use crate::domain::bidding::min_quantity_for_face;
use crate::domain::player_view::AiGameContext;

/// Chance of reaching for a card when one is playable on our turn.
const CARD_CHANCE: f64 = 0.25;
/// Chance of reacting with a card outside our turn.
const REACT_CHANCE: f64 = 0.15;
const DUDO_CHANCE: f64 = 0.2;
const JONTI_CHANCE: f64 = 0.05;
/// Chance that a bid names a face taken from our own dice.
const OWN_FACE_BIAS: f64 = 0.6;

pub struct Easy {
    rng: Mutex<ChaCha8Rng>,
}

impl Easy {
    pub const NAME: &'static str = "Easy";
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

    /// Random legal action, synchronous. Also the driver's recovery move when a
    /// stronger tier proposes something the engine rejects.
    pub fn decide_now(&self, ctx: &AiGameContext) -> Result<Decision, AiError> {
        let mut rng = self.rng.lock();

        let cards = ctx.legal_card_plays();
        if !cards.is_empty() && rng.random_bool(CARD_CHANCE) {
            if let Some(play) = cards.choose(&mut *rng) {
                return Ok(Decision::card(play.clone(), 0.2).because("random card"));
            }
        }

        if ctx.can_call_dudo() {
            let roll: f64 = rng.random();
            if roll < JONTI_CHANCE {
                return Ok(Decision::new(AiAction::Jonti, 0.1).because("random jonti"));
            }
            if roll < JONTI_CHANCE + DUDO_CHANCE {
                return Ok(Decision::dudo(0.3).because("random dudo"));
            }
        }

        let bids = ctx.legal_bids();
        if bids.is_empty() {
            if ctx.can_call_dudo() {
                return Ok(Decision::dudo(0.5).because("no room to raise"));
            }
            return Err(AiError::InvalidMove("No legal action available".into()));
        }

        if rng.random_bool(OWN_FACE_BIAS) {
            if let Some(die) = ctx.my_dice().choose(&mut *rng) {
                let face = die.face;
                let min = min_quantity_for_face(ctx.current_bid().as_ref(), face).max(1);
                if min <= ctx.total_dice() {
                    let extra = rng.random_range(0..=1u8);
                    let quantity = (min + extra).min(ctx.total_dice());
                    return Ok(Decision::bid(quantity, face, 0.3).because("own face"));
                }
            }
        }

        // Prefer the low end of each face's range so bids stay plausible.
        let low: Vec<(u8, u8)> = bids
            .iter()
            .copied()
            .filter(|&(q, f)| q <= min_quantity_for_face(ctx.current_bid().as_ref(), f).max(1) + 1)
            .collect();
        let pool = if low.is_empty() { &bids } else { &low };
        let (quantity, face) = pool
            .choose(&mut *rng)
            .copied()
            .ok_or_else(|| AiError::Internal("Failed to choose random bid".into()))?;
        Ok(Decision::bid(quantity, face, 0.2).because("random bid"))
    }
}

#[async_trait]
impl AiPlayer for Easy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn make_decision(&self, ctx: &AiGameContext) -> Result<Decision, AiError> {
        self.decide_now(ctx)
    }

    async fn react(&self, ctx: &AiGameContext) -> Result<Option<Decision>, AiError> {
        let cards = ctx.legal_card_plays();
        if cards.is_empty() {
            return Ok(None);
        }
        let mut rng = self.rng.lock();
        if !rng.random_bool(REACT_CHANCE) {
            return Ok(None);
        }
        Ok(cards
            .choose(&mut *rng)
            .map(|play| Decision::card(play.clone(), 0.2).because("random reaction")))
    }
}
