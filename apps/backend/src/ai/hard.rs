//! Hard AI - exact probabilities and expected value.
//!
//! P(bid holds) comes from the exact match distribution over the real dice
//! (own faces, leaked faces and sizes, everything else as d6). The bidder's
//! observed bluff rate shifts that probability through Bayes' rule, weighted
//! by how much evidence backs the rate. The action with the best expected dice
//! swing wins.
//!
//! Deterministic: same context, same decision.

use async_trait::async_trait;
use tracing::trace;

use super::decision::{AiAction, Decision};
use super::probability::{beliefs_for, DieBelief, MatchDistribution};
use super::trait_def::{AiError, AiPlayer};
use crate::domain::bidding::min_quantity_for_face;
use crate::domain::card_play::CardPlay;
use crate::domain::cards_types::{CardType, Timing};
use crate::domain::dice::bid_faces;
use crate::domain::player_view::AiGameContext;
use crate::domain::state::{Bid, PlayerId};

/// Chance that the next player challenges whatever we bid.
const CHALLENGE_RISK: f64 = 0.5;
/// Hold probability band where an information card is worth more than guessing.
const UNCERTAIN: (f64, f64) = (0.3, 0.7);
const DOUBLE_THRESHOLD: f64 = 0.6;
const WEAK_BID: f64 = 0.3;
/// Extra quantities above the minimum raise that are scored.
const RAISE_SPREAD: u8 = 2;

/// Fold an observed bluff rate into the raw hold probability.
///
/// `rate` is the bidder's bluff rate, `confidence` how much to trust it.
pub fn adjust_for_bluffing(p: f64, rate: f64, confidence: f64) -> f64 {
    let honest = p * (1.0 - rate);
    let denom = honest + (1.0 - p) * rate;
    let posterior = if denom > 0.0 { honest / denom } else { p };
    ((1.0 - confidence) * p + confidence * posterior).clamp(0.0, 1.0)
}

/// One table view, computed once per decision.
struct Assessment {
    beliefs: Vec<DieBelief>,
    total: u8,
}

impl Assessment {
    fn new(ctx: &AiGameContext) -> Self {
        Self {
            beliefs: beliefs_for(ctx),
            total: ctx.total_dice(),
        }
    }

    fn distribution(&self, face: u8) -> MatchDistribution {
        MatchDistribution::for_dice(&self.beliefs, face)
    }

    fn holds(&self, quantity: u8, face: u8) -> f64 {
        self.distribution(face).at_least(quantity as usize)
    }

    fn exact(&self, quantity: u8, face: u8) -> f64 {
        self.distribution(face).exactly(quantity as usize)
    }

    /// Hold probability of someone else's bid after the bluff prior.
    fn bid_holds(&self, ctx: &AiGameContext, bid: &Bid) -> f64 {
        let raw = self.holds(bid.quantity, bid.face);
        let (rate, confidence) = ctx.opponents.bluff_prior(bid.player);
        adjust_for_bluffing(raw, rate, confidence)
    }

    fn unknown_dice(&self) -> usize {
        self.beliefs
            .iter()
            .filter(|b| !matches!(b, DieBelief::Known(_)))
            .count()
    }
}

#[derive(Debug, Clone, Copy)]
struct Scored {
    action: ScoredAction,
    ev: f64,
    confidence: f64,
}

#[derive(Debug, Clone, Copy)]
enum ScoredAction {
    Bid(u8, u8),
    Dudo { late: bool },
    Jonti,
}

pub struct Hard;

impl Hard {
    pub const NAME: &'static str = "Hard";
    pub const VERSION: &'static str = "1.0.0";

    pub fn new() -> Self {
        Self
    }

    /// Candidate raises: the minimum per face plus a couple of steps above it,
    /// and any phantom bids the seat may place.
    fn candidate_bids(ctx: &AiGameContext) -> Vec<(u8, u8)> {
        let legal = ctx.legal_bids();
        let current = ctx.current_bid();
        let mut out: Vec<(u8, u8)> = legal
            .iter()
            .copied()
            .filter(|&(q, f)| q <= min_quantity_for_face(current.as_ref(), f).max(1) + RAISE_SPREAD)
            .collect();
        out.extend(ctx.phantom_bids());
        out
    }

    fn score_actions(ctx: &AiGameContext, table: &Assessment) -> Vec<Scored> {
        let mut scored = Vec::new();
        let insured = ctx.effects().insurance;

        if ctx.can_call_dudo() {
            if let Some(bid) = ctx.current_bid() {
                let p = table.bid_holds(ctx, &bid);
                let loss = if insured { 0.0 } else { 1.0 };
                scored.push(Scored {
                    action: ScoredAction::Dudo { late: false },
                    ev: (1.0 - p) - p * loss,
                    confidence: 1.0 - p,
                });
                let exact = table.exact(bid.quantity, bid.face);
                scored.push(Scored {
                    action: ScoredAction::Jonti,
                    ev: 2.0 * exact - 1.0,
                    confidence: exact,
                });
            }
        }
        if ctx.can_call_late_dudo() {
            if let Some(prev) = ctx.previous_bid() {
                let p = table.bid_holds(ctx, &prev);
                let loss = if insured { 0.0 } else { 1.0 };
                scored.push(Scored {
                    action: ScoredAction::Dudo { late: true },
                    ev: (1.0 - p) - p * loss,
                    confidence: 1.0 - p,
                });
            }
        }
        for (q, f) in Self::candidate_bids(ctx) {
            let p = table.holds(q, f);
            scored.push(Scored {
                action: ScoredAction::Bid(q, f),
                ev: -(1.0 - p) * CHALLENGE_RISK,
                confidence: p,
            });
        }
        scored
    }

    fn pick(scored: &[Scored]) -> Option<Scored> {
        scored.iter().copied().max_by(|a, b| {
            a.ev.total_cmp(&b.ev).then_with(|| match (a.action, b.action) {
                // Among equal bids prefer the smaller commitment.
                (ScoredAction::Bid(qa, fa), ScoredAction::Bid(qb, fb)) => {
                    qb.cmp(&qa).then(fa.cmp(&fb))
                }
                _ => std::cmp::Ordering::Equal,
            })
        })
    }

    fn find_card(
        ctx: &AiGameContext,
        card_type: CardType,
    ) -> Option<crate::domain::cards_types::Card> {
        ctx.playable_cards()
            .into_iter()
            .find(|c| c.card_type == card_type)
    }

    /// First opponent die this seat knows nothing about.
    fn unknown_target(ctx: &AiGameContext, plays: Vec<CardPlay>) -> Option<CardPlay> {
        plays.into_iter().find(|p| {
            let (Some(owner), Some(idx)) = (p.target_player_id, p.target_die_index) else {
                return false;
            };
            !ctx
                .private
                .knowledge
                .iter()
                .any(|k| k.owner == owner && k.die_index == idx && k.face.is_some())
        })
    }

    /// Card heuristics. Shared with ChuckNorris, which searches only over
    /// bids and calls.
    pub fn choose_card(ctx: &AiGameContext) -> Option<Decision> {
        let timing = ctx.private.timing?;
        let table = Assessment::new(ctx);
        match timing {
            Timing::OnTurn => Self::turn_card(ctx, &table),
            Timing::Reaction => Self::reaction_card(ctx, &table),
            Timing::OnDudo => Self::challenge_card(ctx, &table),
            Timing::Any => None,
        }
    }

    fn turn_card(ctx: &AiGameContext, table: &Assessment) -> Option<Decision> {
        let bid = ctx.current_bid();
        let p_current = bid.map(|b| table.bid_holds(ctx, &b));

        // Late Challenge: the bid before is weak while the current one is not.
        if let (Some(prev), Some(p_now)) = (ctx.previous_bid(), p_current) {
            if prev.player != ctx.seat && !ctx.effects().late_challenge {
                let p_prev = table.bid_holds(ctx, &prev);
                if p_prev < WEAK_BID && p_now > 0.5 {
                    if let Some(card) = Self::find_card(ctx, CardType::LateChallenge) {
                        let play = ctx.card_plays(&card).into_iter().next()?;
                        return Some(
                            Decision::card(play, 1.0 - p_prev).because("previous bid is weak"),
                        );
                    }
                }
            }
        }

        if let Some(p) = p_current {
            if p > UNCERTAIN.0 && p < UNCERTAIN.1 && table.unknown_dice() > 0 {
                if let Some(card) = Self::find_card(ctx, CardType::Peek) {
                    if let Some(play) = Self::unknown_target(ctx, ctx.card_plays(&card)) {
                        return Some(Decision::card(play, 0.5).because("uncertain; peek"));
                    }
                }
                if let Some(card) = Self::find_card(ctx, CardType::Gauge) {
                    if let Some(play) = ctx.card_plays(&card).into_iter().next() {
                        return Some(Decision::card(play, 0.4).because("uncertain; gauge"));
                    }
                }
                // About to lean on a challenge: shrink an opponent die first.
                if p < 0.5 {
                    if let Some(card) = Self::find_card(ctx, CardType::Crack) {
                        if let Some(play) = Self::unknown_target(ctx, ctx.card_plays(&card)) {
                            return Some(Decision::card(play, 0.4).because("crack before dudo"));
                        }
                    }
                }
            }
        }

        // Phantom Bid: every honest raise is a long shot but the bid stands.
        if let Some(p) = p_current {
            if p > DOUBLE_THRESHOLD && !ctx.effects().phantom_bid {
                let best_raise = ctx
                    .legal_bids()
                    .into_iter()
                    .map(|(q, f)| table.holds(q, f))
                    .fold(0.0_f64, f64::max);
                if best_raise < WEAK_BID {
                    if let Some(card) = Self::find_card(ctx, CardType::PhantomBid) {
                        let play = ctx.card_plays(&card).into_iter().next()?;
                        return Some(Decision::card(play, 0.5).because("no safe raise"));
                    }
                }
            }
        }

        // Improve a die that does not support our best face.
        let target_face = Self::best_face(table);
        let weak_die = ctx
            .my_dice()
            .iter()
            .find(|d| !d.matches(target_face))
            .copied();
        if let Some(die) = weak_die {
            for (card_type, why) in [
                (CardType::Polish, "upgrade a dead die"),
                (CardType::Reroll, "reroll a dead die"),
            ] {
                if let Some(card) = Self::find_card(ctx, card_type) {
                    if let Some(play) = ctx
                        .card_plays(&card)
                        .into_iter()
                        .find(|p| p.target_die_id == Some(die.id))
                    {
                        return Some(Decision::card(play, 0.4).because(why));
                    }
                }
            }
        }
        None
    }

    fn reaction_card(ctx: &AiGameContext, table: &Assessment) -> Option<Decision> {
        let bid = ctx.current_bid()?;
        if bid.player == ctx.seat {
            return None;
        }
        let p = table.bid_holds(ctx, &bid);

        if let Some(card) = Self::find_card(ctx, CardType::WildShift) {
            // Move the bid onto the face least likely to hold at that quantity.
            let worst = ctx
                .card_plays(&card)
                .into_iter()
                .filter_map(|play| {
                    let face = play.additional_data.as_ref()?.face?;
                    Some((play, table.holds(bid.quantity, face)))
                })
                .min_by(|a, b| a.1.total_cmp(&b.1));
            if let Some((play, p_shifted)) = worst {
                if p_shifted < WEAK_BID && p_shifted < p {
                    return Some(
                        Decision::card(play, 1.0 - p_shifted).because("shift to a weak face"),
                    );
                }
            }
        }
        if p > UNCERTAIN.0 && p < 0.6 && bid.quantity < table.total {
            if let Some(card) = Self::find_card(ctx, CardType::Inflation) {
                let p_inflated = table.holds(bid.quantity + 1, bid.face);
                if p_inflated < WEAK_BID {
                    let play = ctx.card_plays(&card).into_iter().next()?;
                    return Some(
                        Decision::card(play, 1.0 - p_inflated).because("inflate into a bluff"),
                    );
                }
            }
        }
        None
    }

    fn challenge_card(ctx: &AiGameContext, table: &Assessment) -> Option<Decision> {
        let pending = ctx.pending()?;
        if pending.caller == ctx.seat && !ctx.effects().insurance {
            if let Some(card) = Self::find_card(ctx, CardType::Insurance) {
                let play = ctx.card_plays(&card).into_iter().next()?;
                return Some(Decision::card(play, 0.7).because("insure the call"));
            }
        }
        if pending.target == ctx.seat && !ctx.effects().double_challenge {
            let p = table.holds(pending.bid.quantity, pending.bid.face);
            if p > DOUBLE_THRESHOLD {
                if let Some(card) = Self::find_card(ctx, CardType::DoubleChallenge) {
                    let play = ctx.card_plays(&card).into_iter().next()?;
                    return Some(Decision::card(play, p).because("bid holds; double the stake"));
                }
            }
        }
        None
    }

    /// Face with the highest expected matches (ties to the higher face).
    fn best_face(table: &Assessment) -> u8 {
        bid_faces()
            .map(|f| (f, table.distribution(f).expected()))
            .max_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(f, _)| f)
            .unwrap_or(crate::domain::rules::MAX_FACE)
    }

    /// Bid/call decision without cards.
    pub fn decide_call_or_bid(ctx: &AiGameContext) -> Result<Decision, AiError> {
        let table = Assessment::new(ctx);
        let scored = Self::score_actions(ctx, &table);
        let best = Self::pick(&scored)
            .ok_or_else(|| AiError::InvalidMove("No legal action available".into()))?;
        trace!(seat = ctx.seat, candidates = scored.len(), ev = best.ev, "Hard scored actions");
        let decision = match best.action {
            ScoredAction::Bid(q, f) => Decision::bid(q, f, best.confidence).because("best EV raise"),
            ScoredAction::Dudo { late } => {
                let why = if late {
                    "previous bid is a bluff"
                } else {
                    "bid is likely a bluff"
                };
                Decision::new(AiAction::Dudo { late }, best.confidence).because(why)
            }
            ScoredAction::Jonti => {
                Decision::new(AiAction::Jonti, best.confidence).because("exact count is likely")
            }
        };
        Ok(decision)
    }

    pub fn decide(ctx: &AiGameContext) -> Result<Decision, AiError> {
        if !ctx.is_my_turn() {
            return Err(AiError::InvalidMove("Not this seat's turn".into()));
        }
        if let Some(card) = Self::choose_card(ctx) {
            return Ok(card);
        }
        Self::decide_call_or_bid(ctx)
    }

    /// Probability that `player`'s bid of `quantity`×`face` holds, from `ctx`'s view.
    pub fn hold_probability(ctx: &AiGameContext, player: PlayerId, quantity: u8, face: u8) -> f64 {
        let table = Assessment::new(ctx);
        table.bid_holds(
            ctx,
            &Bid {
                player,
                quantity,
                face,
            },
        )
    }
}

impl Default for Hard {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiPlayer for Hard {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn make_decision(&self, ctx: &AiGameContext) -> Result<Decision, AiError> {
        Self::decide(ctx)
    }

    async fn react(&self, ctx: &AiGameContext) -> Result<Option<Decision>, AiError> {
        Ok(Self::choose_card(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::opponent_model::OpponentModel;
    use crate::domain::cards_types::CardType;
    use crate::domain::challenge::{ChallengeResult, RevealedHand, RoundOutcome};
    use crate::domain::dice::{Die, DieType};
    use crate::domain::engine::apply_action;
    use crate::domain::state::{CallKind, PendingCall, Phase};
    use crate::domain::test_state_helpers::{game_with_dice, set_hand};

    fn bid(player: PlayerId, quantity: u8, face: u8) -> Bid {
        Bid {
            player,
            quantity,
            face,
        }
    }

    #[test]
    fn bluff_adjustment_is_neutral_without_evidence() {
        assert!((adjust_for_bluffing(0.42, 0.5, 1.0) - 0.42).abs() < 1e-12);
        assert!((adjust_for_bluffing(0.42, 0.9, 0.0) - 0.42).abs() < 1e-12);
        assert!(adjust_for_bluffing(0.6, 0.8, 0.5) < 0.6);
        assert!(adjust_for_bluffing(0.6, 0.1, 0.5) > 0.6);
    }

    #[tokio::test]
    async fn challenges_an_impossible_bid() {
        let mut state = game_with_dice(&[&[2, 2, 2], &[3, 4, 5]]);
        state.current_bid = Some(bid(1, 5, 6));
        let ctx = AiGameContext::build(&state, 0, &OpponentModel::default()).unwrap();
        let d = Hard::new().make_decision(&ctx).await.unwrap();
        assert_eq!(d.action, AiAction::Dudo { late: false });
    }

    #[tokio::test]
    async fn raises_a_bid_it_can_see_on_its_own_dice() {
        let mut state = game_with_dice(&[&[4, 4, 4, 1], &[3, 2, 5]]);
        state.current_bid = Some(bid(1, 2, 4));
        let ctx = AiGameContext::build(&state, 0, &OpponentModel::default()).unwrap();
        let d = Hard::new().make_decision(&ctx).await.unwrap();
        assert!(matches!(d.action, AiAction::Bid { .. }), "{d:?}");
        let mut s = state.clone();
        assert!(apply_action(&mut s, 0, &d.into_game_action()).is_ok());
    }

    #[tokio::test]
    async fn known_bluffer_gets_challenged_sooner() {
        let mut state = game_with_dice(&[&[2, 3, 5], &[1, 4, 6, 2, 3]]);
        state.current_bid = Some(bid(1, 3, 6));
        let honest = OpponentModel::default();
        let mut bluffer = OpponentModel::default();
        let reveal = RoundOutcome::Dudo(ChallengeResult {
            caller: 0,
            target: 1,
            bid: bid(1, 1, 2),
            true_count: 0,
            success: true,
            loser: 1,
            dice_lost: 1,
            insurance_used: false,
            doubled: false,
            late: false,
            reveal: vec![RevealedHand {
                player: 1,
                dice: vec![Die {
                    id: 1,
                    die_type: DieType::D6,
                    face: 3,
                }],
            }],
        });
        for round in 1..=30 {
            bluffer.observe_bid(round, &bid(1, 6, 6), None);
            bluffer.observe_outcome(round, &reveal);
        }
        let p_honest = Hard::hold_probability(
            &AiGameContext::build(&state, 0, &honest).unwrap(),
            1,
            3,
            6,
        );
        let p_bluffer = Hard::hold_probability(
            &AiGameContext::build(&state, 0, &bluffer).unwrap(),
            1,
            3,
            6,
        );
        assert!(p_bluffer < p_honest);
    }

    #[tokio::test]
    async fn insures_its_call_and_doubles_a_solid_bid() {
        let mut state = game_with_dice(&[&[3, 3, 3], &[3, 1]]);
        let b = bid(0, 2, 3);
        state.current_bid = Some(b);
        state.pending = Some(PendingCall {
            kind: CallKind::Dudo,
            caller: 1,
            target: 0,
            bid: b,
            late: false,
        });
        state.phase = Phase::DudoCalled;
        set_hand(&mut state, 0, &[CardType::DoubleChallenge]);
        set_hand(&mut state, 1, &[CardType::Insurance]);

        let target = AiGameContext::build(&state, 0, &OpponentModel::default()).unwrap();
        let d = Hard::new().react(&target).await.unwrap().unwrap();
        assert!(apply_action(&mut state.clone(), 0, &d.into_game_action()).is_ok());

        let caller = AiGameContext::build(&state, 1, &OpponentModel::default()).unwrap();
        let d = Hard::new().react(&caller).await.unwrap().unwrap();
        assert!(apply_action(&mut state, 1, &d.into_game_action()).is_ok());
    }

    #[tokio::test]
    async fn decision_is_deterministic() {
        let mut state = game_with_dice(&[&[2, 5, 6], &[1, 3, 3], &[4, 4]]);
        state.current_bid = Some(bid(2, 2, 4));
        let ctx = AiGameContext::build(&state, 0, &OpponentModel::default()).unwrap();
        let a = Hard::new().make_decision(&ctx).await.unwrap();
        let b = Hard::new().make_decision(&ctx).await.unwrap();
        assert_eq!(a, b);
    }
}
