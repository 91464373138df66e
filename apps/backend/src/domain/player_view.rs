//! Player view of game state - what information is visible to one seat.
//!
//! `PrivateInfo` is the owner-only payload sent next to every public update.
//! `AiGameContext` is what an AI strategy decides from: the public snapshot,
//! its own private payload, and its opponent model. It is an owned copy, so a
//! search can run on it off-lock while the live game moves on.

use serde::{Deserialize, Serialize};

use crate::ai::opponent_model::OpponentModel;
use crate::domain::bidding::{legal_bid_options, min_quantity_for_face};
use crate::domain::card_play::{CardExtra, CardPlay};
use crate::domain::cards_types::{can_play_card, Card, CardType, Timing};
use crate::domain::dice::{Die, DieType};
use crate::domain::effects::ActiveEffects;
use crate::domain::rules::{MAX_FACE, WILD_FACE};
use crate::domain::snapshot::{public_state, PublicGameState};
use crate::domain::state::{Bid, Difficulty, GameState, PendingCall, Phase, PlayerId};
use crate::errors::domain::DomainError;

/// A leaked fact about someone else's die, addressed the way clients address it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnownDieView {
    pub owner: PlayerId,
    pub die_index: usize,
    pub die_type: DieType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face: Option<u8>,
}

/// Owner-only payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateInfo {
    pub player: PlayerId,
    pub dice: Vec<Die>,
    pub cards: Vec<Card>,
    pub effects: ActiveEffects,
    pub knowledge: Vec<KnownDieView>,
    /// Card window currently open for this seat.
    pub timing: Option<Timing>,
}

/// Build `player`'s private payload.
pub fn private_info(state: &GameState, player: PlayerId) -> Result<PrivateInfo, DomainError> {
    let me = state.player(player)?;
    let knowledge = me
        .knowledge
        .iter()
        .filter_map(|k| {
            let owner = state.player(k.owner).ok()?;
            let die_index = owner.dice.iter().position(|d| d.id == k.die_id)?;
            Some(KnownDieView {
                owner: k.owner,
                die_index,
                die_type: k.die_type,
                face: k.face,
            })
        })
        .collect();
    Ok(PrivateInfo {
        player,
        dice: me.dice.clone(),
        cards: me.hand.clone(),
        effects: me.effects,
        knowledge,
        timing: state.current_timing(player),
    })
}

/// Information visible to an AI at a decision point.
///
/// Use the helper methods instead of re-implementing rules: everything they
/// return passes validation against the state the context was built from.
#[derive(Debug, Clone)]
pub struct AiGameContext {
    pub seat: PlayerId,
    pub difficulty: Option<Difficulty>,
    pub public: PublicGameState,
    pub private: PrivateInfo,
    pub opponents: OpponentModel,
}

impl AiGameContext {
    pub fn build(
        state: &GameState,
        seat: PlayerId,
        opponents: &OpponentModel,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            seat,
            difficulty: state.player(seat)?.difficulty(),
            public: public_state(state),
            private: private_info(state, seat)?,
            opponents: opponents.clone(),
        })
    }

    pub fn phase(&self) -> Phase {
        self.public.phase
    }

    pub fn version(&self) -> u64 {
        self.public.version
    }

    pub fn current_bid(&self) -> Option<Bid> {
        self.public.current_bid
    }

    pub fn previous_bid(&self) -> Option<Bid> {
        self.public.previous_bid
    }

    pub fn pending(&self) -> Option<PendingCall> {
        self.public.pending_call
    }

    pub fn total_dice(&self) -> u8 {
        self.public.total_dice
    }

    pub fn my_dice(&self) -> &[Die] {
        &self.private.dice
    }

    pub fn my_cards(&self) -> &[Card] {
        &self.private.cards
    }

    pub fn effects(&self) -> ActiveEffects {
        self.private.effects
    }

    pub fn is_my_turn(&self) -> bool {
        self.public.phase == Phase::Bidding && self.public.turn == Some(self.seat)
    }

    /// Non-eliminated opponents with at least one die.
    pub fn live_opponents(&self) -> impl Iterator<Item = &crate::domain::snapshot::PublicPlayer> {
        self.public
            .players
            .iter()
            .filter(move |p| p.id != self.seat && !p.eliminated && p.dice_count > 0)
    }

    /// Opponent dice split into what this seat knows about them.
    ///
    /// Each hidden die appears once: known ones with their leaked type and
    /// (maybe) face, the rest as `None`.
    pub fn opponent_dice(&self) -> Vec<(PlayerId, Option<KnownDieView>)> {
        let mut out = Vec::new();
        for p in self.live_opponents() {
            for i in 0..p.dice_count as usize {
                let known = self
                    .private
                    .knowledge
                    .iter()
                    .find(|k| k.owner == p.id && k.die_index == i)
                    .copied();
                out.push((p.id, known));
            }
        }
        out
    }

    /// Bids that raise the current bid (or open the round) and fit the table.
    pub fn legal_bids(&self) -> Vec<(u8, u8)> {
        if !self.is_my_turn() {
            return Vec::new();
        }
        legal_bid_options(self.current_bid().as_ref(), self.total_dice())
    }

    /// Shape-valid non-raising bids, usable only while phantom bid is held.
    pub fn phantom_bids(&self) -> Vec<(u8, u8)> {
        if !self.is_my_turn() || !self.private.effects.phantom_bid {
            return Vec::new();
        }
        let Some(current) = self.current_bid() else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for face in WILD_FACE..=MAX_FACE {
            let min = min_quantity_for_face(Some(&current), face);
            for q in 1..min.min(self.total_dice().saturating_add(1)) {
                out.push((q, face));
            }
        }
        out
    }

    pub fn can_call_dudo(&self) -> bool {
        self.is_my_turn()
            && self
                .current_bid()
                .map(|b| b.player != self.seat)
                .unwrap_or(false)
    }

    pub fn can_call_late_dudo(&self) -> bool {
        self.is_my_turn()
            && self.private.effects.late_challenge
            && self
                .previous_bid()
                .map(|b| b.player != self.seat)
                .unwrap_or(false)
    }

    pub fn can_call_jonti(&self) -> bool {
        self.can_call_dudo()
    }

    /// Cards in hand whose timing matches the open window.
    pub fn playable_cards(&self) -> Vec<Card> {
        let Some(timing) = self.private.timing else {
            return Vec::new();
        };
        self.private
            .cards
            .iter()
            .filter(|c| can_play_card(c, timing))
            .copied()
            .collect()
    }

    /// Every fully-targeted play of `card` that would pass validation.
    pub fn card_plays(&self, card: &Card) -> Vec<CardPlay> {
        let base = CardPlay {
            card_id: card.id,
            ..CardPlay::default()
        };
        let opponent_targets = || {
            self.live_opponents()
                .flat_map(|p| (0..p.dice_count as usize).map(move |i| (p.id, i)))
                .collect::<Vec<_>>()
        };
        match card.card_type {
            CardType::FalseTell
            | CardType::PhantomBid
            | CardType::Insurance
            | CardType::DoubleChallenge
            | CardType::LateChallenge => vec![base],
            CardType::Inflation => {
                if self.current_bid().is_some() {
                    vec![base]
                } else {
                    Vec::new()
                }
            }
            CardType::WildShift => match self.current_bid() {
                Some(bid) => (WILD_FACE..=MAX_FACE)
                    .filter(|&f| f != bid.face)
                    .map(|f| CardPlay {
                        additional_data: Some(CardExtra {
                            face: Some(f),
                            ..CardExtra::default()
                        }),
                        ..base.clone()
                    })
                    .collect(),
                None => Vec::new(),
            },
            CardType::Peek | CardType::Crack | CardType::BlindSwap => {
                if card.card_type == CardType::BlindSwap && self.private.dice.is_empty() {
                    return Vec::new();
                }
                opponent_targets()
                    .into_iter()
                    .map(|(owner, i)| CardPlay {
                        target_player_id: Some(owner),
                        target_die_index: Some(i),
                        ..base.clone()
                    })
                    .collect()
            }
            CardType::Reroll | CardType::Polish => self
                .private
                .dice
                .iter()
                .map(|d| CardPlay {
                    target_player_id: Some(self.seat),
                    target_die_id: Some(d.id),
                    ..base.clone()
                })
                .collect(),
            CardType::Gauge => {
                let targets = opponent_targets();
                targets
                    .windows(2)
                    .map(|w| CardPlay {
                        target_player_id: Some(w[0].0),
                        target_die_index: Some(w[0].1),
                        additional_data: Some(CardExtra {
                            second_player_id: Some(w[1].0),
                            second_die_index: Some(w[1].1),
                            ..CardExtra::default()
                        }),
                        ..base.clone()
                    })
                    .collect()
            }
        }
    }

    /// All card plays available right now.
    pub fn legal_card_plays(&self) -> Vec<CardPlay> {
        self.playable_cards()
            .iter()
            .flat_map(|c| self.card_plays(c))
            .collect()
    }
}
