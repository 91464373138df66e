//! Card-effect application.
//!
//! Every play is validated in full before anything mutates: the card must be
//! in hand, the timing window must match, and targets must resolve. Opponent
//! dice are addressed by index and translated here; an opponent die id from a
//! client is never trusted.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::cards_types::{can_play_card, Card, CardId, CardType};
use crate::domain::dice::DieId;
use crate::domain::effects::Effect;
use crate::domain::events::{CardResult, DomainEvent, GaugedDie};
use crate::domain::rules::is_valid_face;
use crate::domain::state::{GameState, KnownDie, Phase, PlayerId};
use crate::errors::domain::{DomainError, NotFoundKind, TargetKind, ValidationKind};

/// Extra parameters for cards that need more than one target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardExtra {
    /// New face for Wild Shift.
    #[serde(default)]
    pub face: Option<u8>,
    /// Second die for Gauge.
    #[serde(default)]
    pub second_player_id: Option<PlayerId>,
    #[serde(default)]
    pub second_die_index: Option<usize>,
}

/// A `play_card` request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPlay {
    pub card_id: CardId,
    #[serde(default)]
    pub target_player_id: Option<PlayerId>,
    /// Accepted for the caster's own dice only.
    #[serde(default)]
    pub target_die_id: Option<DieId>,
    #[serde(default)]
    pub target_die_index: Option<usize>,
    #[serde(default)]
    pub additional_data: Option<CardExtra>,
}

/// Validated effect, ready to apply.
#[derive(Debug, Clone, Copy)]
enum Plan {
    Peek { owner: PlayerId, index: usize },
    Gauge { dice: [(PlayerId, usize); 2] },
    FalseTell,
    Inflation,
    WildShift { face: u8 },
    Arm(Effect),
    Reroll { index: usize },
    Polish { index: usize },
    Crack { owner: PlayerId, index: usize },
    BlindSwap { owner: PlayerId, index: usize },
}

fn target_err(kind: TargetKind, detail: impl Into<String>) -> DomainError {
    DomainError::invalid_target(kind, detail)
}

/// A die on a live player, by index.
fn resolve_die_ref(
    state: &GameState,
    owner: Option<PlayerId>,
    index: Option<usize>,
) -> Result<(PlayerId, usize), DomainError> {
    let owner = owner.ok_or_else(|| target_err(TargetKind::MissingTarget, "No target player"))?;
    let player = state.player(owner)?;
    if player.eliminated {
        return Err(target_err(
            TargetKind::PlayerEliminated,
            format!("Seat {owner} is eliminated"),
        ));
    }
    if player.dice.is_empty() {
        return Err(target_err(
            TargetKind::NoDice,
            format!("Seat {owner} has no dice"),
        ));
    }
    let index = index.ok_or_else(|| target_err(TargetKind::MissingTarget, "No target die"))?;
    if index >= player.dice.len() {
        return Err(target_err(
            TargetKind::DieIndexOutOfRange,
            format!("Seat {owner} has {} dice", player.dice.len()),
        ));
    }
    Ok((owner, index))
}

fn resolve_opponent_die(
    state: &GameState,
    who: PlayerId,
    play: &CardPlay,
) -> Result<(PlayerId, usize), DomainError> {
    match play.target_player_id {
        Some(owner) if owner == who => {
            return Err(target_err(
                TargetKind::SelfTarget,
                "This card targets an opponent",
            ))
        }
        None => return Err(target_err(TargetKind::MissingTarget, "No target player")),
        _ => {}
    }
    if play.target_die_index.is_none() && play.target_die_id.is_some() {
        return Err(target_err(
            TargetKind::OpponentDieById,
            "Opponent dice are addressed by index",
        ));
    }
    resolve_die_ref(state, play.target_player_id, play.target_die_index)
}

fn resolve_own_die(
    state: &GameState,
    who: PlayerId,
    play: &CardPlay,
) -> Result<usize, DomainError> {
    if let Some(owner) = play.target_player_id {
        if owner != who {
            return Err(target_err(
                TargetKind::DieNotOwned,
                "This card targets one of your own dice",
            ));
        }
    }
    let me = state.player(who)?;
    if me.dice.is_empty() {
        return Err(target_err(TargetKind::NoDice, "You have no dice"));
    }
    if let Some(id) = play.target_die_id {
        return me
            .dice
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| target_err(TargetKind::DieNotOwned, format!("Die {id} is not yours")));
    }
    match play.target_die_index {
        Some(i) if i < me.dice.len() => Ok(i),
        Some(_) => Err(target_err(
            TargetKind::DieIndexOutOfRange,
            format!("You have {} dice", me.dice.len()),
        )),
        None => Err(target_err(TargetKind::MissingTarget, "No target die")),
    }
}

fn require_current_bid(state: &GameState) -> Result<(), DomainError> {
    if state.current_bid.is_none() {
        return Err(DomainError::validation(
            ValidationKind::NoCurrentBid,
            "This card needs a current bid",
        ));
    }
    Ok(())
}

fn plan_effect(
    state: &GameState,
    who: PlayerId,
    card: &Card,
    play: &CardPlay,
) -> Result<Plan, DomainError> {
    let extra = play.additional_data.clone().unwrap_or_default();
    let plan = match card.card_type {
        CardType::Peek => {
            let (owner, index) = resolve_opponent_die(state, who, play)?;
            Plan::Peek { owner, index }
        }
        CardType::Gauge => {
            let first = resolve_die_ref(state, play.target_player_id, play.target_die_index)?;
            let second = resolve_die_ref(state, extra.second_player_id, extra.second_die_index)?;
            if first == second {
                return Err(target_err(
                    TargetKind::DuplicateDie,
                    "Gauge needs two different dice",
                ));
            }
            Plan::Gauge {
                dice: [first, second],
            }
        }
        CardType::FalseTell => Plan::FalseTell,
        CardType::Inflation => {
            require_current_bid(state)?;
            Plan::Inflation
        }
        CardType::WildShift => {
            require_current_bid(state)?;
            let face = extra
                .face
                .ok_or_else(|| target_err(TargetKind::MissingTarget, "Wild Shift needs a face"))?;
            let current = state.current_bid.map(|b| b.face);
            if !is_valid_face(face) || current == Some(face) {
                return Err(target_err(
                    TargetKind::InvalidFace,
                    format!("Face {face} is not a valid new face"),
                ));
            }
            Plan::WildShift { face }
        }
        CardType::PhantomBid => Plan::Arm(Effect::PhantomBid),
        CardType::Insurance => Plan::Arm(Effect::Insurance),
        CardType::DoubleChallenge => Plan::Arm(Effect::DoubleChallenge),
        CardType::LateChallenge => Plan::Arm(Effect::LateChallenge),
        CardType::Reroll => Plan::Reroll {
            index: resolve_own_die(state, who, play)?,
        },
        CardType::Polish => Plan::Polish {
            index: resolve_own_die(state, who, play)?,
        },
        CardType::Crack => {
            let (owner, index) = resolve_opponent_die(state, who, play)?;
            Plan::Crack { owner, index }
        }
        CardType::BlindSwap => {
            let (owner, index) = resolve_opponent_die(state, who, play)?;
            if state.player(who)?.dice.is_empty() {
                return Err(target_err(TargetKind::NoDice, "You have no dice to swap"));
            }
            Plan::BlindSwap { owner, index }
        }
    };
    Ok(plan)
}

/// Play a card from `who`'s hand.
pub fn play_card(
    state: &mut GameState,
    who: PlayerId,
    play: &CardPlay,
) -> Result<Vec<DomainEvent>, DomainError> {
    if state.phase == Phase::Paused {
        return Err(DomainError::validation(
            ValidationKind::GamePaused,
            "Game is paused",
        ));
    }
    let timing = state.current_timing(who).ok_or_else(|| {
        DomainError::validation(
            ValidationKind::PhaseMismatch,
            format!("No card window is open for seat {who} during {:?}", state.phase),
        )
    })?;

    let card = state
        .player(who)?
        .hand
        .iter()
        .find(|c| c.id == play.card_id)
        .copied()
        .ok_or_else(|| {
            DomainError::validation(
                ValidationKind::CardNotInHand,
                format!("Card {} is not in your hand", play.card_id),
            )
        })?;

    if !can_play_card(&card, timing) {
        return Err(DomainError::validation(
            ValidationKind::CardTimingMismatch,
            format!("{} cannot be played as {timing:?}", card.card_type),
        ));
    }

    let plan = plan_effect(state, who, &card, play)?;

    {
        let me = state.player_mut(who)?;
        me.hand.retain(|c| c.id != card.id);
    }
    state.deck.discard(card);

    let (shown_as, shown_target, private) = apply_plan(state, who, plan)?;
    debug!(seat = who, card = %card.card_type, ?shown_target, "Card played");
    Ok(vec![DomainEvent::CardPlayed {
        player: who,
        shown_as,
        shown_target,
        private,
    }])
}

fn apply_plan(
    state: &mut GameState,
    who: PlayerId,
    plan: Plan,
) -> Result<(CardType, Option<PlayerId>, CardResult), DomainError> {
    let out = match plan {
        Plan::Peek { owner, index } => {
            let die = state.player(owner)?.dice[index];
            learn(state, who, owner, die.id, die.die_type, Some(die.face))?;
            (
                CardType::Peek,
                Some(owner),
                CardResult::Peeked {
                    owner,
                    die_index: index,
                    die_type: die.die_type,
                    face: die.face,
                },
            )
        }
        Plan::Gauge { dice } => {
            let mut gauged = Vec::with_capacity(2);
            for (owner, index) in dice {
                let die = state.player(owner)?.dice[index];
                if owner != who {
                    learn(state, who, owner, die.id, die.die_type, None)?;
                }
                gauged.push(GaugedDie {
                    owner,
                    die_index: index,
                    die_type: die.die_type,
                });
            }
            (CardType::Gauge, None, CardResult::Gauged { dice: gauged })
        }
        Plan::FalseTell => {
            let candidates: Vec<PlayerId> = state
                .active_players()
                .filter(|p| p.id != who && !p.dice.is_empty())
                .map(|p| p.id)
                .collect();
            let shown = if candidates.is_empty() {
                None
            } else {
                let i = state.rng.random_range(0..candidates.len());
                Some(candidates[i])
            };
            (
                CardType::Peek,
                shown,
                CardResult::FalseTell {
                    shown_target: shown,
                },
            )
        }
        Plan::Inflation => {
            let total = state.total_dice();
            let Some(mut bid) = state.current_bid else {
                return Err(DomainError::validation(
                    ValidationKind::NoCurrentBid,
                    "This card needs a current bid",
                ));
            };
            if bid.quantity >= total {
                let reason = "Bid already covers every die in play".to_string();
                (CardType::Inflation, Some(bid.player), CardResult::Fizzled { reason })
            } else {
                bid.quantity += 1;
                replace_current_bid(state, bid);
                (CardType::Inflation, Some(bid.player), CardResult::BidChanged { bid })
            }
        }
        Plan::WildShift { face } => {
            let Some(mut bid) = state.current_bid else {
                return Err(DomainError::validation(
                    ValidationKind::NoCurrentBid,
                    "This card needs a current bid",
                ));
            };
            bid.face = face;
            replace_current_bid(state, bid);
            (CardType::WildShift, Some(bid.player), CardResult::BidChanged { bid })
        }
        Plan::Arm(effect) => {
            state.player_mut(who)?.effects.set(effect);
            let card = match effect {
                Effect::Insurance => CardType::Insurance,
                Effect::DoubleChallenge => CardType::DoubleChallenge,
                Effect::PhantomBid => CardType::PhantomBid,
                Effect::LateChallenge => CardType::LateChallenge,
            };
            (card, None, CardResult::EffectArmed)
        }
        Plan::Reroll { index } => {
            let old = state.player(who)?.dice[index];
            let GameState {
                players, mint, rng, ..
            } = &mut *state;
            let new = mint.roll(old.die_type, rng);
            set_die(players, who, index, new)?;
            state.forget_die(old.id);
            (CardType::Reroll, None, CardResult::DieReplaced { old, new })
        }
        Plan::Polish { index } => {
            let old = state.player(who)?.dice[index];
            match old.die_type.upgrade() {
                Some(next) => {
                    let GameState {
                        players, mint, rng, ..
                    } = &mut *state;
                    let new = mint.roll(next, rng);
                    set_die(players, who, index, new)?;
                    state.forget_die(old.id);
                    (CardType::Polish, None, CardResult::DieReplaced { old, new })
                }
                None => (
                    CardType::Polish,
                    None,
                    CardResult::Fizzled {
                        reason: format!("{} is already the largest die", old.die_type),
                    },
                ),
            }
        }
        Plan::Crack { owner, index } => {
            let old = state.player(owner)?.dice[index];
            match old.die_type.downgrade() {
                Some(prev) => {
                    let GameState {
                        players, mint, rng, ..
                    } = &mut *state;
                    let new = mint.roll(prev, rng);
                    set_die(players, owner, index, new)?;
                    state.forget_die(old.id);
                    learn(state, who, owner, new.id, prev, None)?;
                    (
                        CardType::Crack,
                        Some(owner),
                        CardResult::OpponentDieChanged {
                            owner,
                            die_index: index,
                            die_type: prev,
                        },
                    )
                }
                None => (
                    CardType::Crack,
                    Some(owner),
                    CardResult::Fizzled {
                        reason: format!("{} is already the smallest die", old.die_type),
                    },
                ),
            }
        }
        Plan::BlindSwap { owner, index } => {
            let own_len = state.player(who)?.dice.len();
            let own_index = state.rng.random_range(0..own_len);
            let theirs = state.player(owner)?.dice[index];
            let mine = state.player(who)?.dice[own_index];
            let GameState { players, mint, .. } = &mut *state;
            let to_me = mint.reissue(&theirs);
            let to_them = mint.reissue(&mine);
            set_die(players, who, own_index, to_me)?;
            set_die(players, owner, index, to_them)?;
            state.forget_die(theirs.id);
            state.forget_die(mine.id);
            // The caster still knows the die they handed over.
            learn(state, who, owner, to_them.id, to_them.die_type, Some(to_them.face))?;
            (
                CardType::BlindSwap,
                Some(owner),
                CardResult::Swapped {
                    owner,
                    die_index: index,
                },
            )
        }
    };
    Ok(out)
}

fn set_die(
    players: &mut [crate::domain::state::PlayerState],
    owner: PlayerId,
    index: usize,
    die: crate::domain::dice::Die,
) -> Result<(), DomainError> {
    let player = players
        .iter_mut()
        .find(|p| p.id == owner)
        .ok_or_else(|| DomainError::not_found(NotFoundKind::Player, format!("seat {owner}")))?;
    let slot = player.dice.get_mut(index).ok_or_else(|| {
        target_err(TargetKind::DieIndexOutOfRange, format!("die {index} of seat {owner}"))
    })?;
    *slot = die;
    Ok(())
}

fn learn(
    state: &mut GameState,
    who: PlayerId,
    owner: PlayerId,
    die_id: DieId,
    die_type: crate::domain::dice::DieType,
    face: Option<u8>,
) -> Result<(), DomainError> {
    let me = state.player_mut(who)?;
    match me.knowledge.iter_mut().find(|k| k.die_id == die_id) {
        Some(existing) => {
            existing.die_type = die_type;
            existing.face = face.or(existing.face);
        }
        None => me.knowledge.push(KnownDie {
            owner,
            die_id,
            die_type,
            face,
        }),
    }
    Ok(())
}

/// Swap the current bid in place, keeping the round history in step.
fn replace_current_bid(state: &mut GameState, bid: crate::domain::state::Bid) {
    if let Some(last) = state.round_bids.last_mut() {
        *last = bid;
    }
    state.current_bid = Some(bid);
}
