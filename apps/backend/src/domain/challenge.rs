//! Dudo (challenge) and Jonti (exact call): opening a call and resolving it.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::dice::{count_matches, Die, DieType};
use crate::domain::effects::Effect;
use crate::domain::events::DomainEvent;
use crate::domain::round::{apply_dice_loss, finish_round};
use crate::domain::state::{Bid, CallKind, GameState, PendingCall, Phase, PlayerId};
use crate::errors::domain::{DomainError, NotFoundKind, ValidationKind};

/// One player's dice, shown to everyone at resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedHand {
    pub player: PlayerId,
    pub dice: Vec<Die>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResult {
    pub caller: PlayerId,
    pub target: PlayerId,
    pub bid: Bid,
    pub true_count: u8,
    /// True when the bid was a bluff.
    pub success: bool,
    pub loser: PlayerId,
    pub dice_lost: u8,
    pub insurance_used: bool,
    pub doubled: bool,
    pub late: bool,
    pub reveal: Vec<RevealedHand>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExactCallResult {
    pub caller: PlayerId,
    pub bid: Bid,
    pub true_count: u8,
    /// True only when the count equals the bid quantity exactly.
    pub success: bool,
    /// +1 bonus die, 0 when already at the ceiling, -1 on failure.
    pub dice_delta: i8,
    pub reveal: Vec<RevealedHand>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RoundOutcome {
    Dudo(ChallengeResult),
    Jonti(ExactCallResult),
}

impl RoundOutcome {
    pub fn reveal(&self) -> &[RevealedHand] {
        match self {
            RoundOutcome::Dudo(r) => &r.reveal,
            RoundOutcome::Jonti(r) => &r.reveal,
        }
    }

    pub fn bid(&self) -> Bid {
        match self {
            RoundOutcome::Dudo(r) => r.bid,
            RoundOutcome::Jonti(r) => r.bid,
        }
    }

    /// How many revealed dice count toward `face`.
    pub fn count_for(&self, face: u8) -> u8 {
        count_matches(self.reveal().iter().flat_map(|h| h.dice.iter()), face)
    }

    /// Revealed die sizes per player.
    pub fn die_types_of(&self, player: PlayerId) -> Vec<DieType> {
        self.reveal()
            .iter()
            .find(|h| h.player == player)
            .map(|h| h.dice.iter().map(|d| d.die_type).collect())
            .unwrap_or_default()
    }
}

fn ensure_call_turn(state: &GameState, who: PlayerId) -> Result<(), DomainError> {
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
                format!("Cannot call during {other:?}"),
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

fn open_call(
    state: &mut GameState,
    kind: CallKind,
    caller: PlayerId,
    bid: Bid,
    late: bool,
) -> DomainEvent {
    let pending = PendingCall {
        kind,
        caller,
        target: bid.player,
        bid,
        late,
    };
    state.pending = Some(pending);
    state.phase = match kind {
        CallKind::Dudo => Phase::DudoCalled,
        CallKind::Jonti => Phase::JontiCalled,
    };
    DomainEvent::CallMade {
        kind,
        caller,
        target: bid.player,
        bid,
        late,
    }
}

/// Challenge the current bid, or with `late` the one before it.
pub fn call_dudo(
    state: &mut GameState,
    who: PlayerId,
    late: bool,
) -> Result<Vec<DomainEvent>, DomainError> {
    ensure_call_turn(state, who)?;

    let bid = if late {
        if !state.player(who)?.effects.late_challenge {
            return Err(DomainError::validation(
                ValidationKind::EffectNotActive,
                "Late challenge needs an active Late Challenge effect",
            ));
        }
        state.previous_bid.ok_or_else(|| {
            DomainError::validation(ValidationKind::NoCurrentBid, "No earlier bid to challenge")
        })?
    } else {
        state.current_bid.ok_or_else(|| {
            DomainError::validation(ValidationKind::NoCurrentBid, "No bid to challenge")
        })?
    };

    if bid.player == who {
        return Err(DomainError::validation(
            ValidationKind::SelfChallenge,
            "Cannot challenge your own bid",
        ));
    }

    if late {
        state.player_mut(who)?.effects.consume(Effect::LateChallenge);
    }

    Ok(vec![open_call(state, CallKind::Dudo, who, bid, late)])
}

/// Claim the current bid is exactly right.
pub fn call_jonti(state: &mut GameState, who: PlayerId) -> Result<Vec<DomainEvent>, DomainError> {
    ensure_call_turn(state, who)?;
    let bid = state.current_bid.ok_or_else(|| {
        DomainError::validation(ValidationKind::NoCurrentBid, "No bid to call exact")
    })?;
    if bid.player == who {
        return Err(DomainError::validation(
            ValidationKind::SelfChallenge,
            "Cannot call exact on your own bid",
        ));
    }
    Ok(vec![open_call(state, CallKind::Jonti, who, bid, false)])
}

fn reveal_all(state: &GameState) -> Vec<RevealedHand> {
    state
        .active_players()
        .map(|p| RevealedHand {
            player: p.id,
            dice: p.dice.clone(),
        })
        .collect()
}

/// Close the reaction window and settle the pending call.
///
/// Double Challenge belongs to the challenged bidder and doubles the stake in
/// both directions. The multiplier applies first; the caller's Insurance then
/// absorbs the caller's whole loss. Insurance is only spent when it absorbs.
pub fn resolve_pending_call(state: &mut GameState) -> Result<Vec<DomainEvent>, DomainError> {
    if state.phase == Phase::Paused {
        return Err(DomainError::validation(
            ValidationKind::GamePaused,
            "Game is paused",
        ));
    }
    let pending = match (state.phase, state.pending) {
        (Phase::DudoCalled | Phase::JontiCalled, Some(p)) => p,
        (phase, _) => {
            return Err(DomainError::validation(
                ValidationKind::PhaseMismatch,
                format!("No call pending during {phase:?}"),
            ))
        }
    };

    let reveal = reveal_all(state);
    let true_count = count_matches(reveal.iter().flat_map(|h| h.dice.iter()), pending.bid.face);
    let mut events = Vec::new();

    let starter_hint = match pending.kind {
        CallKind::Dudo => {
            let bluff = true_count < pending.bid.quantity;
            let doubled = state
                .player_mut(pending.target)?
                .effects
                .consume(Effect::DoubleChallenge);
            let stake: u8 = if doubled { 2 } else { 1 };

            let loser = if bluff {
                pending.target
            } else {
                pending.caller
            };
            let mut lost = stake;
            let mut insurance_used = false;
            if !bluff && state.player_mut(pending.caller)?.effects.consume(Effect::Insurance) {
                lost = 0;
                insurance_used = true;
            }

            let eliminated = apply_dice_loss(state, loser, lost)?;
            let result = ChallengeResult {
                caller: pending.caller,
                target: pending.target,
                bid: pending.bid,
                true_count,
                success: bluff,
                loser,
                dice_lost: lost,
                insurance_used,
                doubled,
                late: pending.late,
                reveal,
            };
            info!(
                caller = pending.caller,
                target = pending.target,
                quantity = pending.bid.quantity,
                face = pending.bid.face,
                true_count,
                loser,
                dice_lost = lost,
                insurance_used,
                doubled,
                "Dudo resolved"
            );
            state.last_outcome = Some(RoundOutcome::Dudo(result.clone()));
            events.push(DomainEvent::DudoResolved(result));
            if eliminated {
                events.push(DomainEvent::PlayerEliminated { player: loser });
            }
            loser
        }
        CallKind::Jonti => {
            let success = true_count == pending.bid.quantity;
            let caller = pending.caller;
            let mut eliminated = false;
            let dice_delta = if success {
                let cap = state.rules.max_dice_per_player as usize;
                let GameState {
                    players, mint, rng, ..
                } = state;
                let player = players
                    .iter_mut()
                    .find(|p| p.id == caller)
                    .ok_or_else(|| {
                        DomainError::not_found(NotFoundKind::Player, format!("seat {caller}"))
                    })?;
                if player.dice.len() < cap {
                    player.dice.push(mint.roll(DieType::D6, rng));
                    1
                } else {
                    0
                }
            } else {
                eliminated = apply_dice_loss(state, caller, 1)?;
                -1
            };
            let result = ExactCallResult {
                caller,
                bid: pending.bid,
                true_count,
                success,
                dice_delta,
                reveal,
            };
            info!(
                caller,
                quantity = pending.bid.quantity,
                face = pending.bid.face,
                true_count,
                success,
                "Jonti resolved"
            );
            state.last_outcome = Some(RoundOutcome::Jonti(result.clone()));
            events.push(DomainEvent::JontiResolved(result));
            if eliminated {
                events.push(DomainEvent::PlayerEliminated { player: caller });
            }
            caller
        }
    };

    state.pending = None;
    events.extend(finish_round(state, starter_hint));
    Ok(events)
}
