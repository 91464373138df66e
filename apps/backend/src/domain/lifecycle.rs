//! Pause, resume and new game.

use tracing::info;

use crate::domain::effects::ActiveEffects;
use crate::domain::events::DomainEvent;
use crate::domain::state::{GameState, Phase, PlayerId};
use crate::errors::domain::{DomainError, ValidationKind};

pub fn pause(state: &mut GameState, by: PlayerId) -> Result<Vec<DomainEvent>, DomainError> {
    if state.phase == Phase::Paused {
        return Err(DomainError::validation(
            ValidationKind::GamePaused,
            "Game is already paused",
        ));
    }
    if !state.phase.is_in_round() {
        return Err(DomainError::validation(
            ValidationKind::PhaseMismatch,
            format!("Cannot pause during {:?}", state.phase),
        ));
    }
    let resume_to = state.phase;
    state.paused_from = Some(resume_to);
    state.phase = Phase::Paused;
    info!(seat = by, ?resume_to, "Game paused");
    Ok(vec![DomainEvent::GamePaused { by, resume_to }])
}

/// Restores the exact phase the game was paused in.
pub fn resume(state: &mut GameState, by: PlayerId) -> Result<Vec<DomainEvent>, DomainError> {
    if state.phase != Phase::Paused {
        return Err(DomainError::validation(
            ValidationKind::PhaseMismatch,
            "Game is not paused",
        ));
    }
    let phase = state.paused_from.take().unwrap_or(Phase::Bidding);
    state.phase = phase;
    info!(seat = by, ?phase, "Game resumed");
    Ok(vec![DomainEvent::GameResumed { by, phase }])
}

/// Back to the lobby with the same seats. Only from the lobby or after game over.
pub fn new_game(state: &mut GameState) -> Result<Vec<DomainEvent>, DomainError> {
    if !matches!(state.phase, Phase::Lobby | Phase::GameOver) {
        return Err(DomainError::validation(
            ValidationKind::PhaseMismatch,
            format!("Cannot start a new game during {:?}", state.phase),
        ));
    }
    let hands: Vec<_> = state
        .players
        .iter_mut()
        .flat_map(|p| std::mem::take(&mut p.hand))
        .collect();
    state.deck.reclaim(hands);
    for p in state.players.iter_mut() {
        p.dice.clear();
        p.effects = ActiveEffects::default();
        p.knowledge.clear();
        p.eliminated = false;
        p.ready = p.is_ai();
    }
    state.phase = Phase::Lobby;
    state.paused_from = None;
    state.turn = None;
    state.current_bid = None;
    state.previous_bid = None;
    state.round_bids.clear();
    state.round_no = 0;
    state.pending = None;
    state.last_outcome = None;
    state.next_starter = None;
    state.winner = None;
    info!(players = state.players.len(), "Game reset to lobby");
    Ok(vec![DomainEvent::GameReset])
}
