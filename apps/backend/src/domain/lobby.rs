//! Seating and ready-ups.

use tracing::info;

use crate::domain::events::DomainEvent;
use crate::domain::round::{begin_game, everyone_ready, start_round};
use crate::domain::state::{Difficulty, GameState, Phase, PlayerId, PlayerKind, PlayerState};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};

fn ensure_slot(state: &GameState, slot: PlayerId) -> Result<(), DomainError> {
    if slot as usize >= state.rules.max_players {
        return Err(DomainError::validation(
            ValidationKind::InvalidSeat,
            format!("Seat {slot} is outside 0..{}", state.rules.max_players),
        ));
    }
    if state.players.iter().any(|p| p.id == slot) {
        return Err(DomainError::conflict(
            ConflictKind::SeatTaken,
            format!("Seat {slot} is taken"),
        ));
    }
    Ok(())
}

fn ensure_lobby(state: &GameState) -> Result<(), DomainError> {
    if state.phase != Phase::Lobby {
        return Err(DomainError::validation(
            ValidationKind::GameAlreadyStarted,
            "Seats can only change in the lobby",
        ));
    }
    Ok(())
}

/// Lowest free seat, if any.
pub fn first_free_seat(state: &GameState) -> Option<PlayerId> {
    (0..state.rules.max_players)
        .map(|s| s as PlayerId)
        .find(|s| state.players.iter().all(|p| p.id != *s))
}

fn insert_seated(state: &mut GameState, player: PlayerState) {
    let at = state
        .players
        .iter()
        .position(|p| p.id > player.id)
        .unwrap_or(state.players.len());
    state.players.insert(at, player);
}

/// Seat a human, at `slot` or the first free seat.
pub fn seat_human(
    state: &mut GameState,
    name: &str,
    slot: Option<PlayerId>,
) -> Result<(PlayerId, Vec<DomainEvent>), DomainError> {
    ensure_lobby(state)?;
    let slot = match slot {
        Some(s) => s,
        None => first_free_seat(state)
            .ok_or_else(|| DomainError::conflict(ConflictKind::LobbyFull, "Every seat is taken"))?,
    };
    ensure_slot(state, slot)?;
    insert_seated(state, PlayerState::new(slot, name, PlayerKind::Human));
    info!(seat = slot, "Human seated");
    Ok((
        slot,
        vec![DomainEvent::PlayerJoined {
            player: slot,
            name: name.to_string(),
            ai: None,
        }],
    ))
}

/// Seat an AI at `slot`. AIs are always ready.
pub fn add_ai_player(
    state: &mut GameState,
    slot: PlayerId,
    difficulty: Difficulty,
) -> Result<Vec<DomainEvent>, DomainError> {
    ensure_lobby(state)?;
    ensure_slot(state, slot)?;
    let name = format!("{} AI {}", difficulty.as_str(), slot + 1);
    insert_seated(
        state,
        PlayerState::new(slot, name.clone(), PlayerKind::Ai(difficulty)),
    );
    info!(seat = slot, difficulty = difficulty.as_str(), "AI seated");
    Ok(vec![DomainEvent::PlayerJoined {
        player: slot,
        name,
        ai: Some(difficulty),
    }])
}

/// Remove an AI. In the lobby the seat is freed; between rounds the AI is
/// kicked out of the game and counts as eliminated.
pub fn remove_ai_player(
    state: &mut GameState,
    player: PlayerId,
) -> Result<Vec<DomainEvent>, DomainError> {
    if !state.player(player)?.is_ai() {
        return Err(DomainError::validation(
            ValidationKind::NotAnAi,
            format!("Seat {player} is not an AI"),
        ));
    }
    match state.phase {
        Phase::Lobby | Phase::GameOver => {
            state.players.retain(|p| p.id != player);
            info!(seat = player, "AI removed");
            Ok(vec![DomainEvent::PlayerKicked { player }])
        }
        Phase::RoundEnd => {
            let dice: Vec<_> = {
                let p = state.player_mut(player)?;
                p.eliminated = true;
                p.effects.clear();
                std::mem::take(&mut p.dice)
            };
            let hand = std::mem::take(&mut state.player_mut(player)?.hand);
            state.deck.reclaim(hand);
            for d in &dice {
                state.forget_die(d.id);
            }
            info!(seat = player, "AI kicked between rounds");
            let mut events = vec![DomainEvent::PlayerKicked { player }];
            if state.active_count() <= 1 {
                let hint = state.next_starter.unwrap_or(player);
                events.extend(crate::domain::round::finish_round(state, hint));
            } else if state.next_starter == Some(player) {
                state.next_starter = state.next_active_after(player);
            }
            Ok(events)
        }
        other => Err(DomainError::validation(
            ValidationKind::PhaseMismatch,
            format!("AIs cannot be removed during {other:?}"),
        )),
    }
}

/// A human readies up. Starts the game from the lobby, or the next round from
/// `round_end`, once everyone is ready.
pub fn mark_ready(state: &mut GameState, who: PlayerId) -> Result<Vec<DomainEvent>, DomainError> {
    match state.phase {
        Phase::Lobby | Phase::RoundEnd => {}
        Phase::Paused => {
            return Err(DomainError::validation(
                ValidationKind::GamePaused,
                "Game is paused",
            ))
        }
        other => {
            return Err(DomainError::validation(
                ValidationKind::PhaseMismatch,
                format!("Nothing to ready for during {other:?}"),
            ))
        }
    }
    state.player_mut(who)?.ready = true;
    try_advance(state)
}

/// Start the game or next round if the table is ready; otherwise no events.
pub fn try_advance(state: &mut GameState) -> Result<Vec<DomainEvent>, DomainError> {
    match state.phase {
        Phase::Lobby => {
            let seated = state.players.len();
            if seated < state.rules.min_players || !everyone_ready(state) {
                return Ok(Vec::new());
            }
            Ok(begin_game(state))
        }
        Phase::RoundEnd => {
            if !everyone_ready(state) {
                return Ok(Vec::new());
            }
            let starter = state
                .next_starter
                .or_else(|| state.active_players().next().map(|p| p.id))
                .ok_or_else(|| {
                    DomainError::validation(ValidationKind::NotEnoughPlayers, "No active players")
                })?;
            Ok(start_round(state, starter))
        }
        _ => Ok(Vec::new()),
    }
}
