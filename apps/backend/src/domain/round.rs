//! Round lifecycle: game start, round reset, dice loss, elimination, game over.

use tracing::{debug, info};

use crate::domain::deck::DrawOutcome;
use crate::domain::dice::DieType;
use crate::domain::events::DomainEvent;
use crate::domain::state::{GameState, Phase, PlayerId};
use crate::errors::domain::DomainError;

/// Lobby → first round. Every seated player gets the starting dice as D6s.
pub fn begin_game(state: &mut GameState) -> Vec<DomainEvent> {
    let starting = state.rules.starting_dice;
    {
        let GameState {
            players, mint, rng, ..
        } = state;
        for p in players.iter_mut() {
            p.eliminated = false;
            p.dice = (0..starting).map(|_| mint.roll(DieType::D6, rng)).collect();
        }
    }
    state.winner = None;
    state.round_no = 0;
    state.last_outcome = None;

    let starter = state.players.first().map(|p| p.id).unwrap_or(0);
    info!(players = state.players.len(), "Game started");
    let mut events = vec![DomainEvent::GameStarted];
    events.extend(start_round(state, starter));
    events
}

/// `rolling → bidding`: wipe per-round state, re-roll every die, draw one card each.
///
/// Die sizes carry over between rounds; faces and ids do not.
pub fn start_round(state: &mut GameState, starter: PlayerId) -> Vec<DomainEvent> {
    state.phase = Phase::Rolling;
    state.round_no += 1;
    state.current_bid = None;
    state.previous_bid = None;
    state.round_bids.clear();
    state.pending = None;
    state.next_starter = None;
    state.last_outcome = None;

    let mut events = Vec::new();
    {
        let GameState {
            players,
            mint,
            rng,
            deck,
            rules,
            ..
        } = state;
        for p in players.iter_mut() {
            p.effects.clear();
            p.knowledge.clear();
            if p.eliminated {
                continue;
            }
            p.dice = p
                .dice
                .iter()
                .map(|old| mint.roll(old.die_type, rng))
                .collect();
        }
        for p in players.iter_mut().filter(|p| !p.eliminated) {
            match deck.draw_into(&mut p.hand, rules.hand_cap, rng) {
                DrawOutcome::Drawn(card) => events.push(DomainEvent::CardDrawn {
                    player: p.id,
                    card,
                }),
                DrawOutcome::HandFull => debug!(seat = p.id, "Hand full; no draw"),
                DrawOutcome::Exhausted => debug!(seat = p.id, "Deck exhausted; no draw"),
            }
        }
    }

    let starter = state.active_at_or_after(starter).unwrap_or(starter);
    state.turn = Some(starter);
    state.phase = Phase::Bidding;

    let round_no = state.round_no;
    let total_dice = state.total_dice();
    info!(round_no, starter, total_dice, "Round started");
    events.insert(
        0,
        DomainEvent::RoundStarted {
            round_no,
            starter,
            total_dice,
        },
    );
    events
}

/// Remove `n` dice from `player`, eliminating them at zero.
///
/// Returns whether this loss eliminated the player.
pub fn apply_dice_loss(
    state: &mut GameState,
    player: PlayerId,
    n: u8,
) -> Result<bool, DomainError> {
    if n == 0 {
        return Ok(false);
    }
    let removed: Vec<_> = {
        let p = state.player_mut(player)?;
        let keep = p.dice.len().saturating_sub(n as usize);
        p.dice.split_off(keep)
    };
    for die in &removed {
        state.forget_die(die.id);
    }
    let p = state.player_mut(player)?;
    if p.dice.is_empty() && !p.eliminated {
        p.eliminated = true;
        info!(seat = player, "Player eliminated");
        return Ok(true);
    }
    Ok(false)
}

/// After a resolution: either `game_over` or `round_end` with the next starter chosen.
pub fn finish_round(state: &mut GameState, starter_hint: PlayerId) -> Vec<DomainEvent> {
    state.turn = None;
    let active: Vec<PlayerId> = state.active_players().map(|p| p.id).collect();
    if active.len() <= 1 {
        let winner = active.first().copied().unwrap_or(starter_hint);
        state.winner = Some(winner);
        state.phase = Phase::GameOver;
        state.next_starter = None;
        info!(winner, "Game over");
        return vec![DomainEvent::GameOver { winner }];
    }

    state.next_starter = state.active_at_or_after(starter_hint);
    state.phase = Phase::RoundEnd;
    for p in state.players.iter_mut() {
        p.ready = p.is_ai();
    }
    Vec::new()
}

/// Every non-eliminated human has readied up (AIs are always ready).
pub fn everyone_ready(state: &GameState) -> bool {
    state.active_players().all(|p| p.ready || p.is_ai())
}
