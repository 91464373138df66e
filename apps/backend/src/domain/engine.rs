//! The one mutation path into `GameState`.
//!
//! Humans and AIs submit the same `GameAction`; nothing else in the crate
//! mutates a live game. A rejected action leaves the state untouched.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::bidding::place_bid;
use crate::domain::card_play::{play_card, CardPlay};
use crate::domain::challenge::{call_dudo, call_jonti, resolve_pending_call};
use crate::domain::events::DomainEvent;
use crate::domain::lifecycle::{new_game, pause, resume};
use crate::domain::lobby::{add_ai_player, mark_ready, remove_ai_player};
use crate::domain::state::{Difficulty, GameState, Phase, PlayerId};
use crate::errors::domain::{DomainError, ValidationKind};

/// A validated-on-apply player action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum GameAction {
    MakeBid {
        quantity: u8,
        #[serde(rename = "faceValue")]
        face: u8,
    },
    CallDudo {
        #[serde(default)]
        late: bool,
    },
    CallJonti,
    PlayCard(CardPlay),
    ReadyForRound,
    PauseGame,
    ResumeGame,
    AddAiPlayer {
        slot: PlayerId,
        difficulty: Difficulty,
    },
    RemoveAiPlayer {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
    },
    NewGame,
}

impl GameAction {
    pub fn name(&self) -> &'static str {
        match self {
            GameAction::MakeBid { .. } => "make_bid",
            GameAction::CallDudo { .. } => "call_dudo",
            GameAction::CallJonti => "call_jonti",
            GameAction::PlayCard(_) => "play_card",
            GameAction::ReadyForRound => "ready_for_round",
            GameAction::PauseGame => "pause_game",
            GameAction::ResumeGame => "resume_game",
            GameAction::AddAiPlayer { .. } => "add_ai_player",
            GameAction::RemoveAiPlayer { .. } => "remove_ai_player",
            GameAction::NewGame => "new_game",
        }
    }

    /// Actions that act on the table rather than on a seat's own play.
    pub fn is_table_admin(&self) -> bool {
        matches!(
            self,
            GameAction::AddAiPlayer { .. } | GameAction::RemoveAiPlayer { .. } | GameAction::NewGame
        )
    }
}

/// Validate and apply `action` for `actor`.
///
/// On success the version is bumped and the produced events are returned.
pub fn apply_action(
    state: &mut GameState,
    actor: PlayerId,
    action: &GameAction,
) -> Result<Vec<DomainEvent>, DomainError> {
    if state.phase == Phase::Paused && !matches!(action, GameAction::ResumeGame) {
        return Err(DomainError::validation(
            ValidationKind::GamePaused,
            "Game is paused",
        ));
    }
    if !action.is_table_admin() {
        state.player(actor)?;
    }

    let events = match action {
        GameAction::MakeBid { quantity, face } => place_bid(state, actor, *quantity, *face)?,
        GameAction::CallDudo { late } => call_dudo(state, actor, *late)?,
        GameAction::CallJonti => call_jonti(state, actor)?,
        GameAction::PlayCard(play) => play_card(state, actor, play)?,
        GameAction::ReadyForRound => mark_ready(state, actor)?,
        GameAction::PauseGame => pause(state, actor)?,
        GameAction::ResumeGame => resume(state, actor)?,
        GameAction::AddAiPlayer { slot, difficulty } => add_ai_player(state, *slot, *difficulty)?,
        GameAction::RemoveAiPlayer { player_id } => remove_ai_player(state, *player_id)?,
        GameAction::NewGame => new_game(state)?,
    };

    state.bump_version();
    debug!(
        seat = actor,
        action = action.name(),
        version = state.version,
        events = events.len(),
        "Action applied"
    );
    Ok(events)
}

/// Close the pending call's reaction window. Used by the session timer.
pub fn resolve_pending(state: &mut GameState) -> Result<Vec<DomainEvent>, DomainError> {
    let events = resolve_pending_call(state)?;
    state.bump_version();
    Ok(events)
}

/// Start the game or next round when every seat is ready. No-op otherwise.
pub fn advance_if_ready(state: &mut GameState) -> Result<Vec<DomainEvent>, DomainError> {
    let events = crate::domain::lobby::try_advance(state)?;
    if !events.is_empty() {
        state.bump_version();
    }
    Ok(events)
}
