//! AI player trait definition.

use std::fmt;

use async_trait::async_trait;

use crate::ai::decision::Decision;
use crate::domain::challenge::RoundOutcome;
use crate::domain::player_view::AiGameContext;
use crate::error::AppError;

/// Errors that can occur during AI decision-making.
///
/// None of these reach players: the session recovers with a fallback decision.
#[derive(Debug)]
pub enum AiError {
    /// AI failed to make a decision within its budget
    Timeout,
    /// AI encountered an internal error
    Internal(String),
    /// AI produced (or could only produce) an invalid move
    InvalidMove(String),
    /// A search worker died or never reported
    WorkerFailure(String),
}

impl fmt::Display for AiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiError::Timeout => write!(f, "AI decision timeout"),
            AiError::Internal(msg) => write!(f, "AI internal error: {msg}"),
            AiError::InvalidMove(msg) => write!(f, "AI invalid move: {msg}"),
            AiError::WorkerFailure(msg) => write!(f, "AI worker failure: {msg}"),
        }
    }
}

impl std::error::Error for AiError {}

impl From<AiError> for AppError {
    fn from(err: AiError) -> Self {
        AppError::internal(format!("AI error: {err}"))
    }
}

/// Trait for AI players.
///
/// Implementations receive an owned context for one seat and propose an
/// action. They never touch the live game; the proposal is validated like any
/// human action.
#[async_trait]
pub trait AiPlayer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Decide what to do on this seat's turn.
    ///
    /// The AI should only choose from the context's legal helpers
    /// (`legal_bids()`, `legal_card_plays()`, `can_call_dudo()`...).
    async fn make_decision(&self, ctx: &AiGameContext) -> Result<Decision, AiError>;

    /// Optionally play a card outside this seat's turn (reaction and
    /// challenge windows). `None` passes.
    async fn react(&self, _ctx: &AiGameContext) -> Result<Option<Decision>, AiError> {
        Ok(None)
    }

    /// Called once per resolved round.
    fn update_models(&self, _ctx: &AiGameContext, _outcome: &RoundOutcome) {}

    /// Called between games.
    fn reset(&self) {}
}
