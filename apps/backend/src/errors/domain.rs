//! Domain-level error type used by the state machine and the session layer.
//!
//! This error type is transport-agnostic. The session service converts it
//! into `crate::error::AppError` via `From<DomainError> for AppError`, which
//! is what ends up in an `error{message, code}` event.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Reasons an action is illegal in the current game state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    OutOfTurn,
    PhaseMismatch,
    GamePaused,
    InvalidBid,
    NoCurrentBid,
    SelfChallenge,
    NotInvolved,
    CardNotInHand,
    CardTimingMismatch,
    EffectNotActive,
    NotEnoughPlayers,
    GameAlreadyStarted,
    InvalidSeat,
    NotAnAi,
    Other(String),
}

/// Reasons a card or challenge target is unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TargetKind {
    PlayerEliminated,
    NoDice,
    DieNotOwned,
    DuplicateDie,
    DieIndexOutOfRange,
    MissingTarget,
    SelfTarget,
    InvalidFace,
    OpponentDieById,
}

/// Domain-level not found entities
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Player,
    Game,
    Card,
    Other(String),
}

/// Domain-level conflict kinds
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    SeatTaken,
    LobbyFull,
    StaleVersion,
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Illegal action: wrong turn, wrong phase, bad bid, paused session
    Validation(ValidationKind, String),
    /// Card/challenge target that does not resolve to a usable die or player
    InvalidTarget(TargetKind, String),
    /// Semantic conflict
    Conflict(ConflictKind, String),
    /// Missing resource in domain terms
    NotFound(NotFoundKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "illegal action {kind:?}: {d}"),
            DomainError::InvalidTarget(kind, d) => write!(f, "invalid target {kind:?}: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn invalid_target(kind: TargetKind, detail: impl Into<String>) -> Self {
        Self::InvalidTarget(kind, detail.into())
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }

    /// True for errors the acting player caused (as opposed to lookups).
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            DomainError::Validation(..) | DomainError::InvalidTarget(..)
        )
    }
}
