use thiserror::Error;

use crate::errors::domain::{ConflictKind, NotFoundKind, TargetKind, ValidationKind};
use crate::errors::{DomainError, ErrorCode};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Validation error: {detail}")]
    Validation { code: ErrorCode, detail: String },
    #[error("Invalid target: {detail}")]
    InvalidTarget { code: ErrorCode, detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Conflict: {detail}")]
    Conflict { code: ErrorCode, detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

impl AppError {
    /// Error code reported to the offending actor.
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { code, .. } => *code,
            AppError::InvalidTarget { code, .. } => *code,
            AppError::NotFound { code, .. } => *code,
            AppError::Conflict { code, .. } => *code,
            AppError::Internal { .. } => ErrorCode::Internal,
            AppError::Config { .. } => ErrorCode::ConfigError,
        }
    }

    /// Human-readable reason.
    pub fn detail(&self) -> String {
        match self {
            AppError::Validation { detail, .. } => detail.clone(),
            AppError::InvalidTarget { detail, .. } => detail.clone(),
            AppError::NotFound { detail, .. } => detail.clone(),
            AppError::Conflict { detail, .. } => detail.clone(),
            AppError::Internal { detail } => detail.clone(),
            AppError::Config { detail } => detail.clone(),
        }
    }

    pub fn invalid(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Validation {
            code,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    pub fn not_found(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            detail: detail.into(),
        }
    }

    pub fn conflict(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    /// True when the error was caused by the acting client and state is unchanged.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AppError::Validation { .. } | AppError::InvalidTarget { .. }
        )
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(kind, detail) => {
                let code = match kind {
                    ValidationKind::OutOfTurn => ErrorCode::OutOfTurn,
                    ValidationKind::PhaseMismatch => ErrorCode::PhaseMismatch,
                    ValidationKind::GamePaused => ErrorCode::GamePaused,
                    ValidationKind::InvalidBid => ErrorCode::InvalidBid,
                    ValidationKind::NoCurrentBid => ErrorCode::NoCurrentBid,
                    ValidationKind::SelfChallenge => ErrorCode::SelfChallenge,
                    ValidationKind::NotInvolved => ErrorCode::NotInvolved,
                    ValidationKind::CardNotInHand => ErrorCode::CardNotInHand,
                    ValidationKind::CardTimingMismatch => ErrorCode::CardNotPlayable,
                    ValidationKind::EffectNotActive => ErrorCode::EffectNotActive,
                    ValidationKind::NotEnoughPlayers => ErrorCode::NotEnoughPlayers,
                    ValidationKind::GameAlreadyStarted => ErrorCode::GameAlreadyStarted,
                    ValidationKind::InvalidSeat => ErrorCode::InvalidSeat,
                    ValidationKind::NotAnAi => ErrorCode::NotAnAi,
                    ValidationKind::Other(_) => ErrorCode::ValidationError,
                };
                AppError::Validation { code, detail }
            }
            DomainError::InvalidTarget(kind, detail) => {
                let code = match kind {
                    TargetKind::PlayerEliminated => ErrorCode::TargetEliminated,
                    TargetKind::NoDice => ErrorCode::TargetHasNoDice,
                    TargetKind::DieNotOwned => ErrorCode::DieNotOwned,
                    TargetKind::DuplicateDie => ErrorCode::DuplicateDie,
                    TargetKind::DieIndexOutOfRange => ErrorCode::DieIndexOutOfRange,
                    TargetKind::MissingTarget => ErrorCode::MissingTarget,
                    TargetKind::SelfTarget => ErrorCode::SelfTarget,
                    TargetKind::InvalidFace => ErrorCode::InvalidFace,
                    TargetKind::OpponentDieById => ErrorCode::OpponentDieById,
                };
                AppError::InvalidTarget { code, detail }
            }
            DomainError::Conflict(kind, detail) => {
                let code = match kind {
                    ConflictKind::SeatTaken => ErrorCode::SeatTaken,
                    ConflictKind::LobbyFull => ErrorCode::LobbyFull,
                    ConflictKind::StaleVersion => ErrorCode::StaleVersion,
                    ConflictKind::Other(_) => ErrorCode::Conflict,
                };
                AppError::Conflict { code, detail }
            }
            DomainError::NotFound(kind, detail) => {
                let code = match kind {
                    NotFoundKind::Player => ErrorCode::PlayerNotFound,
                    NotFoundKind::Game => ErrorCode::GameNotFound,
                    NotFoundKind::Card => ErrorCode::CardNotFound,
                    NotFoundKind::Other(_) => ErrorCode::NotFound,
                };
                AppError::NotFound { code, detail }
            }
        }
    }
}
