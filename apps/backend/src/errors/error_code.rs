//! Error codes carried by `error{message, code}` events.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! All error codes are SCREAMING_SNAKE_CASE.

use core::fmt;

/// Centralized error codes for the game engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Illegal actions
    /// Action sent by a player whose turn it is not
    OutOfTurn,
    /// Action not allowed in the current phase
    PhaseMismatch,
    /// Session is paused
    GamePaused,
    /// Bid is malformed or does not raise the current bid
    InvalidBid,
    /// Action needs a current bid and there is none
    NoCurrentBid,
    /// Challenging your own bid
    SelfChallenge,
    /// Player is not part of the open challenge
    NotInvolved,
    /// Card not in hand
    CardNotInHand,
    /// Card timing window does not match the current one
    CardNotPlayable,
    /// Required effect flag is not active
    EffectNotActive,
    /// Not enough seated players to start
    NotEnoughPlayers,
    /// Lobby action after the game started
    GameAlreadyStarted,
    /// Invalid seat number
    InvalidSeat,
    /// Seat is not occupied by an AI
    NotAnAi,
    /// General validation error
    ValidationError,

    // Invalid targets
    /// Target player is eliminated
    TargetEliminated,
    /// Target player has no dice
    TargetHasNoDice,
    /// Die does not belong to the required owner
    DieNotOwned,
    /// Same die selected twice
    DuplicateDie,
    /// Die index outside the owner's dice
    DieIndexOutOfRange,
    /// Required target missing from the action
    MissingTarget,
    /// Card cannot target its caster
    SelfTarget,
    /// Face value outside 1..=6 or unchanged
    InvalidFace,
    /// Opponent dice must be addressed by index
    OpponentDieById,
    /// Generic invalid target
    InvalidTarget,

    // Resource Not Found
    /// Game not found
    GameNotFound,
    /// Player not found
    PlayerNotFound,
    /// Card not found
    CardNotFound,
    /// General not found error
    NotFound,

    // Conflicts
    /// Seat already taken
    SeatTaken,
    /// Lobby has no free seat
    LobbyFull,
    /// State changed while a decision was being computed
    StaleVersion,
    /// Generic conflict
    Conflict,

    // System Errors
    /// Internal error
    Internal,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// Every code, in declaration order.
    pub const ALL: [ErrorCode; 35] = [
        Self::OutOfTurn,
        Self::PhaseMismatch,
        Self::GamePaused,
        Self::InvalidBid,
        Self::NoCurrentBid,
        Self::SelfChallenge,
        Self::NotInvolved,
        Self::CardNotInHand,
        Self::CardNotPlayable,
        Self::EffectNotActive,
        Self::NotEnoughPlayers,
        Self::GameAlreadyStarted,
        Self::InvalidSeat,
        Self::NotAnAi,
        Self::ValidationError,
        Self::TargetEliminated,
        Self::TargetHasNoDice,
        Self::DieNotOwned,
        Self::DuplicateDie,
        Self::DieIndexOutOfRange,
        Self::MissingTarget,
        Self::SelfTarget,
        Self::InvalidFace,
        Self::OpponentDieById,
        Self::GameNotFound,
        Self::PlayerNotFound,
        Self::CardNotFound,
        Self::NotFound,
        Self::SeatTaken,
        Self::LobbyFull,
        Self::StaleVersion,
        Self::Conflict,
        Self::Internal,
        Self::ConfigError,
        Self::InvalidTarget,
    ];

    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OutOfTurn => "OUT_OF_TURN",
            Self::PhaseMismatch => "PHASE_MISMATCH",
            Self::GamePaused => "GAME_PAUSED",
            Self::InvalidBid => "INVALID_BID",
            Self::NoCurrentBid => "NO_CURRENT_BID",
            Self::SelfChallenge => "SELF_CHALLENGE",
            Self::NotInvolved => "NOT_INVOLVED",
            Self::CardNotInHand => "CARD_NOT_IN_HAND",
            Self::CardNotPlayable => "CARD_NOT_PLAYABLE",
            Self::EffectNotActive => "EFFECT_NOT_ACTIVE",
            Self::NotEnoughPlayers => "NOT_ENOUGH_PLAYERS",
            Self::GameAlreadyStarted => "GAME_ALREADY_STARTED",
            Self::InvalidSeat => "INVALID_SEAT",
            Self::NotAnAi => "NOT_AN_AI",
            Self::ValidationError => "VALIDATION_ERROR",

            Self::TargetEliminated => "TARGET_ELIMINATED",
            Self::TargetHasNoDice => "TARGET_HAS_NO_DICE",
            Self::DieNotOwned => "DIE_NOT_OWNED",
            Self::DuplicateDie => "DUPLICATE_DIE",
            Self::DieIndexOutOfRange => "DIE_INDEX_OUT_OF_RANGE",
            Self::MissingTarget => "MISSING_TARGET",
            Self::SelfTarget => "SELF_TARGET",
            Self::InvalidFace => "INVALID_FACE",
            Self::OpponentDieById => "OPPONENT_DIE_BY_ID",
            Self::InvalidTarget => "INVALID_TARGET",

            Self::GameNotFound => "GAME_NOT_FOUND",
            Self::PlayerNotFound => "PLAYER_NOT_FOUND",
            Self::CardNotFound => "CARD_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::SeatTaken => "SEAT_TAKEN",
            Self::LobbyFull => "LOBBY_FULL",
            Self::StaleVersion => "STALE_VERSION",
            Self::Conflict => "CONFLICT",

            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_strings() {
        assert_eq!(ErrorCode::OutOfTurn.as_str(), "OUT_OF_TURN");
        assert_eq!(ErrorCode::PhaseMismatch.as_str(), "PHASE_MISMATCH");
        assert_eq!(ErrorCode::GamePaused.as_str(), "GAME_PAUSED");
        assert_eq!(ErrorCode::InvalidBid.as_str(), "INVALID_BID");
        assert_eq!(ErrorCode::CardNotPlayable.as_str(), "CARD_NOT_PLAYABLE");
        assert_eq!(ErrorCode::DuplicateDie.as_str(), "DUPLICATE_DIE");
        assert_eq!(
            ErrorCode::DieIndexOutOfRange.as_str(),
            "DIE_INDEX_OUT_OF_RANGE"
        );
        assert_eq!(ErrorCode::OpponentDieById.as_str(), "OPPONENT_DIE_BY_ID");
        assert_eq!(ErrorCode::StaleVersion.as_str(), "STALE_VERSION");
        assert_eq!(ErrorCode::ConfigError.as_str(), "CONFIG_ERROR");
    }

    #[test]
    fn test_display_trait() {
        assert_eq!(format!("{}", ErrorCode::OutOfTurn), "OUT_OF_TURN");
        assert_eq!(format!("{}", ErrorCode::LobbyFull), "LOBBY_FULL");
        assert_eq!(format!("{}", ErrorCode::GameNotFound), "GAME_NOT_FOUND");
    }

    #[test]
    fn all_codes_are_screaming_snake_case() {
        for code in ErrorCode::ALL {
            let s = code.as_str();
            assert!(
                s.chars().all(|c| c.is_ascii_uppercase() || c == '_'),
                "{s} is not SCREAMING_SNAKE_CASE"
            );
        }
    }
}
