use serde::{Deserialize, Serialize};

use crate::domain::cards_types::{Card, CardType};
use crate::domain::challenge::{ChallengeResult, ExactCallResult};
use crate::domain::events::{CardResult, DomainEvent};
use crate::domain::player_view::PrivateInfo;
use crate::domain::snapshot::PublicGameState;
use crate::domain::state::{Bid, CallKind, Difficulty, Phase, PlayerId};
use crate::error::AppError;

#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    GameStateUpdate {
        state: PublicGameState,
    },

    PrivateInfo {
        info: PrivateInfo,
    },

    PlayerJoined {
        player: PlayerId,
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        ai: Option<Difficulty>,
    },

    PlayerKicked {
        player: PlayerId,
    },

    RoundStarted {
        round_no: u32,
        starter: PlayerId,
        total_dice: u8,
    },

    BidMade {
        bid: Bid,
        phantom: bool,
    },

    DudoCalled {
        caller: PlayerId,
        target: PlayerId,
        bid: Bid,
        late: bool,
    },

    DudoResult {
        result: ChallengeResult,
    },

    JontiCalled {
        caller: PlayerId,
        bid: Bid,
    },

    JontiResult {
        result: ExactCallResult,
    },

    CardPlayed {
        player: PlayerId,
        card_type: CardType,
        #[serde(skip_serializing_if = "Option::is_none")]
        target: Option<PlayerId>,
    },

    /// Caster only.
    CardResult {
        result: CardResult,
    },

    /// Drawer only.
    CardDrawn {
        card: Card,
    },

    PlayerEliminated {
        player: PlayerId,
    },

    GameOver {
        winner: PlayerId,
    },

    GamePaused {
        by: PlayerId,
    },

    GameResumed {
        by: PlayerId,
        phase: Phase,
    },

    GameReset,

    Error {
        message: String,
        code: String,
    },
}

impl ServerEvent {
    /// Build the `error` payload sent back to the actor of a rejected action.
    pub fn error(err: &AppError) -> Self {
        ServerEvent::Error {
            message: err.detail(),
            code: err.code().as_str().to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ServerEvent::GameStateUpdate { .. } => "game_state_update",
            ServerEvent::PrivateInfo { .. } => "private_info",
            ServerEvent::PlayerJoined { .. } => "player_joined",
            ServerEvent::PlayerKicked { .. } => "player_kicked",
            ServerEvent::RoundStarted { .. } => "round_started",
            ServerEvent::BidMade { .. } => "bid_made",
            ServerEvent::DudoCalled { .. } => "dudo_called",
            ServerEvent::DudoResult { .. } => "dudo_result",
            ServerEvent::JontiCalled { .. } => "jonti_called",
            ServerEvent::JontiResult { .. } => "jonti_result",
            ServerEvent::CardPlayed { .. } => "card_played",
            ServerEvent::CardResult { .. } => "card_result",
            ServerEvent::CardDrawn { .. } => "card_drawn",
            ServerEvent::PlayerEliminated { .. } => "player_eliminated",
            ServerEvent::GameOver { .. } => "game_over",
            ServerEvent::GamePaused { .. } => "game_paused",
            ServerEvent::GameResumed { .. } => "game_resumed",
            ServerEvent::GameReset => "game_reset",
            ServerEvent::Error { .. } => "error",
        }
    }
}

/// Who receives an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    All,
    Only(PlayerId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub audience: Audience,
    pub event: ServerEvent,
}

impl Outbound {
    pub fn all(event: ServerEvent) -> Self {
        Self {
            audience: Audience::All,
            event,
        }
    }

    pub fn only(player: PlayerId, event: ServerEvent) -> Self {
        Self {
            audience: Audience::Only(player),
            event,
        }
    }
}

/// Translate a domain event into what goes on the wire, and to whom.
///
/// `CardPlayed` splits into a public half (possibly disguised) and the
/// caster's private result. `GameStarted` carries nothing a client needs
/// beyond the snapshot that follows every mutation.
pub fn route_event(event: DomainEvent) -> Vec<Outbound> {
    match event {
        DomainEvent::PlayerJoined { player, name, ai } => {
            vec![Outbound::all(ServerEvent::PlayerJoined { player, name, ai })]
        }
        DomainEvent::PlayerKicked { player } => {
            vec![Outbound::all(ServerEvent::PlayerKicked { player })]
        }
        DomainEvent::GameStarted => Vec::new(),
        DomainEvent::RoundStarted {
            round_no,
            starter,
            total_dice,
        } => vec![Outbound::all(ServerEvent::RoundStarted {
            round_no,
            starter,
            total_dice,
        })],
        DomainEvent::CardDrawn { player, card } => {
            vec![Outbound::only(player, ServerEvent::CardDrawn { card })]
        }
        DomainEvent::BidMade { bid, phantom } => {
            vec![Outbound::all(ServerEvent::BidMade { bid, phantom })]
        }
        DomainEvent::CallMade {
            kind,
            caller,
            target,
            bid,
            late,
        } => {
            let event = match kind {
                CallKind::Dudo => ServerEvent::DudoCalled {
                    caller,
                    target,
                    bid,
                    late,
                },
                CallKind::Jonti => ServerEvent::JontiCalled { caller, bid },
            };
            vec![Outbound::all(event)]
        }
        DomainEvent::DudoResolved(result) => {
            vec![Outbound::all(ServerEvent::DudoResult { result })]
        }
        DomainEvent::JontiResolved(result) => {
            vec![Outbound::all(ServerEvent::JontiResult { result })]
        }
        DomainEvent::CardPlayed {
            player,
            shown_as,
            shown_target,
            private,
        } => vec![
            Outbound::all(ServerEvent::CardPlayed {
                player,
                card_type: shown_as,
                target: shown_target,
            }),
            Outbound::only(player, ServerEvent::CardResult { result: private }),
        ],
        DomainEvent::PlayerEliminated { player } => {
            vec![Outbound::all(ServerEvent::PlayerEliminated { player })]
        }
        DomainEvent::GameOver { winner } => vec![Outbound::all(ServerEvent::GameOver { winner })],
        DomainEvent::GamePaused { by, .. } => vec![Outbound::all(ServerEvent::GamePaused { by })],
        DomainEvent::GameResumed { by, phase } => {
            vec![Outbound::all(ServerEvent::GameResumed { by, phase })]
        }
        DomainEvent::GameReset => vec![Outbound::all(ServerEvent::GameReset)],
    }
}
