//! What an AI proposes. Proposals go through the same validation as human actions.

use std::fmt;

use crate::domain::card_play::CardPlay;
use crate::domain::engine::GameAction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiAction {
    Bid { quantity: u8, face: u8 },
    Dudo { late: bool },
    Jonti,
    PlayCard(CardPlay),
}

impl AiAction {
    pub fn into_game_action(self) -> GameAction {
        match self {
            AiAction::Bid { quantity, face } => GameAction::MakeBid { quantity, face },
            AiAction::Dudo { late } => GameAction::CallDudo { late },
            AiAction::Jonti => GameAction::CallJonti,
            AiAction::PlayCard(play) => GameAction::PlayCard(play),
        }
    }

    pub fn is_card(&self) -> bool {
        matches!(self, AiAction::PlayCard(_))
    }
}

impl fmt::Display for AiAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiAction::Bid { quantity, face } => write!(f, "bid {quantity}x{face}"),
            AiAction::Dudo { late: false } => write!(f, "dudo"),
            AiAction::Dudo { late: true } => write!(f, "late dudo"),
            AiAction::Jonti => write!(f, "jonti"),
            AiAction::PlayCard(play) => write!(f, "card {}", play.card_id),
        }
    }
}

/// A proposed action with a confidence in `[0, 1]`.
///
/// `rationale` is for logs only.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub action: AiAction,
    pub confidence: f64,
    pub rationale: Option<String>,
}

impl Decision {
    pub fn new(action: AiAction, confidence: f64) -> Self {
        Self {
            action,
            confidence: confidence.clamp(0.0, 1.0),
            rationale: None,
        }
    }

    pub fn because(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    pub fn bid(quantity: u8, face: u8, confidence: f64) -> Self {
        Self::new(AiAction::Bid { quantity, face }, confidence)
    }

    pub fn dudo(confidence: f64) -> Self {
        Self::new(AiAction::Dudo { late: false }, confidence)
    }

    pub fn card(play: CardPlay, confidence: f64) -> Self {
        Self::new(AiAction::PlayCard(play), confidence)
    }

    pub fn into_game_action(self) -> GameAction {
        self.action.into_game_action()
    }
}
