//! Public snapshot API for observing game state without exposing hidden dice or cards.
//!
//! `PublicGameState` is built field by field from the authoritative state and
//! has no slot that could hold a face value, die type, card identity, or effect
//! flag. The only dice it carries are the reveal inside `last_outcome`, which is
//! public by the time it exists.

use serde::{Deserialize, Serialize};

use crate::domain::challenge::RoundOutcome;
use crate::domain::state::{Bid, Difficulty, GameState, PendingCall, Phase, PlayerId};

/// Public info about a single seat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPlayer {
    pub id: PlayerId,
    pub name: String,
    pub is_ai: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    pub dice_count: u8,
    pub card_count: u8,
    pub eliminated: bool,
    pub ready: bool,
}

/// Everything every participant may see.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicGameState {
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused_from: Option<Phase>,
    pub round_no: u32,
    pub players: Vec<PublicPlayer>,
    pub current_bid: Option<Bid>,
    pub previous_bid: Option<Bid>,
    pub round_bids: Vec<Bid>,
    pub turn: Option<PlayerId>,
    pub total_dice: u8,
    pub pending_call: Option<PendingCall>,
    pub last_outcome: Option<RoundOutcome>,
    pub winner: Option<PlayerId>,
    pub version: u64,
    pub deck_remaining: usize,
    pub discard_count: usize,
}

impl PublicGameState {
    pub fn player(&self, id: PlayerId) -> Option<&PublicPlayer> {
        self.players.iter().find(|p| p.id == id)
    }
}

/// Entry point: produce the public view of the current game state.
pub fn public_state(state: &GameState) -> PublicGameState {
    let players = state
        .players
        .iter()
        .map(|p| PublicPlayer {
            id: p.id,
            name: p.name.clone(),
            is_ai: p.is_ai(),
            difficulty: p.difficulty(),
            dice_count: p.dice_count(),
            card_count: p.hand.len().min(u8::MAX as usize) as u8,
            eliminated: p.eliminated,
            ready: p.ready,
        })
        .collect();

    PublicGameState {
        phase: state.phase,
        paused_from: state.paused_from,
        round_no: state.round_no,
        players,
        current_bid: state.current_bid,
        previous_bid: state.previous_bid,
        round_bids: state.round_bids.clone(),
        turn: state.turn,
        total_dice: state.total_dice(),
        pending_call: state.pending,
        last_outcome: state.last_outcome.clone(),
        winner: state.winner,
        version: state.version,
        deck_remaining: state.deck.remaining(),
        discard_count: state.deck.discarded(),
    }
}
