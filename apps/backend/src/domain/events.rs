//! Events produced by state-machine transitions.
//!
//! The session layer routes each event to its audience: most are public,
//! `CardDrawn` and the `private` half of `CardPlayed` go to one player only.

use serde::{Deserialize, Serialize};

use crate::domain::cards_types::{Card, CardType};
use crate::domain::challenge::{ChallengeResult, ExactCallResult};
use crate::domain::dice::{Die, DieType};
use crate::domain::state::{Bid, CallKind, Difficulty, Phase, PlayerId};

/// Caster-only outcome of a card play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum CardResult {
    Peeked {
        owner: PlayerId,
        die_index: usize,
        die_type: DieType,
        face: u8,
    },
    Gauged {
        dice: Vec<GaugedDie>,
    },
    /// The public event showed a peek that never happened.
    FalseTell { shown_target: Option<PlayerId> },
    BidChanged { bid: Bid },
    EffectArmed,
    /// Own die replaced.
    DieReplaced { old: Die, new: Die },
    /// Opponent die replaced; the caster only learns the new size.
    OpponentDieChanged {
        owner: PlayerId,
        die_index: usize,
        die_type: DieType,
    },
    Swapped {
        owner: PlayerId,
        die_index: usize,
    },
    /// Card spent with no effect.
    Fizzled { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GaugedDie {
    pub owner: PlayerId,
    pub die_index: usize,
    pub die_type: DieType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    PlayerJoined {
        player: PlayerId,
        name: String,
        ai: Option<Difficulty>,
    },
    PlayerKicked {
        player: PlayerId,
    },
    GameStarted,
    RoundStarted {
        round_no: u32,
        starter: PlayerId,
        total_dice: u8,
    },
    /// Unicast to `player`.
    CardDrawn {
        player: PlayerId,
        card: Card,
    },
    BidMade {
        bid: Bid,
        phantom: bool,
    },
    CallMade {
        kind: CallKind,
        caller: PlayerId,
        target: PlayerId,
        bid: Bid,
        late: bool,
    },
    DudoResolved(ChallengeResult),
    JontiResolved(ExactCallResult),
    CardPlayed {
        player: PlayerId,
        /// What everyone sees; a False Tell shows up as a Peek.
        shown_as: CardType,
        shown_target: Option<PlayerId>,
        /// Only for the caster.
        private: CardResult,
    },
    PlayerEliminated {
        player: PlayerId,
    },
    GameOver {
        winner: PlayerId,
    },
    GamePaused {
        by: PlayerId,
        resume_to: Phase,
    },
    GameResumed {
        by: PlayerId,
        phase: Phase,
    },
    GameReset,
}
