//! Authoritative per-session game state.
//!
//! Only the state machine mutates this; everything leaving the engine goes
//! through `snapshot::public_state` or `player_view::private_info`.

use std::str::FromStr;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::domain::cards_types::{Card, Timing};
use crate::domain::challenge::RoundOutcome;
use crate::domain::deck::Deck;
use crate::domain::dice::{Die, DieId, DieMint, DieType};
use crate::domain::effects::ActiveEffects;
use crate::domain::game_transition::GameLifecycleView;
use crate::domain::rules::RuleSet;
use crate::domain::seed_derivation::derive_table_seed;
use crate::errors::domain::{DomainError, NotFoundKind};

pub type PlayerId = u8; // seat slot, 0..MAX_SEATS

/// Overall game progression phases.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Seats filling up; nothing rolled yet.
    Lobby,
    /// Transient: dice re-created and cards drawn.
    Rolling,
    /// Players raise in seating order.
    Bidding,
    /// A Dudo is pending resolution.
    DudoCalled,
    /// A Jonti is pending resolution.
    JontiCalled,
    /// Outcome shown; waiting for players to ready up.
    RoundEnd,
    /// Exactly one player still has dice.
    GameOver,
    /// Frozen; `paused_from` remembers where to resume.
    Paused,
}

impl Phase {
    /// Phases that may be paused.
    pub fn is_in_round(self) -> bool {
        matches!(
            self,
            Phase::Rolling
                | Phase::Bidding
                | Phase::DudoCalled
                | Phase::JontiCalled
                | Phase::RoundEnd
        )
    }

    pub fn is_call_pending(self) -> bool {
        matches!(self, Phase::DudoCalled | Phase::JontiCalled)
    }
}

/// AI tiers, weakest first.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
    ChuckNorris,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::ChuckNorris,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
            Difficulty::ChuckNorris => "chuck_norris",
        }
    }
}

impl FromStr for Difficulty {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            "chuck_norris" | "chucknorris" | "chuck" => Ok(Difficulty::ChuckNorris),
            other => Err(DomainError::not_found(
                NotFoundKind::Other("difficulty".into()),
                format!("unknown difficulty '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "difficulty")]
pub enum PlayerKind {
    Human,
    Ai(Difficulty),
}

/// A bid on "at least `quantity` dice show `face`".
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub player: PlayerId,
    pub quantity: u8,
    #[serde(rename = "faceValue")]
    pub face: u8,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    Dudo,
    Jonti,
}

/// A Dudo or Jonti waiting for its reaction window to close.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCall {
    pub kind: CallKind,
    pub caller: PlayerId,
    pub target: PlayerId,
    pub bid: Bid,
    pub late: bool,
}

impl PendingCall {
    pub fn involves(&self, player: PlayerId) -> bool {
        self.caller == player || self.target == player
    }
}

/// Something a player learned about another die through an information card.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct KnownDie {
    pub owner: PlayerId,
    pub die_id: DieId,
    pub die_type: DieType,
    /// `None` when only the size is known (Gauge).
    pub face: Option<u8>,
}

#[derive(Debug, Clone)]
pub struct PlayerState {
    pub id: PlayerId,
    pub name: String,
    pub kind: PlayerKind,
    pub dice: Vec<Die>,
    pub hand: Vec<Card>,
    pub effects: ActiveEffects,
    pub knowledge: Vec<KnownDie>,
    pub eliminated: bool,
    pub ready: bool,
}

impl PlayerState {
    pub fn new(id: PlayerId, name: impl Into<String>, kind: PlayerKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            dice: Vec::new(),
            hand: Vec::new(),
            effects: ActiveEffects::default(),
            knowledge: Vec::new(),
            eliminated: false,
            ready: matches!(kind, PlayerKind::Ai(_)),
        }
    }

    pub fn is_ai(&self) -> bool {
        matches!(self.kind, PlayerKind::Ai(_))
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        match self.kind {
            PlayerKind::Ai(d) => Some(d),
            PlayerKind::Human => None,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.eliminated
    }

    pub fn dice_count(&self) -> u8 {
        self.dice.len().min(u8::MAX as usize) as u8
    }
}

/// Entire game container, sufficient for pure domain operations.
#[derive(Debug, Clone)]
pub struct GameState {
    pub rules: RuleSet,
    pub phase: Phase,
    /// Phase to restore on resume.
    pub paused_from: Option<Phase>,
    /// Seated players, ordered by seat.
    pub players: Vec<PlayerState>,
    pub turn: Option<PlayerId>,
    pub current_bid: Option<Bid>,
    pub previous_bid: Option<Bid>,
    /// Every bid of the current round, oldest first.
    pub round_bids: Vec<Bid>,
    pub round_no: u32,
    pub pending: Option<PendingCall>,
    /// Result of the most recent resolution (already public).
    pub last_outcome: Option<RoundOutcome>,
    /// Player who opens the next round.
    pub next_starter: Option<PlayerId>,
    pub winner: Option<PlayerId>,
    pub deck: Deck,
    pub mint: DieMint,
    /// Bumped on every successful mutation.
    pub version: u64,
    pub(crate) rng: ChaCha8Rng,
}

impl GameState {
    /// Fresh lobby. `seed` makes every roll, shuffle, and draw reproducible.
    pub fn new(rules: RuleSet, seed: Option<u64>) -> Self {
        let rules = rules.normalized();
        let mut rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(derive_table_seed(s)),
            None => ChaCha8Rng::from_os_rng(),
        };
        let deck = Deck::create(rules.chaos_mode, &mut rng);
        Self {
            rules,
            phase: Phase::Lobby,
            paused_from: None,
            players: Vec::new(),
            turn: None,
            current_bid: None,
            previous_bid: None,
            round_bids: Vec::new(),
            round_no: 0,
            pending: None,
            last_outcome: None,
            next_starter: None,
            winner: None,
            deck,
            mint: DieMint::new(),
            version: 0,
            rng,
        }
    }

    pub fn player(&self, id: PlayerId) -> Result<&PlayerState, DomainError> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| DomainError::not_found(NotFoundKind::Player, format!("seat {id}")))
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Result<&mut PlayerState, DomainError> {
        self.players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| DomainError::not_found(NotFoundKind::Player, format!("seat {id}")))
    }

    pub fn active_players(&self) -> impl Iterator<Item = &PlayerState> {
        self.players.iter().filter(|p| p.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.active_players().count()
    }

    /// Dice still in play across all non-eliminated players.
    pub fn total_dice(&self) -> u8 {
        let total: usize = self.active_players().map(|p| p.dice.len()).sum();
        total.min(u8::MAX as usize) as u8
    }

    /// Next non-eliminated seat strictly after `from`, wrapping.
    pub fn next_active_after(&self, from: PlayerId) -> Option<PlayerId> {
        let active: Vec<PlayerId> = self.active_players().map(|p| p.id).collect();
        active
            .iter()
            .copied()
            .find(|&id| id > from)
            .or_else(|| active.first().copied())
    }

    /// `from` itself if still active, otherwise the next active seat.
    pub fn active_at_or_after(&self, from: PlayerId) -> Option<PlayerId> {
        match self.player(from) {
            Ok(p) if p.is_active() => Some(from),
            _ => self.next_active_after(from),
        }
    }

    /// The phase underneath a pause.
    pub fn effective_phase(&self) -> Phase {
        match self.phase {
            Phase::Paused => self.paused_from.unwrap_or(Phase::Paused),
            other => other,
        }
    }

    /// Card timing window currently open for `player`, if any.
    pub fn current_timing(&self, player: PlayerId) -> Option<Timing> {
        let eliminated = self.player(player).map(|p| p.eliminated).unwrap_or(true);
        if eliminated {
            return None;
        }
        match self.phase {
            Phase::Bidding if self.turn == Some(player) => Some(Timing::OnTurn),
            Phase::Bidding => Some(Timing::Reaction),
            Phase::DudoCalled | Phase::JontiCalled => match self.pending {
                Some(pending) if pending.involves(player) => Some(Timing::OnDudo),
                _ => None,
            },
            _ => None,
        }
    }

    /// Drop every piece of knowledge about a die that no longer exists.
    pub fn forget_die(&mut self, die_id: DieId) {
        for p in &mut self.players {
            p.knowledge.retain(|k| k.die_id != die_id);
        }
    }

    pub fn lifecycle_view(&self) -> GameLifecycleView {
        GameLifecycleView {
            version: self.version,
            turn: self.turn,
            phase: self.phase,
            round_no: self.round_no,
        }
    }

    pub(crate) fn bump_version(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}
