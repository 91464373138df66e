use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::rules::{RuleSet, HAND_CAP, MAX_SEATS, MIN_PLAYERS, STARTING_DICE};

const DEFAULT_REACTION_WINDOW_MS: u64 = 3000;
const MAX_REACTION_WINDOW_MS: u64 = 60_000;

/// Per-session table settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub starting_dice: u8,
    pub min_players: usize,
    pub max_players: usize,
    pub hand_cap: usize,
    pub chaos_mode: bool,
    /// Jonti bonus ceiling. Never below `starting_dice`.
    pub max_dice_per_player: u8,
    /// How long caller and target get to play on-dudo cards.
    pub reaction_window_ms: u64,
    pub seed: Option<u64>,
    /// Drive seated AIs automatically after every mutation.
    pub auto_drive_ai: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            starting_dice: STARTING_DICE,
            min_players: MIN_PLAYERS,
            max_players: MAX_SEATS,
            hand_cap: HAND_CAP,
            chaos_mode: false,
            max_dice_per_player: STARTING_DICE,
            reaction_window_ms: DEFAULT_REACTION_WINDOW_MS,
            seed: None,
            auto_drive_ai: true,
        }
    }
}

impl GameSettings {
    /// Defaults overridden by `PERUDO_*` environment variables.
    ///
    /// Unparseable values are ignored with a warning; out-of-range values are
    /// clamped.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        if let Some(n) = parse_var::<u8, _>(&lookup, "PERUDO_STARTING_DICE") {
            settings.starting_dice = n;
            settings.max_dice_per_player = n;
        }
        if let Some(n) = parse_var::<usize, _>(&lookup, "PERUDO_MAX_PLAYERS") {
            settings.max_players = n;
        }
        if let Some(on) = parse_var::<bool, _>(&lookup, "PERUDO_CHAOS_MODE") {
            settings.chaos_mode = on;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "PERUDO_REACTION_WINDOW_MS") {
            settings.reaction_window_ms = ms;
        }
        if let Some(seed) = parse_var::<u64, _>(&lookup, "PERUDO_SEED") {
            settings.seed = Some(seed);
        }
        settings.clamped()
    }

    pub fn clamped(mut self) -> Self {
        let rules = self.to_rules();
        self.starting_dice = rules.starting_dice;
        self.min_players = rules.min_players;
        self.max_players = rules.max_players;
        self.hand_cap = rules.hand_cap;
        self.max_dice_per_player = rules.max_dice_per_player;
        self.reaction_window_ms = self.reaction_window_ms.min(MAX_REACTION_WINDOW_MS);
        self
    }

    pub fn to_rules(&self) -> RuleSet {
        RuleSet {
            starting_dice: self.starting_dice,
            min_players: self.min_players,
            max_players: self.max_players,
            hand_cap: self.hand_cap,
            max_dice_per_player: self.max_dice_per_player,
            chaos_mode: self.chaos_mode,
        }
        .normalized()
    }

    pub fn reaction_window(&self) -> Duration {
        Duration::from_millis(self.reaction_window_ms)
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(var = name, value = trimmed, "Ignoring unparseable setting");
            None
        }
    }
}
