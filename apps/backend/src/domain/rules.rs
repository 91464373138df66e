use serde::{Deserialize, Serialize};

/// Hard upper bound on seats at one table.
pub const MAX_SEATS: usize = 6;
pub const MIN_PLAYERS: usize = 2;
pub const STARTING_DICE: u8 = 5;
pub const HAND_CAP: usize = 3;

/// The wild face. Counts toward any other face unless the bid is on 1s.
pub const WILD_FACE: u8 = 1;
pub const MIN_FACE: u8 = 1;
pub const MAX_FACE: u8 = 6;

/// Table rules fixed at session creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub starting_dice: u8,
    pub min_players: usize,
    pub max_players: usize,
    pub hand_cap: usize,
    /// Ceiling for the Jonti bonus die.
    pub max_dice_per_player: u8,
    /// Doubles the dice-manipulation cards in the deck.
    pub chaos_mode: bool,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            starting_dice: STARTING_DICE,
            min_players: MIN_PLAYERS,
            max_players: MAX_SEATS,
            hand_cap: HAND_CAP,
            max_dice_per_player: STARTING_DICE,
            chaos_mode: false,
        }
    }
}

impl RuleSet {
    /// Clamp every field into a playable range.
    pub fn normalized(mut self) -> Self {
        self.max_players = self.max_players.clamp(MIN_PLAYERS, MAX_SEATS);
        self.min_players = self.min_players.clamp(MIN_PLAYERS, self.max_players);
        self.starting_dice = self.starting_dice.clamp(1, 10);
        self.max_dice_per_player = self.max_dice_per_player.max(self.starting_dice);
        self.hand_cap = self.hand_cap.min(HAND_CAP);
        self
    }
}

/// Valid face range for any bid.
pub fn is_valid_face(face: u8) -> bool {
    (MIN_FACE..=MAX_FACE).contains(&face)
}
