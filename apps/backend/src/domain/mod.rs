//! Domain layer: pure game logic types and helpers.

pub mod bidding;
pub mod card_play;
pub mod cards_types;
pub mod challenge;
pub mod deck;
pub mod dice;
pub mod effects;
pub mod engine;
pub mod events;
pub mod lifecycle;
pub mod lobby;
pub mod player_view;
pub mod round;

pub mod game_transition;
pub mod rules;
pub mod seed_derivation;
pub mod snapshot;
pub mod state;
#[cfg(test)]
pub(crate) mod test_state_helpers;

#[cfg(test)]
pub(crate) mod test_prelude;
#[cfg(test)]
mod tests_bidding;
#[cfg(test)]
mod tests_card_play;
#[cfg(test)]
mod tests_challenge;
#[cfg(test)]
mod tests_confidentiality;
#[cfg(test)]
mod tests_lifecycle;
#[cfg(test)]
mod tests_props_bidding;

// Re-exports for ergonomics
pub use card_play::{CardExtra, CardPlay};
pub use cards_types::{can_play_card, Card, CardType, Timing};
pub use challenge::{ChallengeResult, ExactCallResult, RoundOutcome};
pub use dice::{Die, DieId, DieType};
pub use effects::{ActiveEffects, Effect};
pub use engine::{apply_action, GameAction};
pub use events::{CardResult, DomainEvent};
pub use player_view::{AiGameContext, PrivateInfo};
pub use rules::RuleSet;
pub use snapshot::{public_state, PublicGameState};
pub use state::{Bid, Difficulty, GameState, Phase, PlayerId};
