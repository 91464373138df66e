// apps/backend/src/domain/game_transition.rs

use crate::domain::state::{Phase, PlayerId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLifecycleView {
    pub version: u64,
    pub turn: Option<PlayerId>,
    pub phase: Phase,
    pub round_no: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameTransition {
    /// Edge-triggered: the turn became a specific player.
    TurnBecame { player_id: PlayerId },

    /// Edge-triggered: Game moved from Lobby -> in-round
    GameStarted,

    /// Edge-triggered: a new round number went live
    RoundStarted { round_no: u32 },

    /// Edge-triggered: a Dudo or Jonti opened its reaction window
    CallOpened,

    /// Edge-triggered: the round resolved and is waiting for ready-ups
    RoundEnded,

    /// Edge-triggered: Game moved into GameOver
    GameEnded,

    /// Edge-triggered: Game froze / thawed
    Paused,
    Resumed,

    /// Edge-triggered: Game went back to the lobby
    GameReset,
}

/// Derive domain transitions from before/after lifecycle state.
///
/// The session layer uses these to decide which timers to arm and which AI
/// seats to wake after a mutation.
pub fn derive_game_transitions(
    before: &GameLifecycleView,
    after: &GameLifecycleView,
) -> Vec<GameTransition> {
    let mut transitions = Vec::new();

    // 1. Pause / resume
    if before.phase != Phase::Paused && after.phase == Phase::Paused {
        transitions.push(GameTransition::Paused);
        return transitions;
    }
    if before.phase == Phase::Paused && after.phase != Phase::Paused {
        transitions.push(GameTransition::Resumed);
    }

    // 2. Back to the lobby
    if before.phase != Phase::Lobby && after.phase == Phase::Lobby {
        transitions.push(GameTransition::GameReset);
        return transitions;
    }

    // 3. Game start (Lobby -> !Lobby)
    if before.phase == Phase::Lobby && after.phase != Phase::Lobby {
        transitions.push(GameTransition::GameStarted);
    }

    // 4. Round start
    if after.round_no != before.round_no && after.phase == Phase::Bidding {
        transitions.push(GameTransition::RoundStarted {
            round_no: after.round_no,
        });
    }

    // 5. Call windows
    if !before.phase.is_call_pending() && after.phase.is_call_pending() {
        transitions.push(GameTransition::CallOpened);
    }

    // 6. Round end / game end
    if before.phase != Phase::RoundEnd && after.phase == Phase::RoundEnd {
        transitions.push(GameTransition::RoundEnded);
    }
    if before.phase != Phase::GameOver && after.phase == Phase::GameOver {
        transitions.push(GameTransition::GameEnded);
    }

    // 7. Turn change (also fires when a new round restarts on the same seat)
    if let Some(player_id) = after.turn {
        let new_round = after.round_no != before.round_no;
        if before.turn != Some(player_id) || new_round || before.phase == Phase::Paused {
            transitions.push(GameTransition::TurnBecame { player_id });
        }
    }

    transitions
}
