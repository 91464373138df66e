use tracing::{debug, info};

use crate::domain::events::DomainEvent;
use crate::domain::game_transition::{derive_game_transitions, GameTransition};
use crate::domain::state::GameState;
use crate::errors::domain::DomainError;
use crate::error::AppError;
use crate::logging::HiddenDice;
use crate::protocol::{route_event, Outbound};
use crate::services::game_flow::GameFlowService;
use crate::services::session::GameSession;

#[derive(Debug)]
pub struct GameFlowMutationResult {
    pub events: Vec<DomainEvent>,
    pub old_version: u64,
    pub new_version: u64,
    pub transitions: Vec<GameTransition>,
}

impl GameFlowMutationResult {
    pub fn has(&self, transition: &GameTransition) -> bool {
        self.transitions.contains(transition)
    }
}

impl GameFlowService {
    /// Apply `mutation` to the session's state, then bring everything that
    /// hangs off the state up to date: AI strategies, the opponent model, and
    /// every subscriber. A rejected mutation changes nothing and emits nothing.
    pub(super) fn run_mutation<F>(
        &self,
        session: &mut GameSession,
        mutation: F,
    ) -> Result<GameFlowMutationResult, AppError>
    where
        F: FnOnce(&mut GameState) -> Result<Vec<DomainEvent>, DomainError>,
    {
        let before = session.state.lifecycle_view();
        let old_version = before.version;

        let events = mutation(&mut session.state)?;

        let after = session.state.lifecycle_view();
        let transitions = derive_game_transitions(&before, &after);

        session.sync_ais();
        session.observe(&events);
        session.touch();

        let outbound: Vec<Outbound> = events.iter().cloned().flat_map(route_event).collect();
        self.hub.publish(session.id, &outbound);
        self.hub.send_snapshot(session.id, &session.state);

        log_transitions(session, &transitions);

        Ok(GameFlowMutationResult {
            events,
            old_version,
            new_version: after.version,
            transitions,
        })
    }
}

fn log_transitions(session: &GameSession, transitions: &[GameTransition]) {
    let game_id = session.id;
    let state = &session.state;
    for t in transitions {
        match t {
            GameTransition::GameStarted => {
                info!(%game_id, players = state.players.len(), "Game started");
            }
            GameTransition::RoundStarted { round_no } => {
                info!(
                    %game_id,
                    round = round_no,
                    total_dice = state.total_dice(),
                    "Round started"
                );
                for p in state.active_players() {
                    debug!(%game_id, seat = p.id, dice = %HiddenDice(&p.dice), "Rolled");
                }
            }
            GameTransition::RoundEnded => {
                info!(%game_id, round = state.round_no, phase = ?state.phase, "Round resolved");
            }
            GameTransition::GameEnded => {
                info!(%game_id, winner = ?state.winner, rounds = state.round_no, "Game over");
            }
            GameTransition::Paused | GameTransition::Resumed | GameTransition::GameReset => {
                info!(%game_id, transition = ?t, phase = ?state.phase, "Lifecycle change");
            }
            GameTransition::CallOpened | GameTransition::TurnBecame { .. } => {
                debug!(%game_id, transition = ?t, version = state.version, "Transition");
            }
        }
    }
}
