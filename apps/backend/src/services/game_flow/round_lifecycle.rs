use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::GameFlowService;
use crate::domain::cards_types::Timing;
use crate::domain::engine::resolve_pending;
use crate::domain::game_transition::GameTransition;
use crate::domain::state::{GameState, PlayerId};
use crate::error::AppError;
use crate::services::game_flow::GameFlowMutationResult;
use crate::services::session::GameSession;

/// Caller or target still holds a card for the challenge window.
pub(super) fn reaction_window_needed(state: &GameState) -> bool {
    let Some(pending) = state.pending else {
        return false;
    };
    [pending.caller, pending.target]
        .into_iter()
        .any(|seat| holds_on_dudo_card(state, seat))
}

pub(super) fn holds_on_dudo_card(state: &GameState, seat: PlayerId) -> bool {
    state
        .player(seat)
        .map(|p| p.is_active() && p.hand.iter().any(|c| c.timing() == Timing::OnDudo))
        .unwrap_or(false)
}

impl GameFlowService {
    /// Follow-ups every mutation may need: open or skip the challenge window,
    /// then wake the AI driver.
    pub(super) fn after_mutation(
        &self,
        session: &mut GameSession,
        result: &GameFlowMutationResult,
        wake_driver: bool,
    ) -> Result<(), AppError> {
        let call_open = session.state.phase.is_call_pending();
        let window_opened = result.has(&GameTransition::CallOpened)
            || (result.has(&GameTransition::Resumed) && call_open);

        if window_opened {
            if reaction_window_needed(&session.state) {
                session.call_seq += 1;
                self.arm_reaction_window(
                    session.id,
                    session.call_seq,
                    session.settings.reaction_window(),
                );
            } else {
                debug!(game_id = %session.id, "No on-dudo cards held; resolving now");
                self.run_mutation(session, resolve_pending)?;
            }
        }

        if wake_driver && session.settings.auto_drive_ai {
            self.spawn_driver(session.id);
        }
        Ok(())
    }

    fn arm_reaction_window(&self, game_id: Uuid, seq: u64, window: Duration) {
        debug!(%game_id, seq, window_ms = window.as_millis() as u64, "Reaction window armed");
        let service = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            match service.close_reaction_window(game_id, seq).await {
                Ok(true) => {}
                Ok(false) => debug!(%game_id, seq, "Reaction window already closed"),
                Err(err) => warn!(%game_id, seq, error = %err, "Failed to close reaction window"),
            }
        });
    }

    /// Resolve the pending call if the window armed as `seq` is still the open
    /// one. Returns whether anything was resolved.
    pub async fn close_reaction_window(&self, game_id: Uuid, seq: u64) -> Result<bool, AppError> {
        let handle = self.registry.get(game_id)?;
        let mut session = handle.lock().await;
        if session.call_seq != seq || !session.state.phase.is_call_pending() {
            return Ok(false);
        }
        let result = self.run_mutation(&mut session, resolve_pending)?;
        info!(%game_id, version = result.new_version, "Reaction window closed");
        self.after_mutation(&mut session, &result, true)?;
        Ok(true)
    }

    pub(super) fn spawn_driver(&self, game_id: Uuid) {
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(err) = service.drive_ai(game_id).await {
                warn!(%game_id, error = %err, "AI driver stopped");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cards_types::CardType;
    use crate::domain::state::{Bid, CallKind, PendingCall, Phase};
    use crate::domain::test_state_helpers::{game_with_dice, set_hand};

    fn called(state: &mut GameState) {
        let bid = Bid {
            player: 1,
            quantity: 2,
            face: 3,
        };
        state.current_bid = Some(bid);
        state.pending = Some(PendingCall {
            kind: CallKind::Dudo,
            caller: 0,
            target: 1,
            bid,
            late: false,
        });
        state.phase = Phase::DudoCalled;
    }

    #[test]
    fn window_only_when_an_involved_seat_holds_an_on_dudo_card() {
        let mut state = game_with_dice(&[&[3, 3], &[2, 4], &[5, 5]]);
        called(&mut state);
        assert!(!reaction_window_needed(&state));

        // A bystander's insurance does not keep the window open.
        set_hand(&mut state, 2, &[CardType::Insurance]);
        assert!(!reaction_window_needed(&state));

        set_hand(&mut state, 1, &[CardType::Peek, CardType::DoubleChallenge]);
        assert!(reaction_window_needed(&state));
    }
}
