use tracing::debug;
use uuid::Uuid;

use super::GameFlowService;
use crate::config::GameSettings;
use crate::domain::engine::{advance_if_ready, apply_action};
use crate::domain::lobby::seat_human;
use crate::domain::player_view::{private_info, PrivateInfo};
use crate::domain::snapshot::{public_state, PublicGameState};
use crate::domain::state::PlayerId;
use crate::error::AppError;
use crate::protocol::{ClientAction, ServerEvent};
use crate::services::event_hub::Subscription;

impl GameFlowService {
    /// Open a new table and return its id.
    pub fn create_game(&self, settings: GameSettings) -> Uuid {
        let (id, _) = self.registry.create(settings, self.ai_config.clone());
        id
    }

    /// Seat a human at `slot` (or the first free seat).
    pub async fn join(
        &self,
        game_id: Uuid,
        name: &str,
        slot: Option<PlayerId>,
    ) -> Result<PlayerId, AppError> {
        let handle = self.registry.get(game_id)?;
        let mut session = handle.lock().await;
        let mut seated = None;
        self.run_mutation(&mut session, |state| {
            let (seat, events) = seat_human(state, name, slot)?;
            state.bump_version();
            seated = Some(seat);
            Ok(events)
        })?;
        seated.ok_or_else(|| AppError::internal("Join produced no seat"))
    }

    /// Start an all-AI table, or any lobby where every human is ready.
    /// Returns whether the game started.
    pub async fn start_if_ready(&self, game_id: Uuid) -> Result<bool, AppError> {
        let handle = self.registry.get(game_id)?;
        let mut session = handle.lock().await;
        let result = self.run_mutation(&mut session, advance_if_ready)?;
        let started = !result.events.is_empty();
        self.after_mutation(&mut session, &result, true)?;
        Ok(started)
    }

    /// The single entry point for player actions.
    ///
    /// On rejection nothing changes and the actor gets an `error` event; the
    /// same error is returned to the caller. Returns the new state version.
    pub async fn submit(
        &self,
        game_id: Uuid,
        actor: PlayerId,
        action: ClientAction,
    ) -> Result<u64, AppError> {
        let handle = self.registry.get(game_id)?;
        let mut session = handle.lock().await;

        let result = match self.run_mutation(&mut session, |state| {
            apply_action(state, actor, &action)
        }) {
            Ok(result) => result,
            Err(err) => {
                debug!(
                    %game_id,
                    seat = actor,
                    action = action.name(),
                    code = %err.code(),
                    "Action rejected"
                );
                self.hub.send_to(game_id, actor, ServerEvent::error(&err));
                return Err(err);
            }
        };

        self.after_mutation(&mut session, &result, true)?;
        Ok(session.version())
    }

    pub async fn public_state(&self, game_id: Uuid) -> Result<PublicGameState, AppError> {
        let handle = self.registry.get(game_id)?;
        let session = handle.lock().await;
        Ok(public_state(&session.state))
    }

    pub async fn private_info(
        &self,
        game_id: Uuid,
        seat: PlayerId,
    ) -> Result<PrivateInfo, AppError> {
        let handle = self.registry.get(game_id)?;
        let session = handle.lock().await;
        Ok(private_info(&session.state, seat)?)
    }

    /// Subscribe to a table's events, optionally as the viewer at `seat`.
    /// The current snapshot is queued right away.
    pub async fn subscribe(
        &self,
        game_id: Uuid,
        viewer: Option<PlayerId>,
    ) -> Result<Subscription, AppError> {
        let handle = self.registry.get(game_id)?;
        let session = handle.lock().await;
        Ok(self
            .hub
            .subscribe_with_snapshot(game_id, viewer, &session.state))
    }
}
