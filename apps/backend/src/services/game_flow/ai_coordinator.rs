use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::round_lifecycle::{holds_on_dudo_card, reaction_window_needed};
use super::GameFlowService;
use crate::ai::{AiPlayer, AiStrategy, Decision};
use crate::domain::cards_types::Timing;
use crate::domain::engine::{advance_if_ready, apply_action, resolve_pending};
use crate::domain::player_view::AiGameContext;
use crate::domain::round::everyone_ready;
use crate::domain::state::{Phase, PlayerId};
use crate::error::AppError;
use crate::services::game_flow::GameFlowMutationResult;
use crate::services::registry::SessionHandle;
use crate::services::session::GameSession;

/// Consecutive steps without progress before the driver gives up.
const MAX_STALLED_STEPS: u32 = 3;

/// What the table is waiting on that an AI (or the driver itself) can supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum AiWork {
    /// An AI must bid, call, or play a turn card.
    Turn(PlayerId),
    /// An AI may play a reaction or on-dudo card.
    React(PlayerId),
    /// Nobody left who could still play into the challenge window.
    ResolveCall,
    /// Round over and every remaining seat is ready.
    NextRound,
}

fn holds_card_for(session: &GameSession, seat: PlayerId, timing: Timing) -> bool {
    let state = &session.state;
    state.current_timing(seat) == Some(timing)
        && state
            .player(seat)
            .map(|p| p.hand.iter().any(|c| c.timing() == timing))
            .unwrap_or(false)
}

pub(super) fn next_ai_work(session: &GameSession) -> Option<AiWork> {
    let state = &session.state;
    let mut ai_seats: Vec<PlayerId> = session.ai_seats().collect();
    ai_seats.sort_unstable();

    match state.phase {
        Phase::Bidding => {
            if state.current_bid.is_some() {
                let reactor = ai_seats.iter().copied().find(|&seat| {
                    Some(seat) != state.turn
                        && !session.was_asked(seat)
                        && holds_card_for(session, seat, Timing::Reaction)
                });
                if let Some(seat) = reactor {
                    return Some(AiWork::React(seat));
                }
            }
            state
                .turn
                .filter(|seat| ai_seats.contains(seat))
                .map(AiWork::Turn)
        }
        Phase::DudoCalled | Phase::JontiCalled => {
            let pending = state.pending?;
            let involved = [pending.caller, pending.target];
            let reactor = involved.into_iter().find(|&seat| {
                ai_seats.contains(&seat)
                    && !session.was_asked(seat)
                    && holds_card_for(session, seat, Timing::OnDudo)
            });
            if let Some(seat) = reactor {
                return Some(AiWork::React(seat));
            }
            // Close early once only AIs that already passed could still play.
            let humans_waiting = involved
                .into_iter()
                .any(|seat| !ai_seats.contains(&seat) && holds_on_dudo_card(state, seat));
            if !reaction_window_needed(state) || !humans_waiting {
                return Some(AiWork::ResolveCall);
            }
            None
        }
        Phase::RoundEnd if everyone_ready(state) => Some(AiWork::NextRound),
        _ => None,
    }
}

/// Everything needed to think off-lock.
struct Prepared {
    work: AiWork,
    seat: PlayerId,
    version: u64,
    ai: Arc<AiStrategy>,
    ctx: AiGameContext,
}

impl GameFlowService {
    /// Let seated AIs act until the table waits on a human, a timer, or the
    /// game ends.
    ///
    /// At most one driver runs per session. Strategies think with the session
    /// unlocked; a decision computed against an older version is dropped and
    /// the driver looks again.
    pub async fn drive_ai(&self, game_id: Uuid) -> Result<(), AppError> {
        let handle = self.registry.get(game_id)?;
        {
            let mut session = handle.lock().await;
            if session.driving {
                return Ok(());
            }
            session.driving = true;
        }

        let result = self.drive_loop(&handle).await;
        if result.is_err() {
            handle.lock().await.driving = false;
        }
        result
    }

    async fn drive_loop(&self, handle: &SessionHandle) -> Result<(), AppError> {
        let mut stalled = 0;
        loop {
            let prepared = {
                let mut session = handle.lock().await;
                let Some(work) = next_ai_work(&session) else {
                    session.driving = false;
                    return Ok(());
                };
                match work {
                    AiWork::ResolveCall => {
                        let result = self.run_mutation(&mut session, resolve_pending)?;
                        self.after_mutation(&mut session, &result, false)?;
                        continue;
                    }
                    AiWork::NextRound => {
                        let result = self.run_mutation(&mut session, advance_if_ready)?;
                        if result.events.is_empty() {
                            stalled += 1;
                        }
                        self.after_mutation(&mut session, &result, false)?;
                        if stalled >= MAX_STALLED_STEPS {
                            session.driving = false;
                            return Err(AppError::internal("Round would not advance"));
                        }
                        continue;
                    }
                    AiWork::Turn(seat) | AiWork::React(seat) => {
                        if matches!(work, AiWork::React(_)) {
                            session.mark_asked(seat);
                        }
                        let Some(ai) = session.ai(seat) else {
                            session.sync_ais();
                            continue;
                        };
                        let ctx = session.context_for(seat)?;
                        Prepared {
                            work,
                            seat,
                            version: session.version(),
                            ai,
                            ctx,
                        }
                    }
                }
            };

            let proposal = think(&prepared).await;

            let mut session = handle.lock().await;
            if session.version() != prepared.version {
                debug!(
                    game_id = %session.id,
                    seat = prepared.seat,
                    seen = prepared.version,
                    now = session.version(),
                    "Stale AI decision dropped"
                );
                continue;
            }

            let progressed = match (prepared.work, proposal) {
                (AiWork::React(_), Ok(None)) => true,
                (_, Ok(Some(decision))) => self.apply_decision(&mut session, &prepared, decision)?,
                // A turn that yields nothing made no progress.
                (_, Ok(None)) => false,
                (work, Err(err)) => {
                    warn!(
                        game_id = %session.id,
                        seat = prepared.seat,
                        ai = prepared.ai.name(),
                        error = %err,
                        "AI failed to decide"
                    );
                    match work {
                        AiWork::Turn(_) => self.apply_fallback(&mut session, &prepared)?,
                        _ => true,
                    }
                }
            };

            if progressed {
                stalled = 0;
            } else {
                stalled += 1;
                if stalled >= MAX_STALLED_STEPS {
                    session.driving = false;
                    return Err(AppError::internal(format!(
                        "AI at seat {} made no legal move",
                        prepared.seat
                    )));
                }
            }
        }
    }

    /// Validate and apply an AI proposal like any human action. A rejected
    /// turn decision is replaced by a random legal one.
    fn apply_decision(
        &self,
        session: &mut GameSession,
        prepared: &Prepared,
        decision: Decision,
    ) -> Result<bool, AppError> {
        debug!(
            game_id = %session.id,
            seat = prepared.seat,
            ai = prepared.ai.name(),
            action = %decision.action,
            confidence = decision.confidence,
            rationale = decision.rationale.as_deref().unwrap_or(""),
            "AI decided"
        );
        match self.apply_for(session, prepared.seat, decision) {
            Ok(result) => {
                self.after_mutation(session, &result, false)?;
                Ok(true)
            }
            Err(err) if err.is_rejection() => {
                warn!(
                    game_id = %session.id,
                    seat = prepared.seat,
                    ai = prepared.ai.name(),
                    code = %err.code(),
                    detail = %err.detail(),
                    "AI decision rejected"
                );
                match prepared.work {
                    AiWork::Turn(_) => self.apply_fallback(session, prepared),
                    _ => Ok(true),
                }
            }
            Err(err) => Err(err),
        }
    }

    fn apply_fallback(
        &self,
        session: &mut GameSession,
        prepared: &Prepared,
    ) -> Result<bool, AppError> {
        let decision = match session.fallback().decide_now(&prepared.ctx) {
            Ok(decision) => decision,
            Err(err) => {
                warn!(
                    game_id = %session.id,
                    seat = prepared.seat,
                    error = %err,
                    "No fallback move"
                );
                return Ok(false);
            }
        };
        info!(
            game_id = %session.id,
            seat = prepared.seat,
            action = %decision.action,
            "Falling back to a random legal move"
        );
        match self.apply_for(session, prepared.seat, decision) {
            Ok(result) => {
                self.after_mutation(session, &result, false)?;
                Ok(true)
            }
            Err(err) if err.is_rejection() => {
                warn!(
                    game_id = %session.id,
                    seat = prepared.seat,
                    code = %err.code(),
                    "Fallback rejected"
                );
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    fn apply_for(
        &self,
        session: &mut GameSession,
        seat: PlayerId,
        decision: Decision,
    ) -> Result<GameFlowMutationResult, AppError> {
        let action = decision.into_game_action();
        self.run_mutation(session, |state| apply_action(state, seat, &action))
    }
}

async fn think(prepared: &Prepared) -> Result<Option<Decision>, crate::ai::AiError> {
    match prepared.work {
        AiWork::Turn(_) => prepared.ai.make_decision(&prepared.ctx).await.map(Some),
        _ => prepared.ai.react(&prepared.ctx).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AiConfig;
    use crate::config::GameSettings;
    use crate::domain::cards_types::CardType;
    use crate::domain::engine::GameAction;
    use crate::domain::lobby::seat_human;
    use crate::domain::state::{Bid, CallKind, Difficulty, PendingCall};
    use crate::domain::test_state_helpers::set_hand;

    fn table(ai_seats: &[PlayerId]) -> GameSession {
        let settings = GameSettings {
            seed: Some(9),
            ..GameSettings::default()
        };
        let mut s = GameSession::new(Uuid::new_v4(), settings, AiConfig::with_seed(9));
        seat_human(&mut s.state, "hu", Some(0)).unwrap();
        for &slot in ai_seats {
            apply_action(
                &mut s.state,
                0,
                &GameAction::AddAiPlayer {
                    slot,
                    difficulty: Difficulty::Normal,
                },
            )
            .unwrap();
        }
        s.sync_ais();
        s
    }

    fn start(s: &mut GameSession) {
        apply_action(&mut s.state, 0, &GameAction::ReadyForRound).unwrap();
        assert_eq!(s.state.phase, Phase::Bidding);
    }

    #[test]
    fn lobby_needs_nothing_from_ais() {
        let s = table(&[1, 2]);
        assert_eq!(next_ai_work(&s), None);
    }

    #[test]
    fn ai_turn_is_detected() {
        let mut s = table(&[1]);
        start(&mut s);
        s.state.turn = Some(1);
        assert_eq!(next_ai_work(&s), Some(AiWork::Turn(1)));
        s.state.turn = Some(0);
        assert_eq!(next_ai_work(&s), None);
    }

    #[test]
    fn reaction_prompt_is_asked_once_per_version() {
        let mut s = table(&[1]);
        start(&mut s);
        s.state.turn = Some(0);
        s.state.current_bid = Some(Bid {
            player: 0,
            quantity: 2,
            face: 4,
        });
        set_hand(&mut s.state, 1, &[CardType::Inflation]);
        assert_eq!(next_ai_work(&s), Some(AiWork::React(1)));
        s.mark_asked(1);
        assert_eq!(next_ai_work(&s), None);
    }

    #[test]
    fn call_resolves_early_once_ais_pass() {
        let mut s = table(&[1]);
        start(&mut s);
        let bid = Bid {
            player: 0,
            quantity: 2,
            face: 4,
        };
        s.state.current_bid = Some(bid);
        s.state.pending = Some(PendingCall {
            kind: CallKind::Dudo,
            caller: 1,
            target: 0,
            bid,
            late: false,
        });
        s.state.phase = Phase::DudoCalled;
        s.state.turn = None;
        set_hand(&mut s.state, 0, &[]);
        set_hand(&mut s.state, 1, &[CardType::Insurance]);
        assert_eq!(next_ai_work(&s), Some(AiWork::React(1)));
        s.mark_asked(1);
        assert_eq!(next_ai_work(&s), Some(AiWork::ResolveCall));

        // A human holding Double keeps the window open for the timer.
        set_hand(&mut s.state, 0, &[CardType::DoubleChallenge]);
        assert_eq!(next_ai_work(&s), None);
    }
}
