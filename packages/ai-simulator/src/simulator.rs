//! In-memory game simulator for AI evaluation.
//!
//! Drives the real engine directly: every AI proposal goes through
//! `apply_action` exactly as it would in a live session, minus the session
//! layer's locks, timers, and event fan-out. A rejected or failed proposal is
//! replaced by the Easy tier's immediate move and counted as a fallback.

use std::time::Instant;

use perudo_backend::ai::{AiPlayer, AiStrategy, Decision, Easy, OpponentModel};
use perudo_backend::domain::challenge::RoundOutcome;
use perudo_backend::domain::engine::{advance_if_ready, apply_action, resolve_pending, GameAction};
use perudo_backend::domain::events::DomainEvent;
use perudo_backend::domain::player_view::AiGameContext;
use perudo_backend::domain::rules::RuleSet;
use perudo_backend::domain::seed_derivation::derive_ai_seed;
use perudo_backend::domain::state::{CallKind, Difficulty, GameState, Phase, PlayerId};
use serde::Serialize;
use tracing::{debug, warn};

/// Hard stop for a game that never converges.
const MAX_ACTIONS: usize = 20_000;

/// Per-seat counters accumulated over a game.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeatTally {
    pub decisions: u32,
    pub fallbacks: u32,
    pub bids: u32,
    pub dudos_called: u32,
    pub dudos_won: u32,
    pub jontis_called: u32,
    pub jontis_won: u32,
    pub cards_played: u32,
    pub dice_lost: u32,
    pub think_ms: f64,
}

/// One resolved round.
#[derive(Debug, Clone, Serialize)]
pub struct RoundRecord {
    pub round_no: u32,
    pub starter: PlayerId,
    pub total_dice: u8,
    pub bids: u32,
    pub kind: CallKind,
    pub caller: PlayerId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<PlayerId>,
    pub quantity: u8,
    pub face: u8,
    pub true_count: u8,
    pub success: bool,
    /// Seat that lost dice, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loser: Option<PlayerId>,
}

/// Result of simulating a complete game.
#[derive(Debug, Clone)]
pub struct GameResult {
    pub winner: PlayerId,
    pub rounds: Vec<RoundRecord>,
    /// Seats in the order they went out.
    pub eliminations: Vec<PlayerId>,
    pub seats: Vec<SeatTally>,
    pub actions: usize,
}

#[derive(Default)]
struct Tracker {
    seats: Vec<SeatTally>,
    rounds: Vec<RoundRecord>,
    eliminations: Vec<PlayerId>,
    round_no: u32,
    starter: PlayerId,
    total_dice: u8,
    bids_this_round: u32,
    winner: Option<PlayerId>,
}

impl Tracker {
    fn new(seats: usize) -> Self {
        Self {
            seats: vec![SeatTally::default(); seats],
            ..Self::default()
        }
    }

    fn seat(&mut self, seat: PlayerId) -> Option<&mut SeatTally> {
        self.seats.get_mut(seat as usize)
    }

    fn observe(&mut self, events: &[DomainEvent]) {
        for event in events {
            match event {
                DomainEvent::RoundStarted {
                    round_no,
                    starter,
                    total_dice,
                } => {
                    self.round_no = *round_no;
                    self.starter = *starter;
                    self.total_dice = *total_dice;
                    self.bids_this_round = 0;
                }
                DomainEvent::BidMade { bid, .. } => {
                    self.bids_this_round += 1;
                    if let Some(t) = self.seat(bid.player) {
                        t.bids += 1;
                    }
                }
                DomainEvent::CallMade { kind, caller, .. } => {
                    if let Some(t) = self.seat(*caller) {
                        match kind {
                            CallKind::Dudo => t.dudos_called += 1,
                            CallKind::Jonti => t.jontis_called += 1,
                        }
                    }
                }
                DomainEvent::CardPlayed { player, .. } => {
                    if let Some(t) = self.seat(*player) {
                        t.cards_played += 1;
                    }
                }
                DomainEvent::DudoResolved(r) => {
                    if r.success {
                        if let Some(t) = self.seat(r.caller) {
                            t.dudos_won += 1;
                        }
                    }
                    if let Some(t) = self.seat(r.loser) {
                        t.dice_lost += r.dice_lost as u32;
                    }
                    self.rounds.push(RoundRecord {
                        round_no: self.round_no,
                        starter: self.starter,
                        total_dice: self.total_dice,
                        bids: self.bids_this_round,
                        kind: CallKind::Dudo,
                        caller: r.caller,
                        target: Some(r.target),
                        quantity: r.bid.quantity,
                        face: r.bid.face,
                        true_count: r.true_count,
                        success: r.success,
                        loser: Some(r.loser),
                    });
                }
                DomainEvent::JontiResolved(r) => {
                    if let Some(t) = self.seat(r.caller) {
                        if r.success {
                            t.jontis_won += 1;
                        }
                        if r.dice_delta < 0 {
                            t.dice_lost += r.dice_delta.unsigned_abs() as u32;
                        }
                    }
                    self.rounds.push(RoundRecord {
                        round_no: self.round_no,
                        starter: self.starter,
                        total_dice: self.total_dice,
                        bids: self.bids_this_round,
                        kind: CallKind::Jonti,
                        caller: r.caller,
                        target: None,
                        quantity: r.bid.quantity,
                        face: r.bid.face,
                        true_count: r.true_count,
                        success: r.success,
                        loser: (r.dice_delta < 0).then_some(r.caller),
                    });
                }
                DomainEvent::PlayerEliminated { player } => self.eliminations.push(*player),
                DomainEvent::GameOver { winner } => self.winner = Some(*winner),
                _ => {}
            }
        }
    }
}

/// In-memory game simulator.
pub struct Simulator {
    seed: u64,
    game_id: u32,
    rules: RuleSet,
    fallback: Easy,
}

impl Simulator {
    pub fn new(seed: u64, game_id: u32, rules: RuleSet) -> Self {
        Self {
            seed,
            game_id,
            rules,
            fallback: Easy::new(Some(derive_ai_seed(seed, u8::MAX))),
        }
    }

    /// Play one game to the end with `ais[seat]` deciding for each seat.
    pub async fn simulate_game(&self, ais: &[AiStrategy]) -> Result<GameResult, String> {
        let mut state = GameState::new(self.rules.clone(), Some(self.seed));
        let mut model = OpponentModel::default();
        let mut tracker = Tracker::new(ais.len());

        for (slot, ai) in ais.iter().enumerate() {
            let action = GameAction::AddAiPlayer {
                slot: slot as PlayerId,
                difficulty: ai.difficulty(),
            };
            apply_action(&mut state, 0, &action).map_err(|e| format!("seating: {e}"))?;
        }
        let events = advance_if_ready(&mut state).map_err(|e| format!("start: {e}"))?;
        tracker.observe(&events);

        let mut actions = 0;
        while state.phase != Phase::GameOver {
            actions += 1;
            if actions > MAX_ACTIONS {
                return Err(format!("game {} did not finish", self.game_id));
            }

            let events = match state.phase {
                Phase::Bidding => {
                    self.offer_reactions(&mut state, ais, &mut model, &mut tracker)
                        .await?;
                    if state.phase != Phase::Bidding {
                        continue;
                    }
                    let seat = state.turn.ok_or("bidding without a seat on turn")?;
                    self.play_turn(&mut state, seat, ais, &model, &mut tracker)
                        .await?
                }
                Phase::DudoCalled | Phase::JontiCalled => {
                    self.offer_reactions(&mut state, ais, &mut model, &mut tracker)
                        .await?;
                    resolve_pending(&mut state).map_err(|e| format!("resolve: {e}"))?
                }
                Phase::RoundEnd => {
                    advance_if_ready(&mut state).map_err(|e| format!("advance: {e}"))?
                }
                other => return Err(format!("simulation stuck in {other:?}")),
            };
            observe(&state, &mut model, ais, &mut tracker, &events);
        }

        let winner = tracker
            .winner
            .or(state.winner)
            .ok_or("game over without a winner")?;
        debug!(game = self.game_id, winner, rounds = tracker.rounds.len(), "Game finished");
        Ok(GameResult {
            winner,
            rounds: tracker.rounds,
            eliminations: tracker.eliminations,
            seats: tracker.seats,
            actions,
        })
    }

    /// Give every seat that could play a card right now one chance to.
    async fn offer_reactions(
        &self,
        state: &mut GameState,
        ais: &[AiStrategy],
        model: &mut OpponentModel,
        tracker: &mut Tracker,
    ) -> Result<(), String> {
        let seats: Vec<PlayerId> = state
            .active_players()
            .filter(|p| state.phase != Phase::Bidding || Some(p.id) != state.turn)
            .filter(|p| state.current_timing(p.id).is_some())
            .map(|p| p.id)
            .collect();

        for seat in seats {
            let Some(ai) = ais.get(seat as usize) else {
                continue;
            };
            let Ok(ctx) = AiGameContext::build(state, seat, model) else {
                continue;
            };
            let started = Instant::now();
            let reaction = ai.react(&ctx).await;
            if let Some(t) = tracker.seat(seat) {
                t.think_ms += started.elapsed().as_secs_f64() * 1000.0;
            }
            let Ok(Some(decision)) = reaction else {
                continue;
            };
            let action = decision.clone().into_game_action();
            match apply_action(state, seat, &action) {
                Ok(events) => observe(state, model, ais, tracker, &events),
                Err(e) => warn!(
                    game = self.game_id,
                    seat,
                    action = %decision.action,
                    error = %e,
                    "Reaction rejected"
                ),
            }
        }
        Ok(())
    }

    async fn play_turn(
        &self,
        state: &mut GameState,
        seat: PlayerId,
        ais: &[AiStrategy],
        model: &OpponentModel,
        tracker: &mut Tracker,
    ) -> Result<Vec<DomainEvent>, String> {
        let ai = ais.get(seat as usize).ok_or("no AI for seat")?;
        let ctx = AiGameContext::build(state, seat, model).map_err(|e| e.to_string())?;

        let started = Instant::now();
        let proposed = ai.make_decision(&ctx).await;
        if let Some(t) = tracker.seat(seat) {
            t.think_ms += started.elapsed().as_secs_f64() * 1000.0;
            t.decisions += 1;
        }

        if let Ok(decision) = &proposed {
            let action = decision.clone().into_game_action();
            match apply_action(state, seat, &action) {
                Ok(events) => return Ok(events),
                Err(e) => warn!(
                    game = self.game_id,
                    seat,
                    ai = ai.name(),
                    action = %decision.action,
                    error = %e,
                    "Decision rejected"
                ),
            }
        } else if let Err(e) = &proposed {
            warn!(game = self.game_id, seat, ai = ai.name(), error = %e, "Decision failed");
        }

        if let Some(t) = tracker.seat(seat) {
            t.fallbacks += 1;
        }
        let decision: Decision = self.fallback.decide_now(&ctx).map_err(|e| e.to_string())?;
        apply_action(state, seat, &decision.into_game_action())
            .map_err(|e| format!("fallback rejected: {e}"))
    }
}

fn observe(
    state: &GameState,
    model: &mut OpponentModel,
    ais: &[AiStrategy],
    tracker: &mut Tracker,
    events: &[DomainEvent],
) {
    tracker.observe(events);
    for event in events {
        let outcome = match event {
            DomainEvent::BidMade { bid, .. } => {
                model.observe_bid(state.round_no, bid, state.previous_bid.as_ref());
                continue;
            }
            DomainEvent::DudoResolved(r) => RoundOutcome::Dudo(r.clone()),
            DomainEvent::JontiResolved(r) => RoundOutcome::Jonti(r.clone()),
            _ => continue,
        };
        model.observe_outcome(state.round_no, &outcome);
        for (seat, ai) in ais.iter().enumerate() {
            if let Ok(ctx) = AiGameContext::build(state, seat as PlayerId, model) {
                ai.update_models(&ctx, &outcome);
            }
        }
    }
}

/// Difficulty names in seat order, as recorded in the output.
pub fn seat_labels(tiers: &[Difficulty]) -> Vec<String> {
    tiers.iter().map(|d| d.as_str().to_string()).collect()
}
