#![allow(dead_code)]

// tests/common/mod.rs
pub mod proptest_prelude;

use std::time::Duration;

use perudo_backend::ai::{AiConfig, Easy, OpponentModel};
use perudo_backend::config::GameSettings;
use perudo_backend::domain::engine::{advance_if_ready, apply_action, resolve_pending, GameAction};
use perudo_backend::domain::player_view::AiGameContext;
use perudo_backend::domain::rules::RuleSet;
use perudo_backend::domain::state::{Difficulty, GameState, Phase};
use perudo_backend::protocol::ServerEvent;
use perudo_backend::services::{GameFlowService, Subscription};

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

/// Short reaction window so timer paths finish quickly.
pub fn fast_settings(seed: u64) -> GameSettings {
    GameSettings {
        seed: Some(seed),
        reaction_window_ms: 50,
        ..GameSettings::default()
    }
}

/// Search budget small enough for CI.
pub fn quick_ai_config(seed: u64) -> AiConfig {
    AiConfig::with_seed(seed).with_budget(40, 200).with_workers(2)
}

pub fn service(seed: u64) -> GameFlowService {
    GameFlowService::new(quick_ai_config(seed))
}

/// Next event, or `None` when nothing arrives within `within`.
pub async fn next_event(sub: &mut Subscription, within: Duration) -> Option<ServerEvent> {
    tokio::time::timeout(within, sub.events.recv())
        .await
        .ok()
        .flatten()
}

/// Drain events until one matches `pred`.
pub async fn wait_for<F>(sub: &mut Subscription, within: Duration, mut pred: F) -> Option<ServerEvent>
where
    F: FnMut(&ServerEvent) -> bool,
{
    let deadline = tokio::time::Instant::now() + within;
    loop {
        let event = tokio::time::timeout_at(deadline, sub.events.recv())
            .await
            .ok()
            .flatten()?;
        if pred(&event) {
            return Some(event);
        }
    }
}

/// A table of AIs, already rolling, built only through the engine.
pub fn started_ai_table(seed: u64, tiers: &[Difficulty], starting_dice: u8) -> GameState {
    let rules = RuleSet {
        starting_dice,
        max_dice_per_player: starting_dice,
        ..RuleSet::default()
    };
    let mut state = GameState::new(rules, Some(seed));
    for (slot, difficulty) in tiers.iter().enumerate() {
        apply_action(
            &mut state,
            0,
            &GameAction::AddAiPlayer {
                slot: slot as u8,
                difficulty: *difficulty,
            },
        )
        .expect("seat AI");
    }
    advance_if_ready(&mut state).expect("start game");
    assert_eq!(state.phase, Phase::Bidding);
    state
}

/// Close call windows and start rounds the way the session layer would.
/// Returns false once the game is over.
pub fn settle(state: &mut GameState) -> bool {
    loop {
        match state.phase {
            Phase::DudoCalled | Phase::JontiCalled => {
                resolve_pending(state).expect("resolve call");
            }
            Phase::RoundEnd => {
                advance_if_ready(state).expect("next round");
            }
            Phase::GameOver => return false,
            _ => return true,
        }
    }
}

/// One random legal move for whoever is on turn.
pub fn random_turn(state: &mut GameState, easy: &Easy) -> Result<(), String> {
    let seat = state.turn.ok_or("no seat on turn")?;
    let ctx = AiGameContext::build(state, seat, &OpponentModel::default())
        .map_err(|e| e.to_string())?;
    let decision = easy.decide_now(&ctx).map_err(|e| e.to_string())?;
    let action = decision.clone().into_game_action();
    apply_action(state, seat, &action)
        .map(|_| ())
        .map_err(|e| format!("{decision:?} rejected: {e}"))
}
