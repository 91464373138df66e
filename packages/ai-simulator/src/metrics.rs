//! Metrics collection and output for AI simulation results.

use serde::Serialize;

use crate::simulator::{GameResult, RoundRecord, SeatTally};
use crate::types::MetricsLevel;

/// Complete game metrics for output.
#[derive(Debug, Clone, Serialize)]
pub struct GameMetrics {
    pub game_id: u32,
    pub seed: u64,
    pub timestamp: String,
    pub config: GameConfig,
    pub result: GameResultMetrics,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rounds: Vec<RoundRecord>,
    pub player_metrics: Vec<PlayerMetrics>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameConfig {
    pub ai_types: Vec<String>,
    pub starting_dice: u8,
    pub total_games: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameResultMetrics {
    pub winner: u8,
    pub winner_ai: String,
    pub rounds_played: usize,
    pub actions: usize,
    pub eliminations: Vec<u8>,
    pub duration_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerMetrics {
    pub seat: u8,
    pub ai_type: String,
    /// 1 for the winner, then reverse elimination order.
    pub placement: usize,
    #[serde(flatten)]
    pub tally: SeatTally,
    pub dudo_accuracy: f64,
    pub avg_think_ms: f64,
}

/// One line of the summary CSV.
#[derive(Debug, Clone, Serialize)]
pub struct CsvSummaryRow {
    pub game_id: u32,
    pub seed: u64,
    pub seats: String,
    pub winner: u8,
    pub winner_ai: String,
    pub rounds: usize,
    pub fallbacks: u32,
    pub duration_ms: f64,
}

impl From<&GameMetrics> for CsvSummaryRow {
    fn from(m: &GameMetrics) -> Self {
        Self {
            game_id: m.game_id,
            seed: m.seed,
            seats: m.config.ai_types.join("/"),
            winner: m.result.winner,
            winner_ai: m.result.winner_ai.clone(),
            rounds: m.result.rounds_played,
            fallbacks: m.player_metrics.iter().map(|p| p.tally.fallbacks).sum(),
            duration_ms: m.result.duration_ms,
        }
    }
}

pub struct GameRun<'a> {
    pub game_id: u32,
    pub seed: u64,
    pub ai_types: &'a [String],
    pub starting_dice: u8,
    pub total_games: u32,
    pub duration_ms: f64,
}

fn ratio(num: u32, den: u32) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn placement(result: &GameResult, seat: u8) -> usize {
    if seat == result.winner {
        return 1;
    }
    match result.eliminations.iter().position(|&s| s == seat) {
        Some(idx) => 1 + result.eliminations.len() - idx,
        None => result.eliminations.len() + 1,
    }
}

/// Build metrics from a finished game.
pub fn build_game_metrics(
    run: &GameRun<'_>,
    result: &GameResult,
    level: &MetricsLevel,
) -> GameMetrics {
    let timestamp = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("unknown"));

    let label = |seat: u8| {
        run.ai_types
            .get(seat as usize)
            .cloned()
            .unwrap_or_else(|| String::from("unknown"))
    };

    let player_metrics = result
        .seats
        .iter()
        .enumerate()
        .map(|(seat, tally)| {
            let seat = seat as u8;
            PlayerMetrics {
                seat,
                ai_type: label(seat),
                placement: placement(result, seat),
                tally: tally.clone(),
                dudo_accuracy: ratio(tally.dudos_won, tally.dudos_called),
                avg_think_ms: if tally.decisions == 0 {
                    0.0
                } else {
                    tally.think_ms / tally.decisions as f64
                },
            }
        })
        .collect();

    let rounds = match level {
        MetricsLevel::Detailed => result.rounds.clone(),
        MetricsLevel::Basic => Vec::new(),
    };

    GameMetrics {
        game_id: run.game_id,
        seed: run.seed,
        timestamp,
        config: GameConfig {
            ai_types: run.ai_types.to_vec(),
            starting_dice: run.starting_dice,
            total_games: run.total_games,
        },
        result: GameResultMetrics {
            winner: result.winner,
            winner_ai: label(result.winner),
            rounds_played: result.rounds.len(),
            actions: result.actions,
            eliminations: result.eliminations.clone(),
            duration_ms: run.duration_ms,
        },
        rounds,
        player_metrics,
    }
}
