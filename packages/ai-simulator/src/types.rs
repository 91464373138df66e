//! Shared types for the simulator.

use clap::ValueEnum;
use perudo_backend::domain::state::Difficulty;

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Jsonl,
    Json,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum MetricsLevel {
    Basic,
    Detailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AiType {
    Easy,
    Normal,
    Hard,
    ChuckNorris,
}

impl AiType {
    pub fn difficulty(self) -> Difficulty {
        match self {
            AiType::Easy => Difficulty::Easy,
            AiType::Normal => Difficulty::Normal,
            AiType::Hard => Difficulty::Hard,
            AiType::ChuckNorris => Difficulty::ChuckNorris,
        }
    }
}
