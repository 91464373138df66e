//! ChuckNorris AI - ISMCTS on a worker pool.
//!
//! Cards are chosen with the Hard heuristics; bids and calls come from the
//! search. When the search completes no iteration within its budget (or every
//! worker dies) the Hard decision is returned instead.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::warn;

use super::config::AiConfig;
use super::decision::Decision;
use super::hard::Hard;
use super::ismcts;
use super::trait_def::{AiError, AiPlayer};
use crate::domain::player_view::AiGameContext;
use crate::domain::seed_derivation::derive_worker_seed;

pub struct ChuckNorris {
    config: AiConfig,
    base_seed: u64,
    searches: AtomicU64,
}

impl ChuckNorris {
    pub const NAME: &'static str = "ChuckNorris";
    pub const VERSION: &'static str = "1.0.0";

    pub fn new(config: AiConfig) -> Self {
        let base_seed = config.seed.unwrap_or_else(rand::random);
        Self {
            config,
            base_seed,
            searches: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    fn worker_seeds(&self) -> Vec<u64> {
        let search_no = self.searches.fetch_add(1, Ordering::Relaxed);
        (0..self.config.worker_count())
            .map(|w| derive_worker_seed(self.base_seed, w, search_no))
            .collect()
    }

    fn fallback(ctx: &AiGameContext, why: &AiError) -> Result<Decision, AiError> {
        warn!(seat = ctx.seat, error = %why, "Search produced nothing; using Hard decision");
        Hard::decide(ctx)
    }
}

#[async_trait]
impl AiPlayer for ChuckNorris {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn make_decision(&self, ctx: &AiGameContext) -> Result<Decision, AiError> {
        if !ctx.is_my_turn() {
            return Err(AiError::InvalidMove("Not this seat's turn".into()));
        }
        if let Some(card) = Hard::choose_card(ctx) {
            return Ok(card);
        }
        if self.config.iterations == 0 || self.config.time_budget_ms == 0 {
            return Self::fallback(ctx, &AiError::Timeout);
        }
        match ismcts::search(ctx, &self.config, self.worker_seeds()).await {
            Ok(outcome) => Ok(Decision::new(outcome.action, outcome.win_rate).because(format!(
                "most visited after {} iterations",
                outcome.report.iterations
            ))),
            Err(err) => Self::fallback(ctx, &err),
        }
    }

    async fn react(&self, ctx: &AiGameContext) -> Result<Option<Decision>, AiError> {
        Ok(Hard::choose_card(ctx))
    }
}
