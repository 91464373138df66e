//! How to register an AI tier
//!
//! 1) Implement `AiPlayer` for your type in its module.
//! 2) Add a variant to `AiStrategy` and a new `AiFactory` entry to the static
//!    list with a stable `name` and `version`.
//! 3) Keep ordering stable (weakest first); avoid side effects in constructors.
//! 4) Determinism: same seed ⇒ same behavior (where applicable).

use async_trait::async_trait;

use super::chuck_norris::ChuckNorris;
use super::config::AiConfig;
use super::decision::Decision;
use super::easy::Easy;
use super::hard::Hard;
use super::normal::Normal;
use super::trait_def::{AiError, AiPlayer};
use crate::domain::challenge::RoundOutcome;
use crate::domain::player_view::AiGameContext;
use crate::domain::state::Difficulty;

/// The closed set of tiers. Adding one is a compile error everywhere a tier
/// is matched on.
pub enum AiStrategy {
    Easy(Easy),
    Normal(Normal),
    Hard(Hard),
    ChuckNorris(ChuckNorris),
}

impl AiStrategy {
    pub fn difficulty(&self) -> Difficulty {
        match self {
            AiStrategy::Easy(_) => Difficulty::Easy,
            AiStrategy::Normal(_) => Difficulty::Normal,
            AiStrategy::Hard(_) => Difficulty::Hard,
            AiStrategy::ChuckNorris(_) => Difficulty::ChuckNorris,
        }
    }

    fn player(&self) -> &dyn AiPlayer {
        match self {
            AiStrategy::Easy(ai) => ai,
            AiStrategy::Normal(ai) => ai,
            AiStrategy::Hard(ai) => ai,
            AiStrategy::ChuckNorris(ai) => ai,
        }
    }
}

#[async_trait]
impl AiPlayer for AiStrategy {
    fn name(&self) -> &'static str {
        self.player().name()
    }

    async fn make_decision(&self, ctx: &AiGameContext) -> Result<Decision, AiError> {
        self.player().make_decision(ctx).await
    }

    async fn react(&self, ctx: &AiGameContext) -> Result<Option<Decision>, AiError> {
        self.player().react(ctx).await
    }

    fn update_models(&self, ctx: &AiGameContext, outcome: &RoundOutcome) {
        self.player().update_models(ctx, outcome)
    }

    fn reset(&self) {
        self.player().reset()
    }
}

/// Factory definition for constructing AI implementations.
pub struct AiFactory {
    pub difficulty: Difficulty,
    pub name: &'static str,
    pub version: &'static str,
    pub make: fn(config: AiConfig) -> AiStrategy,
}

static AI_FACTORIES: &[AiFactory] = &[
    AiFactory {
        difficulty: Difficulty::Easy,
        name: Easy::NAME,
        version: Easy::VERSION,
        make: make_easy,
    },
    AiFactory {
        difficulty: Difficulty::Normal,
        name: Normal::NAME,
        version: Normal::VERSION,
        make: make_normal,
    },
    AiFactory {
        difficulty: Difficulty::Hard,
        name: Hard::NAME,
        version: Hard::VERSION,
        make: make_hard,
    },
    AiFactory {
        difficulty: Difficulty::ChuckNorris,
        name: ChuckNorris::NAME,
        version: ChuckNorris::VERSION,
        make: make_chuck_norris,
    },
];

/// Returns the statically registered AI factories.
pub fn registered_ais() -> &'static [AiFactory] {
    AI_FACTORIES
}

/// Finds a registered AI factory by its name.
pub fn by_name(name: &str) -> Option<&'static AiFactory> {
    registered_ais().iter().find(|factory| factory.name == name)
}

pub fn by_difficulty(difficulty: Difficulty) -> Option<&'static AiFactory> {
    registered_ais()
        .iter()
        .find(|factory| factory.difficulty == difficulty)
}

/// Build the strategy for `difficulty`.
pub fn create_ai(difficulty: Difficulty, config: AiConfig) -> AiStrategy {
    match by_difficulty(difficulty) {
        Some(factory) => (factory.make)(config),
        None => make_easy(config),
    }
}

fn make_easy(config: AiConfig) -> AiStrategy {
    AiStrategy::Easy(Easy::new(config.seed))
}

fn make_normal(config: AiConfig) -> AiStrategy {
    AiStrategy::Normal(Normal::new(config.seed))
}

fn make_hard(_config: AiConfig) -> AiStrategy {
    AiStrategy::Hard(Hard::new())
}

fn make_chuck_norris(config: AiConfig) -> AiStrategy {
    AiStrategy::ChuckNorris(ChuckNorris::new(config))
}
