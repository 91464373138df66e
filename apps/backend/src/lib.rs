#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod ai;
pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod logging;
pub mod protocol;
pub mod services;
pub mod telemetry;

#[cfg(test)]
pub mod test_bootstrap;

// Re-exports for public API
pub use ai::{create_ai, AiConfig, AiPlayer, AiStrategy, Decision};
pub use config::GameSettings;
pub use domain::{apply_action, GameAction, GameState, PublicGameState};
pub use error::AppError;
pub use protocol::{ClientAction, ServerEvent};
pub use services::{GameFlowService, SessionRegistry};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}
