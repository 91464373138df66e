//! Session layer: live tables, their event fan-out, and the orchestration
//! that drives them.

pub mod event_hub;
pub mod game_flow;
pub mod registry;
pub mod session;

pub use event_hub::{EventHub, Subscription};
pub use game_flow::GameFlowService;
pub use registry::{SessionHandle, SessionRegistry};
pub use session::GameSession;
