//! Action and event shapes exchanged with clients.
//!
//! Transport is not this crate's concern: whatever carries these (websocket,
//! channel, test harness) serializes them with serde as-is.

pub mod events;

pub use crate::domain::engine::GameAction as ClientAction;
pub use events::{route_event, Audience, Outbound, ServerEvent};

pub const PROTOCOL_VERSION: i32 = 1;
