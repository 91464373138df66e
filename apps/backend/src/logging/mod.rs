pub mod redact;

pub use redact::{HiddenDice, HiddenHand};
