//! AI player module - automated decisions for seated AIs.
//!
//! This module provides:
//! - the `AiPlayer` trait and the closed `AiStrategy` set of tiers
//! - the probability engine and the opponent model the tiers decide from
//! - ISMCTS for the strongest tier
//!
//! Strategies never touch a live game. They receive an owned
//! `AiGameContext` and return a `Decision` that goes through the same
//! validation as a human action.

pub mod chuck_norris;
pub mod config;
pub mod decision;
pub mod easy;
pub mod hard;
pub mod ismcts;
pub mod normal;
pub mod opponent_model;
pub mod probability;
pub mod registry;
mod trait_def;

pub use chuck_norris::ChuckNorris;
pub use config::AiConfig;
pub use decision::{AiAction, Decision};
pub use easy::Easy;
pub use hard::Hard;
pub use normal::Normal;
pub use opponent_model::OpponentModel;
pub use registry::{create_ai, registered_ais, AiStrategy};
pub use trait_def::{AiError, AiPlayer};
