//! Shared test support for the perudo backend.
//!
//! Unit tests and integration tests both install their tracing subscriber
//! through [`logging::init`] so that a single binary never races two
//! subscribers.

pub mod logging;
