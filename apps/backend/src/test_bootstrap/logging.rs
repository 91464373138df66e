#![cfg(test)]

//! Test logging for the library's unit tests.
//!
//! Installs the same subscriber the integration tests use, once per test
//! binary. Level comes from `TEST_LOG`, then `RUST_LOG`, else `warn`:
//!
//! ```bash
//! TEST_LOG=debug cargo test -p perudo-backend ai::
//! ```

/// Idempotent; safe to call from any test.
pub fn init() {
    backend_test_support::logging::init();
}
