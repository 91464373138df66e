//! Shared proptest configuration for domain property tests.

use proptest::test_runner::Config;

/// Case count from `PROPTEST_CASES` (default 64), no failure persistence.
pub fn proptest_config() -> Config {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(64);
    Config {
        cases,
        failure_persistence: None,
        ..Config::default()
    }
}
