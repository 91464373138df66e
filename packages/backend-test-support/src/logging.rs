//! One-shot tracing setup for test binaries.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Install the test subscriber once per process.
///
/// Level precedence is `TEST_LOG`, then `RUST_LOG`, then `"warn"`.
/// Setting `TEST_LOG_JSON=1` switches to the same JSON shape the engine
/// emits in production, which is handy when grepping simulator traces.
pub fn init() {
    INITIALIZED.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        let json = std::env::var("TEST_LOG_JSON")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        if json {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_test_writer()
                .without_time()
                .try_init()
                .ok();
        } else {
            fmt()
                .with_env_filter(filter)
                .with_test_writer() // cargo/nextest capture
                .without_time()
                .try_init()
                .ok();
        }
    });
}
