pub mod builders;
pub mod recording_runner;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use celldag::logging::LOG_ENV_VAR;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Install a capturing subscriber once per test binary.
///
/// Reads the same `CELLDAG_LOG` variable as the binary, e.g.
/// `CELLDAG_LOG=celldag=debug cargo test`. Output shows up for failing tests
/// only unless run with `--nocapture`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Upper bound for one shell or cascade step in tests. Shorter than the
/// `sleep 5` cells used to exercise cancellation.
pub const STEP_TIMEOUT: Duration = Duration::from_secs(4);

/// Await `fut`, failing the test if it exceeds [`STEP_TIMEOUT`].
pub async fn with_timeout<F: Future>(fut: F) -> F::Output {
    match tokio::time::timeout(STEP_TIMEOUT, fut).await {
        Ok(output) => output,
        Err(_) => panic!("step did not finish within {STEP_TIMEOUT:?}"),
    }
}
