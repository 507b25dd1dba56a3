// Logging setup for the command-line tool
// Events go to stderr so reports written to stdout stay machine-readable

use std::sync::OnceLock;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: OnceLock<()> = OnceLock::new();

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "siteopt=info";

/// Installs the global subscriber.
///
/// Safe to call multiple times, only the first call has effect. `RUST_LOG`
/// wins over `directive`, which falls back to [`DEFAULT_DIRECTIVE`].
pub fn init(directive: Option<&str>) {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(directive.unwrap_or(DEFAULT_DIRECTIVE)));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init();
    });
}

/// Maps `-v` repetitions to a filter directive.
pub fn directive_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => DEFAULT_DIRECTIVE,
        1 => "siteopt=debug",
        _ => "siteopt=trace",
    }
}
