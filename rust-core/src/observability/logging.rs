use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static SUBSCRIBER: OnceLock<()> = OnceLock::new();

/// Installs the global subscriber on first call; later calls are no-ops.
///
/// Output always goes to stderr because stdout carries the JSON response.
/// `RUST_LOG` overrides the default `info` filter.
pub fn setup_logging(json: bool) {
    SUBSCRIBER.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let base = tracing_subscriber::registry().with(filter);

        if json {
            base.with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
        } else {
            base.with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    });
}

/// Request lifecycle events under the `request` target.
#[macro_export]
macro_rules! log_request {
    ($level:ident, $($arg:tt)*) => {
        tracing::$level!(target: "request", $($arg)*);
    };
}

/// Events about an external collaborator (script runner, catalog command, classifier).
#[macro_export]
macro_rules! log_collaborator {
    ($level:ident, $collaborator:expr, $($arg:tt)*) => {
        tracing::$level!(target: "collaborator", collaborator = $collaborator, $($arg)*);
    };
}
