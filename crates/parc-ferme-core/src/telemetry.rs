//! Log setup for the `parc-ferme` binary.
//!
//! Stdout is reserved for the header, prompt and review text, so every log
//! line goes to stderr. Colour codes are only emitted when stderr is a terminal.

use std::io::IsTerminal;

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` applies to every target.
/// With `json`, each event is one JSON object per line. A second call in
/// the same process is a no-op.
pub fn init_tracing(json: bool, level: Level) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let installed = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer.with_ansi(false).json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer.with_ansi(std::io::stderr().is_terminal()))
            .try_init()
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
