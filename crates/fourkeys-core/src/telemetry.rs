//! Tracing setup for the `fourkeys` binary.
//!
//! Logs go to stderr so report output on stdout stays pipeable. Without
//! `RUST_LOG`, only the fourkeys crates log at the requested level; HTTP
//! client internals are held at `warn`.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const OWN_TARGETS: [&str; 3] = ["fourkeys", "fourkeys_core", "fourkeys_github"];

/// Filter directives used when `RUST_LOG` is unset.
pub fn default_directives(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    let mut directives = vec!["warn".to_string()];
    directives.extend(OWN_TARGETS.iter().map(|t| format!("{t}={level}")));
    directives.join(",")
}

/// Install the global subscriber. Later calls are no-ops.
///
/// * `json` - newline-delimited JSON instead of human-readable lines.
/// * `level` - verbosity for the fourkeys crates when `RUST_LOG` is unset.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let json_layer = json.then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
    });
    let text_layer = (!json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .ok();
}
