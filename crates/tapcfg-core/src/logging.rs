//! Diagnostic tracing for the tapcfg binary.
//!
//! Resolution steps (variables read, rc file loaded, aliases expanded,
//! implied values settled) are emitted as `tracing` events. Stdout carries
//! the resolved JSON or YAML, so events always go to stderr.

use std::sync::OnceLock;
use tracing::Level;

/// Variable selecting the event level: `trace`, `debug`, `info`, `warn` or `error`
pub const LOG_ENV: &str = "TAPCFG_LOG";

static INIT: OnceLock<()> = OnceLock::new();

/// Unknown or missing levels fall back to `warn`, which shows only the
/// recoverable anomalies (missing explicit rc file, negated aliases).
fn level_from(raw: Option<&str>) -> Level {
    raw.and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(Level::WARN)
}

/// Install the stderr subscriber, reading the level from [`LOG_ENV`].
///
/// Safe to call more than once; only the first call has an effect.
pub fn init() {
    INIT.get_or_init(|| {
        let level = level_from(std::env::var(LOG_ENV).ok().as_deref());
        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_falls_back_to_warn() {
        assert_eq!(level_from(None), Level::WARN);
        assert_eq!(level_from(Some("loud")), Level::WARN);
        assert_eq!(level_from(Some("")), Level::WARN);
    }

    #[test]
    fn test_level_names() {
        assert_eq!(level_from(Some("DEBUG")), Level::DEBUG);
        assert_eq!(level_from(Some(" trace ")), Level::TRACE);
        assert_eq!(level_from(Some("error")), Level::ERROR);
    }

    #[test]
    fn test_init_twice() {
        init();
        init();
        assert!(INIT.get().is_some());
    }
}
