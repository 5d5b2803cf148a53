//! Logging setup for the quiz backend (tracing + tracing-subscriber).
//!
//! Two application targets carry the interesting events:
//! - `quiz`: bank inventory, session lifecycle, answers, rendering and skips.
//! - `nomenquiz`: startup, configuration and the OpenAI explanation client.
//!
//! `LOG_LEVEL` replaces the default directives below. `LOG_FORMAT=json`
//! switches to one JSON object per line for log shippers. HTTP request spans
//! come from the router's `TraceLayer` under the `tower_http` target.

use tracing_subscriber::EnvFilter;

/// Used when `LOG_LEVEL` is unset or unparsable.
pub const DEFAULT_DIRECTIVES: &str = "info,quiz=debug,nomenquiz=debug,tower_http=info,axum=info";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // The two branches build different subscriber types.
    match LogFormat::parse(std::env::var("LOG_FORMAT").ok().as_deref()) {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_defaults_to_pretty() {
        assert_eq!(LogFormat::parse(None), LogFormat::Pretty);
        assert_eq!(LogFormat::parse(Some("yaml")), LogFormat::Pretty);
        assert_eq!(LogFormat::parse(Some(" JSON ")), LogFormat::Json);
    }

    #[test]
    fn default_directives_parse() {
        assert!(DEFAULT_DIRECTIVES.parse::<EnvFilter>().is_ok());
    }
}
