//! Tracing setup for the service.
//!
//! - LOG_LEVEL holds EnvFilter directives, e.g. "debug" or
//!   "info,quiz=debug,resolver=debug,dataset=info".
//! - LOG_FORMAT picks "pretty" (default) or "json".
//!
//! Events use the `biotrack_backend`, `dataset`, `quiz` and `resolver` targets;
//! the HTTP TraceLayer adds request spans on top.

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str = "info,quiz=debug,dataset=info,biotrack_backend=debug,tower_http=info,axum=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) if s == "json" => LogFormat::Json,
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

    let format = LogFormat::parse(std::env::var("LOG_FORMAT").ok().as_deref());
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
