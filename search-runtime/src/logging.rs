//! # Logging & tracing infrastructure
//!
//! Configures `tracing-subscriber` once per process, the way every
//! long-running operation in this system (`sync`, `search`, scheduler
//! ticks) expects: pretty output for local development, JSON for anything
//! that ships logs elsewhere, and an `EnvFilter` a caller can override with
//! `RUST_LOG`.
//!
//! ## Usage
//!
//! ```ignore
//! use search_runtime::logging::{LoggingConfig, LogFormat, init_logging};
//!
//! init_logging(LoggingConfig::default().with_format(LogFormat::Json))
//!     .expect("failed to initialise logging");
//!
//! tracing::info!("search core starting");
//! ```

use std::io;

use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Error, Result};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, multi-line, coloured — local development.
    Pretty,
    /// Structured JSON, one object per line — anything that ships logs off
    /// the box.
    Json,
    /// Single-line, no colour — CI and scripted invocations.
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        #[cfg(debug_assertions)]
        return Self::Pretty;

        #[cfg(not(debug_assertions))]
        return Self::Json;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Logging configuration. Crate names in the default filter cover every
/// `search-*` crate; third-party HTTP/DB crates are pinned to `warn` so a
/// sync or search span doesn't drown in connection-pool chatter.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Overrides the generated filter string entirely (e.g.
    /// `"search_sync=debug,search_query=trace"`).
    pub filter: Option<String>,
    pub display_target: bool,
    pub display_thread_info: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: LogLevel::Info,
            filter: None,
            display_target: true,
            display_thread_info: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_target(mut self, display: bool) -> Self {
        self.display_target = display;
        self
    }

    pub fn with_thread_info(mut self, display: bool) -> Self {
        self.display_thread_info = display;
        self
    }
}

/// Initialises the global `tracing` subscriber. Call once at process
/// startup; a second call returns an error rather than panicking.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = build_filter(&config)?;

    match config.format {
        LogFormat::Pretty => init_with(config.clone(), filter, tracing_subscriber::fmt::layer().pretty()),
        LogFormat::Json => {
            let layer = tracing_subscriber::fmt::layer().json().flatten_event(true);
            init_with(config.clone(), filter, layer)
        }
        LogFormat::Compact => init_with(config.clone(), filter, tracing_subscriber::fmt::layer().compact()),
    }
}

fn init_with<L>(config: LoggingConfig, filter: EnvFilter, layer: L) -> Result<()>
where
    L: tracing_subscriber::Layer<tracing_subscriber::Registry> + Send + Sync + 'static,
{
    let layer = layer
        .with_target(config.display_target)
        .with_thread_ids(config.display_thread_info)
        .with_thread_names(config.display_thread_info)
        .with_writer(io::stdout);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| Error::Config(format!("failed to initialise logging: {e}")))
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let base_level = config.level.as_str();

    let filter_string = if let Some(custom) = &config.filter {
        custom.clone()
    } else {
        format!(
            "{base_level},search_sync={base_level},search_query={base_level},\
             search_scheduler={base_level},search_settings={base_level},\
             search_connector={base_level},search_pipeline={base_level},\
             search_index={base_level},search_store={base_level},\
             h2=warn,hyper=warn,reqwest=warn,sqlx=warn"
        )
    };

    EnvFilter::try_new(filter_string).map_err(|e| Error::Config(format!("invalid log filter: {e}")))
}

/// Redacts a field's value if its name looks sensitive (tokens, secrets,
/// API keys); used when a span needs to log around a `Credentials` value
/// instead of through it. Credential types themselves never derive
/// `Debug` over raw secrets (see `search-traits::secret::Credentials`) —
/// this is for ad hoc logging sites that format a value by hand.
pub fn redact_if_sensitive(field_name: &str, value: &str) -> String {
    const SENSITIVE_FIELDS: &[&str] = &[
        "token",
        "access_token",
        "refresh_token",
        "access_secret",
        "refresh_secret",
        "password",
        "secret",
        "api_key",
        "authorization",
        "bearer",
    ];

    let field_lower = field_name.to_lowercase();
    if SENSITIVE_FIELDS.iter().any(|&f| field_lower.contains(f)) {
        "[REDACTED]".to_string()
    } else if value.contains('@') && value.contains('.') {
        match value.find('@') {
            Some(at_pos) => format!("{}***@[REDACTED]", &value[..1.min(at_pos)]),
            None => value.to_string(),
        }
    } else {
        value.to_string()
    }
}

/// Strips a full filesystem path down to its basename, for logging
/// filesystem-connector activity without leaking a user's directory
/// layout into logs.
pub fn strip_path(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path).rsplit('\\').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_config_builder_sets_fields() {
        let config = LoggingConfig::default()
            .with_format(LogFormat::Json)
            .with_level(LogLevel::Debug)
            .with_filter("search_sync=trace")
            .with_target(true)
            .with_thread_info(true);

        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.filter, Some("search_sync=trace".to_string()));
        assert!(config.display_target);
        assert!(config.display_thread_info);
    }

    #[test]
    fn redact_if_sensitive_masks_tokens() {
        assert_eq!(redact_if_sensitive("access_token", "secret123"), "[REDACTED]");
        assert_eq!(redact_if_sensitive("api_key", "abc"), "[REDACTED]");
        assert_eq!(redact_if_sensitive("document_title", "hello"), "hello");
    }

    #[test]
    fn redact_if_sensitive_partially_masks_emails() {
        let redacted = redact_if_sensitive("email", "user@example.com");
        assert!(redacted.starts_with('u'));
        assert!(redacted.contains("[REDACTED]"));
    }

    #[test]
    fn strip_path_keeps_only_the_basename() {
        assert_eq!(strip_path("/home/user/notes/a.txt"), "a.txt");
        assert_eq!(strip_path("C:\\Users\\a\\notes\\a.txt"), "a.txt");
        assert_eq!(strip_path("a.txt"), "a.txt");
    }

    #[test]
    fn build_filter_includes_requested_level() {
        let config = LoggingConfig::default().with_level(LogLevel::Debug);
        let filter = build_filter(&config).unwrap();
        assert!(filter.to_string().contains("debug"));
    }

    #[test]
    fn build_filter_honours_custom_override() {
        let config = LoggingConfig::default().with_filter("search_sync=trace,search_query=debug");
        let filter = build_filter(&config).unwrap();
        assert!(filter.to_string().contains("search_sync=trace"));
    }
}
