//! Logging system demonstration.
//!
//! Run with:
//! ```bash
//! cargo run -p search-runtime --example logging_demo
//! cargo run -p search-runtime --example logging_demo -- json
//! cargo run -p search-runtime --example logging_demo -- compact "search_sync=trace"
//! ```

use search_runtime::logging::{init_logging, redact_if_sensitive, strip_path, LogFormat, LogLevel, LoggingConfig};
use std::env;
use tracing::{debug, error, info, instrument, span, trace, warn, Level};

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();

    let format = match args.get(1).map(String::as_str) {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        Some("pretty") => LogFormat::Pretty,
        _ => LogFormat::default(),
    };

    let mut config = LoggingConfig::default().with_format(format).with_level(LogLevel::Trace);
    if let Some(filter) = args.get(2).cloned() {
        config = config.with_filter(filter);
    }

    init_logging(config).expect("failed to initialise logging");

    info!("=== search-runtime logging demo ===");
    demo_log_levels();
    demo_structured_logging();
    demo_spans().await;
    demo_pii_redaction();
    demo_instrumentation().await;
    info!("=== demo complete ===");
}

fn demo_log_levels() {
    let span = span!(Level::INFO, "log_levels");
    let _enter = span.enter();
    trace!("trace level");
    debug!("debug level");
    info!("info level");
    warn!("warn level");
    error!("error level");
}

fn demo_structured_logging() {
    let span = span!(Level::INFO, "structured_logging");
    let _enter = span.enter();
    info!(source_id = "src-1", documents_processed = 42, "sync progress");
}

async fn demo_spans() {
    let span = span!(Level::INFO, "sync_operation", source_type = "filesystem");
    let _enter = span.enter();
    info!("starting sync");
    tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
    info!(items_processed = 12, "sync completed");
}

fn demo_pii_redaction() {
    let span = span!(Level::INFO, "pii_redaction");
    let _enter = span.enter();
    let secret = "refresh_secret_12345";
    let email = "user@example.com";
    let path = "/home/user/private/notes/a.txt";
    info!(
        secret = %redact_if_sensitive("refresh_secret", secret),
        email = %redact_if_sensitive("email", email),
        file = %strip_path(path),
        "redacted logging example"
    );
}

#[instrument]
async fn demo_instrumentation() {
    info!("instrumented function creates its own span");
    process_items(&["a.txt", "b.md", "c.txt"]).await;
}

#[instrument(fields(count = items.len()))]
async fn process_items(items: &[&str]) {
    for (idx, item) in items.iter().enumerate() {
        process_item(idx, item).await;
    }
}

#[instrument(fields(item_id = idx))]
async fn process_item(idx: usize, item: &str) {
    trace!(item = %item, "processing item");
    tokio::time::sleep(tokio::time::Duration::from_millis(2)).await;
}
