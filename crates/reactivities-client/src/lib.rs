pub mod cli;
pub mod config;
pub mod http;

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber. Respects `RUST_LOG`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("reactivities_client=info,reactivities_store=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
