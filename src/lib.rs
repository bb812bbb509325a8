// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod bootstrap;
pub mod clickup;
pub mod config;
pub mod error;
pub mod keywords;
pub mod metrics;
pub mod pipeline;
pub mod quota;
pub mod scheduler;
pub mod search;
pub mod service;
pub mod sinks;
pub mod types;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::error::{Result, SyncError};
pub use crate::pipeline::{Pipeline, RunResult};
pub use crate::service::SyncService;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber: `RUST_LOG` or `keyword_post_sync=info,warn`,
/// compact lines, JSON when `LOG_FORMAT=json`.
///
/// Uses `try_init`, so a subscriber installed by the deployment runtime wins.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("keyword_post_sync=info,warn"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    let _ = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}
