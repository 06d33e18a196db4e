pub mod cli;
pub mod config;
pub mod error;
pub mod list;
pub mod metrics;
pub mod output_formats;
pub mod processor;
pub mod search;
pub mod tool;
pub mod walker;

pub use clap::Parser;
pub use cli::{Cli, Commands};
pub use config::Config;
pub use error::{CodeseekError, ListError, Result, SearchError, SearchErrorKind};
pub use list::{EntryKind, ListEntry, ListRequest, list_directory};
pub use metrics::Metrics;
pub use processor::{build_regex, is_binary};
pub use search::{
    SearchEngine, SearchLimits, SearchOutcome, SearchRequest, SearchResult, MAX_FILE_SIZE,
    MAX_RESULTS, TIMEOUT_MS,
};
pub use tool::{ToolRequest, handle_line};

use std::sync::Arc;

/// Builds an engine from a loaded config.
pub fn engine_from_config(config: &Config, metrics: Arc<Metrics>) -> SearchEngine {
    SearchEngine::new(metrics)
        .with_limits(config.limits())
        .with_cache_capacity(config.cache.capacity)
}
