use prometheus::{Encoder, IntCounter, Opts, Registry, TextEncoder};
use std::sync::Arc;

#[derive(Clone)]
pub struct Metrics {
    pub files_scanned: IntCounter,
    pub files_skipped: IntCounter,
    pub matches_found: IntCounter,
    pub searches_total: IntCounter,
    pub searches_timed_out: IntCounter,
    pub searches_truncated: IntCounter,
    registry: Arc<Registry>,
}

fn counter(registry: &Registry, name: &str, help: &str) -> prometheus::Result<IntCounter> {
    let counter = IntCounter::with_opts(Opts::new(name, help))?;
    registry.register(Box::new(counter.clone()))?;
    Ok(counter)
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();
        Ok(Metrics {
            files_scanned: counter(&registry, "files_scanned", "Number of files scanned")?,
            files_skipped: counter(
                &registry,
                "files_skipped",
                "Number of files skipped as empty, oversized, binary or unreadable",
            )?,
            matches_found: counter(&registry, "matches_found", "Number of matching lines")?,
            searches_total: counter(&registry, "searches_total", "Number of searches run")?,
            searches_timed_out: counter(
                &registry,
                "searches_timed_out",
                "Number of searches that hit the deadline",
            )?,
            searches_truncated: counter(
                &registry,
                "searches_truncated",
                "Number of searches that hit the result cap",
            )?,
            registry: Arc::new(registry),
        })
    }

    pub fn gather(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if encoder.encode(&metric_families, &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}
