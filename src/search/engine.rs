//! Core search engine implementation
use crate::error::SearchError;
use crate::metrics::Metrics;
use crate::processor::{LineScanner, build_regex};
use crate::search::cache::PatternCache;
use crate::search::{
    Budget, Deadline, IncludeFilter, SearchLimits, SearchOutcome, SearchRequest, absolutize,
    is_ignored_dir,
};
use crate::walker::Walker;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Runs search requests. One engine is meant to serve many requests; the
/// include-pattern cache lives here and is shared between them.
pub struct SearchEngine {
    limits: SearchLimits,
    cache: PatternCache,
    metrics: Arc<Metrics>,
}

impl SearchEngine {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self {
            limits: SearchLimits::default(),
            cache: PatternCache::default(),
            metrics,
        }
    }

    /// Limits above the public ceilings are clamped down to them.
    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits.clamped();
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = PatternCache::new(capacity);
        self
    }

    pub fn limits(&self) -> &SearchLimits {
        &self.limits
    }

    pub fn cache(&self) -> &PatternCache {
        &self.cache
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Validates the request, walks (or scans) the root under the deadline
    /// and result cap, and reports what was collected.
    ///
    /// Only an invalid pattern or a missing root fail; everything else that
    /// goes wrong mid-walk just contributes no results.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchOutcome, SearchError> {
        let start = Instant::now();
        let regex = build_regex(&request.pattern)?;
        let root = resolve_root(request.path.as_deref())?;
        let metadata = fs::metadata(&root)
            .map_err(|_| SearchError::path_not_found(&root.display().to_string()))?;

        info!(
            "Searching {} for /{}/ (include: {})",
            root.display(),
            request.pattern,
            request.include.as_deref().unwrap_or("*")
        );
        self.metrics.searches_total.inc();

        let filter = IncludeFilter::compile(request.include.as_deref(), &self.cache);
        let scanner = LineScanner::new(&regex, &self.limits, &self.metrics);
        let deadline = Deadline::at(start + Duration::from_millis(self.limits.timeout_ms));
        let mut budget = Budget::new(deadline, self.limits.max_results);

        if metadata.is_dir() {
            let ignored = root
                .file_name()
                .is_some_and(|name| is_ignored_dir(&name.to_string_lossy()));
            if ignored {
                debug!("Search root is an ignored directory: {}", root.display());
            } else {
                Walker::new(&root, &filter, &scanner).walk(&mut budget);
            }
        } else {
            let parent = root.parent().unwrap_or(Path::new(""));
            if !filter.matches(parent, &root) {
                debug!("Search root does not match include filter: {}", root.display());
            } else if !budget.check_deadline() {
                scanner.scan(parent, &root, &mut budget);
            }
        }

        let timed_out = budget.timed_out();
        let results = budget.into_results();
        let truncated = results.len() >= self.limits.max_results;
        let search_time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        if timed_out {
            warn!(
                "Search timed out after {search_time_ms}ms with {} results",
                results.len()
            );
            self.metrics.searches_timed_out.inc();
        }
        if truncated {
            info!("Search truncated at {} results", results.len());
            self.metrics.searches_truncated.inc();
        }
        debug!("Search finished in {search_time_ms}ms");

        Ok(SearchOutcome {
            results,
            truncated,
            timed_out,
            search_time_ms,
        })
    }
}

/// An absent or empty path means the working directory; relative paths are
/// resolved against it.
fn resolve_root(path: Option<&str>) -> Result<PathBuf, SearchError> {
    let raw = path.map(str::trim).filter(|p| !p.is_empty()).unwrap_or(".");
    absolutize(Path::new(raw)).map_err(|_| SearchError::path_not_found(raw))
}
