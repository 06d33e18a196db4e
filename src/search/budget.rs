//! Wall-clock deadline and result budget shared by the walker and scanner.
//!
//! Cancellation is cooperative: the deadline is only consulted between units
//! of work (before a directory is read, before a file is scanned, after each
//! appended result). A single file read in progress is never interrupted; the
//! maximum file size bounds how long that can take.
use super::SearchResult;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    expires_at: Instant,
}

impl Deadline {
    pub fn at(expires_at: Instant) -> Self {
        Self { expires_at }
    }

    pub fn after(timeout: Duration) -> Self {
        Self::at(Instant::now() + timeout)
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Accumulates results for a single request and records why the walk stopped.
#[derive(Debug)]
pub struct Budget {
    deadline: Deadline,
    max_results: usize,
    results: Vec<SearchResult>,
    timed_out: bool,
}

impl Budget {
    pub fn new(deadline: Deadline, max_results: usize) -> Self {
        Self {
            deadline,
            max_results,
            results: Vec::new(),
            timed_out: false,
        }
    }

    /// Returns true if the deadline has passed; latches `timed_out`.
    pub fn check_deadline(&mut self) -> bool {
        if !self.timed_out && self.deadline.is_expired() {
            self.timed_out = true;
        }
        self.timed_out
    }

    pub fn is_full(&self) -> bool {
        self.results.len() >= self.max_results
    }

    /// True once either bound has been hit.
    pub fn should_stop(&mut self) -> bool {
        self.is_full() || self.check_deadline()
    }

    /// Appends a result unless the budget is already full. Returns whether the
    /// walk should stop afterwards.
    pub fn push(&mut self, result: SearchResult) -> bool {
        if !self.is_full() {
            self.results.push(result);
        }
        self.should_stop()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    pub fn into_results(self) -> Vec<SearchResult> {
        self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(line: usize) -> SearchResult {
        SearchResult {
            file: "a.txt".to_string(),
            line,
            text: "x".to_string(),
        }
    }

    #[test]
    fn push_stops_at_capacity() {
        let mut budget = Budget::new(Deadline::after(Duration::from_secs(60)), 2);
        assert!(!budget.push(result(1)));
        assert!(budget.push(result(2)));
        assert!(budget.push(result(3)));
        assert_eq!(budget.len(), 2);
        assert!(!budget.timed_out());
    }

    #[test]
    fn expired_deadline_latches() {
        let mut budget = Budget::new(Deadline::at(Instant::now()), 10);
        assert!(budget.check_deadline());
        assert!(budget.timed_out());
        assert!(budget.should_stop());
        assert!(budget.is_empty());
    }
}
