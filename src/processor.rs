use crate::error::SearchError;
use crate::metrics::Metrics;
use crate::search::{
    BINARY_EXTENSIONS, BINARY_PROBE_SIZE, Budget, SearchLimits, SearchResult, relative_path,
};
use log::debug;
use regex::{Regex, RegexBuilder};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

/// Compiles a user pattern the way every search uses it: case-insensitive.
pub fn build_regex(pattern: &str) -> Result<Regex, SearchError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| SearchError::invalid_pattern(&e))
}

pub fn has_binary_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| BINARY_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

pub fn is_binary(path: &Path) -> bool {
    is_binary_with_probe(path, BINARY_PROBE_SIZE)
}

/// Known binary extension, or a NUL byte within the first `probe_size`
/// bytes. Files that cannot be read count as binary.
pub fn is_binary_with_probe(path: &Path, probe_size: usize) -> bool {
    if has_binary_extension(path) {
        return true;
    }

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            debug!("Treating unreadable file as binary {}: {e}", path.display());
            return true;
        }
    };

    let mut buffer = Vec::with_capacity(probe_size);
    match file.take(probe_size as u64).read_to_end(&mut buffer) {
        Ok(_) => memchr::memchr(0, &buffer).is_some(),
        Err(e) => {
            debug!("Treating unreadable file as binary {}: {e}", path.display());
            true
        }
    }
}

/// Trims surrounding whitespace and keeps at most `max_chars` characters.
pub fn cap_line(line: &str, max_chars: usize) -> String {
    line.trim().chars().take(max_chars).collect()
}

/// Scans single files line by line into a shared `Budget`.
pub struct LineScanner<'a> {
    regex: &'a Regex,
    limits: &'a SearchLimits,
    metrics: &'a Metrics,
}

impl<'a> LineScanner<'a> {
    pub fn new(regex: &'a Regex, limits: &'a SearchLimits, metrics: &'a Metrics) -> Self {
        Self {
            regex,
            limits,
            metrics,
        }
    }

    /// Appends every matching line of `path` to `budget`, reported relative
    /// to `root`. Returns true when the whole search should stop.
    ///
    /// Empty, oversized, binary and unreadable files contribute nothing.
    pub fn scan(&self, root: &Path, path: &Path, budget: &mut Budget) -> bool {
        let size = match fs::metadata(path) {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                debug!("Skipping unreadable file {}: {e}", path.display());
                self.metrics.files_skipped.inc();
                return false;
            }
        };

        if size == 0 || size > self.limits.max_file_size {
            debug!("Skipping file by size ({size} bytes): {}", path.display());
            self.metrics.files_skipped.inc();
            return false;
        }

        if is_binary_with_probe(path, self.limits.binary_probe_size) {
            debug!("Skipping binary file: {}", path.display());
            self.metrics.files_skipped.inc();
            return false;
        }

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("Skipping unreadable file {}: {e}", path.display());
                self.metrics.files_skipped.inc();
                return false;
            }
        };
        self.metrics.files_scanned.inc();

        let text = String::from_utf8_lossy(&bytes);
        let file = relative_path(root, path);

        for (index, line) in text.split('\n').enumerate() {
            if !self.regex.is_match(line) {
                continue;
            }
            self.metrics.matches_found.inc();
            let result = SearchResult {
                file: file.clone(),
                line: index + 1,
                text: cap_line(line, self.limits.max_line_length),
            };
            if budget.push(result) {
                return true;
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::Deadline;
    use proptest::prelude::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn scan(
        dir: &TempDir,
        name: &str,
        pattern: &str,
        max_results: usize,
    ) -> (Vec<SearchResult>, bool) {
        let regex = build_regex(pattern).unwrap();
        let limits = SearchLimits::default();
        let metrics = Metrics::new().unwrap();
        let scanner = LineScanner::new(&regex, &limits, &metrics);
        let mut budget = Budget::new(Deadline::after(Duration::from_secs(60)), max_results);
        let stop = scanner.scan(dir.path(), &dir.path().join(name), &mut budget);
        (budget.into_results(), stop)
    }

    #[test]
    fn text_file_is_not_binary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "plain text\n").unwrap();
        assert!(!is_binary(&path));
    }

    #[test]
    fn null_byte_marks_binary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blob.dat");
        fs::write(&path, b"abc\x00def").unwrap();
        assert!(is_binary(&path));
    }

    #[test]
    fn null_byte_past_probe_is_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("late.txt");
        let mut content = vec![b'a'; BINARY_PROBE_SIZE];
        content.push(0);
        fs::write(&path, content).unwrap();
        assert!(!is_binary(&path));
    }

    #[test]
    fn binary_extension_skips_probe() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logo.PNG");
        fs::write(&path, "actually text").unwrap();
        assert!(is_binary(&path));
    }

    #[test]
    fn missing_file_counts_as_binary() {
        let dir = TempDir::new().unwrap();
        assert!(is_binary(&dir.path().join("gone.txt")));
    }

    #[test]
    fn invalid_regex_is_reported() {
        let err = build_regex("(").unwrap_err();
        assert_eq!(err.kind, crate::error::SearchErrorKind::InvalidPattern);
        assert!(err.to_string().starts_with("Invalid regex pattern: "));
    }

    #[test]
    fn scan_reports_one_based_lines_case_insensitively() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.ts"), "one\ntwo\n  FOO bar  \r\nfoo\n").unwrap();
        let (results, stop) = scan(&dir, "a.ts", "foo", 100);
        assert!(!stop);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].file, "a.ts");
        assert_eq!(results[0].line, 3);
        assert_eq!(results[0].text, "FOO bar");
        assert_eq!(results[1].line, 4);
    }

    #[test]
    fn scan_caps_long_lines() {
        let dir = TempDir::new().unwrap();
        let line = format!("match {}", "é".repeat(500));
        fs::write(dir.path().join("long.txt"), &line).unwrap();
        let (results, _) = scan(&dir, "long.txt", "match", 100);
        assert_eq!(results[0].text.chars().count(), 200);
    }

    #[test]
    fn scan_stops_when_budget_fills() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("many.txt"), "x\n".repeat(10)).unwrap();
        let (results, stop) = scan(&dir, "many.txt", "x", 3);
        assert!(stop);
        assert_eq!(results.len(), 3);
        assert_eq!(results[2].line, 3);
    }

    #[test]
    fn scan_skips_empty_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("empty.txt"), "").unwrap();
        let (results, stop) = scan(&dir, "empty.txt", ".*", 100);
        assert!(results.is_empty());
        assert!(!stop);
    }

    #[test]
    fn scan_reads_invalid_utf8_lossily() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("latin1.txt"), b"caf\xe9 needle\n").unwrap();
        let (results, _) = scan(&dir, "latin1.txt", "needle", 100);
        assert_eq!(results.len(), 1);
        assert!(results[0].text.ends_with("needle"));
    }

    proptest! {
        #[test]
        fn capped_lines_never_exceed_limit(line in "[^\n]{0,400}") {
            let capped = cap_line(&line, 200);
            prop_assert!(capped.chars().count() <= 200);
            prop_assert!(!capped.contains('\n'));
        }
    }
}
