use crate::processor::LineScanner;
use crate::search::{Budget, IncludeFilter, is_ignored_dir};
use ignore::{DirEntry, Walk, WalkBuilder};
use log::debug;
use std::path::Path;

/// Sequential walk from `root` with every gitignore-style filter turned off.
/// Only the fixed ignore set and dot-directories below the root are pruned.
/// No sort is applied, so entries come in OS order, depth-first and
/// pre-order, each subtree finished before the next sibling.
pub fn walk_dir(root: &Path) -> Walk {
    WalkBuilder::new(root)
        .standard_filters(false)
        .hidden(false)
        .follow_links(false)
        .filter_entry(|entry| !is_pruned_dir(entry))
        .build()
}

fn is_pruned_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_some_and(|t| t.is_dir()) {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    is_ignored_dir(&name) || name.starts_with('.')
}

pub struct Walker<'a> {
    root: &'a Path,
    filter: &'a IncludeFilter,
    scanner: &'a LineScanner<'a>,
}

impl<'a> Walker<'a> {
    pub fn new(root: &'a Path, filter: &'a IncludeFilter, scanner: &'a LineScanner<'a>) -> Self {
        Self {
            root,
            filter,
            scanner,
        }
    }

    /// Walks from the root into `budget`. Returns true if the walk stopped
    /// early on the deadline or the result cap.
    ///
    /// A directory is only read when the walk advances past its entry, so
    /// checking the deadline on each yielded directory stops before reading it.
    pub fn walk(&self, budget: &mut Budget) -> bool {
        if budget.should_stop() {
            return true;
        }

        for entry in walk_dir(self.root) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable path: {e}");
                    continue;
                }
            };
            // Symlinks are not followed and count as neither file nor directory.
            let Some(file_type) = entry.file_type() else {
                continue;
            };

            if file_type.is_dir() {
                if entry.depth() > 0 && budget.check_deadline() {
                    return true;
                }
            } else if file_type.is_file() {
                let path = entry.path();
                if !self.filter.matches(self.root, path) {
                    continue;
                }
                if budget.check_deadline() {
                    return true;
                }
                if self.scanner.scan(self.root, path, budget) {
                    return true;
                }
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metrics;
    use crate::processor::build_regex;
    use crate::search::{Deadline, PatternCache, SearchLimits};
    use std::fs;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    fn walk(
        root: &Path,
        pattern: &str,
        include: Option<&str>,
        deadline: Deadline,
    ) -> (Budget, bool) {
        let regex = build_regex(pattern).unwrap();
        let limits = SearchLimits::default();
        let metrics = Metrics::new().unwrap();
        let cache = PatternCache::default();
        let filter = IncludeFilter::compile(include, &cache);
        let scanner = LineScanner::new(&regex, &limits, &metrics);
        let mut budget = Budget::new(deadline, limits.max_results);
        let stopped = Walker::new(root, &filter, &scanner).walk(&mut budget);
        (budget, stopped)
    }

    fn later() -> Deadline {
        Deadline::after(Duration::from_secs(60))
    }

    fn files(budget: Budget) -> Vec<String> {
        let mut files: Vec<_> = budget.into_results().into_iter().map(|r| r.file).collect();
        files.sort();
        files
    }

    #[test]
    fn skips_ignored_and_hidden_directories() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        for sub in ["node_modules", ".git", ".hidden", "dist", "src/nested"] {
            fs::create_dir_all(root.join(sub)).unwrap();
            fs::write(root.join(sub).join("f.js"), "needle\n").unwrap();
        }
        fs::write(root.join(".env"), "needle\n").unwrap();

        let (budget, stopped) = walk(root, "needle", None, later());
        assert!(!stopped);
        // dotfiles are files, only dot-directories are skipped
        assert_eq!(files(budget), vec![".env", "src/nested/f.js"]);
    }

    #[test]
    fn dot_named_root_is_still_walked() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join(".config");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("settings.json"), "needle\n").unwrap();

        let (budget, _) = walk(&root, "needle", None, later());
        assert_eq!(files(budget), vec!["settings.json"]);
    }

    #[test]
    fn gitignore_files_have_no_effect() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join(".gitignore"), "*.log\n").unwrap();
        fs::write(root.join(".ignore"), "*.log\n").unwrap();
        fs::write(root.join("app.log"), "needle\n").unwrap();

        let (budget, _) = walk(root, "needle", Some("*.log"), later());
        assert_eq!(files(budget), vec!["app.log"]);
    }

    #[test]
    fn applies_include_filter_to_files_only() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("lib.js")).unwrap();
        fs::write(root.join("lib.js/inner.ts"), "needle\n").unwrap();
        fs::write(root.join("top.js"), "needle\n").unwrap();

        let (budget, _) = walk(root, "needle", Some("*.ts"), later());
        assert_eq!(files(budget), vec!["lib.js/inner.ts"]);
    }

    #[test]
    fn expired_deadline_stops_before_any_work() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "needle\n").unwrap();

        let (budget, stopped) = walk(dir.path(), "needle", None, Deadline::at(Instant::now()));
        assert!(stopped);
        assert!(budget.timed_out());
        assert!(budget.is_empty());
    }

    #[test]
    fn subtree_is_finished_before_siblings() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::write(root.join("a/b/deep.txt"), "needle\n").unwrap();
        fs::write(root.join("a/shallow.txt"), "needle\n").unwrap();
        fs::create_dir_all(root.join("c")).unwrap();
        fs::write(root.join("c/other.txt"), "needle\n").unwrap();

        let (budget, _) = walk(root, "needle", None, later());
        let order: Vec<_> = budget.into_results().into_iter().map(|r| r.file).collect();
        let pos = |f: &str| order.iter().position(|x| x == f).unwrap();
        // everything under a/ is contiguous, wherever the OS puts c/
        let a_first = pos("a/b/deep.txt").min(pos("a/shallow.txt"));
        let a_last = pos("a/b/deep.txt").max(pos("a/shallow.txt"));
        assert_eq!(a_last - a_first, 1);
        assert_eq!(order.len(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_entries_do_not_hide_siblings() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("locked")).unwrap();
        fs::write(root.join("locked/inside.txt"), "needle\n").unwrap();
        fs::write(root.join("secret.txt"), "needle\n").unwrap();
        fs::create_dir(root.join("open")).unwrap();
        fs::write(root.join("open/visible.txt"), "needle\n").unwrap();
        fs::write(root.join("top.txt"), "needle\n").unwrap();

        fs::set_permissions(root.join("locked"), fs::Permissions::from_mode(0o000)).unwrap();
        fs::set_permissions(root.join("secret.txt"), fs::Permissions::from_mode(0o000)).unwrap();

        // privileged users read through permission bits; nothing to assert then
        let privileged = fs::read_dir(root.join("locked")).is_ok();

        let (budget, stopped) = walk(root, "needle", None, later());

        fs::set_permissions(root.join("locked"), fs::Permissions::from_mode(0o755)).unwrap();
        fs::set_permissions(root.join("secret.txt"), fs::Permissions::from_mode(0o644)).unwrap();

        if privileged {
            return;
        }
        assert!(!stopped);
        assert_eq!(files(budget), vec!["open/visible.txt", "top.txt"]);
    }
}
