//! Bounded recursive content search
pub mod budget;
pub mod cache;
pub mod engine;
pub mod include;

use serde::{Deserialize, Serialize};
use std::env;
use std::io;
use std::path::{Component, Path, PathBuf};

pub use budget::{Budget, Deadline};
pub use cache::{CacheStats, PatternCache};
pub use engine::SearchEngine;
pub use include::{IncludeFilter, IncludeRule};

pub const MAX_RESULTS: usize = 100;
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
pub const TIMEOUT_MS: u64 = 30_000;
pub const MAX_LINE_LENGTH: usize = 200;
pub const BINARY_PROBE_SIZE: usize = 512;

/// Directory names never descended into.
pub const IGNORE_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".svn",
    ".hg",
    "dist",
    "build",
    "out",
    "target",
    "coverage",
    ".next",
    ".nuxt",
    ".cache",
    ".turbo",
    "__pycache__",
    ".pytest_cache",
    ".venv",
    "venv",
    ".idea",
    ".vscode",
];

/// Extensions (lowercase, without the dot) treated as binary without reading.
pub const BINARY_EXTENSIONS: &[&str] = &[
    // Images
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "tiff", "psd",
    // Archives
    "zip", "tar", "gz", "bz2", "xz", "7z", "rar", "jar", "war",
    // Executables and objects
    "exe", "dll", "so", "dylib", "bin", "o", "a", "lib", "obj", "class", "pyc", "wasm",
    // Documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx",
    // Media
    "mp3", "mp4", "wav", "avi", "mov", "mkv", "flac", "ogg", "webm",
    // Fonts
    "ttf", "otf", "woff", "woff2", "eot",
    // Data
    "db", "sqlite", "iso", "dmg",
];

pub fn is_ignored_dir(name: &str) -> bool {
    IGNORE_DIRS.contains(&name)
}

/// `path` relative to `root`, always `/`-separated.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Joins a relative `path` onto the working directory and lexically removes
/// `.` and `..` components. Symlinks are not resolved.
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()?.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    Ok(out)
}

/// Per-engine bounds. Defaults are the fixed public limits above, which
/// are also the ceilings: limits can be tightened, never loosened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_results: usize,
    pub max_file_size: u64,
    pub timeout_ms: u64,
    pub max_line_length: usize,
    pub binary_probe_size: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_results: MAX_RESULTS,
            max_file_size: MAX_FILE_SIZE,
            timeout_ms: TIMEOUT_MS,
            max_line_length: MAX_LINE_LENGTH,
            binary_probe_size: BINARY_PROBE_SIZE,
        }
    }
}

impl SearchLimits {
    /// Caps every field at its public limit.
    pub fn clamped(self) -> Self {
        Self {
            max_results: self.max_results.min(MAX_RESULTS),
            max_file_size: self.max_file_size.min(MAX_FILE_SIZE),
            timeout_ms: self.timeout_ms.min(TIMEOUT_MS),
            max_line_length: self.max_line_length.min(MAX_LINE_LENGTH),
            binary_probe_size: self.binary_probe_size.min(BINARY_PROBE_SIZE),
        }
    }
}

/// One search call as received from a tool-call layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<String>,
}

impl SearchRequest {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Self::default()
        }
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn include(mut self, include: impl Into<String>) -> Self {
        self.include = Some(include.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// `/`-separated path relative to the search root
    pub file: String,
    /// 1-based
    pub line: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    pub truncated: bool,
    pub timed_out: bool,
    #[serde(rename = "searchTime")]
    pub search_time_ms: u64,
}
