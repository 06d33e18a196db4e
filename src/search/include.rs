//! Comma-separated include filters (`*.ts, src/**/*.rs, Makefile`).
//!
//! Each token resolves to exactly one rule, tried in this order:
//! 1. `*.ext` shorthand compares the file extension.
//! 2. A token without `*` or `?` compares against the basename, the relative
//!    path, or the extension.
//! 3. Anything else is translated to an anchored regex and tried against the
//!    relative path and the basename.
//!
//! All comparisons are case-insensitive. A path passes the filter if any
//! token matches.
use super::cache::PatternCache;
use log::warn;
use regex::{Regex, RegexBuilder};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug)]
pub enum IncludeRule {
    /// Lowercase extension without the leading dot.
    Extension(String),
    /// Lowercase literal token.
    Exact(String),
    Glob(Regex),
    /// A token whose translation could not be compiled; matches nothing.
    Never,
}

impl IncludeRule {
    /// Compiles one raw token. Normalization happens here so the cache can be
    /// keyed by the text the caller supplied.
    pub fn compile(raw: &str) -> Self {
        let token = normalize_token(raw);

        if let Some(ext) = extension_shorthand(&token) {
            return IncludeRule::Extension(ext.to_lowercase());
        }

        if !has_wildcard(&token) {
            return IncludeRule::Exact(token.to_lowercase());
        }

        let source = glob_to_regex(&token);
        match RegexBuilder::new(&source).case_insensitive(true).build() {
            Ok(regex) => IncludeRule::Glob(regex),
            Err(e) => {
                warn!("Include pattern '{raw}' could not be compiled: {e}");
                IncludeRule::Never
            }
        }
    }

    pub fn matches(&self, relative: &str, basename: &str, extension: Option<&str>) -> bool {
        match self {
            IncludeRule::Extension(ext) => {
                extension.is_some_and(|e| e.to_lowercase() == *ext)
            }
            IncludeRule::Exact(token) => {
                basename.to_lowercase() == *token
                    || relative.to_lowercase() == *token
                    || extension.is_some_and(|e| {
                        let e = e.to_lowercase();
                        *token == e || token.strip_prefix('.') == Some(e.as_str())
                    })
            }
            IncludeRule::Glob(regex) => regex.is_match(relative) || regex.is_match(basename),
            IncludeRule::Never => false,
        }
    }
}

/// Trims, converts to `/` separators and strips any leading `./` or `**/`.
pub fn normalize_token(raw: &str) -> String {
    let mut token = raw.trim().replace('\\', "/");
    loop {
        if let Some(rest) = token.strip_prefix("./") {
            token = rest.to_string();
        } else if let Some(rest) = token.strip_prefix("**/") {
            token = rest.to_string();
        } else {
            break;
        }
    }
    token
}

fn has_wildcard(token: &str) -> bool {
    token.contains(['*', '?'])
}

/// `*.ext` where `ext` has no separator or wildcard. A dotted `ext` such as
/// `d.ts` still compares the final extension only.
fn extension_shorthand(token: &str) -> Option<&str> {
    let ext = token.strip_prefix("*.")?;
    if ext.is_empty() || ext.contains(['/', '*', '?']) {
        return None;
    }
    Some(ext)
}

/// `**` becomes `.*`, a lone `*` stays within one path segment, `?` is any
/// single character. Everything else is matched literally.
pub fn glob_to_regex(token: &str) -> String {
    let mut out = String::with_capacity(token.len() * 2 + 2);
    out.push('^');
    let mut chars = token.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                out.push_str(".*");
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push('.'),
            other => {
                let mut buf = [0u8; 4];
                out.push_str(&regex::escape(other.encode_utf8(&mut buf)));
            }
        }
    }
    out.push('$');
    out
}

/// A compiled include filter. An empty filter accepts every file.
#[derive(Debug, Clone, Default)]
pub struct IncludeFilter {
    rules: Vec<Arc<IncludeRule>>,
}

impl IncludeFilter {
    /// Splits `raw` on commas and resolves each token through `cache`.
    pub fn compile(raw: Option<&str>, cache: &PatternCache) -> Self {
        let rules = raw
            .into_iter()
            .flat_map(|raw| raw.split(','))
            .map(str::trim)
            .filter(|token| !normalize_token(token).is_empty())
            .map(|token| cache.get_or_compile(token))
            .collect();
        Self { rules }
    }

    /// `path` must live under `root`; the relative form is what rules see.
    pub fn matches(&self, root: &Path, path: &Path) -> bool {
        if self.rules.is_empty() {
            return true;
        }
        let relative = super::relative_path(root, path);
        let basename = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        let extension = path.extension().and_then(|e| e.to_str());
        self.rules
            .iter()
            .any(|rule| rule.matches(&relative, &basename, extension))
    }
}
