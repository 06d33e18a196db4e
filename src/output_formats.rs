use crate::list::{EntryKind, ListEntry};
use crate::search::SearchOutcome;
use colored::*;

/// Output format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json { OutputFormat::Json } else { OutputFormat::Text }
    }
}

/// Renders a search outcome as human-readable lines.
pub fn format_search_text(outcome: &SearchOutcome) -> String {
    let mut output = Vec::new();

    if outcome.results.is_empty() {
        output.push(format!("{}", "No matches found".yellow()));
    } else {
        for result in &outcome.results {
            output.push(format!(
                "{}:{}: {}",
                result.file.green(),
                result.line.to_string().yellow().bold(),
                result.text
            ));
        }
        output.push(String::new());
        output.push(format!(
            "{} {} {} in {}ms",
            "Found".green(),
            outcome.results.len(),
            if outcome.results.len() == 1 { "match" } else { "matches" },
            outcome.search_time_ms
        ));
    }

    if outcome.truncated {
        output.push(format!(
            "{}",
            "Result limit reached; refine the pattern or include filter to see more.".yellow()
        ));
    }
    if outcome.timed_out {
        output.push(format!(
            "{}",
            "Search timed out; results are partial.".red()
        ));
    }

    output.join("\n")
}

pub fn format_list_text(entries: &[ListEntry]) -> String {
    entries
        .iter()
        .map(|entry| match entry.kind {
            EntryKind::Directory => format!("{}/", entry.name.blue().bold()),
            EntryKind::File => entry.name.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
