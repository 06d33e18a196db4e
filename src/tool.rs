//! JSON request/response surface consumed by an agent tool-call layer.
//!
//! Success and failure share one wire slot: a search answers with either
//! `{results, truncated, timedOut, searchTime}` or `{error}`; a listing
//! answers with a bare array or `{error}`.
use crate::error::Result;
use crate::list::{ListEntry, ListRequest, list_directory};
use crate::search::{SearchEngine, SearchOutcome, SearchRequest};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum ToolRequest {
    Search(SearchRequest),
    List(ListRequest),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl ToString) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SearchResponse {
    Success(SearchOutcome),
    Failure(ErrorResponse),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ListResponse {
    Entries(Vec<ListEntry>),
    Failure(ErrorResponse),
}

pub fn search(engine: &SearchEngine, request: &SearchRequest) -> SearchResponse {
    match engine.search(request) {
        Ok(outcome) => SearchResponse::Success(outcome),
        Err(e) => SearchResponse::Failure(ErrorResponse::new(e)),
    }
}

pub fn list(request: &ListRequest) -> ListResponse {
    match list_directory(Path::new(&request.path)) {
        Ok(entries) => ListResponse::Entries(entries),
        Err(e) => ListResponse::Failure(ErrorResponse::new(e)),
    }
}

pub fn handle(engine: &SearchEngine, request: &ToolRequest) -> serde_json::Value {
    let value = match request {
        ToolRequest::Search(request) => serde_json::to_value(search(engine, request)),
        ToolRequest::List(request) => serde_json::to_value(list(request)),
    };
    value.unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }))
}

/// Decodes one JSON request line and encodes the response.
pub fn handle_line(engine: &SearchEngine, line: &str) -> Result<String> {
    let response = match serde_json::from_str::<ToolRequest>(line) {
        Ok(request) => handle(engine, &request),
        Err(e) => {
            debug!("Rejecting malformed request: {e}");
            serde_json::to_value(ErrorResponse::new(format!("Invalid request: {e}")))?
        }
    };
    Ok(serde_json::to_string(&response)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metrics;
    use serde_json::Value;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn engine() -> SearchEngine {
        SearchEngine::new(Arc::new(Metrics::new().unwrap()))
    }

    fn call(line: &str) -> Value {
        serde_json::from_str(&handle_line(&engine(), line).unwrap()).unwrap()
    }

    #[test]
    fn search_success_uses_wire_field_names() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.ts"), "x\ny\nfoo bar\n").unwrap();
        let request = serde_json::json!({
            "op": "search",
            "pattern": "foo",
            "path": dir.path(),
        });

        let response = call(&request.to_string());
        assert_eq!(response["results"][0]["file"], "a.ts");
        assert_eq!(response["results"][0]["line"], 3);
        assert_eq!(response["truncated"], false);
        assert_eq!(response["timedOut"], false);
        assert!(response["searchTime"].is_u64());
    }

    #[test]
    fn search_failure_is_an_error_object() {
        let response = call(r#"{"op":"search","pattern":"("}"#);
        let error = response["error"].as_str().unwrap();
        assert!(error.starts_with("Invalid regex pattern: "));
        assert!(response.get("results").is_none());
    }

    #[test]
    fn list_returns_bare_array() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("f.txt"), "x").unwrap();
        let request = serde_json::json!({ "op": "list", "path": dir.path() });
        let response = call(&request.to_string());
        assert_eq!(response[0]["name"], "f.txt");
        assert_eq!(response[0]["type"], "file");
    }

    #[test]
    fn malformed_request_is_rejected() {
        let response = call("{not json");
        assert!(response["error"].as_str().unwrap().starts_with("Invalid request: "));
    }
}
