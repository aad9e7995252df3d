// JSON export

use std::path::Path;

use stockmatch_matcher::MatchResult;

/// Export the full run result (meta, summary, ranked rows, diagnostics).
pub fn export(result: &MatchResult, path: &Path) -> Result<(), String> {
    crate::write_replacing(path, |w| {
        serde_json::to_writer_pretty(w, result).map_err(|e| e.to_string())
    })
}

pub fn to_string(result: &MatchResult) -> Result<String, String> {
    serde_json::to_string_pretty(result).map_err(|e| format!("JSON serialization error: {e}"))
}
