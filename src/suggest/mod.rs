mod filter;
mod loader;

pub use filter::{filter_suggestions, parse_filter_expr, FilterRule};
pub use loader::{compute_diff_hash, load_suggestion_file, LoadedSuggestions};

use serde::{Deserialize, Serialize};

/// One machine-generated suggestion, as produced by the external reviewer.
/// `line_number` is a 1-based new-file coordinate; `file_path` must match
/// the diff's destination path exactly (no normalization).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub file_path: String,
    pub line_number: usize,
    pub suggested_code: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// On-disk suggestion batch. `diff_hash` ties the batch to the diff text it
/// was generated against, for staleness detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionFile {
    pub version: u32,
    pub diff_hash: String,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}
