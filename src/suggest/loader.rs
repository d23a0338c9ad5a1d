use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use super::SuggestionFile;

/// Compute SHA-256 hash of raw diff text (for staleness detection)
pub fn compute_diff_hash(raw_diff: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_diff.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// A loaded suggestion batch plus whether it matches the current diff
#[derive(Debug, Clone)]
pub struct LoadedSuggestions {
    pub file: SuggestionFile,
    pub is_stale: bool,
}

/// Load a suggestion JSON file and check it against the current diff hash.
/// A stale batch is still returned — lines that moved will simply fail
/// validation downstream — but the mismatch is logged.
pub fn load_suggestion_file(path: &Path, current_diff_hash: &str) -> Result<LoadedSuggestions> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading suggestions from {}", path.display()))?;
    let file: SuggestionFile = serde_json::from_str(&content)
        .with_context(|| format!("parsing suggestions from {}", path.display()))?;

    let is_stale = file.diff_hash != current_diff_hash;
    if is_stale {
        log::warn!(
            "{} was generated against a different diff; line coordinates may be stale",
            path.display()
        );
    }

    Ok(LoadedSuggestions { file, is_stale })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn hash_is_stable_lowercase_hex() {
        let h = compute_diff_hash("diff --git a/f b/f\n");
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(h, compute_diff_hash("diff --git a/f b/f\n"));
    }

    #[test]
    fn fresh_file_loads_without_staleness() {
        let dir = tempfile::tempdir().unwrap();
        let diff = "diff --git a/f.rs b/f.rs\n@@ -1,1 +1,1 @@\n line\n";
        let hash = compute_diff_hash(diff);
        let json = format!(
            r#"{{"version":1,"diff_hash":"{hash}","suggestions":[
                {{"file_path":"f.rs","line_number":1,"suggested_code":"x"}}
            ]}}"#
        );
        let path = write_file(&dir, "suggestions.json", &json);

        let loaded = load_suggestion_file(&path, &hash).unwrap();
        assert!(!loaded.is_stale);
        assert_eq!(loaded.file.suggestions.len(), 1);
        assert_eq!(loaded.file.suggestions[0].description, None);
    }

    #[test]
    fn hash_mismatch_marks_stale() {
        let dir = tempfile::tempdir().unwrap();
        let json = r#"{"version":1,"diff_hash":"deadbeef","suggestions":[]}"#;
        let path = write_file(&dir, "suggestions.json", json);

        let loaded = load_suggestion_file(&path, "cafef00d").unwrap();
        assert!(loaded.is_stale);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "suggestions.json", "{not json");
        assert!(load_suggestion_file(&path, "x").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_suggestion_file(&dir.path().join("nope.json"), "x").is_err());
    }
}
