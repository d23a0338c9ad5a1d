use std::collections::BTreeMap;

use crate::diff::parser::{parse_diff, DiffFile};
use crate::error::{ItemError, ParseError};

/// An inclusive span of new-file line numbers covered by one hunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn contains(&self, line: usize) -> bool {
        self.start <= line && line <= self.end
    }
}

/// Destination path → the new-file line ranges the diff touches.
///
/// Built once per diff text and read-only afterward. Ranges for a path are
/// non-overlapping and ordered by `start`; a file with no hunks (pure
/// rename or mode change) keeps an empty range list.
#[derive(Debug, Clone, Default)]
pub struct DiffIndex {
    ranges: BTreeMap<String, Vec<LineRange>>,
    files: Vec<DiffFile>,
}

impl DiffIndex {
    pub fn build(diff_text: &str) -> Result<Self, ParseError> {
        let files = parse_diff(diff_text)?;
        let mut ranges: BTreeMap<String, Vec<LineRange>> = BTreeMap::new();

        for file in &files {
            let entry = ranges.entry(file.path.clone()).or_default();
            for hunk in &file.hunks {
                let counted = hunk.new_lines();
                // Deletion-only hunks span no new-file lines
                if counted == 0 {
                    continue;
                }
                entry.push(LineRange {
                    start: hunk.new_start,
                    end: hunk.new_start + counted - 1,
                });
            }
        }

        Ok(DiffIndex { ranges, files })
    }

    /// Validate that a (path, line) coordinate exists in the diff.
    pub fn locate(&self, file_path: &str, line_number: usize) -> Result<(), ItemError> {
        let covered = self
            .ranges
            .get(file_path)
            .map(|ranges| ranges.iter().any(|r| r.contains(line_number)))
            .unwrap_or(false);

        if covered {
            Ok(())
        } else {
            Err(ItemError::LineNotInDiff {
                file: file_path.to_string(),
                line: line_number,
            })
        }
    }

    pub fn ranges(&self, file_path: &str) -> Option<&[LineRange]> {
        self.ranges.get(file_path).map(|v| v.as_slice())
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.ranges.keys().map(|s| s.as_str())
    }

    /// The parsed file sections, in diff order, with per-line content
    pub fn files(&self) -> &[DiffFile] {
        &self.files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_HUNKS: &str = "diff --git a/src/lib.rs b/src/lib.rs\n\
                             @@ -1,3 +1,4 @@\n \
                             a\n\
                             +b\n \
                             c\n \
                             d\n\
                             @@ -20,2 +21,3 @@\n \
                             x\n\
                             +y\n \
                             z\n";

    #[test]
    fn ranges_ordered_and_disjoint() {
        let index = DiffIndex::build(TWO_HUNKS).unwrap();
        let ranges = index.ranges("src/lib.rs").unwrap();
        assert_eq!(
            ranges,
            &[LineRange { start: 1, end: 4 }, LineRange { start: 21, end: 23 }]
        );
        assert!(ranges[0].end < ranges[1].start);
    }

    #[test]
    fn union_matches_counted_lines() {
        let index = DiffIndex::build(TWO_HUNKS).unwrap();
        let total: usize = index
            .ranges("src/lib.rs")
            .unwrap()
            .iter()
            .map(|r| r.end - r.start + 1)
            .sum();
        // 4 new-file lines in hunk one, 3 in hunk two
        assert_eq!(total, 7);
    }

    #[test]
    fn locate_accepts_covered_lines() {
        let index = DiffIndex::build(TWO_HUNKS).unwrap();
        assert!(index.locate("src/lib.rs", 1).is_ok());
        assert!(index.locate("src/lib.rs", 4).is_ok());
        assert!(index.locate("src/lib.rs", 22).is_ok());
    }

    #[test]
    fn locate_rejects_one_past_range_end() {
        let index = DiffIndex::build(TWO_HUNKS).unwrap();
        let err = index.locate("src/lib.rs", 5).unwrap_err();
        assert_eq!(
            err,
            ItemError::LineNotInDiff {
                file: "src/lib.rs".into(),
                line: 5
            }
        );
        assert!(index.locate("src/lib.rs", 24).is_err());
    }

    #[test]
    fn locate_rejects_unknown_file() {
        let index = DiffIndex::build(TWO_HUNKS).unwrap();
        assert!(matches!(
            index.locate("src/other.rs", 1),
            Err(ItemError::LineNotInDiff { .. })
        ));
    }

    #[test]
    fn locate_rejects_gap_between_hunks() {
        let index = DiffIndex::build(TWO_HUNKS).unwrap();
        assert!(index.locate("src/lib.rs", 10).is_err());
    }

    #[test]
    fn deletion_only_hunk_covers_nothing() {
        let raw = "diff --git a/gone.rs b/gone.rs\n\
                   @@ -3,2 +2,0 @@\n\
                   -first\n\
                   -second\n";
        let index = DiffIndex::build(raw).unwrap();
        assert!(index.ranges("gone.rs").unwrap().is_empty());
        assert!(index.locate("gone.rs", 2).is_err());
    }

    #[test]
    fn rename_only_file_present_with_no_ranges() {
        let raw = "diff --git a/a.rs b/b.rs\n\
                   rename from a.rs\n\
                   rename to b.rs\n";
        let index = DiffIndex::build(raw).unwrap();
        assert!(index.ranges("b.rs").unwrap().is_empty());
        assert!(index.locate("b.rs", 1).is_err());
    }

    #[test]
    fn parse_error_propagates() {
        assert!(DiffIndex::build("diff --git a/f b/f\n@@ nope @@\n").is_err());
    }
}
