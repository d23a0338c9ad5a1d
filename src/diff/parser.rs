use crate::error::ParseError;

/// A single line in a diff hunk
#[derive(Debug, Clone)]
pub struct DiffLine {
    pub line_type: LineType,
    pub content: String,
    pub old_num: Option<usize>,
    pub new_num: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineType {
    Context,
    Add,
    Delete,
}

/// One `@@` block and its effect on the new file's numbering
#[derive(Debug, Clone)]
pub struct DiffHunk {
    pub header: String,
    pub old_start: usize,
    pub old_count: usize,
    pub new_start: usize,
    pub new_count: usize,
    /// 1-based line number of the hunk header within the diff text
    pub diff_line: usize,
    pub lines: Vec<DiffLine>,
}

impl DiffHunk {
    /// New-file lines this hunk actually carries (`+` and context lines).
    /// Deletion-only hunks carry none.
    pub fn new_lines(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| l.line_type != LineType::Delete)
            .count()
    }
}

/// A file section of the diff, keyed by its destination (`b/`) path
#[derive(Debug, Clone)]
pub struct DiffFile {
    pub path: String,
    pub hunks: Vec<DiffHunk>,
}

/// Parse unified diff text into per-file hunks.
///
/// Unlike a lenient viewer, this parser refuses the whole input on the first
/// malformed header: a single misread hunk start would shift every line
/// coordinate after it, so no partial result is ever returned.
pub fn parse_diff(raw: &str) -> Result<Vec<DiffFile>, ParseError> {
    let mut files: Vec<DiffFile> = Vec::new();
    let mut current_file: Option<DiffFile> = None;
    let mut current_hunk: Option<DiffHunk> = None;
    let mut old_line: usize = 0;
    let mut new_line: usize = 0;

    for (idx, line) in raw.lines().enumerate() {
        let line_no = idx + 1;

        // New file section: diff --git a/old b/new
        if line.starts_with("diff --git") {
            if let Some(hunk) = current_hunk.take() {
                if let Some(ref mut file) = current_file {
                    file.hunks.push(hunk);
                }
            }
            if let Some(file) = current_file.take() {
                files.push(file);
            }

            // Destination path is the map key; renames land under b/
            let path = match line.split(" b/").last() {
                Some(p) if !p.is_empty() && line.contains(" b/") => p.to_string(),
                _ => {
                    return Err(ParseError::MalformedFileHeader {
                        line_no,
                        text: line.to_string(),
                    })
                }
            };

            current_file = Some(DiffFile {
                path,
                hunks: Vec::new(),
            });
            continue;
        }

        // Extended headers carry no line content
        if current_file.is_some()
            && (line.starts_with("index ")
                || line.starts_with("--- ")
                || line.starts_with("+++ ")
                || line.starts_with("new file")
                || line.starts_with("deleted file")
                || line.starts_with("similarity index")
                || line.starts_with("rename from")
                || line.starts_with("rename to")
                || line.starts_with("old mode")
                || line.starts_with("new mode"))
        {
            continue;
        }

        // Hunk header: @@ -old_start,old_count +new_start,new_count @@ context
        if line.starts_with("@@") {
            if let Some(hunk) = current_hunk.take() {
                if let Some(ref mut file) = current_file {
                    file.hunks.push(hunk);
                }
            }

            let parsed =
                parse_hunk_header(line, line_no).ok_or_else(|| ParseError::MalformedHunkHeader {
                    line_no,
                    text: line.to_string(),
                })?;
            old_line = parsed.old_start;
            new_line = parsed.new_start;
            current_hunk = Some(parsed);
            continue;
        }

        if let Some(ref mut hunk) = current_hunk {
            if line.starts_with('+') {
                hunk.lines.push(DiffLine {
                    line_type: LineType::Add,
                    content: line[1..].to_string(),
                    old_num: None,
                    new_num: Some(new_line),
                });
                new_line += 1;
            } else if line.starts_with('-') {
                hunk.lines.push(DiffLine {
                    line_type: LineType::Delete,
                    content: line[1..].to_string(),
                    old_num: Some(old_line),
                    new_num: None,
                });
                old_line += 1;
            } else if line.starts_with(' ') || line.is_empty() {
                // Some tools emit a bare empty line where the context line
                // itself is empty; count it as context either way
                let content = if line.is_empty() {
                    String::new()
                } else {
                    line[1..].to_string()
                };
                hunk.lines.push(DiffLine {
                    line_type: LineType::Context,
                    content,
                    old_num: Some(old_line),
                    new_num: Some(new_line),
                });
                old_line += 1;
                new_line += 1;
            }
            // Anything else ("\ No newline at end of file") doesn't count
        }
    }

    if let Some(hunk) = current_hunk {
        if let Some(ref mut file) = current_file {
            file.hunks.push(hunk);
        }
    }
    if let Some(file) = current_file {
        files.push(file);
    }

    Ok(files)
}

/// Parse a hunk header like "@@ -10,4 +10,15 @@ fn foo()"
fn parse_hunk_header(line: &str, diff_line: usize) -> Option<DiffHunk> {
    let after_first = line.strip_prefix("@@ ")?;
    let end_idx = after_first.find(" @@")?;
    let range_str = &after_first[..end_idx];

    let parts: Vec<&str> = range_str.split_whitespace().collect();
    if parts.len() < 2 {
        return None;
    }

    let (old_start, old_count) = parse_range(parts[0].strip_prefix('-')?)?;
    let (new_start, new_count) = parse_range(parts[1].strip_prefix('+')?)?;

    Some(DiffHunk {
        header: line.to_string(),
        old_start,
        old_count,
        new_start,
        new_count,
        diff_line,
        lines: Vec::new(),
    })
}

/// Parse "start,count" or just "start" (count defaults to 1)
fn parse_range(s: &str) -> Option<(usize, usize)> {
    if let Some((start, count)) = s.split_once(',') {
        Some((start.parse().ok()?, count.parse().ok()?))
    } else {
        Some((s.parse().ok()?, 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_diff() {
        let raw = r#"diff --git a/src/main.rs b/src/main.rs
index abc123..def456 100644
--- a/src/main.rs
+++ b/src/main.rs
@@ -1,3 +1,4 @@ fn main()
 fn main() {
+    println!("hello");
     let x = 1;
 }
"#;
        let files = parse_diff(raw).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "src/main.rs");
        assert_eq!(files[0].hunks.len(), 1);
        let hunk = &files[0].hunks[0];
        assert_eq!(hunk.new_start, 1);
        assert_eq!(hunk.lines.len(), 4);
        assert_eq!(hunk.new_lines(), 4);
        assert_eq!(hunk.diff_line, 5);
    }

    #[test]
    fn new_file_numbering_starts_at_one() {
        let raw = r#"diff --git a/new.rs b/new.rs
new file mode 100644
index 0000000..abc1234
--- /dev/null
+++ b/new.rs
@@ -0,0 +1,2 @@
+fn hello() {}
+fn world() {}
"#;
        let files = parse_diff(raw).unwrap();
        let lines = &files[0].hunks[0].lines;
        assert_eq!(lines[0].new_num, Some(1));
        assert_eq!(lines[1].new_num, Some(2));
    }

    #[test]
    fn deletions_do_not_advance_new_counter() {
        let raw = "diff --git a/f.rs b/f.rs\n\
                   @@ -5,4 +5,3 @@\n \
                   keep\n\
                   -gone\n\
                   -also gone\n\
                   +replacement\n \
                   tail\n";
        let files = parse_diff(raw).unwrap();
        let lines = &files[0].hunks[0].lines;
        // keep=5, replacement=6, tail=7 in the new file
        assert_eq!(lines[0].new_num, Some(5));
        assert_eq!(lines[1].new_num, None);
        assert_eq!(lines[2].new_num, None);
        assert_eq!(lines[3].new_num, Some(6));
        assert_eq!(lines[4].new_num, Some(7));
    }

    #[test]
    fn rename_without_hunks_yields_empty_file() {
        let raw = "diff --git a/old_name.rs b/new_name.rs\n\
                   similarity index 100%\n\
                   rename from old_name.rs\n\
                   rename to new_name.rs\n";
        let files = parse_diff(raw).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "new_name.rs");
        assert!(files[0].hunks.is_empty());
    }

    #[test]
    fn rename_keyed_by_destination_path() {
        let raw = "diff --git a/lib/old.rs b/lib/renamed.rs\n\
                   rename from lib/old.rs\n\
                   rename to lib/renamed.rs\n\
                   @@ -1,1 +1,2 @@\n \
                   fn f() {}\n\
                   +fn g() {}\n";
        let files = parse_diff(raw).unwrap();
        assert_eq!(files[0].path, "lib/renamed.rs");
    }

    #[test]
    fn malformed_hunk_header_aborts_parse() {
        let raw = "diff --git a/f.rs b/f.rs\n\
                   @@ bogus @@\n\
                   +line\n";
        let err = parse_diff(raw).unwrap_err();
        assert!(matches!(err, ParseError::MalformedHunkHeader { line_no: 2, .. }));
    }

    #[test]
    fn hunk_header_missing_digits_aborts_parse() {
        let raw = "diff --git a/f.rs b/f.rs\n\
                   @@ -x,1 +1,1 @@\n \
                   line\n";
        assert!(parse_diff(raw).is_err());
    }

    #[test]
    fn file_header_without_destination_aborts_parse() {
        let raw = "diff --git nonsense\n";
        let err = parse_diff(raw).unwrap_err();
        assert!(matches!(err, ParseError::MalformedFileHeader { line_no: 1, .. }));
    }

    #[test]
    fn no_newline_marker_ignored_for_counting() {
        let raw = "diff --git a/f.txt b/f.txt\n\
                   @@ -1,1 +1,1 @@\n\
                   -old\n\
                   +new\n\
                   \\ No newline at end of file\n";
        let files = parse_diff(raw).unwrap();
        assert_eq!(files[0].hunks[0].new_lines(), 1);
    }

    #[test]
    fn multiple_hunks_and_files() {
        let raw = "diff --git a/a.rs b/a.rs\n\
                   @@ -1,2 +1,3 @@\n \
                   one\n\
                   +two\n \
                   three\n\
                   @@ -10,2 +11,2 @@\n \
                   ten\n \
                   eleven\n\
                   diff --git a/b.rs b/b.rs\n\
                   @@ -1,1 +1,1 @@\n \
                   only\n";
        let files = parse_diff(raw).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].hunks.len(), 2);
        assert_eq!(files[0].hunks[1].new_start, 11);
        assert_eq!(files[1].hunks.len(), 1);
    }

    #[test]
    fn parse_hunk_header_with_context() {
        let hunk = parse_hunk_header("@@ -10,4 +10,15 @@ impl Foo", 1).unwrap();
        assert_eq!(hunk.old_start, 10);
        assert_eq!(hunk.old_count, 4);
        assert_eq!(hunk.new_start, 10);
        assert_eq!(hunk.new_count, 15);
    }

    #[test]
    fn parse_hunk_header_without_counts() {
        let hunk = parse_hunk_header("@@ -3 +4 @@", 1).unwrap();
        assert_eq!(hunk.old_count, 1);
        assert_eq!(hunk.new_start, 4);
        assert_eq!(hunk.new_count, 1);
    }
}
