use thiserror::Error;

/// Fatal diff-parse failures. Any of these aborts the whole batch: once one
/// hunk header is unreadable, every downstream line coordinate is suspect.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("malformed hunk header at diff line {line_no}: {text}")]
    MalformedHunkHeader { line_no: usize, text: String },

    #[error("malformed file header at diff line {line_no}: {text}")]
    MalformedFileHeader { line_no: usize, text: String },
}

/// Per-suggestion failures. These are recorded and skipped — one bad
/// suggestion never interrupts the rest of the batch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ItemError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("line {line} of {file} is not covered by the diff")]
    LineNotInDiff { file: String, line: usize },

    #[error("no anchor found for {file}:{line}")]
    AnchorNotFound { file: String, line: usize },

    #[error("filename {basename} matches {matches} file sections; refusing to guess")]
    AmbiguousFilename { basename: String, matches: usize },

    #[error("render target was torn down mid-run")]
    RenderTargetGone,
}
