use glob::Pattern;

use crate::error::ItemError;
use crate::target::{NodeId, RenderTarget};

// Attribute names host renderers are known to hang path and line metadata
// on. Probed in order; the first attribute present wins.
const PATH_ATTRS: &[&str] = &["data-path", "data-file-path"];
const LINE_ATTRS: &[&str] = &["data-line", "data-line-number"];

/// How structurally certain a placement match is. Orders the cascade:
/// resolution stops at the first tier that produces an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    /// Per-line id whose hash prefix is scoped to one file section
    ExactId,
    /// Explicit line-number attribute inside an exact-path file section
    ExactAttribute,
    /// Text search, accepted only when the file section is unambiguous
    UniqueTextMatch,
}

/// A resolved anchor. Ephemeral: the handle dies with the next re-render,
/// so placements are never cached across runs.
#[derive(Debug, Clone)]
pub struct Placement {
    pub anchor: NodeId,
    pub confidence: Confidence,
    /// Which signal produced the match, for diagnostics
    pub matched_by: String,
}

type Matcher = fn(&dyn RenderTarget, &str, usize) -> Result<Option<Placement>, ItemError>;

// Ordered highest-confidence first. Each matcher either produces a
// placement, declines (None), or fails the item outright (ambiguity).
const MATCHERS: &[Matcher] = &[match_exact_id, match_exact_attribute, match_unique_text];

/// Find the anchor node for a (file, line) coordinate, or report a typed
/// absence. Read-only on the target; never guesses a nearby line.
pub fn resolve(
    target: &dyn RenderTarget,
    file_path: &str,
    line_number: usize,
) -> Result<Placement, ItemError> {
    for matcher in MATCHERS {
        if let Some(placement) = matcher(target, file_path, line_number)? {
            log::debug!(
                "resolved {file_path}:{line_number} via {}",
                placement.matched_by
            );
            return Ok(placement);
        }
    }
    Err(ItemError::AnchorNotFound {
        file: file_path.to_string(),
        line: line_number,
    })
}

/// The file section whose path attribute equals the full path exactly.
/// Basenames never match here.
fn section_by_path_attr(target: &dyn RenderTarget, file_path: &str) -> Option<NodeId> {
    for attr in PATH_ATTRS {
        let hits = target.find_by_attr(None, attr, file_path);
        if let Some(&section) = hits.first() {
            return Some(section);
        }
    }
    None
}

/// Tier 1: row ids of the form `<hash>R<new-line>`, scoped to the exact-path
/// file section so equal line numbers in other files cannot collide.
fn match_exact_id(
    target: &dyn RenderTarget,
    file_path: &str,
    line_number: usize,
) -> Result<Option<Placement>, ItemError> {
    let Some(section) = section_by_path_attr(target, file_path) else {
        return Ok(None);
    };

    let pattern = match Pattern::new(&format!("*R{line_number}")) {
        Ok(p) => p,
        Err(_) => return Ok(None),
    };

    for node in target.find_by_id_pattern(Some(section), &pattern) {
        let Some(id) = target.id_attr(node) else {
            continue;
        };
        // A glob suffix can't distinguish R42 from a decorated tail, so
        // re-parse the digits after the final R and demand exact equality
        let verified = id
            .rfind('R')
            .and_then(|idx| id[idx + 1..].parse::<usize>().ok())
            .is_some_and(|n| n == line_number);
        if verified {
            return Ok(Some(Placement {
                anchor: node,
                confidence: Confidence::ExactId,
                matched_by: format!("line id {id}"),
            }));
        }
    }
    Ok(None)
}

/// Tier 2: an explicit line-number attribute inside the exact-path section
fn match_exact_attribute(
    target: &dyn RenderTarget,
    file_path: &str,
    line_number: usize,
) -> Result<Option<Placement>, ItemError> {
    let Some(section) = section_by_path_attr(target, file_path) else {
        return Ok(None);
    };

    let line_value = line_number.to_string();
    for attr in LINE_ATTRS {
        if let Some(&node) = target.find_by_attr(Some(section), attr, &line_value).first() {
            return Ok(Some(Placement {
                anchor: node,
                confidence: Confidence::ExactAttribute,
                matched_by: format!("exact path + {attr}={line_value}"),
            }));
        }
    }
    Ok(None)
}

/// Tier 3: no structural attributes at all. The file section is found by
/// text; a basename match is only acceptable when exactly one section in
/// the whole tree carries that name — the uniqueness check runs before any
/// basename comparison, because two files sharing a name in different
/// directories would otherwise be silently miscorrected.
fn match_unique_text(
    target: &dyn RenderTarget,
    file_path: &str,
    line_number: usize,
) -> Result<Option<Placement>, ItemError> {
    let (section, path_signal) = match sections_with_text(target, file_path) {
        hits if hits.len() == 1 => (hits[0], "full path text"),
        hits if hits.len() > 1 => {
            return Err(ItemError::AmbiguousFilename {
                basename: basename(file_path).to_string(),
                matches: hits.len(),
            })
        }
        _ => {
            let base = basename(file_path);
            let hits = sections_with_text(target, base);
            match hits.len() {
                1 => (hits[0], "unique basename text"),
                0 => return Ok(None),
                n => {
                    return Err(ItemError::AmbiguousFilename {
                        basename: base.to_string(),
                        matches: n,
                    })
                }
            }
        }
    };

    // Prefer a line attribute if the rows carry one even though the section
    // itself had no path attribute
    let line_value = line_number.to_string();
    for attr in LINE_ATTRS {
        if let Some(&node) = target.find_by_attr(Some(section), attr, &line_value).first() {
            return Ok(Some(Placement {
                anchor: node,
                confidence: Confidence::UniqueTextMatch,
                matched_by: format!("{path_signal} + {attr}={line_value}"),
            }));
        }
    }

    // Last resort: the gutter cell whose visible text is this line number.
    // Gutters may be decorated (padding, icons), so compare the digits only;
    // anything containing letters is code, not a gutter.
    for node in target.find_by_text(Some(section), &line_value) {
        let text = target.text(node);
        if text.chars().any(|c| c.is_alphabetic()) {
            continue;
        }
        if gutter_digits(&text) == Some(line_number) {
            return Ok(Some(Placement {
                anchor: node,
                confidence: Confidence::UniqueTextMatch,
                matched_by: format!("{path_signal} + gutter text {line_value:?}"),
            }));
        }
    }

    Ok(None)
}

/// Distinct file sections whose text (or a descendant's) contains `needle`
fn sections_with_text(target: &dyn RenderTarget, needle: &str) -> Vec<NodeId> {
    let mut sections = Vec::new();
    for node in target.find_by_text(None, needle) {
        if let Some(section) = target.enclosing_section(node) {
            if !sections.contains(&section) {
                sections.push(section);
            }
        }
    }
    sections
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Parse a gutter cell's digits, tolerating decoration around them
fn gutter_digits(text: &str) -> Option<usize> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}
