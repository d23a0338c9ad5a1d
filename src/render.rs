use crate::suggest::Suggestion;
use crate::target::Fragment;

/// A suggestion formatted for insertion: the display subtree plus the
/// copy-paste block for the original review surface.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub fragment: Fragment,
    pub block_text: String,
}

/// Build the display fragment and the fenced `suggestion` block for one
/// suggestion. The block body reproduces the code byte-for-byte.
pub fn render(suggestion: &Suggestion) -> Rendered {
    let block_text = suggestion_block(&suggestion.suggested_code);

    let mut fragment = Fragment::new("suggestion")
        .attr("class", "dp-suggestion")
        .attr("data-suggestion-block", &block_text);

    if let Some(ref description) = suggestion.description {
        if !description.is_empty() {
            fragment = fragment.child(Fragment::new("description").text(description));
        }
    }
    fragment = fragment.child(Fragment::new("code").text(&suggestion.suggested_code));

    Rendered {
        fragment,
        block_text,
    }
}

/// The inline-suggestion syntax: a fenced block tagged `suggestion`,
/// meaning "replace zero old lines, add these lines" at the anchor.
/// The fence is widened past any backtick run inside the code so the body
/// survives unmodified.
fn suggestion_block(code: &str) -> String {
    let fence = "`".repeat(fence_width(code));
    let mut block = String::with_capacity(code.len() + fence.len() * 2 + 16);
    block.push_str(&fence);
    block.push_str("suggestion\n");
    block.push_str(code);
    if !code.ends_with('\n') {
        block.push('\n');
    }
    block.push_str(&fence);
    block
}

fn fence_width(code: &str) -> usize {
    let mut longest = 0;
    let mut run = 0;
    for c in code.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    (longest + 1).max(3)
}
