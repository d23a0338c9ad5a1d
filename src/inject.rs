use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use crate::config::WaitConfig;
use crate::diff::DiffIndex;
use crate::error::ItemError;
use crate::render;
use crate::resolve;
use crate::suggest::Suggestion;
use crate::target::RenderTarget;

/// Aggregate result of one injection run. Per-item failures are collected
/// here; callers decide whether to surface a summary.
#[derive(Debug, Default)]
pub struct InjectionOutcome {
    pub success: usize,
    pub failed: usize,
    pub errors: Vec<(Suggestion, ItemError)>,
}

impl InjectionOutcome {
    fn record_failure(&mut self, suggestion: &Suggestion, error: ItemError) {
        log::warn!(
            "skipping suggestion for {}:{}: {error}",
            suggestion.file_path,
            suggestion.line_number
        );
        self.failed += 1;
        self.errors.push((suggestion.clone(), error));
    }
}

/// Place every suggestion into the render target, in input order.
///
/// A diff that fails to parse is fatal for the whole batch — every
/// downstream coordinate would be untrustworthy — but individual failures
/// (line outside the diff, no anchor, ambiguous filename) are recorded and
/// skipped. Succeeded insertions are never rolled back.
pub fn inject_code_suggestions(
    target: &mut dyn RenderTarget,
    suggestions: &[Suggestion],
    diff_text: &str,
    wait: &WaitConfig,
) -> InjectionOutcome {
    let mut outcome = InjectionOutcome::default();

    let index = match DiffIndex::build(diff_text) {
        Ok(index) => index,
        Err(e) => {
            log::error!("diff parse failed, aborting batch: {e}");
            for suggestion in suggestions {
                outcome.record_failure(suggestion, ItemError::Parse(e.clone()));
            }
            return outcome;
        }
    };

    if let Err(e) = wait_for_ready(target, wait) {
        for suggestion in suggestions {
            outcome.record_failure(suggestion, e.clone());
        }
        return outcome;
    }

    let mut gone = false;
    for suggestion in suggestions {
        if gone || !target.is_attached() {
            gone = true;
            outcome.record_failure(suggestion, ItemError::RenderTargetGone);
            continue;
        }

        match place_one(target, &index, suggestion) {
            Ok(()) => outcome.success += 1,
            Err(e) => {
                if e == ItemError::RenderTargetGone {
                    gone = true;
                }
                outcome.record_failure(suggestion, e);
            }
        }
    }

    outcome
}

fn place_one(
    target: &mut dyn RenderTarget,
    index: &DiffIndex,
    suggestion: &Suggestion,
) -> Result<(), ItemError> {
    index.locate(&suggestion.file_path, suggestion.line_number)?;
    let placement = resolve::resolve(target, &suggestion.file_path, suggestion.line_number)?;
    let rendered = render::render(suggestion);

    // Insert after the anchor's whole row, never inside it, so repeated
    // runs stay additive and the anchor's own content survives
    let row = target.enclosing_row(placement.anchor);
    target.insert_after(row, rendered.fragment)?;
    Ok(())
}

/// Wait for the render target to become ready: poll on a fixed interval
/// while also listening for the target's one-shot structural-change
/// notification, whichever fires first. The subscription is dropped on
/// every exit path. A timeout is not fatal — the run proceeds and lets
/// per-item resolution report what is actually there — but a detached
/// target is.
fn wait_for_ready(target: &mut dyn RenderTarget, wait: &WaitConfig) -> Result<(), ItemError> {
    if !target.is_attached() {
        return Err(ItemError::RenderTargetGone);
    }
    if target.is_ready() {
        return Ok(());
    }

    let rx = target.subscribe_change();
    let deadline = Instant::now() + Duration::from_millis(wait.timeout_ms);
    let poll = Duration::from_millis(wait.poll_ms.max(1));

    loop {
        if !target.is_attached() {
            return Err(ItemError::RenderTargetGone);
        }
        if target.is_ready() {
            return Ok(());
        }
        if Instant::now() >= deadline {
            log::debug!(
                "render target not ready after {}ms; proceeding anyway",
                wait.timeout_ms
            );
            return Ok(());
        }

        match rx.recv_timeout(poll) {
            Ok(()) | Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                // Target offers no change notifications; plain polling
                std::thread::sleep(poll);
            }
        }
    }
}
