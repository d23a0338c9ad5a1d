use std::path::{Path, PathBuf};
use std::sync::mpsc;

use anyhow::{Context, Result};
use clap::Parser;

use diffpin::config::DpConfig;
use diffpin::diff::DiffIndex;
use diffpin::inject::inject_code_suggestions;
use diffpin::suggest::{compute_diff_hash, filter_suggestions, load_suggestion_file, parse_filter_expr};
use diffpin::target::TreeTarget;
use diffpin::watch::{InputWatcher, WatchEvent};

/// Anchor code suggestions onto a rendered diff
#[derive(Parser)]
#[command(name = "dp", version, about)]
struct Cli {
    /// Unified diff file to annotate
    diff: PathBuf,

    /// Suggestion JSON file produced by the reviewer
    suggestions: PathBuf,

    /// Filter expression over suggestion paths (e.g. '+src/**,-*.lock')
    #[arg(long)]
    filter: Option<String>,

    /// Re-run injection whenever an input file changes
    #[arg(long)]
    watch: bool,

    /// Only print the placement summary, not the annotated render
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = DpConfig::load(Path::new("."));

    let any_failed = run_once(&cli, &config)?;

    if cli.watch {
        let (tx, rx) = mpsc::channel::<WatchEvent>();
        let _watcher = InputWatcher::new(
            &[cli.diff.clone(), cli.suggestions.clone()],
            config.watch.debounce_ms,
            tx,
        )
        .context("starting input watcher")?;

        while let Ok(WatchEvent::InputsChanged(paths)) = rx.recv() {
            log::info!("inputs changed: {paths:?}");
            if let Err(e) = run_once(&cli, &config) {
                eprintln!("re-run failed: {e:#}");
            }
        }
        return Ok(());
    }

    if any_failed {
        std::process::exit(1);
    }
    Ok(())
}

/// One full load → inject → report cycle. Returns whether any item failed.
fn run_once(cli: &Cli, config: &DpConfig) -> Result<bool> {
    let diff_text = std::fs::read_to_string(&cli.diff)
        .with_context(|| format!("reading diff from {}", cli.diff.display()))?;
    let diff_hash = compute_diff_hash(&diff_text);

    let loaded = load_suggestion_file(&cli.suggestions, &diff_hash)?;
    let mut suggestions = loaded.file.suggestions;
    if let Some(ref expr) = cli.filter {
        suggestions = filter_suggestions(suggestions, &parse_filter_expr(expr));
    }
    let total = suggestions.len();

    let index = DiffIndex::build(&diff_text).context("parsing diff")?;
    let mut target = TreeTarget::from_diff(&index);

    let outcome = inject_code_suggestions(&mut target, &suggestions, &diff_text, &config.wait);

    if !cli.quiet {
        print!("{}", target.to_text());
    }
    println!("placed {} of {} suggestion(s)", outcome.success, total);
    for (suggestion, error) in &outcome.errors {
        eprintln!(
            "  {}:{} — {error}",
            suggestion.file_path, suggestion.line_number
        );
    }

    Ok(outcome.failed > 0)
}
