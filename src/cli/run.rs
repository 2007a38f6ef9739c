// src/cli/run.rs — `recipe-sweep run`

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use super::progress::terminal_progress;
use crate::core::results::{self, ResultLog};
use crate::core::runner::RecipeRunner;
use crate::core::types::RunSummary;
use crate::core::worklist::WorkList;
use crate::dss::DssApi;
use crate::infra::config::Config;

/// Replay the saved work list and append outcomes to `results_path`.
pub async fn run_sweep(
    api: Arc<dyn DssApi>,
    config: &Config,
    work_list: &Path,
    results_path: &Path,
    resume: bool,
    quiet: bool,
) -> anyhow::Result<RunSummary> {
    let work = WorkList::load(work_list)?.ok_or_else(|| {
        anyhow::anyhow!(
            "No work list at {}. Run `recipe-sweep discover` first.",
            work_list.display()
        )
    })?;

    if work.is_empty() {
        eprintln!("Work list {} has no recipes to run", work_list.display());
    }

    if work.instance != config.instance {
        tracing::warn!(
            "Work list was discovered on {} but running against {}",
            work.instance,
            config.instance
        );
    }

    let completed = if resume {
        results::completed_pairs(&results::read_outcomes(results_path)?)
    } else {
        HashSet::new()
    };
    let assignments = work.assignments(&completed);
    let skipped = work.len() - assignments.len();
    if skipped > 0 {
        eprintln!("Skipping {} recipe(s) already in {}", skipped, results_path.display());
    }

    let mut log = ResultLog::open(results_path)?;
    let mut runner = RecipeRunner::new(api, config.concurrency, config.poll_interval);
    if !quiet {
        runner = runner.with_progress(terminal_progress());
    }

    let mut summary = runner.run(assignments, &mut log).await?;
    summary.skipped = skipped;

    println!("{summary}");
    println!("Results appended to {}", results_path.display());
    Ok(summary)
}
