// src/cli/summary.rs — `recipe-sweep summary`

use std::path::Path;

use crate::core::results;
use crate::core::types::{RecipeOutcome, RunSummary};

/// Print counts for an existing results file, followed by every recipe
/// whose latest row did not pass.
pub fn show_summary(results_path: &Path) -> anyhow::Result<RunSummary> {
    let outcomes = results::read_outcomes(results_path)?;
    if outcomes.is_empty() {
        println!("No results in {}", results_path.display());
        return Ok(RunSummary::default());
    }

    let latest = latest_outcomes(&outcomes);
    let mut summary = RunSummary::default();
    for outcome in &latest {
        summary.record(outcome);
    }

    println!("{summary}");
    for outcome in latest.iter().filter(|o| !o.passed()) {
        println!("  {:<10} {}.{}", outcome.result, outcome.project_key, outcome.recipe);
    }
    Ok(summary)
}

/// Keep only the last row per (project, recipe); a rerun supersedes older rows.
pub fn latest_outcomes(outcomes: &[RecipeOutcome]) -> Vec<RecipeOutcome> {
    let mut latest: std::collections::BTreeMap<(String, String), RecipeOutcome> =
        std::collections::BTreeMap::new();
    for o in outcomes {
        latest.insert((o.project_key.clone(), o.recipe.clone()), o.clone());
    }
    latest.into_values().collect()
}
