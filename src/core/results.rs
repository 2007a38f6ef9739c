// src/core/results.rs — Append-only results file
//
// One line per finished recipe: `project_key,recipe_name,result`.
// Project keys and recipe names are DSS identifiers and never contain commas.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::types::RecipeOutcome;

pub struct ResultLog {
    path: PathBuf,
    file: File,
}

impl ResultLog {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one outcome and flush it to disk.
    pub fn append(&mut self, outcome: &RecipeOutcome) -> std::io::Result<()> {
        writeln!(self.file, "{}", format_line(outcome))?;
        self.file.flush()
    }
}

pub fn format_line(outcome: &RecipeOutcome) -> String {
    format!(
        "{},{},{}",
        outcome.project_key, outcome.recipe, outcome.result
    )
}

pub fn parse_line(line: &str) -> Option<RecipeOutcome> {
    let mut parts = line.trim_end_matches(['\r', '\n']).splitn(3, ',');
    let project_key = parts.next()?.trim();
    let recipe = parts.next()?.trim();
    let result = parts.next()?.trim();
    if project_key.is_empty() || recipe.is_empty() {
        return None;
    }
    Some(RecipeOutcome::new(project_key, recipe, result))
}

/// Read every well-formed row of an existing results file.
/// A missing file reads as empty.
pub fn read_outcomes(path: &Path) -> anyhow::Result<Vec<RecipeOutcome>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut outcomes = Vec::new();
    for (n, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line) {
            Some(o) => outcomes.push(o),
            None => tracing::warn!("{}:{}: skipping malformed line", path.display(), n + 1),
        }
    }
    Ok(outcomes)
}

/// (project key, recipe) pairs that already have a row.
pub fn completed_pairs(outcomes: &[RecipeOutcome]) -> HashSet<(String, String)> {
    outcomes
        .iter()
        .map(|o| (o.project_key.clone(), o.recipe.clone()))
        .collect()
}
