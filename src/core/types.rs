// src/core/types.rs — Core domain types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::dss::types::{JobOutput, JobState};

/// Result string recorded when a job could not be started or tracked.
pub const ERROR_RESULT: &str = "ERROR";

/// Recipe types whose settings are code (python, SQL script, Spark code, ...).
pub const CODE_RECIPE_TYPES: &[&str] = &[
    "python",
    "r",
    "julia",
    "shell",
    "sql_script",
    "sql_query",
    "pyspark",
    "sparkr",
    "spark_scala",
    "spark_sql_query",
];

/// Why a recipe was selected for the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipeKind {
    /// A code recipe.
    Code,
    /// A visual recipe running on the Spark engine.
    Spark,
}

impl RecipeKind {
    /// Classify a recipe by type and engine. `None` means the recipe is not
    /// part of the sweep.
    pub fn classify(recipe_type: &str, engine_type: Option<&str>) -> Option<Self> {
        if is_code_recipe(recipe_type) {
            Some(RecipeKind::Code)
        } else if engine_type == Some("SPARK") {
            Some(RecipeKind::Spark)
        } else {
            None
        }
    }
}

pub fn is_code_recipe(recipe_type: &str) -> bool {
    CODE_RECIPE_TYPES.contains(&recipe_type)
}

impl fmt::Display for RecipeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipeKind::Code => write!(f, "code"),
            RecipeKind::Spark => write!(f, "spark"),
        }
    }
}

/// A recipe selected for execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub recipe: String,
    pub kind: RecipeKind,
    /// First buildable output of the recipe, if the flow has one.
    #[serde(default)]
    pub output: Option<JobOutput>,
}

/// One work item bound to its project, as handed to a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub project_key: String,
    pub item: WorkItem,
}

/// One row of the results file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeOutcome {
    pub project_key: String,
    pub recipe: String,
    pub result: String,
}

impl RecipeOutcome {
    pub fn new(
        project_key: impl Into<String>,
        recipe: impl Into<String>,
        result: impl Into<String>,
    ) -> Self {
        Self {
            project_key: project_key.into(),
            recipe: recipe.into(),
            result: result.into(),
        }
    }

    pub fn from_state(assignment: &Assignment, state: &JobState) -> Self {
        Self::new(&assignment.project_key, &assignment.item.recipe, state.as_str())
    }

    pub fn error(assignment: &Assignment) -> Self {
        Self::new(&assignment.project_key, &assignment.item.recipe, ERROR_RESULT)
    }

    pub fn passed(&self) -> bool {
        self.result == JobState::Done.as_str()
    }
}

/// Progress events emitted by the runner.
#[derive(Debug, Clone)]
pub enum RunEvent {
    Started { project_key: String, recipe: String },
    Finished(RecipeOutcome),
}

/// Aggregate counts for a run (or an existing results file).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub by_result: BTreeMap<String, usize>,
    pub skipped: usize,
    pub panicked: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &RecipeOutcome) {
        *self.by_result.entry(outcome.result.clone()).or_insert(0) += 1;
    }

    pub fn total(&self) -> usize {
        self.by_result.values().sum()
    }

    pub fn passed(&self) -> usize {
        self.by_result
            .get(JobState::Done.as_str())
            .copied()
            .unwrap_or(0)
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} recipe(s): {} passed, {} not passed",
            self.total(),
            self.passed(),
            self.failed()
        )?;
        if !self.by_result.is_empty() {
            let parts: Vec<String> = self
                .by_result
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            write!(f, " ({})", parts.join(", "))?;
        }
        if self.skipped > 0 {
            write!(f, ", {} skipped", self.skipped)?;
        }
        if self.panicked > 0 {
            write!(f, ", {} worker(s) crashed", self.panicked)?;
        }
        Ok(())
    }
}
