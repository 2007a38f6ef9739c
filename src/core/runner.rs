// src/core/runner.rs — Bounded recipe execution
//
// A semaphore caps the number of recipe jobs in flight. Each worker holds
// its permit until the remote job reaches a terminal state, then sends its
// outcome over a channel. Whenever the coordinator obtains a permit (a
// worker retired) it reaps finished workers and drains the channel into
// the results file, so results land on disk as the sweep progresses.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{Id, JoinError, JoinSet};

use super::results::ResultLog;
use super::types::{Assignment, RecipeOutcome, RunEvent, RunSummary};
use crate::dss::job::run_recipe_job;
use crate::dss::types::JobState;
use crate::dss::DssApi;

pub type ProgressFn = Arc<dyn Fn(RunEvent) + Send + Sync>;

pub struct RecipeRunner {
    api: Arc<dyn DssApi>,
    concurrency: usize,
    poll_interval: Duration,
    progress: Option<ProgressFn>,
}

impl RecipeRunner {
    pub fn new(api: Arc<dyn DssApi>, concurrency: usize, poll_interval: Duration) -> Self {
        Self {
            api,
            concurrency: concurrency.max(1),
            poll_interval,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: impl Fn(RunEvent) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(progress));
        self
    }

    /// Run every assignment and append one row per finished recipe to `log`.
    pub async fn run(
        &self,
        assignments: Vec<Assignment>,
        log: &mut ResultLog,
    ) -> anyhow::Result<RunSummary> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let (tx, mut rx) = mpsc::unbounded_channel::<RecipeOutcome>();
        let mut workers: JoinSet<()> = JoinSet::new();
        // Task id -> assignment, so a crashed worker still gets its row
        let mut in_flight: HashMap<Id, Assignment> = HashMap::new();
        let mut summary = RunSummary::default();

        tracing::info!(
            recipes = assignments.len(),
            concurrency = self.concurrency,
            "Starting recipe sweep"
        );

        for assignment in assignments {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .context("worker pool closed")?;

            while let Some(joined) = workers.try_join_next_with_id() {
                reap(joined, &mut in_flight, log, &mut summary)?;
            }
            drain(&mut rx, log, &mut summary)?;

            let api = self.api.clone();
            let tx = tx.clone();
            let progress = self.progress.clone();
            let poll_interval = self.poll_interval;
            let task_assignment = assignment.clone();

            let handle = workers.spawn(async move {
                let _permit = permit;
                let assignment = task_assignment;
                emit(
                    &progress,
                    RunEvent::Started {
                        project_key: assignment.project_key.clone(),
                        recipe: assignment.item.recipe.clone(),
                    },
                );

                let outcome = execute(api.as_ref(), &assignment, poll_interval).await;
                emit(&progress, RunEvent::Finished(outcome.clone()));
                let _ = tx.send(outcome);
            });
            in_flight.insert(handle.id(), assignment);
        }

        drop(tx);
        while let Some(joined) = workers.join_next_with_id().await {
            reap(joined, &mut in_flight, log, &mut summary)?;
            drain(&mut rx, log, &mut summary)?;
        }
        drain(&mut rx, log, &mut summary)?;

        tracing::info!("Sweep finished: {}", summary);
        Ok(summary)
    }
}

/// Run one recipe job; any error becomes an `ERROR` outcome.
async fn execute(
    api: &dyn DssApi,
    assignment: &Assignment,
    poll_interval: Duration,
) -> RecipeOutcome {
    let project_key = assignment.project_key.as_str();
    let recipe = assignment.item.recipe.as_str();

    match run_recipe_job(
        api,
        project_key,
        recipe,
        assignment.item.output.as_ref(),
        poll_interval,
    )
    .await
    {
        Ok(state) => {
            if state != JobState::Done {
                tracing::warn!(project = project_key, recipe, state = %state, "Recipe did not succeed");
            }
            RecipeOutcome::from_state(assignment, &state)
        }
        Err(e) => {
            tracing::error!(project = project_key, recipe, "Recipe job error: {}", e);
            RecipeOutcome::error(assignment)
        }
    }
}

fn drain(
    rx: &mut mpsc::UnboundedReceiver<RecipeOutcome>,
    log: &mut ResultLog,
    summary: &mut RunSummary,
) -> anyhow::Result<()> {
    while let Ok(outcome) = rx.try_recv() {
        log.append(&outcome)
            .with_context(|| format!("writing {}", log.path().display()))?;
        summary.record(&outcome);
    }
    Ok(())
}

/// Forget a finished worker. A worker that crashed before sending its
/// outcome is recorded as `ERROR`.
fn reap(
    joined: Result<(Id, ()), JoinError>,
    in_flight: &mut HashMap<Id, Assignment>,
    log: &mut ResultLog,
    summary: &mut RunSummary,
) -> anyhow::Result<()> {
    let e = match joined {
        Ok((id, ())) => {
            in_flight.remove(&id);
            return Ok(());
        }
        Err(e) => e,
    };

    summary.panicked += 1;
    let Some(assignment) = in_flight.remove(&e.id()) else {
        tracing::error!("Recipe worker crashed: {}", e);
        return Ok(());
    };
    tracing::error!(
        project = %assignment.project_key,
        recipe = %assignment.item.recipe,
        "Recipe worker crashed: {}",
        e
    );
    let outcome = RecipeOutcome::error(&assignment);
    log.append(&outcome)
        .with_context(|| format!("writing {}", log.path().display()))?;
    summary.record(&outcome);
    Ok(())
}

fn emit(progress: &Option<ProgressFn>, event: RunEvent) {
    if let Some(ref cb) = progress {
        cb(event);
    }
}
