// src/dss/job.rs — Start a recipe build and wait for it to finish
//
// The waiter polls with exponential backoff, doubling the interval after
// every non-terminal answer up to five minutes. A failed or aborted job is
// a normal return value; only transport/API problems are errors.

use std::time::Duration;

use super::types::{JobDefinition, JobOutput, JobState};
use super::DssApi;
use crate::infra::errors::DssError;

pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(300);

/// Poll `job_id` until it reaches DONE, FAILED or ABORTED.
pub async fn wait_for_job(
    api: &dyn DssApi,
    project_key: &str,
    job_id: &str,
    initial_interval: Duration,
) -> Result<JobState, DssError> {
    let mut delay = initial_interval.min(MAX_POLL_INTERVAL);
    let mut state = api.job_state(project_key, job_id).await?;

    while !state.is_terminal() {
        tracing::trace!(
            project = project_key,
            job = job_id,
            state = %state,
            delay_ms = delay.as_millis() as u64,
            "Job still running"
        );
        tokio::time::sleep(delay).await;
        delay = delay.saturating_mul(2).min(MAX_POLL_INTERVAL);
        state = api.job_state(project_key, job_id).await?;
    }

    Ok(state)
}

/// Force-build the first output of `recipe` and wait for the job.
pub async fn run_recipe_job(
    api: &dyn DssApi,
    project_key: &str,
    recipe: &str,
    output: Option<&JobOutput>,
    poll_interval: Duration,
) -> Result<JobState, DssError> {
    let output = output.ok_or_else(|| DssError::NoOutputs {
        project_key: project_key.to_string(),
        recipe: recipe.to_string(),
    })?;

    let definition = JobDefinition::forced_build(project_key, output);
    let job_id = api.start_job(project_key, &definition).await?;
    tracing::info!(
        project = project_key,
        recipe,
        job = %job_id,
        output = %output.id,
        "Job started"
    );

    wait_for_job(api, project_key, &job_id, poll_interval).await
}
