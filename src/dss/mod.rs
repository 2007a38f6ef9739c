// src/dss/mod.rs — DSS public API abstraction
//
// Only the handful of endpoints the recipe sweep needs are modelled.
// `DssClient` talks HTTP; tests substitute their own implementation.

pub mod client;
pub mod job;
pub mod types;

use async_trait::async_trait;

use crate::infra::errors::DssError;
use types::{
    AuthInfo, FlowGraph, JobDefinition, JobState, ProjectFolder, RecipeDefinition, RecipeListItem,
};

pub use client::DssClient;

/// The subset of the DSS public API used for discovery and job execution.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DssApi: Send + Sync {
    /// Identity behind the API key.
    async fn auth_info(&self) -> Result<AuthInfo, DssError>;

    /// The root project folder.
    async fn root_folder(&self) -> Result<ProjectFolder, DssError>;

    async fn folder(&self, folder_id: &str) -> Result<ProjectFolder, DssError>;

    async fn list_recipes(&self, project_key: &str) -> Result<Vec<RecipeListItem>, DssError>;

    async fn recipe(&self, project_key: &str, recipe: &str)
        -> Result<RecipeDefinition, DssError>;

    async fn flow_graph(&self, project_key: &str) -> Result<FlowGraph, DssError>;

    /// Start a job and return its id.
    async fn start_job(
        &self,
        project_key: &str,
        definition: &JobDefinition,
    ) -> Result<String, DssError>;

    async fn job_state(&self, project_key: &str, job_id: &str) -> Result<JobState, DssError>;
}
