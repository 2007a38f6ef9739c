// src/dss/types.rs — Wire types for the DSS public API

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Response of `GET auth/info`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthInfo {
    pub auth_identifier: String,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub user_profile: Option<String>,
}

impl fmt::Display for AuthInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.auth_identifier)?;
        if let Some(ref profile) = self.user_profile {
            write!(f, " ({profile})")?;
        }
        if !self.groups.is_empty() {
            write!(f, " groups=[{}]", self.groups.join(", "))?;
        }
        Ok(())
    }
}

/// A project folder node.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFolder {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub children_ids: Vec<String>,
    #[serde(default)]
    pub project_keys: Vec<String>,
}

/// An entry of `GET projects/{key}/recipes/`.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeListItem {
    pub name: String,
    #[serde(rename = "type")]
    pub recipe_type: String,
}

/// Response of `GET projects/{key}/recipes/{name}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeAndPayload {
    pub recipe: RecipeDefinition,
    #[serde(default)]
    pub payload: Option<String>,
}

/// The raw recipe definition. Only the fields used for classification are typed.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub recipe_type: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl RecipeDefinition {
    pub fn engine_type(&self) -> Option<&str> {
        self.params.get("engineType").and_then(|v| v.as_str())
    }
}

/// Response of `GET projects/{key}/flow/graph/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlowGraph {
    #[serde(default)]
    pub nodes: HashMap<String, FlowNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlowNode {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub successors: Vec<String>,
}

impl FlowGraph {
    /// Buildable objects produced by `recipe`, in graph order.
    pub fn successor_computables(&self, recipe: &str) -> Vec<JobOutput> {
        let Some(node) = self.nodes.get(recipe) else {
            return Vec::new();
        };
        node.successors
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .filter_map(JobOutput::from_node)
            .collect()
    }
}

/// A build target for a job: an object id plus its DSS object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOutput {
    pub id: String,
    #[serde(rename = "type")]
    pub object_type: String,
}

impl JobOutput {
    fn from_node(node: &FlowNode) -> Option<Self> {
        let object_type = match node.node_type.as_str() {
            "COMPUTABLE_DATASET" => "DATASET",
            "COMPUTABLE_FOLDER" => "MANAGED_FOLDER",
            "COMPUTABLE_SAVED_MODEL" => "SAVED_MODEL",
            "COMPUTABLE_STREAMING_ENDPOINT" => "STREAMING_ENDPOINT",
            "COMPUTABLE_MODEL_EVALUATION_STORE" => "MODEL_EVALUATION_STORE",
            "COMPUTABLE_KNOWLEDGE_BANK" => "RETRIEVABLE_KNOWLEDGE",
            _ => return None,
        };
        Some(Self {
            id: node.reference.clone(),
            object_type: object_type.to_string(),
        })
    }
}

/// Build mode for a job. The recipe check only ever forces a single step.
pub const FORCED_BUILD: &str = "NON_RECURSIVE_FORCED_BUILD";

/// Body of `POST projects/{key}/jobs/`.
#[derive(Debug, Clone, Serialize)]
pub struct JobDefinition {
    #[serde(rename = "type")]
    pub job_type: String,
    pub outputs: Vec<JobOutputRef>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobOutputRef {
    pub project_key: String,
    pub id: String,
    #[serde(rename = "type")]
    pub object_type: String,
}

impl JobDefinition {
    pub fn forced_build(project_key: &str, output: &JobOutput) -> Self {
        Self {
            job_type: FORCED_BUILD.to_string(),
            outputs: vec![JobOutputRef {
                project_key: project_key.to_string(),
                id: output.id.clone(),
                object_type: output.object_type.clone(),
            }],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobStarted {
    pub id: String,
}

/// Response of `GET projects/{key}/jobs/{id}/`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub base_status: BaseStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BaseStatus {
    pub state: JobState,
}

/// State of a DSS job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    NotStarted,
    Running,
    Done,
    Failed,
    Aborted,
    Other(String),
}

impl JobState {
    pub fn parse(s: &str) -> Self {
        match s {
            "NOT_STARTED" => JobState::NotStarted,
            "RUNNING" => JobState::Running,
            "DONE" => JobState::Done,
            "FAILED" => JobState::Failed,
            "ABORTED" => JobState::Aborted,
            other => JobState::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobState::NotStarted => "NOT_STARTED",
            JobState::Running => "RUNNING",
            JobState::Done => "DONE",
            JobState::Failed => "FAILED",
            JobState::Aborted => "ABORTED",
            JobState::Other(s) => s,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Done | JobState::Failed | JobState::Aborted)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobState {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(JobState::parse(&s))
    }
}
