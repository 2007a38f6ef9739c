// src/dss/client.rs — HTTP client for the DSS public REST API
//
// Authenticates with HTTP basic auth: the API key is the user name and the
// password is empty. All endpoints live under `{instance}/public/api/`.

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use url::Url;

use super::types::{
    AuthInfo, FlowGraph, JobDefinition, JobStarted, JobState, JobStatus, ProjectFolder,
    RecipeAndPayload, RecipeDefinition, RecipeListItem,
};
use super::DssApi;
use crate::infra::errors::DssError;

const API_ROOT: &str = "public/api/";

pub struct DssClient {
    client: Client,
    base: Url,
    api_key: String,
}

impl DssClient {
    pub fn new(instance: &str, api_key: impl Into<String>) -> Result<Self, DssError> {
        let mut root = Url::parse(instance)?;
        if !root.path().ends_with('/') {
            let path = format!("{}/", root.path());
            root.set_path(&path);
        }
        let client = Client::builder()
            .user_agent(concat!("recipe-sweep/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base: root.join(API_ROOT)?,
            api_key: api_key.into(),
        })
    }

    /// Build an endpoint URL from raw path segments (each segment is escaped).
    fn endpoint(&self, segments: &[&str], trailing_slash: bool) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
            if trailing_slash {
                path.push("");
            }
        }
        url
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        trailing_slash: bool,
        body: Option<&serde_json::Value>,
    ) -> Result<T, DssError> {
        let url = self.endpoint(segments, trailing_slash);
        let path = url
            .path()
            .strip_prefix(self.base.path())
            .unwrap_or(url.path())
            .to_string();
        tracing::debug!(method = %method, path = %path, "DSS request");

        let mut req = self
            .client
            .request(method.clone(), url)
            .basic_auth(&self.api_key, Some(""));
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await?;
        decode(resp, method.as_str(), path).await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        trailing_slash: bool,
    ) -> Result<T, DssError> {
        self.request(Method::GET, segments, trailing_slash, None)
            .await
    }
}

async fn decode<T: DeserializeOwned>(
    resp: Response,
    method: &str,
    path: String,
) -> Result<T, DssError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(DssError::Api {
            method: method.to_string(),
            path,
            status: status.as_u16(),
            body,
        });
    }

    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| DssError::Decode {
        path,
        message: e.to_string(),
    })
}

#[async_trait]
impl DssApi for DssClient {
    async fn auth_info(&self) -> Result<AuthInfo, DssError> {
        self.get(&["auth", "info"], false).await
    }

    async fn root_folder(&self) -> Result<ProjectFolder, DssError> {
        self.get(&["project-folders"], true).await
    }

    async fn folder(&self, folder_id: &str) -> Result<ProjectFolder, DssError> {
        self.get(&["project-folders", folder_id], false).await
    }

    async fn list_recipes(&self, project_key: &str) -> Result<Vec<RecipeListItem>, DssError> {
        self.get(&["projects", project_key, "recipes"], true).await
    }

    async fn recipe(
        &self,
        project_key: &str,
        recipe: &str,
    ) -> Result<RecipeDefinition, DssError> {
        let resp: RecipeAndPayload = self
            .get(&["projects", project_key, "recipes", recipe], false)
            .await?;
        Ok(resp.recipe)
    }

    async fn flow_graph(&self, project_key: &str) -> Result<FlowGraph, DssError> {
        self.get(&["projects", project_key, "flow", "graph"], true)
            .await
    }

    async fn start_job(
        &self,
        project_key: &str,
        definition: &JobDefinition,
    ) -> Result<String, DssError> {
        let body = serde_json::to_value(definition).map_err(|e| DssError::Decode {
            path: format!("projects/{project_key}/jobs/"),
            message: e.to_string(),
        })?;
        let started: JobStarted = self
            .request(
                Method::POST,
                &["projects", project_key, "jobs"],
                true,
                Some(&body),
            )
            .await?;
        Ok(started.id)
    }

    async fn job_state(&self, project_key: &str, job_id: &str) -> Result<JobState, DssError> {
        let status: JobStatus = self
            .get(&["projects", project_key, "jobs", job_id], true)
            .await?;
        Ok(status.base_status.state)
    }
}
