// tests/sweep_test.rs — Discover, persist and run against a mock DSS server

use std::sync::Arc;
use std::time::Duration;

use recipe_sweep::cli::discover::run_discover;
use recipe_sweep::cli::run::run_sweep;
use recipe_sweep::core::results::read_outcomes;
use recipe_sweep::core::types::RecipeKind;
use recipe_sweep::core::worklist::WorkList;
use recipe_sweep::dss::{DssApi, DssClient};
use recipe_sweep::infra::config::Config;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn get(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/public/api/{route}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// ROOT -> "LSE MPIM" (PRJ_A) -> "Nested" (PRJ_B)
async fn mount_instance(server: &MockServer) {
    get(server, "project-folders/", json!({
        "id": "ROOT", "name": "Root", "childrenIds": ["f1", "f9"], "projectKeys": ["TOP"]
    }))
    .await;
    get(server, "project-folders/f9", json!({
        "id": "f9", "name": "Sandbox", "childrenIds": [], "projectKeys": ["SANDBOX"]
    }))
    .await;
    get(server, "project-folders/f1", json!({
        "id": "f1", "name": "LSE MPIM", "childrenIds": ["f2"], "projectKeys": ["PRJ_A"]
    }))
    .await;
    get(server, "project-folders/f2", json!({
        "id": "f2", "name": "Nested", "childrenIds": [], "projectKeys": ["PRJ_B"]
    }))
    .await;

    get(server, "projects/PRJ_A/recipes/", json!([
        { "name": "compute_orders", "type": "python" },
        { "name": "join_sales", "type": "join" },
        { "name": "sync_copy", "type": "sync" }
    ]))
    .await;
    get(server, "projects/PRJ_A/recipes/join_sales", json!({
        "recipe": { "name": "join_sales", "type": "join", "params": { "engineType": "SPARK" } }
    }))
    .await;
    get(server, "projects/PRJ_A/recipes/sync_copy", json!({
        "recipe": { "name": "sync_copy", "type": "sync", "params": { "engineType": "DSS" } }
    }))
    .await;
    get(server, "projects/PRJ_A/flow/graph/", json!({
        "nodes": {
            "compute_orders": { "ref": "compute_orders", "type": "RUNNABLE_RECIPE", "successors": ["orders"] },
            "join_sales": { "ref": "join_sales", "type": "RUNNABLE_RECIPE", "successors": ["sales"] },
            "sync_copy": { "ref": "sync_copy", "type": "RUNNABLE_RECIPE", "successors": ["copy"] },
            "orders": { "ref": "orders", "type": "COMPUTABLE_DATASET", "successors": [] },
            "sales": { "ref": "sales", "type": "COMPUTABLE_DATASET", "successors": [] },
            "copy": { "ref": "copy", "type": "COMPUTABLE_DATASET", "successors": [] }
        }
    }))
    .await;

    get(server, "projects/PRJ_B/recipes/", json!([
        { "name": "train_model", "type": "pyspark" }
    ]))
    .await;
    get(server, "projects/PRJ_B/flow/graph/", json!({
        "nodes": {
            "train_model": { "ref": "train_model", "type": "RUNNABLE_RECIPE", "successors": ["model_f"] },
            "model_f": { "ref": "model_f", "type": "COMPUTABLE_FOLDER", "successors": [] }
        }
    }))
    .await;
}

async fn mount_jobs(server: &MockServer) {
    for (project, output, state) in [
        ("PRJ_A", "orders", "DONE"),
        ("PRJ_A", "sales", "FAILED"),
        ("PRJ_B", "model_f", "DONE"),
    ] {
        let job_id = format!("build_{output}");
        Mock::given(method("POST"))
            .and(path(format!("/public/api/projects/{project}/jobs/")))
            .and(wiremock::matchers::body_partial_json(json!({
                "outputs": [{ "id": output }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": job_id })))
            .expect(1)
            .mount(server)
            .await;
        get(server, &format!("projects/{project}/jobs/{job_id}/"), json!({
            "baseStatus": { "state": state }
        }))
        .await;
    }
}

fn config(server: &MockServer) -> Config {
    Config {
        api_key: "test-key".into(),
        instance: server.uri(),
        folder: "LSE MPIM".into(),
        concurrency: 5,
        poll_interval: Duration::from_millis(10),
    }
}

#[tokio::test]
async fn test_discover_then_run() {
    let server = MockServer::start().await;
    mount_instance(&server).await;
    mount_jobs(&server).await;

    let dir = TempDir::new().unwrap();
    let work_path = dir.path().join("recipes");
    let results_path = dir.path().join("results.csv");
    let config = config(&server);
    let client: Arc<dyn DssApi> = Arc::new(DssClient::new(&config.instance, "test-key").unwrap());

    // Discovery: projects outside the folder are ignored, the sync recipe is dropped
    let work = run_discover(client.as_ref(), &config, &work_path, false, true)
        .await
        .unwrap();
    assert_eq!(
        work.projects.keys().cloned().collect::<Vec<_>>(),
        vec!["PRJ_A", "PRJ_B"]
    );
    assert_eq!(work.len(), 3);

    let saved = WorkList::load(&work_path).unwrap().unwrap();
    assert_eq!(saved, work);
    let join = saved.projects["PRJ_A"]
        .iter()
        .find(|i| i.recipe == "join_sales")
        .unwrap();
    assert_eq!(join.kind, RecipeKind::Spark);
    assert_eq!(join.output.as_ref().unwrap().id, "sales");
    assert_eq!(
        saved.projects["PRJ_B"][0].output.as_ref().unwrap().object_type,
        "MANAGED_FOLDER"
    );

    // A second discovery refuses to overwrite the saved list
    assert!(run_discover(client.as_ref(), &config, &work_path, false, true)
        .await
        .is_err());

    // Execution replays the saved list
    let summary = run_sweep(client, &config, &work_path, &results_path, false, true)
        .await
        .unwrap();
    assert_eq!(summary.total(), 3);
    assert_eq!(summary.passed(), 2);

    let mut rows: Vec<String> = read_outcomes(&results_path)
        .unwrap()
        .iter()
        .map(|o| format!("{},{},{}", o.project_key, o.recipe, o.result))
        .collect();
    rows.sort();
    assert_eq!(
        rows,
        vec![
            "PRJ_A,compute_orders,DONE",
            "PRJ_A,join_sales,FAILED",
            "PRJ_B,train_model,DONE",
        ]
    );
}

#[tokio::test]
async fn test_run_without_work_list_fails() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = config(&server);
    let client: Arc<dyn DssApi> = Arc::new(DssClient::new(&config.instance, "test-key").unwrap());

    let err = run_sweep(
        client,
        &config,
        &dir.path().join("recipes"),
        &dir.path().join("results.csv"),
        false,
        true,
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("No work list"));
}

#[tokio::test]
async fn test_job_error_is_recorded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/public/api/projects/PRJ_A/jobs/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let work_path = dir.path().join("recipes");
    let results_path = dir.path().join("results.csv");
    let config = config(&server);

    let mut work = WorkList::new(server.uri(), "LSE MPIM");
    work.insert(
        "PRJ_A",
        vec![recipe_sweep::core::types::WorkItem {
            recipe: "compute_orders".into(),
            kind: RecipeKind::Code,
            output: Some(recipe_sweep::dss::types::JobOutput {
                id: "orders".into(),
                object_type: "DATASET".into(),
            }),
        }],
    );
    work.save(&work_path).unwrap();

    let client: Arc<dyn DssApi> = Arc::new(DssClient::new(&config.instance, "test-key").unwrap());
    let summary = run_sweep(client, &config, &work_path, &results_path, false, true)
        .await
        .unwrap();
    assert_eq!(summary.failed(), 1);
    assert_eq!(
        std::fs::read_to_string(&results_path).unwrap(),
        "PRJ_A,compute_orders,ERROR\n"
    );
}
