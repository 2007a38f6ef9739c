// src/core/discovery.rs — Find the projects and recipes to sweep
//
// The target folder is a direct child of the root project folder. Every
// project under it (at any depth) is scanned; code recipes and visual
// recipes on the Spark engine are selected.

use std::collections::{BTreeSet, HashSet};

use super::types::{is_code_recipe, RecipeKind, WorkItem};
use super::worklist::WorkList;
use crate::dss::types::ProjectFolder;
use crate::dss::DssApi;
use crate::infra::errors::DssError;

/// Find the child of the root folder named `name`. When several children
/// share the name, the last one listed wins.
pub async fn find_folder(api: &dyn DssApi, name: &str) -> Result<ProjectFolder, DssError> {
    let root = api.root_folder().await?;

    let mut found = None;
    for child_id in &root.children_ids {
        let child = api.folder(child_id).await?;
        if child.name == name {
            if found.is_some() {
                tracing::warn!(
                    folder = name,
                    id = %child.id,
                    "Several folders share this name, using the later one"
                );
            }
            found = Some(child);
        }
    }

    found.ok_or_else(|| DssError::FolderNotFound(name.to_string()))
}

/// Project keys in `folder` and all of its descendants.
pub async fn collect_project_keys(
    api: &dyn DssApi,
    folder: &ProjectFolder,
) -> Result<BTreeSet<String>, DssError> {
    let mut keys: BTreeSet<String> = folder.project_keys.iter().cloned().collect();
    let mut seen: HashSet<String> = HashSet::from([folder.id.clone()]);
    let mut pending: Vec<String> = folder.children_ids.clone();

    while let Some(id) = pending.pop() {
        if !seen.insert(id.clone()) {
            continue;
        }
        let child = api.folder(&id).await?;
        tracing::debug!(folder = %child.name, projects = child.project_keys.len(), "Scanned folder");
        keys.extend(child.project_keys);
        pending.extend(child.children_ids);
    }

    Ok(keys)
}

/// Recipes of `project_key` that belong in the sweep.
pub async fn collect_recipes(
    api: &dyn DssApi,
    project_key: &str,
) -> Result<Vec<WorkItem>, DssError> {
    let mut selected = Vec::new();

    for listed in api.list_recipes(project_key).await? {
        // Code recipes are recognised from the listing alone; everything
        // else needs its definition to read the engine.
        let kind = if is_code_recipe(&listed.recipe_type) {
            Some(RecipeKind::Code)
        } else {
            let def = api.recipe(project_key, &listed.name).await?;
            RecipeKind::classify(&def.recipe_type, def.engine_type())
        };

        match kind {
            Some(kind) => {
                if kind == RecipeKind::Spark {
                    tracing::info!(project = project_key, recipe = %listed.name, "SPARK recipe");
                }
                selected.push((listed.name, kind));
            }
            None => {
                tracing::debug!(
                    project = project_key,
                    recipe = %listed.name,
                    recipe_type = %listed.recipe_type,
                    "Skipping recipe"
                );
            }
        }
    }

    if selected.is_empty() {
        return Ok(Vec::new());
    }

    let graph = api.flow_graph(project_key).await?;
    Ok(selected
        .into_iter()
        .map(|(recipe, kind)| {
            let output = graph.successor_computables(&recipe).into_iter().next();
            if output.is_none() {
                tracing::warn!(project = project_key, recipe = %recipe, "Recipe has no buildable output");
            }
            WorkItem {
                recipe,
                kind,
                output,
            }
        })
        .collect())
}

/// Walk `folder_name` and build the work list.
///
/// `on_project` is called after each project is scanned.
pub async fn discover<F>(
    api: &dyn DssApi,
    instance: &str,
    folder_name: &str,
    mut on_project: F,
) -> Result<WorkList, DssError>
where
    F: FnMut(&str, &[WorkItem]),
{
    let folder = find_folder(api, folder_name).await?;
    let keys = collect_project_keys(api, &folder).await?;
    tracing::info!("Found {} projects under '{}'", keys.len(), folder_name);

    let mut work = WorkList::new(instance, folder_name);
    for key in keys {
        let items = collect_recipes(api, &key).await?;
        on_project(&key, &items);
        work.insert(key, items);
    }

    Ok(work)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dss::types::{FlowGraph, RecipeDefinition, RecipeListItem};
    use crate::dss::MockDssApi;

    fn folder(id: &str, name: &str, children: &[&str], projects: &[&str]) -> ProjectFolder {
        ProjectFolder {
            id: id.into(),
            name: name.into(),
            parent_id: None,
            children_ids: children.iter().map(|s| s.to_string()).collect(),
            project_keys: projects.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn listed(name: &str, recipe_type: &str) -> RecipeListItem {
        RecipeListItem {
            name: name.into(),
            recipe_type: recipe_type.into(),
        }
    }

    fn graph_json() -> FlowGraph {
        serde_json::from_value(serde_json::json!({
            "nodes": {
                "py_clean": {"ref": "py_clean", "type": "RUNNABLE_RECIPE", "successors": ["clean"]},
                "join_spark": {"ref": "join_spark", "type": "RUNNABLE_RECIPE", "successors": ["joined"]},
                "clean": {"ref": "clean", "type": "COMPUTABLE_DATASET"},
                "joined": {"ref": "joined", "type": "COMPUTABLE_DATASET"}
            }
        }))
        .unwrap()
    }

    /// A mock whose folder tree is ROOT -> {TARGET, OTHER}, TARGET -> {SUB}.
    fn tree_api() -> MockDssApi {
        let mut api = MockDssApi::new();
        api.expect_root_folder()
            .returning(|| Ok(folder("ROOT", "/", &["OTHER", "TARGET"], &["TOP_LEVEL"])));
        api.expect_folder().returning(|id| {
            Ok(match id {
                "OTHER" => folder("OTHER", "Sandbox", &[], &["SANDBOX"]),
                "TARGET" => folder("TARGET", "LSE MPIM", &["SUB"], &["PRJ_A", "PRJ_B"]),
                "SUB" => folder("SUB", "Nested", &[], &["PRJ_B", "PRJ_C"]),
                other => panic!("unexpected folder {other}"),
            })
        });
        api
    }

    #[tokio::test]
    async fn test_find_folder_by_name() {
        let api = tree_api();
        let f = find_folder(&api, "LSE MPIM").await.unwrap();
        assert_eq!(f.id, "TARGET");
    }

    #[tokio::test]
    async fn test_find_folder_duplicate_name_takes_last() {
        let mut api = MockDssApi::new();
        api.expect_root_folder()
            .returning(|| Ok(folder("ROOT", "/", &["OLD", "NEW"], &[])));
        api.expect_folder().returning(|id| {
            assert_ne!(id, "ROOT", "root is already listed");
            Ok(folder(id, "LSE MPIM", &[], &[]))
        });

        let f = find_folder(&api, "LSE MPIM").await.unwrap();
        assert_eq!(f.id, "NEW");
    }

    #[tokio::test]
    async fn test_find_folder_missing() {
        let api = tree_api();
        let err = find_folder(&api, "Nope").await.unwrap_err();
        assert!(matches!(err, DssError::FolderNotFound(ref n) if n == "Nope"));
    }

    #[tokio::test]
    async fn test_collect_keys_is_union_of_descendants() {
        let api = tree_api();
        let target = folder("TARGET", "LSE MPIM", &["SUB"], &["PRJ_A", "PRJ_B"]);
        let keys = collect_project_keys(&api, &target).await.unwrap();
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        assert_eq!(keys, vec!["PRJ_A", "PRJ_B", "PRJ_C"]);
    }

    #[tokio::test]
    async fn test_collect_keys_leaf_folder() {
        let api = MockDssApi::new();
        let leaf = folder("LEAF", "Leaf", &[], &["ONLY"]);
        let keys = collect_project_keys(&api, &leaf).await.unwrap();
        assert_eq!(keys.len(), 1);
    }

    #[tokio::test]
    async fn test_collect_recipes_selects_code_and_spark() {
        let mut api = MockDssApi::new();
        api.expect_list_recipes().returning(|_| {
            Ok(vec![
                listed("py_clean", "python"),
                listed("join_spark", "join"),
                listed("prep", "shaker"),
            ])
        });
        api.expect_recipe().returning(|_, name| {
            let engine = if name == "join_spark" { "SPARK" } else { "DSS" };
            let kind = if name == "join_spark" { "join" } else { "shaker" };
            Ok(serde_json::from_value::<RecipeDefinition>(serde_json::json!({
                "name": name,
                "type": kind,
                "params": {"engineType": engine}
            }))
            .unwrap())
        })
        .times(2);
        api.expect_flow_graph().returning(|_| Ok(graph_json()));

        let items = collect_recipes(&api, "PRJ_A").await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].recipe, "py_clean");
        assert_eq!(items[0].kind, RecipeKind::Code);
        assert_eq!(items[0].output.as_ref().unwrap().id, "clean");
        assert_eq!(items[1].recipe, "join_spark");
        assert_eq!(items[1].kind, RecipeKind::Spark);
    }

    #[tokio::test]
    async fn test_collect_recipes_keeps_recipe_without_output() {
        let mut api = MockDssApi::new();
        api.expect_list_recipes()
            .returning(|_| Ok(vec![listed("orphan", "python")]));
        api.expect_flow_graph()
            .returning(|_| Ok(FlowGraph::default()));

        let items = collect_recipes(&api, "PRJ").await.unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].output.is_none());
    }

    #[tokio::test]
    async fn test_collect_recipes_skips_graph_when_nothing_selected() {
        let mut api = MockDssApi::new();
        api.expect_list_recipes()
            .returning(|_| Ok(vec![listed("prep", "shaker")]));
        api.expect_recipe().returning(|_, _| {
            Ok(serde_json::from_value::<RecipeDefinition>(
                serde_json::json!({"name": "prep", "type": "shaker"}),
            )
            .unwrap())
        });
        api.expect_flow_graph().never();

        assert!(collect_recipes(&api, "PRJ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_discover_builds_work_list() {
        let mut api = tree_api();
        api.expect_list_recipes().returning(|key| {
            Ok(if key == "PRJ_B" {
                vec![listed("py_clean", "python")]
            } else {
                vec![]
            })
        });
        api.expect_flow_graph().returning(|_| Ok(graph_json()));

        let mut seen = Vec::new();
        let work = discover(&api, "https://dss.example.com", "LSE MPIM", |key, items| {
            seen.push((key.to_string(), items.len()))
        })
        .await
        .unwrap();

        assert_eq!(work.project_count(), 3);
        assert_eq!(work.len(), 1);
        assert_eq!(work.folder, "LSE MPIM");
        assert_eq!(
            seen,
            vec![
                ("PRJ_A".to_string(), 0),
                ("PRJ_B".to_string(), 1),
                ("PRJ_C".to_string(), 0)
            ]
        );
    }
}
