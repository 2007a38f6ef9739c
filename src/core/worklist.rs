// src/core/worklist.rs — Persisted discovery result
//
// Discovery is slow (one request per recipe), so its output is saved and
// replayed by later runs. Writes are atomic (temp file + rename).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::path::Path;

use super::types::{Assignment, WorkItem};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkList {
    pub instance: String,
    pub folder: String,
    pub discovered_at: DateTime<Utc>,
    /// Project key -> selected recipes. Projects with no selected recipe are kept.
    #[serde(default)]
    pub projects: BTreeMap<String, Vec<WorkItem>>,
}

impl WorkList {
    pub fn new(instance: impl Into<String>, folder: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            folder: folder.into(),
            discovered_at: Utc::now(),
            projects: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, project_key: impl Into<String>, items: Vec<WorkItem>) {
        self.projects.insert(project_key.into(), items);
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    /// Number of recipes across all projects.
    pub fn len(&self) -> usize {
        self.projects.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All (project key, item) pairs in project-key order.
    pub fn items(&self) -> impl Iterator<Item = (&str, &WorkItem)> {
        self.projects
            .iter()
            .flat_map(|(key, items)| items.iter().map(move |item| (key.as_str(), item)))
    }

    /// Assignments for every item not in `completed`.
    pub fn assignments(&self, completed: &HashSet<(String, String)>) -> Vec<Assignment> {
        self.items()
            .filter(|(key, item)| !completed.contains(&(key.to_string(), item.recipe.clone())))
            .map(|(key, item)| Assignment {
                project_key: key.to_string(),
                item: item.clone(),
            })
            .collect()
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "worklist".into());
        let tmp = path.with_file_name(format!(".{file_name}.tmp"));

        let mut f = std::fs::File::create(&tmp)?;
        f.write_all(json.as_bytes())?;
        f.flush()?;
        f.sync_all()?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Load a saved work list. `Ok(None)` when the file does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let list = serde_json::from_str(&content).map_err(|e| {
            anyhow::anyhow!(
                "{} is not a valid work list ({e}). Delete it or run `discover --force`.",
                path.display()
            )
        })?;
        Ok(Some(list))
    }
}
