//! Static task catalog: the workflow tasks a client walks through, each
//! with the subtasks (and their input roles) it is made of.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// A top-level task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEntry {
    pub task_label: String,
    pub task_uri: String,
    #[serde(default)]
    pub children: Vec<SubtaskEntry>,
}

/// A subtask; `role_uri` is what the client resolves role fillers for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtaskEntry {
    pub task_label: String,
    pub task_uri: String,
    pub parent_task_label: String,
    pub parent_task_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_label: Option<String>,
}

/// The catalog file, read on every request so edits show up without a restart.
#[derive(Debug, Clone)]
pub struct TaskCatalog {
    path: PathBuf,
}

impl TaskCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> CatalogResult<Vec<TaskEntry>> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| CatalogError::Read {
            path: self.path.display().to_string(),
            source: e,
        })?;
        parse_catalog(&content, &self.path.display().to_string())
    }
}

/// Parse catalog JSON; `origin` names the source in errors.
pub fn parse_catalog(content: &str, origin: &str) -> CatalogResult<Vec<TaskEntry>> {
    serde_json::from_str(content).map_err(|e| CatalogError::Parse {
        path: origin.to_string(),
        message: e.to_string(),
    })
}
