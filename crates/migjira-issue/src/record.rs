//! Cached issue records: one pretty-printed JSON file per issue.
use std::{
  fs,
  path::{Path, PathBuf},
};

use log::debug;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::{
  error::IssueError,
  types::{
    ChildIssueInfo,
    DevStatusDetail,
    FieldMeta,
    Issue,
    ParentIssueInfo,
    RemoteLink,
  },
};

/// Everything fetched for one issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRecord {
  pub issue: Issue,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub dev_status: Option<DevStatusDetail>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub parent_info: Option<ParentIssueInfo>,

  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub child_issues: Vec<ChildIssueInfo>,

  /// Field metadata used to name custom fields.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub fields: Vec<FieldMeta>,

  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub remote_links: Vec<RemoteLink>,

  #[serde(default)]
  pub saved_at: String,
}

impl IssueRecord {
  /// Read a record from `path`.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or is not a valid record.
  pub fn load(path: &Path) -> Result<Self, IssueError> {
    let content = fs::read_to_string(path).map_err(|source| {
      IssueError::Read {
        path: path.to_path_buf(),
        source,
      }
    })?;
    serde_json::from_str(&content).map_err(|source| {
      IssueError::Parse {
        path: path.to_path_buf(),
        source,
      }
    })
  }

  /// Path the record is stored at under `dir`: `dir/PROJECT/KEY.json`.
  ///
  /// # Errors
  ///
  /// Returns [`IssueError::MissingProject`] if the issue has no project key.
  pub fn path_in(&self, dir: &Path) -> Result<PathBuf, IssueError> {
    let project = self.issue.project_key();
    if project.is_empty() {
      return Err(IssueError::MissingProject(self.issue.key.clone()));
    }
    Ok(dir.join(project).join(format!("{}.json", self.issue.key)))
  }

  /// Write the record as pretty-printed JSON under `dir`, creating the
  /// project directory as needed. Returns the written path.
  ///
  /// # Errors
  ///
  /// Returns an error if the record cannot be serialized or written.
  pub fn save(&self, dir: &Path) -> Result<PathBuf, IssueError> {
    let path = self.path_in(dir)?;
    let json = serde_json::to_string_pretty(self).map_err(|source| {
      IssueError::Serialize {
        key: self.issue.key.clone(),
        source,
      }
    })?;

    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).map_err(|source| {
        IssueError::Write {
          path: parent.to_path_buf(),
          source,
        }
      })?;
    }
    fs::write(&path, json).map_err(|source| {
      IssueError::Write {
        path: path.clone(),
        source,
      }
    })?;

    debug!("Saved {} to {}", self.issue.key, path.display());
    Ok(path)
  }
}

fn is_json(path: &Path) -> bool {
  path.extension().is_some_and(|ext| ext == "json")
}

/// Record files under `path`: the file itself, or every `.json` file found
/// recursively when `path` is a directory. Sorted for stable output.
///
/// # Errors
///
/// Returns an error if `path` does not exist or the walk fails.
pub fn collect_record_files(path: &Path) -> Result<Vec<PathBuf>, IssueError> {
  let metadata = fs::metadata(path).map_err(|source| {
    IssueError::Read {
      path: path.to_path_buf(),
      source,
    }
  })?;
  if !metadata.is_dir() {
    return Ok(vec![path.to_path_buf()]);
  }

  let mut files = Vec::new();
  for entry in WalkDir::new(path).follow_links(true) {
    let entry = entry.map_err(|source| {
      IssueError::Walk {
        path: path.to_path_buf(),
        source,
      }
    })?;
    if entry.file_type().is_file() && is_json(entry.path()) {
      files.push(entry.into_path());
    }
  }
  files.sort();

  debug!("Found {} record files under {}", files.len(), path.display());
  Ok(files)
}
