use std::{io, path::PathBuf};

use thiserror::Error;

/// Error type for reading and writing issue records
#[derive(Debug, Error)]
pub enum IssueError {
  #[error("Failed to read issue record {path}: {source}")]
  Read {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Failed to parse issue record {path}: {source}")]
  Parse {
    path:   PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("Failed to write issue record {path}: {source}")]
  Write {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Failed to serialize issue {key}: {source}")]
  Serialize {
    key:    String,
    #[source]
    source: serde_json::Error,
  },

  #[error("Failed to walk {path}: {source}")]
  Walk {
    path:   PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error("Issue {0} has no project key")]
  MissingProject(String),
}
