use std::{fmt, io, path::PathBuf};

use thiserror::Error;

/// Errors raised while rendering or writing Markdown documents.
#[derive(Debug, Error)]
pub enum WriteError {
  #[error("Failed to create directory {path}: {source}")]
  CreateDir {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Failed to write {path}: {source}")]
  Write {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Issue {0} has no project key")]
  MissingProject(String),

  #[error("Failed to serialize front matter: {0}")]
  FrontMatter(#[from] toml::ser::Error),

  #[error("Formatting error: {0}")]
  Format(#[from] fmt::Error),
}
