//! Markdown documents for issues and projects.
//!
//! An issue page is TOML front matter followed by a breadcrumb, a side panel
//! with the issue details and development activity, and the converted body
//! sections. Pages land in `<markdown_dir>/<PROJECT>/<KEY>.md` next to one
//! `_index.md` per project.
mod format;
mod front_matter;
mod sections;

use std::{
  fmt::Write,
  fs,
  path::{Path, PathBuf},
};

pub use format::{PROJECT_ICON, issue_type_icon, parse_timestamp};
use log::debug;
use migjira_config::Config;
use migjira_issue::{
  FieldNameCache,
  IssueRecord,
  mapping::{build_attachment_map, stored_attachment_names},
  types::Project,
};
use migjira_markup::{AttachmentMap, Converter, ConverterOptions, UserMapping};

use crate::error::WriteError;

/// Name of the per-project index page.
pub const PROJECT_INDEX: &str = "_index.md";

/// Markers delimiting the side panel in the page theme.
const PANEL_START: &str = "<!-- PAGE_RIGHT_START -->";
const PANEL_END: &str = "<!-- PAGE_RIGHT_END -->";

/// Everything needed to render one issue: configuration, the shared user
/// mapping, and the issue's own attachment and field-name tables.
///
/// Only attachments present in `output.attachments_dir` are linked.
#[derive(Debug, Clone)]
pub struct WriterContext<'a> {
  pub config:             &'a Config,
  pub users:              &'a UserMapping,
  pub attachments:        AttachmentMap,
  pub stored_attachments: Vec<String>,
  pub field_names:        FieldNameCache,
}

impl<'a> WriterContext<'a> {
  #[must_use]
  pub fn new(
    record: &IssueRecord,
    config: &'a Config,
    users: &'a UserMapping,
  ) -> Self {
    let all_stored = stored_attachment_names(&record.issue);
    let mut attachments = build_attachment_map(&record.issue, &all_stored);
    let stored_attachments =
      downloaded_attachments(all_stored, &config.output.attachments_dir);
    attachments.retain(|_, stored| stored_attachments.contains(stored));
    Self {
      config,
      users,
      attachments,
      stored_attachments,
      field_names: FieldNameCache::new(&record.fields),
    }
  }

  /// A markup converter over this context's tables.
  #[must_use]
  pub fn converter(&self) -> Converter<'_> {
    Converter::with_options(
      self.users,
      &self.attachments,
      ConverterOptions::default()
        .with_attachment_url(&self.config.output.attachments_url),
    )
  }
}

/// Keep the stored names that exist as files in `dir`. Attachments that were
/// never downloaded are neither linked nor rendered inline.
fn downloaded_attachments(stored: Vec<String>, dir: &Path) -> Vec<String> {
  stored
    .into_iter()
    .filter(|name| {
      let present = dir.join(name).is_file();
      if !present {
        debug!("Attachment {name} not found in {}", dir.display());
      }
      present
    })
    .collect()
}

/// Render an issue page.
///
/// # Errors
///
/// Returns an error if the front matter cannot be serialized or formatting
/// into the output buffer fails.
pub fn render_issue(
  record: &IssueRecord,
  ctx: &WriterContext<'_>,
) -> Result<String, WriteError> {
  let mut out = String::new();

  front_matter::write_front_matter(&mut out, record, ctx)?;
  sections::write_title(&mut out, record)?;

  writeln!(out, "{PANEL_START}\n")?;
  sections::write_details(&mut out, record, ctx)?;
  sections::write_development(&mut out, record)?;
  writeln!(out, "{PANEL_END}\n")?;

  sections::write_description(&mut out, record, ctx)?;
  sections::write_child_issues(&mut out, record)?;
  sections::write_confluence_links(&mut out, record)?;
  sections::write_comments(&mut out, record, ctx)?;
  sections::write_subtasks(&mut out, record)?;
  sections::write_issue_links(&mut out, record)?;
  sections::write_attachments(&mut out, ctx)?;
  sections::write_change_history(&mut out, record, ctx)?;

  Ok(out)
}

/// Path of an issue page under `dir`.
///
/// # Errors
///
/// Returns an error if the issue has no project key.
pub fn issue_path(record: &IssueRecord, dir: &Path) -> Result<PathBuf, WriteError> {
  let project = record.issue.project_key();
  if project.is_empty() {
    return Err(WriteError::MissingProject(record.issue.key.clone()));
  }
  Ok(dir.join(project).join(format!("{}.md", record.issue.key)))
}

/// Render an issue and write it to `dir/PROJECT/KEY.md`.
///
/// # Errors
///
/// Returns an error if the issue has no project key, or the page cannot be
/// rendered or written.
pub fn write_issue(
  record: &IssueRecord,
  ctx: &WriterContext<'_>,
  dir: &Path,
) -> Result<PathBuf, WriteError> {
  let path = issue_path(record, dir)?;
  let content = render_issue(record, ctx)?;
  write_file(&path, &content)?;
  debug!("Wrote {}", path.display());
  Ok(path)
}

/// Render the `_index.md` page of a project.
///
/// # Errors
///
/// Returns an error if the front matter cannot be serialized.
pub fn render_project_index(project: &Project) -> Result<String, WriteError> {
  let mut out = String::new();
  front_matter::write_project_front_matter(
    &mut out,
    &project.key,
    &project.name,
    PROJECT_ICON,
  )?;
  writeln!(out, "# {}\n", project.name)?;
  if let Some(description) =
    project.description.as_deref().filter(|d| !d.is_empty())
  {
    writeln!(out, "{description}\n")?;
  }
  Ok(out)
}

/// Write `dir/PROJECT/_index.md` for `project`.
///
/// # Errors
///
/// Returns an error if the project has no key, or the page cannot be written.
pub fn write_project_index(
  dir: &Path,
  project: &Project,
) -> Result<PathBuf, WriteError> {
  if project.key.is_empty() {
    return Err(WriteError::MissingProject(project.name.clone()));
  }
  let path = dir.join(&project.key).join(PROJECT_INDEX);
  write_file(&path, &render_project_index(project)?)?;
  debug!("Wrote project index {}", path.display());
  Ok(path)
}

fn write_file(path: &Path, content: &str) -> Result<(), WriteError> {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).map_err(|source| {
      WriteError::CreateDir {
        path: parent.to_path_buf(),
        source,
      }
    })?;
  }
  fs::write(path, content).map_err(|source| {
    WriteError::Write {
      path: path.to_path_buf(),
      source,
    }
  })
}
