use migjira_issue::IssueRecord;
use serde::Serialize;
use toml::value::Datetime;

use super::{
  WriterContext,
  format::{date, rfc3339, user_name},
};
use crate::error::WriteError;

/// Delimiter of TOML front matter.
const FENCE: &str = "+++";

/// Hugo front matter of an issue page. Field order is the key order of the
/// rendered table.
#[derive(Debug, Serialize)]
struct FrontMatter<'a> {
  title:             &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  date:              Option<Datetime>,
  #[serde(skip_serializing_if = "Option::is_none")]
  lastmod:           Option<Datetime>,
  project:           &'a str,
  issue_key:         &'a str,
  #[serde(rename = "type")]
  page_type:         &'static str,
  issue_type:        &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  parent:            Option<&'a str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  parent_issue_type: Option<&'a str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  rank:              Option<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  tags:              Vec<&'a str>,
  status:            &'a str,
  assignee:          String,
  #[serde(skip_serializing_if = "Option::is_none")]
  startdate:         Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  duedate:           Option<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  fix_versions:      Vec<&'a str>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  affected_versions: Vec<&'a str>,
}

/// Front matter of a project's `_index.md`.
#[derive(Debug, Serialize)]
struct ProjectFrontMatter<'a> {
  title:        String,
  project_key:  &'a str,
  project_name: &'a str,
  #[serde(rename = "type")]
  page_type:    &'static str,
}

/// Write the `+++`-delimited TOML front matter of an issue page.
pub fn write_front_matter(
  out: &mut String,
  record: &IssueRecord,
  ctx: &WriterContext<'_>,
) -> Result<(), WriteError> {
  let issue = &record.issue;
  let fields = &issue.fields;
  let display = &ctx.config.display;
  let parent = record.parent_info.as_ref().filter(|p| !p.key.is_empty());

  let front_matter = FrontMatter {
    title:             &fields.summary,
    date:              fields.created.as_deref().and_then(rfc3339),
    lastmod:           fields.updated.as_deref().and_then(rfc3339),
    project:           issue.project_key(),
    issue_key:         &issue.key,
    page_type:         "page",
    issue_type:        &fields.issue_type.name,
    parent:            parent.map(|p| p.key.as_str()),
    parent_issue_type: parent.map(|p| p.issue_type.as_str()),
    rank:              displayed_custom_field(record, &display.rank_field_id),
    tags:              fields.labels.iter().map(String::as_str).collect(),
    status:            fields.status_name(),
    assignee:          user_name(fields.assignee.as_ref(), ctx.config),
    startdate:         displayed_custom_field(
      record,
      &display.start_date_field_id,
    ),
    duedate:           date(fields.duedate.as_deref()),
    fix_versions:      fields
      .fix_versions
      .iter()
      .map(|v| v.name.as_str())
      .collect(),
    affected_versions: fields
      .affects_versions
      .iter()
      .map(|v| v.name.as_str())
      .collect(),
  };

  write_fenced(out, &front_matter)
}

/// Write the front matter of a project index page.
pub fn write_project_front_matter(
  out: &mut String,
  key: &str,
  name: &str,
  icon: &str,
) -> Result<(), WriteError> {
  write_fenced(out, &ProjectFrontMatter {
    title:        format!("{icon}{name}"),
    project_key:  key,
    project_name: name,
    page_type:    "project",
  })
}

fn write_fenced<T: Serialize>(
  out: &mut String,
  front_matter: &T,
) -> Result<(), WriteError> {
  let table = toml::to_string(front_matter)?;
  out.push_str(FENCE);
  out.push('\n');
  out.push_str(&table);
  out.push_str(FENCE);
  out.push_str("\n\n");
  Ok(())
}

/// Display value of a custom field, if it is set and renders to something.
pub(super) fn displayed_custom_field(
  record: &IssueRecord,
  field_id: &str,
) -> Option<String> {
  record
    .issue
    .fields
    .custom_field(field_id)
    .filter(|value| !value.is_empty())
    .map(|value| value.display())
    .filter(|value| !value.is_empty())
}
