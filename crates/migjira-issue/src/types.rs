//! Issue payloads as the tracker's REST API returns them.
//!
//! Only the fields the document writer reads are modelled. Anything else at
//! the top level of an issue, or inside `fields`, is kept in a flattened map so
//! a record survives a load/save cycle unchanged.
use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::custom_field::CustomFieldValue;

/// Prefix of every custom field key inside `fields`.
pub const CUSTOM_FIELD_PREFIX: &str = "customfield_";

/// Account type the tracker reports for deleted users.
pub const DELETED_ACCOUNT_TYPE: &str = "unknown";

/// Treat an explicit `null` like a missing value.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Issue {
  #[serde(deserialize_with = "nullable")]
  pub id: String,

  #[serde(deserialize_with = "nullable")]
  pub key: String,

  pub fields: IssueFields,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub changelog: Option<Changelog>,

  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl Issue {
  #[must_use]
  pub fn project_key(&self) -> &str {
    &self.fields.project.key
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueFields {
  #[serde(deserialize_with = "nullable")]
  pub summary: String,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,

  #[serde(rename = "issuetype", deserialize_with = "nullable")]
  pub issue_type: Named,

  #[serde(deserialize_with = "nullable")]
  pub project: Project,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub status: Option<Named>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub priority: Option<Named>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub resolution: Option<Named>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub assignee: Option<User>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub reporter: Option<User>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub created: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub updated: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub duedate: Option<String>,

  #[serde(deserialize_with = "nullable")]
  pub labels: Vec<String>,

  #[serde(rename = "fixVersions", deserialize_with = "nullable")]
  pub fix_versions: Vec<Named>,

  #[serde(rename = "versions", deserialize_with = "nullable")]
  pub affects_versions: Vec<Named>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub parent: Option<IssueRef>,

  #[serde(rename = "timetracking", skip_serializing_if = "Option::is_none")]
  pub time_tracking: Option<TimeTracking>,

  #[serde(
    rename = "aggregatetimeoriginalestimate",
    skip_serializing_if = "Option::is_none"
  )]
  pub aggregate_original_estimate: Option<u64>,

  #[serde(rename = "aggregatetimeestimate", skip_serializing_if = "Option::is_none")]
  pub aggregate_remaining_estimate: Option<u64>,

  #[serde(rename = "aggregatetimespent", skip_serializing_if = "Option::is_none")]
  pub aggregate_time_spent: Option<u64>,

  #[serde(rename = "comment", skip_serializing_if = "Option::is_none")]
  pub comments: Option<Comments>,

  #[serde(rename = "attachment", deserialize_with = "nullable")]
  pub attachments: Vec<Attachment>,

  #[serde(rename = "issuelinks", deserialize_with = "nullable")]
  pub issue_links: Vec<IssueLink>,

  #[serde(deserialize_with = "nullable")]
  pub subtasks: Vec<IssueRef>,

  /// Every other key, custom fields included, decoded once.
  #[serde(flatten)]
  pub other: BTreeMap<String, CustomFieldValue>,
}

impl IssueFields {
  /// Custom fields, sorted by id.
  pub fn custom_fields(&self) -> impl Iterator<Item = (&str, &CustomFieldValue)> {
    self
      .other
      .iter()
      .filter(|(key, _)| key.starts_with(CUSTOM_FIELD_PREFIX))
      .map(|(key, value)| (key.as_str(), value))
  }

  #[must_use]
  pub fn custom_field(&self, id: &str) -> Option<&CustomFieldValue> {
    id.starts_with(CUSTOM_FIELD_PREFIX)
      .then(|| self.other.get(id))
      .flatten()
  }

  /// Comments in the order the tracker returned them (oldest first).
  #[must_use]
  pub fn comment_list(&self) -> &[Comment] {
    self
      .comments
      .as_ref()
      .map_or(&[], |comments| comments.comments.as_slice())
  }

  #[must_use]
  pub fn status_name(&self) -> &str {
    self.status.as_ref().map_or("", |status| status.name.as_str())
  }
}

/// Anything identified to readers by its name: issue types, statuses,
/// priorities, resolutions and versions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Named {
  #[serde(deserialize_with = "nullable")]
  pub name: String,
}

impl Named {
  #[must_use]
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into() }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
  #[serde(deserialize_with = "nullable")]
  pub key: String,

  #[serde(deserialize_with = "nullable")]
  pub name: String,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
  #[serde(deserialize_with = "nullable")]
  pub account_id: String,

  #[serde(deserialize_with = "nullable")]
  pub display_name: String,

  #[serde(deserialize_with = "nullable")]
  pub account_type: String,
}

impl User {
  #[must_use]
  pub fn is_deleted(&self) -> bool {
    self.account_type == DELETED_ACCOUNT_TYPE
  }
}

/// A reference to another issue, as embedded in `parent`, `subtasks` and
/// issue links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueRef {
  #[serde(deserialize_with = "nullable")]
  pub key: String,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub fields: Option<IssueRefFields>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueRefFields {
  #[serde(deserialize_with = "nullable")]
  pub summary: String,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub status: Option<Named>,

  #[serde(rename = "issuetype", skip_serializing_if = "Option::is_none")]
  pub issue_type: Option<Named>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimeTracking {
  pub original_estimate_seconds:  u64,
  pub remaining_estimate_seconds: u64,
  pub time_spent_seconds:         u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Comments {
  #[serde(deserialize_with = "nullable")]
  pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Comment {
  #[serde(deserialize_with = "nullable")]
  pub id: String,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub author: Option<User>,

  #[serde(deserialize_with = "nullable")]
  pub body: String,

  #[serde(deserialize_with = "nullable")]
  pub created: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Attachment {
  #[serde(deserialize_with = "nullable")]
  pub id: String,

  #[serde(deserialize_with = "nullable")]
  pub filename: String,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub mime_type: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub size: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IssueLink {
  #[serde(rename = "type", deserialize_with = "nullable")]
  pub link_type: LinkType,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub inward_issue: Option<IssueRef>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub outward_issue: Option<IssueRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkType {
  #[serde(deserialize_with = "nullable")]
  pub name: String,

  #[serde(deserialize_with = "nullable")]
  pub inward: String,

  #[serde(deserialize_with = "nullable")]
  pub outward: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Changelog {
  #[serde(deserialize_with = "nullable")]
  pub histories: Vec<History>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct History {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub author: Option<User>,

  #[serde(deserialize_with = "nullable")]
  pub created: String,

  #[serde(deserialize_with = "nullable")]
  pub items: Vec<ChangeItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChangeItem {
  #[serde(deserialize_with = "nullable")]
  pub field: String,

  #[serde(deserialize_with = "nullable")]
  pub from_string: String,

  #[serde(deserialize_with = "nullable")]
  pub to_string: String,
}

/// Field metadata: id to human name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMeta {
  #[serde(deserialize_with = "nullable")]
  pub id: String,

  #[serde(deserialize_with = "nullable")]
  pub name: String,
}

/// A link from an issue to a page in another application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteLink {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub application: Option<RemoteApplication>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub object: Option<RemoteObject>,
}

impl RemoteLink {
  #[must_use]
  pub fn is_confluence(&self) -> bool {
    self
      .application
      .as_ref()
      .is_some_and(|app| {
        let app_type = app.app_type.to_ascii_lowercase();
        app_type == "confluence" || app_type.ends_with(".confluence")
      })
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteApplication {
  #[serde(rename = "type", deserialize_with = "nullable")]
  pub app_type: String,

  #[serde(deserialize_with = "nullable")]
  pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteObject {
  #[serde(deserialize_with = "nullable")]
  pub url: String,

  #[serde(deserialize_with = "nullable")]
  pub title: String,
}

/// Pull-request and branch details fetched alongside an issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevStatusDetail {
  #[serde(deserialize_with = "nullable")]
  pub detail: Vec<DevStatusItem>,
}

impl DevStatusDetail {
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.detail.is_empty()
  }

  /// The first pull request across all repositories, if any.
  #[must_use]
  pub fn first_pull_request(&self) -> Option<&DevPullRequest> {
    self
      .detail
      .iter()
      .find_map(|item| item.pull_requests.first())
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DevStatusItem {
  #[serde(deserialize_with = "nullable")]
  pub branches: Vec<DevBranch>,

  #[serde(deserialize_with = "nullable")]
  pub pull_requests: Vec<DevPullRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DevBranch {
  #[serde(deserialize_with = "nullable")]
  pub name: String,

  #[serde(deserialize_with = "nullable")]
  pub url: String,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub last_commit: Option<DevCommit>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DevCommit {
  #[serde(deserialize_with = "nullable")]
  pub display_id: String,

  #[serde(deserialize_with = "nullable")]
  pub timestamp: String,

  #[serde(deserialize_with = "nullable")]
  pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevPullRequest {
  #[serde(deserialize_with = "nullable")]
  pub id: String,

  #[serde(deserialize_with = "nullable")]
  pub name: String,

  #[serde(deserialize_with = "nullable")]
  pub author: DevAuthor,

  #[serde(deserialize_with = "nullable")]
  pub status: String,

  #[serde(deserialize_with = "nullable")]
  pub source: DevSource,

  #[serde(deserialize_with = "nullable")]
  pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevAuthor {
  #[serde(deserialize_with = "nullable")]
  pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevSource {
  #[serde(deserialize_with = "nullable")]
  pub branch: String,

  #[serde(deserialize_with = "nullable")]
  pub url: String,
}

/// Parent issue summary stored next to an issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ParentIssueInfo {
  pub key:        String,
  #[serde(rename = "Type")]
  pub issue_type: String,
}

/// Child issue summary stored next to an issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ChildIssueInfo {
  pub key:        String,
  pub summary:    String,
  pub status:     String,
  #[serde(rename = "Type")]
  pub issue_type: String,
  pub rank:       String,
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]
  use serde_json::json;

  use super::*;

  #[test]
  fn nulls_decode_as_defaults() {
    let fields: IssueFields = serde_json::from_value(json!({
      "summary": null,
      "labels": null,
      "fixVersions": null,
      "attachment": null,
      "priority": null,
      "issuetype": { "name": "Bug" }
    }))
    .unwrap();
    assert_eq!(fields.summary, "");
    assert!(fields.labels.is_empty());
    assert!(fields.fix_versions.is_empty());
    assert!(fields.priority.is_none());
    assert_eq!(fields.issue_type.name, "Bug");
  }

  #[test]
  fn custom_fields_are_separated_from_other_keys() {
    let fields: IssueFields = serde_json::from_value(json!({
      "customfield_10020": "b",
      "customfield_10010": "a",
      "watches": { "watchCount": 1 }
    }))
    .unwrap();
    let ids: Vec<&str> = fields.custom_fields().map(|(id, _)| id).collect();
    assert_eq!(ids, ["customfield_10010", "customfield_10020"]);
    assert!(fields.custom_field("watches").is_none());
    assert!(fields.custom_field("customfield_10010").is_some());
  }

  #[test]
  fn unknown_keys_survive_a_round_trip() {
    let raw = json!({
      "id": "10001",
      "key": "PROJ-1",
      "self": "https://tracker.example.com/rest/api/2/issue/10001",
      "fields": {
        "summary": "s",
        "project": { "key": "PROJ", "name": "Project" },
        "watches": { "watchCount": 1 },
        "customfield_1": 3
      }
    });
    let issue: Issue = serde_json::from_value(raw.clone()).unwrap();
    let back = serde_json::to_value(&issue).unwrap();
    assert_eq!(back["self"], raw["self"]);
    assert_eq!(back["fields"]["watches"], raw["fields"]["watches"]);
    assert_eq!(back["fields"]["customfield_1"], json!(3));
  }

  #[test]
  fn parent_and_child_info_use_stored_key_names() {
    let parent: ParentIssueInfo =
      serde_json::from_value(json!({ "Key": "PROJ-1", "Type": "Epic" })).unwrap();
    assert_eq!(parent.issue_type, "Epic");
    let child = ChildIssueInfo {
      key: "PROJ-2".to_owned(),
      rank: "0|i0001".to_owned(),
      ..ChildIssueInfo::default()
    };
    let value = serde_json::to_value(&child).unwrap();
    assert_eq!(value["Key"], "PROJ-2");
    assert_eq!(value["Rank"], "0|i0001");
  }

  #[test]
  fn first_pull_request_spans_repositories() {
    let dev: DevStatusDetail = serde_json::from_value(json!({
      "detail": [
        { "branches": [], "pullRequests": [] },
        { "pullRequests": [{ "name": "Fix it", "source": { "branch": "fix/it" } }] }
      ]
    }))
    .unwrap();
    let pr = dev.first_pull_request().unwrap();
    assert_eq!(pr.name, "Fix it");
    assert_eq!(pr.source.branch, "fix/it");
  }

  #[test]
  fn confluence_links_by_application_type() {
    let link = |app_type: &str| -> RemoteLink {
      serde_json::from_value(json!({
        "application": { "type": app_type },
        "object": { "url": "https://wiki.example.com", "title": "Page" }
      }))
      .unwrap()
    };
    assert!(link("confluence").is_confluence());
    assert!(link("com.atlassian.Confluence").is_confluence());
    assert!(!link("web").is_confluence());
    assert!(!RemoteLink::default().is_confluence());
  }
}
