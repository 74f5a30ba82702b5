#![allow(
  clippy::expect_used,
  clippy::unwrap_used,
  clippy::panic,
  reason = "Fine in tests"
)]
use std::fs;

use migjira::{
  error::WriteError,
  writer::{
    WriterContext,
    render_issue,
    render_project_index,
    write_issue,
    write_project_index,
  },
};
use migjira_config::Config;
use migjira_issue::{IssueRecord, mapping::build_user_mapping};
use serde_json::json;
use tempfile::TempDir;

fn full_record() -> IssueRecord {
  serde_json::from_value(json!({
    "issue": {
      "id": "10001",
      "key": "PROJ-7",
      "fields": {
        "summary": "Login \"fails\" on Safari",
        "description": "h2. Overview\nThe *login* fails.\n!screen shot.png!\n[~accountid:u1] please check",
        "issuetype": { "name": "Bug" },
        "project": { "key": "PROJ", "name": "Portal" },
        "status": { "name": "In Progress" },
        "priority": null,
        "resolution": { "name": "Fixed" },
        "assignee": { "accountId": "u1", "displayName": "Taro", "accountType": "atlassian" },
        "reporter": { "accountId": "u9", "displayName": "Former user", "accountType": "unknown" },
        "created": "2026-01-22T00:43:07.025+0900",
        "updated": "2026-01-23T09:00:00.000+0900",
        "duedate": "2026-02-01",
        "labels": ["web", "auth"],
        "fixVersions": [{ "name": "1.2" }],
        "versions": [{ "name": "1.1" }],
        "parent": { "key": "PROJ-1" },
        "timetracking": { "originalEstimateSeconds": 7200, "timeSpentSeconds": 5400 },
        "aggregatetimespent": 9000,
        "comment": { "comments": [
          { "id": "1", "author": { "accountId": "u1", "displayName": "Taro" },
            "body": "Looks like a *cookie* issue", "created": "2026-01-22T10:15:00.000+0900" },
          { "id": "2", "author": { "accountId": "u2", "displayName": "Hanako" },
            "body": "[~accountid:u1] confirmed", "created": "2026-01-22T11:00:00.000+0900" }
        ] },
        "attachment": [{ "id": "a1", "filename": "screen shot.png" }],
        "issuelinks": [{
          "type": { "name": "Blocks", "inward": "is blocked by", "outward": "blocks" },
          "outwardIssue": { "key": "PROJ-9", "fields": { "summary": "Release", "status": { "name": "To Do" } } }
        }],
        "subtasks": [{ "key": "PROJ-8", "fields": { "summary": "Add test", "status": { "name": "Done" } } }],
        "customfield_10015": "2026-01-20",
        "customfield_10019": "0|i0001",
        "customfield_10050": "internal",
        "customfield_10060": 3.5,
        "customfield_10070": null
      },
      "changelog": { "histories": [{
        "author": { "accountId": "u1", "displayName": "Taro" },
        "created": "2026-01-22T12:00:00.000+0900",
        "items": [{ "field": "status", "fromString": "To Do", "toString": "In Progress" }]
      }] }
    },
    "parentInfo": { "Key": "PROJ-1", "Type": "Epic" },
    "childIssues": [{ "Key": "PROJ-20", "Summary": "Child", "Status": "Open", "Type": "Task", "Rank": "" }],
    "fields": [
      { "id": "customfield_10015", "name": "Start date" },
      { "id": "customfield_10060", "name": "Story points" }
    ],
    "remoteLinks": [
      { "application": { "type": "com.atlassian.confluence", "name": "Confluence" },
        "object": { "url": "https://wiki.example.com/page", "title": "Design" } },
      { "application": { "type": "web", "name": "Web" },
        "object": { "url": "https://example.com", "title": "Elsewhere" } }
    ],
    "devStatus": { "detail": [{
      "branches": [{ "name": "fix/login", "url": "https://git.example.com/b",
        "lastCommit": { "displayId": "abc123", "timestamp": "2026-01-22T01:00:00Z", "url": "https://git.example.com/c" } }],
      "pullRequests": [{ "id": "1", "name": "Fix login", "author": { "name": "Taro" },
        "status": "OPEN", "source": { "branch": "fix/login", "url": "" }, "url": "https://git.example.com/pr/1" }]
    }] }
  }))
  .unwrap()
}

/// Configuration with `screen shot.png` already downloaded into a temporary
/// attachments directory.
fn config() -> (TempDir, Config) {
  let attachments = TempDir::new().unwrap();
  fs::write(attachments.path().join("PROJ-7_screen shot.png"), b"png").unwrap();

  let mut config = Config::default();
  config.output.attachments_dir = attachments.path().to_path_buf();
  config
    .deleted_users
    .insert("u9".to_string(), "Jiro (left)".to_string());
  config.display.hidden_custom_fields = vec!["customfield_10050".to_string()];
  (attachments, config)
}

fn render(record: &IssueRecord, config: &Config) -> String {
  let users = build_user_mapping([&record.issue]);
  let ctx = WriterContext::new(record, config, &users);
  render_issue(record, &ctx).unwrap()
}

/// Raw text between the `+++` delimiters of a rendered page.
fn front_matter_text(page: &str) -> &str {
  page
    .strip_prefix("+++\n")
    .and_then(|rest| rest.split_once("+++\n"))
    .map(|(front, _)| front)
    .unwrap()
}

/// Parsed front matter of a rendered page.
fn front_matter(page: &str) -> toml::Table {
  toml::from_str(front_matter_text(page)).unwrap()
}

/// Front matter keys in the order they were written.
fn front_matter_keys(page: &str) -> Vec<&str> {
  front_matter_text(page)
    .lines()
    .filter_map(|line| line.split_once(" = ").map(|(key, _)| key))
    .collect()
}

#[test]
fn front_matter_carries_page_metadata() {
  let (_attachments, config) = config();
  let page = render(&full_record(), &config);
  let table = front_matter(&page);

  assert_eq!(front_matter_keys(&page), [
    "title",
    "date",
    "lastmod",
    "project",
    "issue_key",
    "type",
    "issue_type",
    "parent",
    "parent_issue_type",
    "rank",
    "tags",
    "status",
    "assignee",
    "startdate",
    "duedate",
    "fix_versions",
    "affected_versions",
  ]);

  let text = |key: &str| table[key].as_str().unwrap().to_owned();
  assert_eq!(text("title"), "Login \"fails\" on Safari");
  assert_eq!(
    table["date"].as_datetime().unwrap().to_string(),
    "2026-01-22T00:43:07+09:00"
  );
  assert_eq!(
    table["lastmod"].as_datetime().unwrap().to_string(),
    "2026-01-23T09:00:00+09:00"
  );
  assert_eq!(text("project"), "PROJ");
  assert_eq!(text("issue_key"), "PROJ-7");
  assert_eq!(text("type"), "page");
  assert_eq!(text("issue_type"), "Bug");
  assert_eq!(text("parent"), "PROJ-1");
  assert_eq!(text("parent_issue_type"), "Epic");
  assert_eq!(text("rank"), "0|i0001");
  assert_eq!(text("status"), "In Progress");
  assert_eq!(text("assignee"), "Taro");
  assert_eq!(text("startdate"), "2026-01-20");
  assert_eq!(text("duedate"), "2026-02-01");

  let strings = |key: &str| -> Vec<String> {
    table[key]
      .as_array()
      .unwrap()
      .iter()
      .map(|v| v.as_str().unwrap().to_owned())
      .collect()
  };
  assert_eq!(strings("tags"), ["web", "auth"]);
  assert_eq!(strings("fix_versions"), ["1.2"]);
  assert_eq!(strings("affected_versions"), ["1.1"]);
}

#[test]
fn front_matter_survives_control_characters() {
  let mut record = full_record();
  let summary = "Build \u{1b}[31m fails\u{7f} on\tCI\r\nagain \\ 'quoted'";
  record.issue.fields.summary = summary.to_string();
  record.issue.fields.labels = vec!["bell\u{7}".to_string(), "nul\u{0}".to_string()];
  let (_attachments, config) = config();
  let page = render(&record, &config);
  let table = front_matter(&page);

  assert_eq!(table["title"].as_str(), Some(summary));
  let tags: Vec<&str> = table["tags"]
    .as_array()
    .unwrap()
    .iter()
    .map(|v| v.as_str().unwrap())
    .collect();
  assert_eq!(tags, ["bell\u{7}", "nul\u{0}"]);
}

#[test]
fn breadcrumb_and_details_panel() {
  let (_attachments, config) = config();
  let page = render(&full_record(), &config);

  assert!(page.contains(
    "[📦 Portal](../) / [🟣 PROJ-1](../PROJ-1/) / [🐞 PROJ-7](../PROJ-7/)\n\n# Login \"fails\" on Safari\n"
  ));

  let start = page.find("<!-- PAGE_RIGHT_START -->").unwrap();
  let end = page.find("<!-- PAGE_RIGHT_END -->").unwrap();
  let panel = &page[start..end];

  for line in [
    "- **Key**: PROJ-7",
    "- **Priority**: Not set",
    "- **Assignee**: Taro",
    "- **Reporter**: Jiro (left)",
    "- **Created**: 2026-01-22 00:43:07",
    "- **Start date**: 2026-01-20",
    "- **Due date**: 2026-02-01",
    "- **Labels**: web, auth",
    "- **Parent**: [PROJ-1](../PROJ-1/)",
    "- **Original estimate**: 2.00h",
    "- **Time spent**: 1.50h",
    "- **Σ Time spent**: 2.50h",
    "- **Resolution**: Fixed",
    "- **Story points**: 3.50",
    "- **Custom field 10019**: 0|i0001",
    "- [`fix/login`](https://git.example.com/b)",
    "  - Last commit: [`abc123`](https://git.example.com/c) (2026-01-22 01:00:00)",
    "- [Fix login](https://git.example.com/pr/1)",
    "  - Branch: `fix/login`",
  ] {
    assert!(panel.contains(line), "missing {line:?} in:\n{panel}");
  }

  assert!(!panel.contains("Remaining estimate"));
  assert!(!panel.contains("internal"), "hidden field shown");
  assert!(!panel.contains("10070"), "empty field shown");
  assert_eq!(panel.matches("Start date").count(), 1);
}

#[test]
fn body_sections_in_order() {
  let (_attachments, config) = config();
  let page = render(&full_record(), &config);

  let headings: Vec<&str> = page
    .lines()
    .filter(|line| line.starts_with("## ") && !line.contains("Overview"))
    .collect();
  assert_eq!(
    headings,
    [
      "## Details",
      "## Development",
      "## Description",
      "## Child issues",
      "## Confluence pages",
      "## Comments",
      "## Sub-tasks",
      "## Linked issues",
      "## Attachments",
      "## Change history",
    ]
  );
}

#[test]
fn bodies_go_through_the_markup_converter() {
  let (_attachments, config) = config();
  let page = render(&full_record(), &config);

  assert!(page.contains("The **login** fails."));
  assert!(page.contains("![screen shot.png](/attachments/PROJ-7_screen%20shot.png)"));
  assert!(page.contains("<span class=\"mention\">@Taro</span> please check"));
  assert!(page.contains("Looks like a **cookie** issue"));
}

#[test]
fn comments_links_and_history() {
  let (_attachments, config) = config();
  let page = render(&full_record(), &config);

  assert!(page.contains("Taro 2026-01-22 10:15\n\n---\n\n"));
  assert!(page.contains("↩️ Hanako 2026-01-22 11:00\n\n---\n\n"));
  assert!(page.contains("- ☑️ **[PROJ-20](../PROJ-20/)**: Child [Open]"));
  assert!(page.contains("- [Design](https://wiki.example.com/page)"));
  assert!(!page.contains("Elsewhere"));
  assert!(page.contains("- **[PROJ-8](../PROJ-8/)**: Add test [Done]"));
  assert!(page.contains("- **blocks**: [PROJ-9](../PROJ-9/) - Release [To Do]"));
  assert!(page.contains(
    "- [PROJ-7_screen shot.png](../../attachments/PROJ-7_screen%20shot.png)"
  ));
  assert!(page.contains(
    "### Change 1\n\n- **Author**: Taro\n- **Date**: 2026-01-22 12:00:00\n\n- **status**: `To Do` → `In Progress`\n"
  ));
}

#[test]
fn attachments_missing_on_disk_are_not_linked() {
  let record = full_record();
  let (attachments, config) = config();
  fs::remove_file(attachments.path().join("PROJ-7_screen shot.png")).unwrap();
  let page = render(&record, &config);

  assert!(page.contains("!screen shot.png!"));
  assert!(!page.contains("/attachments/PROJ-7_screen%20shot.png"));
  assert!(!page.contains("## Attachments"));
}

#[test]
fn minimal_issue_skips_optional_sections() {
  let record: IssueRecord = serde_json::from_value(json!({
    "issue": {
      "key": "OPS-1",
      "fields": {
        "summary": "Bare",
        "issuetype": { "name": "Task" },
        "project": { "key": "OPS", "name": "Ops" }
      }
    }
  }))
  .unwrap();
  let config = Config::default();
  let page = render(&record, &config);

  let table = front_matter(&page);
  assert!(!table.contains_key("date"));
  assert!(!table.contains_key("parent"));
  assert!(!table.contains_key("tags"));
  assert_eq!(table["assignee"].as_str(), Some("Not set"));
  assert!(page.contains("[📦 Ops](../) / [☑️ OPS-1](../OPS-1/)\n"));
  for heading in ["## Description", "## Comments", "## Attachments", "## Development"] {
    assert!(!page.contains(heading), "unexpected {heading}");
  }
}

#[test]
fn writes_pages_under_the_project_directory() {
  let dir = TempDir::new().unwrap();
  let record = full_record();
  let (_attachments, config) = config();
  let users = build_user_mapping([&record.issue]);
  let ctx = WriterContext::new(&record, &config, &users);

  let path = write_issue(&record, &ctx, dir.path()).unwrap();
  assert_eq!(path, dir.path().join("PROJ").join("PROJ-7.md"));
  assert!(fs::read_to_string(&path).unwrap().starts_with("+++\ntitle = "));

  let mut orphan = record.clone();
  orphan.issue.fields.project.key.clear();
  assert!(matches!(
    write_issue(&orphan, &ctx, dir.path()),
    Err(WriteError::MissingProject(key)) if key == "PROJ-7"
  ));
}

#[test]
fn project_index_page() {
  let dir = TempDir::new().unwrap();
  let project = full_record().issue.fields.project;
  let path = write_project_index(dir.path(), &project).unwrap();
  assert_eq!(path, dir.path().join("PROJ").join("_index.md"));

  let page = render_project_index(&project).unwrap();
  assert!(page.ends_with("+++\n\n# Portal\n\n"));
  let table = front_matter(&page);
  assert_eq!(front_matter_keys(&page), [
    "title",
    "project_key",
    "project_name",
    "type"
  ]);
  assert_eq!(table["title"].as_str(), Some("📦Portal"));
  assert_eq!(table["project_key"].as_str(), Some("PROJ"));
  assert_eq!(table["project_name"].as_str(), Some("Portal"));
  assert_eq!(table["type"].as_str(), Some("project"));
}
