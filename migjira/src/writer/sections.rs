//! Body sections of an issue page, in page order.
use std::fmt::{self, Write};

use migjira_issue::{IssueRecord, NOT_SET, types::IssueRef};
use migjira_markup::links::escape_path_segment;

use super::{
  WriterContext,
  format::{
    PROJECT_ICON,
    date,
    datetime,
    datetime_or_raw,
    hours,
    issue_type_icon,
    short_datetime,
    user_name,
  },
  front_matter::displayed_custom_field,
};

/// Relative link from an issue page to the attachment directory.
const ATTACHMENT_LINK_PREFIX: &str = "../../attachments/";

/// Comments opening with a mention are replies.
const REPLY_MARKER: &str = "[~accountid:";

/// Breadcrumb trail and page heading.
pub fn write_title(out: &mut String, record: &IssueRecord) -> fmt::Result {
  let issue = &record.issue;
  let fields = &issue.fields;

  write!(out, "[{PROJECT_ICON} {}](../) / ", fields.project.name)?;
  if let Some(parent) = record.parent_info.as_ref().filter(|p| !p.key.is_empty())
  {
    write!(
      out,
      "[{} {key}](../{key}/) / ",
      issue_type_icon(&parent.issue_type),
      key = parent.key
    )?;
  }
  writeln!(
    out,
    "[{} {key}](../{key}/)\n",
    issue_type_icon(&fields.issue_type.name),
    key = issue.key
  )?;
  writeln!(out, "# {}\n", fields.summary)
}

/// The "Details" list.
pub fn write_details(
  out: &mut String,
  record: &IssueRecord,
  ctx: &WriterContext<'_>,
) -> fmt::Result {
  let issue = &record.issue;
  let fields = &issue.fields;
  let config = ctx.config;

  writeln!(out, "## Details\n")?;
  writeln!(out, "- **Key**: {}", issue.key)?;
  writeln!(out, "- **Type**: {}", fields.issue_type.name)?;
  writeln!(out, "- **Status**: {}", fields.status_name())?;
  writeln!(
    out,
    "- **Priority**: {}",
    fields.priority.as_ref().map_or(NOT_SET, |p| p.name.as_str())
  )?;
  writeln!(
    out,
    "- **Assignee**: {}",
    user_name(fields.assignee.as_ref(), config)
  )?;
  writeln!(
    out,
    "- **Reporter**: {}",
    user_name(fields.reporter.as_ref(), config)
  )?;
  writeln!(out, "- **Created**: {}", datetime(fields.created.as_deref()))?;
  writeln!(out, "- **Updated**: {}", datetime(fields.updated.as_deref()))?;

  let start_field = &config.display.start_date_field_id;
  if let Some(start) = displayed_custom_field(record, start_field) {
    writeln!(
      out,
      "- **{}**: {start}",
      ctx.field_names.field_name(start_field)
    )?;
  }

  if let Some(due) = date(fields.duedate.as_deref()) {
    writeln!(out, "- **Due date**: {due}")?;
  }
  if !fields.labels.is_empty() {
    writeln!(out, "- **Labels**: {}", fields.labels.join(", "))?;
  }
  if !fields.fix_versions.is_empty() {
    let names: Vec<&str> =
      fields.fix_versions.iter().map(|v| v.name.as_str()).collect();
    writeln!(out, "- **Fix versions**: {}", names.join(", "))?;
  }
  if !fields.affects_versions.is_empty() {
    let names: Vec<&str> = fields
      .affects_versions
      .iter()
      .map(|v| v.name.as_str())
      .collect();
    writeln!(out, "- **Affects versions**: {}", names.join(", "))?;
  }
  if let Some(parent) = fields.parent.as_ref().filter(|p| !p.key.is_empty()) {
    writeln!(out, "- **Parent**: [{key}](../{key}/)", key = parent.key)?;
  }

  if let Some(tracking) = &fields.time_tracking {
    let estimates = [
      ("Original estimate", tracking.original_estimate_seconds),
      ("Remaining estimate", tracking.remaining_estimate_seconds),
      ("Time spent", tracking.time_spent_seconds),
    ];
    for (label, seconds) in estimates {
      if seconds > 0 {
        writeln!(out, "- **{label}**: {}", hours(seconds))?;
      }
    }
  }
  let aggregates = [
    ("Σ Original estimate", fields.aggregate_original_estimate),
    ("Σ Remaining estimate", fields.aggregate_remaining_estimate),
    ("Σ Time spent", fields.aggregate_time_spent),
  ];
  for (label, seconds) in aggregates {
    if let Some(seconds) = seconds.filter(|s| *s > 0) {
      writeln!(out, "- **{label}**: {}", hours(seconds))?;
    }
  }

  if let Some(resolution) = &fields.resolution {
    writeln!(out, "- **Resolution**: {}", resolution.name)?;
  }

  for (field_id, value) in fields.custom_fields() {
    if field_id == start_field
      || config.display.is_hidden(field_id)
      || value.is_empty()
    {
      continue;
    }
    let shown = value.display_with_dev_status(record.dev_status.as_ref());
    if shown.is_empty() {
      continue;
    }
    writeln!(
      out,
      "- **{}**: {shown}",
      ctx.field_names.field_name(field_id)
    )?;
  }

  writeln!(out)
}

/// Branches and pull requests from the development panel.
pub fn write_development(
  out: &mut String,
  record: &IssueRecord,
) -> fmt::Result {
  let Some(dev_status) = record.dev_status.as_ref().filter(|d| !d.is_empty())
  else {
    return Ok(());
  };

  writeln!(out, "## Development\n")?;
  for detail in &dev_status.detail {
    if !detail.branches.is_empty() {
      writeln!(out, "### Branches\n")?;
      for branch in &detail.branches {
        writeln!(out, "- [`{}`]({})", branch.name, branch.url)?;
        if let Some(commit) = &branch.last_commit {
          write!(
            out,
            "  - Last commit: [`{}`]({})",
            commit.display_id, commit.url
          )?;
          if !commit.timestamp.is_empty() {
            write!(out, " ({})", datetime_or_raw(&commit.timestamp))?;
          }
          writeln!(out)?;
        }
      }
      writeln!(out)?;
    }

    if !detail.pull_requests.is_empty() {
      writeln!(out, "### Pull requests\n")?;
      for pr in &detail.pull_requests {
        writeln!(out, "- [{}]({})", pr.name, pr.url)?;
        if !pr.author.name.is_empty() {
          writeln!(out, "  - Author: {}", pr.author.name)?;
        }
        if !pr.source.branch.is_empty() {
          writeln!(out, "  - Branch: `{}`", pr.source.branch)?;
        }
        if !pr.status.is_empty() {
          writeln!(out, "  - Status: {}", pr.status)?;
        }
      }
      writeln!(out)?;
    }
  }
  Ok(())
}

pub fn write_description(
  out: &mut String,
  record: &IssueRecord,
  ctx: &WriterContext<'_>,
) -> fmt::Result {
  let Some(description) = record
    .issue
    .fields
    .description
    .as_deref()
    .filter(|d| !d.is_empty())
  else {
    return Ok(());
  };

  writeln!(out, "## Description\n")?;
  writeln!(out, "{}\n", ctx.converter().convert(description))
}

pub fn write_child_issues(
  out: &mut String,
  record: &IssueRecord,
) -> fmt::Result {
  if record.child_issues.is_empty() {
    return Ok(());
  }

  writeln!(out, "## Child issues\n")?;
  for child in &record.child_issues {
    write!(
      out,
      "- {} **[{key}](../{key}/)**: {}",
      issue_type_icon(&child.issue_type),
      child.summary,
      key = child.key
    )?;
    if !child.status.is_empty() {
      write!(out, " [{}]", child.status)?;
    }
    writeln!(out)?;
  }
  writeln!(out)
}

/// Remote links that point into Confluence.
pub fn write_confluence_links(
  out: &mut String,
  record: &IssueRecord,
) -> fmt::Result {
  let pages: Vec<_> = record
    .remote_links
    .iter()
    .filter(|link| link.is_confluence())
    .filter_map(|link| link.object.as_ref())
    .collect();
  if pages.is_empty() {
    return Ok(());
  }

  writeln!(out, "## Confluence pages\n")?;
  for page in pages {
    let title = if page.title.is_empty() {
      "Confluence page"
    } else {
      page.title.as_str()
    };
    writeln!(out, "- [{title}]({})", page.url)?;
  }
  writeln!(out)
}

/// Comments, oldest first.
pub fn write_comments(
  out: &mut String,
  record: &IssueRecord,
  ctx: &WriterContext<'_>,
) -> fmt::Result {
  let comments = record.issue.fields.comment_list();
  if comments.is_empty() {
    return Ok(());
  }

  let converter = ctx.converter();
  writeln!(out, "## Comments\n")?;
  for comment in comments {
    let reply = if comment.body.starts_with(REPLY_MARKER) {
      "↩️ "
    } else {
      ""
    };
    writeln!(
      out,
      "{reply}{} {}\n\n---\n",
      user_name(comment.author.as_ref(), ctx.config),
      short_datetime(&comment.created)
    )?;
    writeln!(out, "{}\n", converter.convert(&comment.body))?;
  }
  Ok(())
}

fn write_issue_ref_suffix(out: &mut String, issue: &IssueRef) -> fmt::Result {
  let Some(fields) = &issue.fields else {
    return Ok(());
  };
  if !fields.summary.is_empty() {
    write!(out, " - {}", fields.summary)?;
  }
  if let Some(status) = &fields.status {
    write!(out, " [{}]", status.name)?;
  }
  Ok(())
}

pub fn write_subtasks(out: &mut String, record: &IssueRecord) -> fmt::Result {
  let subtasks = &record.issue.fields.subtasks;
  if subtasks.is_empty() {
    return Ok(());
  }

  writeln!(out, "## Sub-tasks\n")?;
  for subtask in subtasks {
    write!(out, "- **[{key}](../{key}/)**", key = subtask.key)?;
    if let Some(fields) = &subtask.fields {
      write!(out, ": {}", fields.summary)?;
      if let Some(status) = &fields.status {
        write!(out, " [{}]", status.name)?;
      }
    }
    writeln!(out)?;
  }
  writeln!(out)
}

/// Issue links, each rendered from this issue's point of view.
pub fn write_issue_links(
  out: &mut String,
  record: &IssueRecord,
) -> fmt::Result {
  let links = &record.issue.fields.issue_links;
  if links.is_empty() {
    return Ok(());
  }

  writeln!(out, "## Linked issues\n")?;
  for link in links {
    let sides = [
      (&link.link_type.outward, &link.outward_issue),
      (&link.link_type.inward, &link.inward_issue),
    ];
    for (relation, other) in sides {
      let Some(other) = other else { continue };
      write!(out, "- **{relation}**: [{key}](../{key}/)", key = other.key)?;
      write_issue_ref_suffix(out, other)?;
      writeln!(out)?;
    }
  }
  writeln!(out)
}

pub fn write_attachments(
  out: &mut String,
  ctx: &WriterContext<'_>,
) -> fmt::Result {
  if ctx.stored_attachments.is_empty() {
    return Ok(());
  }

  writeln!(out, "## Attachments\n")?;
  for stored in &ctx.stored_attachments {
    writeln!(
      out,
      "- [{stored}]({ATTACHMENT_LINK_PREFIX}{})",
      escape_path_segment(stored)
    )?;
  }
  writeln!(out)
}

pub fn write_change_history(
  out: &mut String,
  record: &IssueRecord,
  ctx: &WriterContext<'_>,
) -> fmt::Result {
  let Some(histories) = record
    .issue
    .changelog
    .as_ref()
    .map(|changelog| &changelog.histories)
    .filter(|histories| !histories.is_empty())
  else {
    return Ok(());
  };

  writeln!(out, "## Change history\n")?;
  for (index, history) in histories.iter().enumerate() {
    writeln!(out, "### Change {}\n", index + 1)?;
    writeln!(
      out,
      "- **Author**: {}",
      user_name(history.author.as_ref(), ctx.config)
    )?;
    writeln!(out, "- **Date**: {}\n", datetime_or_raw(&history.created))?;
    for item in &history.items {
      writeln!(
        out,
        "- **{}**: `{}` → `{}`",
        item.field, item.from_string, item.to_string
      )?;
    }
    writeln!(out)?;
  }
  Ok(())
}
