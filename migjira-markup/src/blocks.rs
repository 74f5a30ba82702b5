//! Line-level structure: headings and nested lists.
use std::sync::LazyLock;

use regex::Regex;

use crate::{utils::compile_pattern, vault::Vault};

/// Spaces per nesting level of a rendered list item.
pub const LIST_INDENT: &str = "    ";

static HEADING: LazyLock<Regex> =
  LazyLock::new(|| compile_pattern("HEADING", r"^h([1-6])\.\s+(.+)$"));

static BULLET_ITEM: LazyLock<Regex> =
  LazyLock::new(|| compile_pattern("BULLET_ITEM", r"^\s*(\*{1,6})\s+(.+)$"));

static NUMBERED_ITEM: LazyLock<Regex> =
  LazyLock::new(|| compile_pattern("NUMBERED_ITEM", r"^\s*(#{1,6})\s+(.+)$"));

/// Leading marker of a rendered list item or heading.
static RENDERED_MARKER: LazyLock<Regex> = LazyLock::new(|| {
  compile_pattern("RENDERED_MARKER", r"^(?:(?: {4})*(?:- |1\. )|#{1,6} )")
});

fn map_lines<F>(text: &str, mut f: F) -> String
where
  F: FnMut(&str) -> String,
{
  text.split('\n').map(&mut f).collect::<Vec<_>>().join("\n")
}

/// Render `h1.`–`h6.` lines as `#`–`######` headings and park them in
/// `vault`, so the list pass never sees their `#` markers.
pub fn protect_headings(text: &str, vault: &mut Vault) -> String {
  map_lines(text, |line| {
    match HEADING.captures(line) {
      Some(caps) => {
        let level = caps[1].parse::<usize>().unwrap_or(1);
        vault.stash(format!("{} {}", "#".repeat(level), &caps[2]))
      },
      None => line.to_owned(),
    }
  })
}

/// Bullet (`*`) and numbered (`#`) items to Markdown, one indent unit per
/// extra marker character. Numbered items are always rendered as `1.`.
#[must_use]
pub fn convert_lists(text: &str) -> String {
  map_lines(text, |line| {
    if let Some(caps) = BULLET_ITEM.captures(line) {
      return render_item(caps[1].len(), "-", &caps[2]);
    }
    if let Some(caps) = NUMBERED_ITEM.captures(line) {
      return render_item(caps[1].len(), "1.", &caps[2]);
    }
    line.to_owned()
  })
}

fn render_item(depth: usize, marker: &str, content: &str) -> String {
  format!("{}{marker} {content}", LIST_INDENT.repeat(depth.saturating_sub(1)))
}

/// Park the leading marker of each rendered list item or heading in `vault`,
/// leaving the item text open to the decoration passes.
pub fn protect_list_markers(text: &str, vault: &mut Vault) -> String {
  map_lines(text, |line| {
    match RENDERED_MARKER.find(line) {
      Some(marker) => {
        let token = vault.stash(marker.as_str().to_owned());
        format!("{token}{}", &line[marker.end()..])
      },
      None => line.to_owned(),
    }
  })
}
