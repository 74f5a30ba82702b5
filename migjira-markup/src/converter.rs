//! The conversion pipeline.
//!
//! Stage order matters: every pass after code protection may only see text
//! that earlier passes have either finalised or parked in a vault.
use log::debug;

use crate::{
  blocks::{convert_lists, protect_headings, protect_list_markers},
  code::protect_code,
  inline::convert_decorations,
  links::{convert_links, protect_images, protect_mentions, protect_urls},
  macros::convert_macros,
  tables::convert_tables,
  types::{AttachmentMap, ConverterOptions, UserMapping},
  utils::process_safe,
  vault::Vault,
};

/// Converts wiki markup to Markdown against one issue's lookup tables.
///
/// A converter borrows its maps and holds no other state, so one instance can
/// be shared across threads and reused for every text of an issue.
#[derive(Debug, Clone)]
pub struct Converter<'a> {
  users:       &'a UserMapping,
  attachments: &'a AttachmentMap,
  options:     ConverterOptions,
}

impl<'a> Converter<'a> {
  #[must_use]
  pub fn new(users: &'a UserMapping, attachments: &'a AttachmentMap) -> Self {
    Self::with_options(users, attachments, ConverterOptions::default())
  }

  #[must_use]
  pub const fn with_options(
    users: &'a UserMapping,
    attachments: &'a AttachmentMap,
    options: ConverterOptions,
  ) -> Self {
    Self {
      users,
      attachments,
      options,
    }
  }

  #[must_use]
  pub const fn options(&self) -> &ConverterOptions {
    &self.options
  }

  /// Convert `text` to Markdown.
  ///
  /// Never fails: constructs that do not match their pattern stay literal, and
  /// if a pass panics the source text is returned unchanged.
  #[must_use]
  pub fn convert(&self, text: &str) -> String {
    process_safe(text, |text| self.run(text), text)
  }

  fn run(&self, text: &str) -> String {
    let text = text.replace("\r\n", "\n");

    let mut code = Vault::new("CODE");
    let text = protect_code(&text, &mut code);
    let mut images = Vault::new("IMAGE");
    let text = protect_images(
      &text,
      self.attachments,
      &self.options.attachment_url,
      &mut images,
    );

    let text = convert_macros(&text);
    let text = convert_tables(&text);
    let mut mentions = Vault::new("MENTION");
    let text = protect_mentions(&text, self.users, &mut mentions);
    let text = convert_links(&text);

    let mut headings = Vault::new("HEADING");
    let text = protect_headings(&text, &mut headings);
    let text = convert_lists(&text);
    let text = headings.restore(&text);

    let mut markers = Vault::new("MARKER");
    let text = protect_list_markers(&text, &mut markers);
    let mut urls = Vault::new("URL");
    let text = protect_urls(&text, &mut urls);
    let text = convert_decorations(&text);
    let text = urls.restore(&text);
    let text = markers.restore(&text);
    let text = mentions.restore(&text);

    let text = images.restore(&text);
    let text = code.restore(&text);
    debug!(
      "Converted markup with {} code spans and {} attachment references",
      code.len(),
      images.len()
    );

    if self.options.hard_breaks {
      add_hard_breaks(&text)
    } else {
      text
    }
  }
}

/// Convert `text` with default options.
#[must_use]
pub fn convert(
  text: &str,
  users: &UserMapping,
  attachments: &AttachmentMap,
) -> String {
  Converter::new(users, attachments).convert(text)
}

/// Append a Markdown hard break to every non-empty line followed by a
/// newline. Fenced code is left alone.
#[must_use]
pub fn add_hard_breaks(text: &str) -> String {
  let lines: Vec<&str> = text.split('\n').collect();
  let last = lines.len().saturating_sub(1);
  let mut in_fence = false;
  lines
    .iter()
    .enumerate()
    .map(|(index, line)| {
      let is_fence = is_fence_line(line);
      let out = if index < last && !line.is_empty() && !in_fence && !is_fence {
        format!("{line}  ")
      } else {
        (*line).to_owned()
      };
      if is_fence {
        in_fence = !in_fence;
      }
      out
    })
    .collect::<Vec<_>>()
    .join("\n")
}

/// A line opening or closing a fenced block: three backticks, optionally
/// followed by a language tag. Inline code that merely starts with backticks
/// does not count.
fn is_fence_line(line: &str) -> bool {
  line
    .trim_start()
    .strip_prefix("```")
    .is_some_and(|language| {
      language.chars().all(|c| {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-' | '#' | '.')
      })
    })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn convert_plain(text: &str) -> String {
    convert(text, &UserMapping::new(), &AttachmentMap::new())
  }

  #[test]
  fn hard_breaks_skip_blank_lines_and_fences() {
    assert_eq!(add_hard_breaks("a\nb"), "a  \nb");
    assert_eq!(add_hard_breaks("a\n\nb"), "a  \n\nb");
    assert_eq!(add_hard_breaks("```\nx\n```\ny"), "```\nx\n```\ny");
  }

  #[test]
  fn inline_backticks_do_not_open_a_fence() {
    assert_eq!(
      add_hard_breaks("```` inline\na\nb"),
      "```` inline  \na  \nb"
    );
    assert_eq!(
      convert_plain("{{```}}\nnext\nlast"),
      "`````  \nnext  \nlast"
    );
  }

  #[test]
  fn fence_with_language_is_skipped() {
    assert_eq!(
      add_hard_breaks("```rust\nlet x = 1;\n```\ndone"),
      "```rust\nlet x = 1;\n```\ndone"
    );
  }

  #[test]
  fn underscored_mentions_are_not_decorated() {
    let users =
      UserMapping::from([("abc".to_owned(), "taro_yamada_x".to_owned())]);
    let attachments = AttachmentMap::new();
    let converter = Converter::new(&users, &attachments);
    assert_eq!(
      converter.convert("cc [~accountid:abc] and *bold*"),
      r#"cc <span class="mention">@taro_yamada_x</span> and **bold**"#
    );
  }

  #[test]
  fn crlf_is_normalised() {
    assert_eq!(convert_plain("h1. a\r\nb"), "# a  \nb");
  }

  #[test]
  fn empty_input() {
    assert_eq!(convert_plain(""), "");
  }

  #[test]
  fn hard_breaks_can_be_disabled() {
    let users = UserMapping::new();
    let attachments = AttachmentMap::new();
    let converter = Converter::with_options(
      &users,
      &attachments,
      ConverterOptions::default().with_hard_breaks(false),
    );
    assert_eq!(converter.convert("*a*\n_b_"), "**a**\n*b*");
    assert!(!converter.options().hard_breaks);
  }
}
