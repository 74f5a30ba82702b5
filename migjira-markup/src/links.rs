//! Mentions, piped links and attachment image references.
use std::{path::Path, sync::LazyLock};

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use regex::{Captures, Regex};

use crate::{
  types::{AttachmentMap, UserMapping},
  utils::{compile_pattern, replace_matches},
  vault::Vault,
};

static MENTION: LazyLock<Regex> = LazyLock::new(|| {
  compile_pattern("MENTION", r"\[~accountid:([^\]]+)\]")
});

static PIPED_LINK: LazyLock<Regex> = LazyLock::new(|| {
  compile_pattern("PIPED_LINK", r"\[([^\]|]+)\|([^\]]+)\]")
});

/// `!file.ext!` or `!file.ext|width=300!`, on one line.
static IMAGE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
  compile_pattern(
    "IMAGE_REFERENCE",
    r"!([^!|\n]+\.[a-zA-Z0-9]+)(?:\|[^!\n]*)?!",
  )
});

/// Bare URLs, kept away from the decoration passes.
static BARE_URL: LazyLock<Regex> = LazyLock::new(|| {
  compile_pattern("BARE_URL", r#"https?://[^\s<>"'()\[\]|]+"#)
});

/// Extensions rendered inline as images rather than linked.
const IMAGE_EXTENSIONS: &[&str] =
  &["png", "jpg", "jpeg", "gif", "svg", "webp", "bmp", "ico"];

/// Characters escaped in an attachment path segment. Parentheses are included
/// so the result is safe inside a Markdown link destination.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
  .add(b' ')
  .add(b'!')
  .add(b'"')
  .add(b'#')
  .add(b'%')
  .add(b'\'')
  .add(b'(')
  .add(b')')
  .add(b'*')
  .add(b'/')
  .add(b'<')
  .add(b'>')
  .add(b'?')
  .add(b'[')
  .add(b'\\')
  .add(b']')
  .add(b'^')
  .add(b'`')
  .add(b'{')
  .add(b'|')
  .add(b'}');

/// Percent-encode a filename for use as one URL path segment.
#[must_use]
pub fn escape_path_segment(name: &str) -> String {
  utf8_percent_encode(name, PATH_SEGMENT).to_string()
}

/// Whether `filename` has one of the inline image extensions.
#[must_use]
pub fn is_image_file(filename: &str) -> bool {
  Path::new(filename)
    .extension()
    .and_then(|ext| ext.to_str())
    .is_some_and(|ext| {
      IMAGE_EXTENSIONS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(ext))
    })
}

fn render_mention(caps: &Captures, users: &UserMapping) -> String {
  let account_id = &caps[1];
  let name = users
    .get(account_id)
    .map(String::as_str)
    .filter(|name| !name.is_empty())
    .unwrap_or(account_id);
  format!(
    r#"<span class="mention">@{}</span>"#,
    html_escape::encode_text(name)
  )
}

/// Render `[~accountid:ID]` as a mention span carrying the display name and
/// park it in `vault`, so names with `_` or `*` survive the decoration
/// passes.
pub fn protect_mentions(
  text: &str,
  users: &UserMapping,
  vault: &mut Vault,
) -> String {
  vault.protect(text, &MENTION, |caps| render_mention(caps, users))
}

/// `[text|url]` to `[text](url)`.
#[must_use]
pub fn convert_links(text: &str) -> String {
  replace_matches(text, &PIPED_LINK, |caps: &Captures| {
    format!("[{}]({})", &caps[1], &caps[2])
  })
}

/// Render one image reference against the attachment map, or `None` when the
/// file is not a known attachment.
fn render_image(
  caps: &Captures,
  attachments: &AttachmentMap,
  url_prefix: &str,
) -> Option<String> {
  let original = &caps[1];
  let stored = attachments.get(original)?;
  let url = format!(
    "{}/{}",
    url_prefix.trim_end_matches('/'),
    escape_path_segment(stored)
  );
  if is_image_file(original) {
    Some(format!("![{original}]({url})"))
  } else {
    Some(format!("[{original}]({url})"))
  }
}

/// Render resolved image references and park them in `vault`, so the
/// decoration passes never touch a filename.
pub fn protect_images(
  text: &str,
  attachments: &AttachmentMap,
  url_prefix: &str,
  vault: &mut Vault,
) -> String {
  vault.protect_filtered(text, &IMAGE_REFERENCE, |caps| {
    render_image(caps, attachments, url_prefix)
  })
}

/// Park bare URLs in `vault` unchanged.
pub fn protect_urls(text: &str, vault: &mut Vault) -> String {
  vault.protect(text, &BARE_URL, |caps| caps[0].to_owned())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn users() -> UserMapping {
    UserMapping::from([
      ("abc".to_owned(), "Taro".to_owned()),
      ("empty".to_owned(), String::new()),
      ("html".to_owned(), "<b>Bob</b>".to_owned()),
    ])
  }

  fn mentions(text: &str) -> String {
    let mut vault = Vault::new("MENTION");
    let protected = protect_mentions(text, &users(), &mut vault);
    vault.restore(&protected)
  }

  fn images(text: &str, attachments: &AttachmentMap, url_prefix: &str) -> String {
    let mut vault = Vault::new("IMAGE");
    let protected = protect_images(text, attachments, url_prefix, &mut vault);
    vault.restore(&protected)
  }

  #[test]
  fn mentions_use_display_names() {
    assert_eq!(
      mentions("[~accountid:abc]"),
      r#"<span class="mention">@Taro</span>"#
    );
    assert_eq!(
      mentions("hi [~accountid:zzz]!"),
      r#"hi <span class="mention">@zzz</span>!"#
    );
    assert_eq!(
      mentions("[~accountid:empty]"),
      r#"<span class="mention">@empty</span>"#
    );
    assert_eq!(
      mentions("[~accountid:html]"),
      r#"<span class="mention">@&lt;b&gt;Bob&lt;/b&gt;</span>"#
    );
  }

  #[test]
  fn protected_mentions_hide_the_name() {
    let mut vault = Vault::new("MENTION");
    let protected = protect_mentions("ping [~accountid:abc]", &users(), &mut vault);
    assert!(!protected.contains("Taro"));
    assert_eq!(vault.len(), 1);
  }

  #[test]
  fn piped_links() {
    assert_eq!(
      convert_links("see [Google|https://google.com] now"),
      "see [Google](https://google.com) now"
    );
    assert_eq!(convert_links("[no pipe]"), "[no pipe]");
  }

  #[test]
  fn mention_and_link_passes_are_idempotent() {
    let once = convert_links(&mentions("[~accountid:abc] [a|b]"));
    assert_eq!(convert_links(&mentions(&once)), once);
  }

  #[test]
  fn images_resolve_through_attachment_map() {
    let attachments = AttachmentMap::from([
      ("screen shot.png".to_owned(), "PROJ-1_screen shot.png".to_owned()),
      ("report.pdf".to_owned(), "PROJ-1_report.pdf".to_owned()),
    ]);
    assert_eq!(
      images("!screen shot.png|width=300!", &attachments, "/attachments"),
      "![screen shot.png](/attachments/PROJ-1_screen%20shot.png)"
    );
    assert_eq!(
      images("!report.pdf!", &attachments, "/files/"),
      "[report.pdf](/files/PROJ-1_report.pdf)"
    );
    assert_eq!(
      images("!missing.png!", &attachments, "/attachments"),
      "!missing.png!"
    );
  }

  #[test]
  fn image_extensions_are_case_insensitive() {
    assert!(is_image_file("A.PNG"));
    assert!(is_image_file("photo.jpeg"));
    assert!(!is_image_file("notes.txt"));
    assert!(!is_image_file("no_extension"));
  }

  #[test]
  fn path_segments_are_escaped() {
    assert_eq!(escape_path_segment("a b/c?.png"), "a%20b%2Fc%3F.png");
    assert_eq!(escape_path_segment("日本.png"), "%E6%97%A5%E6%9C%AC.png");
    assert_eq!(escape_path_segment("shot (1).png"), "shot%20%281%29.png");
  }

  #[test]
  fn urls_are_protected_verbatim() {
    let mut vault = Vault::new("URL");
    let protected = protect_urls("go to https://x.y/a_b_c-d-e now", &mut vault);
    assert!(!protected.contains('_'));
    assert_eq!(vault.restore(&protected), "go to https://x.y/a_b_c-d-e now");
  }
}
