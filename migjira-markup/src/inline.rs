//! Inline decorations: bold, italic, strikethrough, superscript, subscript.
//!
//! Bold, italic and strikethrough share delimiters with list markers, doubled
//! Markdown emphasis, dates and URLs, so every candidate goes through a
//! rejection check before it is rewritten. Resolution is iterative per line:
//! the first acceptable candidate (left to right) is rewritten, then the line
//! is rescanned until nothing changes.
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::{
  utils::{compile_pattern, replace_matches},
  vault::Vault,
};

static BOLD: LazyLock<Regex> =
  LazyLock::new(|| compile_pattern("BOLD", r"\*([^*\n]+?)\*"));

static ITALIC: LazyLock<Regex> =
  LazyLock::new(|| compile_pattern("ITALIC", r"_([^_\n]+?)_"));

static STRIKETHROUGH: LazyLock<Regex> =
  LazyLock::new(|| compile_pattern("STRIKETHROUGH", r"-([^- \n]+?)-"));

static SUPERSCRIPT: LazyLock<Regex> =
  LazyLock::new(|| compile_pattern("SUPERSCRIPT", r"\^([^^\n]+)\^"));

static SUBSCRIPT: LazyLock<Regex> =
  LazyLock::new(|| compile_pattern("SUBSCRIPT", r"~([^~\n]+?)~"));

/// Already-converted `~~strikethrough~~` spans, shielded from the subscript
/// pass.
static DOUBLE_TILDE: LazyLock<Regex> =
  LazyLock::new(|| compile_pattern("DOUBLE_TILDE", r"~~[^~\n]*~~"));

/// A decoration candidate: the whole match and its inner text.
struct Candidate<'a> {
  start:   usize,
  end:     usize,
  content: &'a str,
}

impl Candidate<'_> {
  fn before(&self, line: &str) -> Option<char> {
    line[..self.start].chars().next_back()
  }

  fn after(&self, line: &str) -> Option<char> {
    line[self.end..].chars().next()
  }
}

/// Rewrite `line` until no acceptable candidate is left.
///
/// Candidates may overlap: a rejected match only advances the scan by one
/// byte past its opening delimiter, so `**a** *b*` still finds `*b*`.
fn resolve_line<A, R>(line: &str, pattern: &Regex, accept: A, render: R) -> String
where
  A: Fn(&str, &Candidate) -> bool,
  R: Fn(&str) -> String,
{
  let mut current = line.to_owned();
  loop {
    let Some((start, end, replacement)) = first_acceptable(&current, pattern, &accept)
      .map(|c| (c.start, c.end, render(c.content)))
    else {
      break;
    };
    let next = format!("{}{replacement}{}", &current[..start], &current[end..]);
    if next == current {
      break;
    }
    current = next;
  }
  current
}

fn first_acceptable<'a, A>(
  line: &'a str,
  pattern: &Regex,
  accept: &A,
) -> Option<Candidate<'a>>
where
  A: Fn(&str, &Candidate) -> bool,
{
  let mut position = 0;
  while position <= line.len() {
    let caps = pattern.captures_at(line, position)?;
    let whole = caps.get(0)?;
    let candidate = Candidate {
      start:   whole.start(),
      end:     whole.end(),
      content: caps.get(1)?.as_str(),
    };
    if accept(line, &candidate) {
      return Some(candidate);
    }
    // Every delimiter is a single ASCII byte, so this stays on a char boundary.
    position = candidate.start + 1;
  }
  None
}

fn map_lines<F>(text: &str, f: F) -> String
where
  F: Fn(&str) -> String,
{
  text.split('\n').map(f).collect::<Vec<_>>().join("\n")
}

/// `*bold*` to `**bold**`.
///
/// A candidate touching another `*` is already part of a doubled sequence and
/// is left alone, which makes the pass idempotent.
#[must_use]
pub fn convert_bold(text: &str) -> String {
  map_lines(text, |line| {
    resolve_line(
      line,
      &BOLD,
      |line, c| c.before(line) != Some('*') && c.after(line) != Some('*'),
      |content| format!("**{content}**"),
    )
  })
}

/// `_italic_` to `*italic*`.
#[must_use]
pub fn convert_italic(text: &str) -> String {
  map_lines(text, |line| {
    resolve_line(
      line,
      &ITALIC,
      |line, c| c.before(line) != Some('_') && c.after(line) != Some('_'),
      |content| format!("*{content}*"),
    )
  })
}

/// Characters that must not touch a strikethrough delimiter: they mark dates
/// (`2025-01-14`), hyphenated words and URL segments.
const fn blocks_strikethrough(c: char) -> bool {
  c.is_ascii_alphanumeric() || matches!(c, '-' | '/' | ':' | ';')
}

fn accept_strikethrough(line: &str, c: &Candidate) -> bool {
  if c.content.trim().is_empty() {
    return false;
  }
  if c.start == 0 && c.content.starts_with(' ') {
    return false;
  }
  if c.before(line).is_some_and(blocks_strikethrough)
    || c.after(line).is_some_and(blocks_strikethrough)
  {
    return false;
  }
  !(line[..c.start].ends_with("~~") || line[c.end..].starts_with("~~"))
}

/// `-deleted-` to `~~deleted~~`.
#[must_use]
pub fn convert_strikethrough(text: &str) -> String {
  map_lines(text, |line| {
    resolve_line(line, &STRIKETHROUGH, accept_strikethrough, |content| {
      format!("~~{content}~~")
    })
  })
}

/// `^sup^` to `<sup>sup</sup>`.
#[must_use]
pub fn convert_superscript(text: &str) -> String {
  replace_matches(text, &SUPERSCRIPT, |caps: &Captures| {
    format!("<sup>{}</sup>", &caps[1])
  })
}

/// `~sub~` to `<sub>sub</sub>`, leaving `~~strikethrough~~` untouched.
#[must_use]
pub fn convert_subscript(text: &str) -> String {
  let mut strikes = Vault::new("STRIKE");
  let protected = strikes.protect(text, &DOUBLE_TILDE, |caps| caps[0].to_owned());
  let converted = replace_matches(&protected, &SUBSCRIPT, |caps: &Captures| {
    format!("<sub>{}</sub>", &caps[1])
  });
  strikes.restore(&converted)
}

/// Every decoration pass, in order.
#[must_use]
pub fn convert_decorations(text: &str) -> String {
  let text = convert_bold(text);
  let text = convert_italic(&text);
  let text = convert_strikethrough(&text);
  let text = convert_superscript(&text);
  convert_subscript(&text)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bold_next_to_cjk_and_latin() {
    assert_eq!(convert_bold("これは*太字*です。"), "これは**太字**です。");
    assert_eq!(convert_bold("*太字1*と*太字2*があります。"), "**太字1**と**太字2**があります。");
    assert_eq!(convert_bold("This is*bold*text."), "This is**bold**text.");
    assert_eq!(convert_bold("*太字のみ*"), "**太字のみ**");
  }

  #[test]
  fn bold_rejects_doubled_sequences() {
    for input in ["***装飾***", "**", "*太字1**太字2*", "5 * 3 = 15", "**already**"] {
      assert_eq!(convert_bold(input), input, "{input}");
    }
  }

  #[test]
  fn bold_finds_candidates_after_a_rejected_one() {
    assert_eq!(convert_bold("*a* b *c*"), "**a** b **c**");
  }

  #[test]
  fn bold_is_idempotent() {
    for input in ["*a* and *b*", "x*y*z", "***", "*太字の中に_斜体_*"] {
      let once = convert_bold(input);
      assert_eq!(convert_bold(&once), once);
    }
  }

  #[test]
  fn bold_does_not_span_lines() {
    assert_eq!(convert_bold("*改行\nあり*"), "*改行\nあり*");
  }

  #[test]
  fn italic_conversion() {
    assert_eq!(convert_italic("これは_斜体_です。"), "これは*斜体*です。");
    assert_eq!(convert_italic("_斜体1_と_斜体2_"), "*斜体1*と*斜体2*");
    assert_eq!(convert_italic("file_name_example"), "file*name*example");
    assert_eq!(convert_italic("__text__"), "__text__");
  }

  #[test]
  fn strikethrough_conversion() {
    assert_eq!(convert_strikethrough("これは-取り消し-です。"), "これは~~取り消し~~です。");
    assert_eq!(convert_strikethrough("-取り消し-で始まる行"), "~~取り消し~~で始まる行");
    assert_eq!(convert_strikethrough("This is -gone- now"), "This is ~~gone~~ now");
  }

  #[test]
  fn strikethrough_skips_dates_urls_and_words() {
    for input in [
      "2025-01-14",
      "foo-bar-baz",
      "https://example.com/path-to-page",
      "a;-b-;c",
      "- list item",
      "- -",
      "~~-x-~~",
    ] {
      assert_eq!(convert_strikethrough(input), input, "{input}");
    }
  }

  #[test]
  fn superscript_and_subscript() {
    assert_eq!(convert_superscript("x^2^"), "x<sup>2</sup>");
    assert_eq!(convert_subscript("H~2~O"), "H<sub>2</sub>O");
    assert_eq!(convert_subscript("~~gone~~ and ~x~"), "~~gone~~ and <sub>x</sub>");
  }

  #[test]
  fn combined_decorations() {
    assert_eq!(
      convert_decorations("*太字*、_斜体_、-取り消し-があります。"),
      "**太字**、*斜体*、~~取り消し~~があります。"
    );
    assert_eq!(convert_decorations("*太字の中に_斜体_*"), "**太字の中に*斜体***");
  }
}
