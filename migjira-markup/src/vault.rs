//! Placeholder vault.
//!
//! Every pass that must shield a span from later passes swaps the span for an
//! opaque token and puts it back once the dangerous passes have run. Tokens
//! are wrapped in a private-use character and contain only ASCII letters and
//! digits, so none of the decoration delimiters (`*`, `_`, `-`, `^`, `~`) or
//! table and list markers can ever match inside one.
use log::debug;
use regex::{Captures, Regex};

/// Sentinel wrapped around every token. U+E000 is a private-use code point
/// that never appears in tracker content.
const SENTINEL: char = '\u{E000}';

/// Protected spans of one kind, in creation order.
#[derive(Debug)]
pub struct Vault {
  kind:    &'static str,
  entries: Vec<(String, String)>,
}

impl Vault {
  /// Create an empty vault. `kind` must be uppercase ASCII letters; it keeps
  /// tokens of different vaults apart.
  #[must_use]
  pub const fn new(kind: &'static str) -> Self {
    Self {
      kind,
      entries: Vec::new(),
    }
  }

  #[must_use]
  pub const fn len(&self) -> usize {
    self.entries.len()
  }

  #[must_use]
  pub const fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Store `value` and return the token that stands in for it.
  pub fn stash(&mut self, value: String) -> String {
    let token = format!("{SENTINEL}{}{}{SENTINEL}", self.kind, self.entries.len());
    self.entries.push((token.clone(), value));
    token
  }

  /// Replace every non-overlapping match of `pattern` with a fresh token and
  /// remember `render(match)` for it.
  pub fn protect<F>(&mut self, text: &str, pattern: &Regex, mut render: F) -> String
  where
    F: FnMut(&Captures) -> String,
  {
    self.protect_filtered(text, pattern, |caps| Some(render(caps)))
  }

  /// Like [`Vault::protect`], but a match for which `render` returns `None`
  /// is left in the text unprotected.
  pub fn protect_filtered<F>(
    &mut self,
    text: &str,
    pattern: &Regex,
    mut render: F,
  ) -> String
  where
    F: FnMut(&Captures) -> Option<String>,
  {
    pattern
      .replace_all(text, |caps: &Captures| {
        render(caps).map_or_else(|| caps[0].to_owned(), |value| self.stash(value))
      })
      .into_owned()
  }

  /// Substitute each stored value back for its token, once, in creation
  /// order. Tokens that are no longer present are skipped.
  #[must_use]
  pub fn restore(&self, text: &str) -> String {
    let mut restored = text.to_owned();
    for (token, value) in &self.entries {
      if restored.contains(token.as_str()) {
        restored = restored.replacen(token.as_str(), value, 1);
      } else {
        debug!("{} placeholder {token:?} vanished before restore", self.kind);
      }
    }
    restored
  }
}
