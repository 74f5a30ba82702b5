//! Regex helpers shared by the conversion passes.
use std::borrow::Cow;

use log::error;
use regex::{Captures, Regex};

/// Compile a pattern for one of the process-wide pattern statics.
///
/// A pattern that fails to compile is logged and replaced with one that never
/// matches, so the pass it belongs to degrades to a no-op instead of
/// panicking.
pub(crate) fn compile_pattern(name: &str, pattern: &str) -> Regex {
  Regex::new(pattern).unwrap_or_else(|e| {
    error!("Failed to compile {name} regex: {e}");
    never_matching_regex()
  })
}

/// Create a regex that never matches anything.
///
/// This is used as a fallback pattern when a regex fails to compile.
/// It will never match any input, which is safer than using a trivial regex
/// like `^$` which would match empty strings.
#[must_use]
#[allow(clippy::expect_used, reason = "constant pattern")]
pub fn never_matching_regex() -> Regex {
  Regex::new(r"[^\s\S]").expect("never-matching pattern is valid")
}

/// Apply a regex transformation to every match in `text`.
pub fn replace_matches<F>(text: &str, regex: &Regex, transform: F) -> String
where
  F: FnMut(&Captures) -> String,
{
  match regex.replace_all(text, transform) {
    Cow::Borrowed(_) => text.to_owned(),
    Cow::Owned(s) => s,
  }
}

/// Safely process markup content with error recovery.
///
/// Runs `processor_fn` and returns `fallback` if it panics, so a bug in one
/// pass can never take down a batch.
pub fn process_safe<F>(content: &str, processor_fn: F, fallback: &str) -> String
where
  F: FnOnce(&str) -> String,
{
  if content.is_empty() {
    return String::new();
  }

  let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
    processor_fn(content)
  }));

  match result {
    Ok(processed_text) => processed_text,
    Err(e) => {
      if let Some(error_msg) = e.downcast_ref::<String>() {
        error!("Error processing markup: {error_msg}");
      } else if let Some(error_msg) = e.downcast_ref::<&str>() {
        error!("Error processing markup: {error_msg}");
      } else {
        error!("Unknown error occurred while processing markup");
      }
      fallback.to_owned()
    },
  }
}

/// Parse `key=value` pairs separated by `|`.
///
/// Keys are lowercased, keys and values are trimmed. Segments without `=`
/// are returned with an empty key so callers can treat them as a positional
/// value (`{code:java}`).
pub(crate) fn parse_params(params: &str) -> Vec<(String, String)> {
  params
    .split('|')
    .filter(|segment| !segment.trim().is_empty())
    .map(|segment| {
      match segment.split_once('=') {
        Some((key, value)) => {
          (key.trim().to_ascii_lowercase(), value.trim().to_owned())
        },
        None => (String::new(), segment.trim().to_owned()),
      }
    })
    .collect()
}

/// Look up a parameter by lowercase key.
pub(crate) fn param<'a>(
  params: &'a [(String, String)],
  key: &str,
) -> Option<&'a str> {
  params
    .iter()
    .find(|(k, _)| k == key)
    .map(|(_, v)| v.as_str())
    .filter(|v| !v.is_empty())
}
