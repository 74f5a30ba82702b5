//! Code, noformat and inline-code protection.
//!
//! These run before anything else: code content is rendered to its final
//! Markdown form immediately and parked in a vault until the very end.
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::{
  utils::{compile_pattern, param, parse_params},
  vault::Vault,
};

/// `{code:lang}...{code}` or `{code:title=X|language=lang}...{code}`.
static CODE_WITH_PARAMS: LazyLock<Regex> = LazyLock::new(|| {
  compile_pattern("CODE_WITH_PARAMS", r"(?s)\{code:([^}]*)\}(.*?)\{code\}")
});

static CODE_PLAIN: LazyLock<Regex> =
  LazyLock::new(|| compile_pattern("CODE_PLAIN", r"(?s)\{code\}(.*?)\{code\}"));

static NOFORMAT: LazyLock<Regex> = LazyLock::new(|| {
  compile_pattern("NOFORMAT", r"(?s)\{noformat(?::[^}]*)?\}(.*?)\{noformat\}")
});

/// `{{monospace}}`, single line only.
static INLINE_CODE: LazyLock<Regex> =
  LazyLock::new(|| compile_pattern("INLINE_CODE", r"\{\{([^}\n]+)\}\}"));

/// Replace every code construct in `text` with a token from `vault`.
///
/// Block forms become fenced code blocks, inline monospace becomes a backtick
/// span.
pub fn protect_code(text: &str, vault: &mut Vault) -> String {
  let text = vault.protect(text, &CODE_WITH_PARAMS, |caps| {
    fence(&code_language(&caps[1]), &caps[2])
  });
  let text = vault.protect(&text, &CODE_PLAIN, |caps| fence("", &caps[1]));
  let text = vault.protect(&text, &NOFORMAT, |caps| fence("", &caps[1]));
  vault.protect(&text, &INLINE_CODE, |caps: &Captures| {
    format!("`{}`", &caps[1])
  })
}

/// Pick the fence language out of `{code:...}` parameters.
fn code_language(raw: &str) -> String {
  let params = parse_params(raw);
  param(&params, "language")
    .or_else(|| param(&params, ""))
    .unwrap_or_default()
    .to_owned()
}

fn fence(language: &str, body: &str) -> String {
  let body = body.strip_prefix('\n').unwrap_or(body);
  let body = body.strip_suffix('\n').unwrap_or(body);
  format!("```{language}\n{body}\n```")
}
