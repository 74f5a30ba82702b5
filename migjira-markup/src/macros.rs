//! Block macros: status labels, quotes, colors, statuses, panels and
//! admonitions.
//!
//! Each macro is an independent substitution. They run in a fixed order
//! because the status-label form is a special case of the generic color
//! macro.
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::utils::{compile_pattern, param, parse_params, replace_matches};

/// `{color:#HEX}*[ text ]*{color}`
static STATUS_LABEL: LazyLock<Regex> = LazyLock::new(|| {
  compile_pattern(
    "STATUS_LABEL",
    r"(?i)\{color:(#[0-9a-f]{6})\}\*\[\s*([^\]]+?)\s*\]\*\{color\}",
  )
});

static QUOTE: LazyLock<Regex> =
  LazyLock::new(|| compile_pattern("QUOTE", r"(?s)\{quote\}(.*?)\{quote\}"));

static COLOR: LazyLock<Regex> = LazyLock::new(|| {
  compile_pattern("COLOR", r"(?s)\{color:([^}]+)\}(.*?)\{color\}")
});

static STATUS: LazyLock<Regex> = LazyLock::new(|| {
  compile_pattern(
    "STATUS",
    r"(?i)\{status(?::colou?r=([^}]+))?\}([^{]*)\{status\}",
  )
});

static PANEL: LazyLock<Regex> = LazyLock::new(|| {
  compile_pattern("PANEL", r"(?s)\{panel(?::([^}]*))?\}(.*?)\{panel\}")
});

/// One pattern per admonition keyword, paired with its panel class.
static ADMONITIONS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
  [
    ("note", "panel-note"),
    ("info", "panel-info"),
    ("warning", "panel-warning"),
    ("tip", "panel-success"),
  ]
  .into_iter()
  .map(|(keyword, class)| {
    let pattern =
      format!(r"(?s)\{{{keyword}(?::([^}}]*))?\}}(.*?)\{{{keyword}\}}");
    (compile_pattern(keyword, &pattern), class)
  })
  .collect()
});

/// Run every macro pass in order.
#[must_use]
pub fn convert_macros(text: &str) -> String {
  let text = convert_status_labels(text);
  let text = convert_quotes(&text);
  let text = convert_colors(&text);
  let text = convert_statuses(&text);
  let text = convert_panels(&text);
  convert_admonitions(&text)
}

/// Custom status labels, drawn as a bold bracketed word in a known color.
#[must_use]
pub fn convert_status_labels(text: &str) -> String {
  replace_matches(text, &STATUS_LABEL, |caps: &Captures| {
    let label = &caps[2];
    match status_label_class(&caps[1]) {
      Some(class) => {
        format!(r#"<span class="status-label {class}">{label}</span>"#)
      },
      None => format!(r#"<span class="status-label">{label}</span>"#),
    }
  })
}

fn status_label_class(hex: &str) -> Option<&'static str> {
  match hex.to_ascii_lowercase().as_str() {
    "#ff991f" => Some("status-label-warning"),
    "#00b8d9" => Some("status-label-teal"),
    "#36b37e" => Some("status-label-success"),
    "#ff5630" => Some("status-label-danger"),
    "#6554c0" => Some("status-label-purple"),
    "#97a0af" => Some("status-label-gray"),
    _ => None,
  }
}

/// `{quote}` blocks become Markdown blockquotes, one `>` per line.
#[must_use]
pub fn convert_quotes(text: &str) -> String {
  replace_matches(text, &QUOTE, |caps: &Captures| {
    caps[1]
      .split('\n')
      .map(|line| {
        if line.trim().is_empty() {
          ">".to_owned()
        } else {
          format!("> {line}")
        }
      })
      .collect::<Vec<_>>()
      .join("\n")
  })
}

/// Generic color spans. The color spec is passed through verbatim.
#[must_use]
pub fn convert_colors(text: &str) -> String {
  replace_matches(text, &COLOR, |caps: &Captures| {
    format!(r#"<span style="color:{}">{}</span>"#, &caps[1], &caps[2])
  })
}

/// `{status:colour=Name}text{status}` lozenges.
#[must_use]
pub fn convert_statuses(text: &str) -> String {
  replace_matches(text, &STATUS, |caps: &Captures| {
    let label = &caps[2];
    let class = caps.get(1).and_then(|color| {
      // `colour=Green|title=Done` carries extra parameters after the color.
      let name = color.as_str().split('|').next().unwrap_or_default();
      status_class(name)
    });
    match class {
      Some(class) => format!(r#"<span class="status {class}">{label}</span>"#),
      None => format!(r#"<span class="status">{label}</span>"#),
    }
  })
}

fn status_class(name: &str) -> Option<&'static str> {
  match name.trim().to_ascii_lowercase().as_str() {
    "green" => Some("status-green"),
    "yellow" => Some("status-yellow"),
    "red" => Some("status-red"),
    "blue" | "blue-gray" => Some("status-blue"),
    "grey" | "gray" => Some("status-gray"),
    _ => None,
  }
}

/// Panels, with or without parameters.
#[must_use]
pub fn convert_panels(text: &str) -> String {
  replace_matches(text, &PANEL, |caps: &Captures| {
    let params = caps.get(1).map(|m| parse_params(m.as_str())).unwrap_or_default();
    let class = panel_class(param(&params, "bgcolor"));
    render_panel(class, param(&params, "title"), &caps[2])
  })
}

/// Map a panel background color onto one of the semantic panel classes.
fn panel_class(background: Option<&str>) -> &'static str {
  let Some(background) = background else {
    return "panel-info";
  };
  let background = background.trim().to_ascii_lowercase();
  match background.trim_start_matches('#') {
    "ffebe6" => "panel-error",
    "e3fcef" => "panel-success",
    "fffae6" => "panel-warning",
    _ => "panel-info",
  }
}

/// `{note}`, `{info}`, `{warning}` and `{tip}` blocks.
#[must_use]
pub fn convert_admonitions(text: &str) -> String {
  ADMONITIONS
    .iter()
    .fold(text.to_owned(), |text, (pattern, class)| {
      replace_matches(&text, pattern, |caps: &Captures| {
        let params =
          caps.get(1).map(|m| parse_params(m.as_str())).unwrap_or_default();
        render_panel(class, param(&params, "title"), &caps[2])
      })
    })
}

fn render_panel(class: &str, title: Option<&str>, body: &str) -> String {
  match title {
    Some(title) => {
      format!(
        r#"<div class="panel {class}"><div class="panel-title">{title}</div><div class="panel-body">{body}</div></div>"#
      )
    },
    None => {
      format!(
        r#"<div class="panel {class}"><div class="panel-body">{body}</div></div>"#
      )
    },
  }
}
