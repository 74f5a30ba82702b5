//! Custom field values.
//!
//! Custom fields arrive as arbitrary JSON. They are decoded into a
//! [`CustomFieldValue`] once, when the record is read, and rendered by
//! matching on the variant.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::types::DevStatusDetail;

/// Shown for a value that exists but carries nothing.
pub const NOT_SET: &str = "Not set";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum CustomFieldValue {
  Null,
  Bool(bool),
  Number(Number),
  Text(String),
  List(Vec<Value>),
  Object(Map<String, Value>),
  /// A development-integration summary (pull requests linked to the issue).
  Development(DevelopmentField),
}

/// Pull-request summary extracted from a development field.
#[derive(Debug, Clone, PartialEq)]
pub struct DevelopmentField {
  pub count: u64,
  pub state: String,
  raw:       Map<String, Value>,
}

impl DevelopmentField {
  fn is_development(object: &Map<String, Value>) -> bool {
    object.contains_key("pullrequest") || object.contains_key("json")
  }

  fn from_raw(raw: Map<String, Value>) -> Self {
    let (count, state) = Self::direct_summary(&raw)
      .or_else(|| Self::cached_summary(&raw))
      .unwrap_or_default();
    Self { count, state, raw }
  }

  /// `{"pullrequest": {"state": "OPEN", "stateCount": 1}}`
  fn direct_summary(raw: &Map<String, Value>) -> Option<(u64, String)> {
    let pr = raw.get("pullrequest")?.as_object()?;
    let state = pr.get("state")?.as_str()?;
    let count = pr.get("stateCount")?.as_u64()?;
    (count > 0 && !state.is_empty()).then(|| (count, state.to_owned()))
  }

  /// `{"json": {"cachedValue": {"summary": {"pullrequest": {"overall": ...}}}}}`
  fn cached_summary(raw: &Map<String, Value>) -> Option<(u64, String)> {
    let overall = raw
      .get("json")?
      .pointer("/cachedValue/summary/pullrequest/overall")?;
    let count = overall.get("count")?.as_u64()?;
    let state = overall
      .get("state")
      .and_then(Value::as_str)
      .unwrap_or_default();
    (count > 0).then(|| (count, state.to_owned()))
  }

  /// `Pull Request: 2 open`, or `None` when no pull request is linked.
  #[must_use]
  pub fn summary(&self) -> Option<String> {
    (self.count > 0).then(|| {
      format!("Pull Request: {} {}", self.count, self.state.to_lowercase())
    })
  }
}

impl From<Value> for CustomFieldValue {
  fn from(value: Value) -> Self {
    match value {
      Value::Null => Self::Null,
      Value::Bool(flag) => Self::Bool(flag),
      Value::Number(number) => Self::Number(number),
      Value::String(text) => Self::Text(text),
      Value::Array(items) => Self::List(items),
      Value::Object(object) if DevelopmentField::is_development(&object) => {
        Self::Development(DevelopmentField::from_raw(object))
      },
      Value::Object(object) => Self::Object(object),
    }
  }
}

impl From<CustomFieldValue> for Value {
  fn from(value: CustomFieldValue) -> Self {
    match value {
      CustomFieldValue::Null => Self::Null,
      CustomFieldValue::Bool(flag) => Self::Bool(flag),
      CustomFieldValue::Number(number) => Self::Number(number),
      CustomFieldValue::Text(text) => Self::String(text),
      CustomFieldValue::List(items) => Self::Array(items),
      CustomFieldValue::Object(object) => Self::Object(object),
      CustomFieldValue::Development(field) => Self::Object(field.raw),
    }
  }
}

/// Plain text for a nested JSON value: strings unquoted, everything else as
/// JSON.
fn value_text(value: &Value) -> String {
  match value {
    Value::String(text) => text.clone(),
    other => other.to_string(),
  }
}

/// The first of `keys` present in `object`, as text.
fn labelled(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
  keys.iter().find_map(|key| object.get(*key)).map(value_text)
}

impl CustomFieldValue {
  /// Whether the field should be left out of the details list entirely.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    match self {
      Self::Null => true,
      Self::Text(text) => text.is_empty(),
      Self::List(items) => items.is_empty(),
      Self::Object(object) => object.is_empty(),
      Self::Development(field) => field.summary().is_none(),
      Self::Bool(_) | Self::Number(_) => false,
    }
  }

  /// Render the value for display. An empty result means "do not show".
  #[must_use]
  pub fn display(&self) -> String {
    match self {
      Self::Null => NOT_SET.to_owned(),
      Self::Text(text) if text.is_empty() => NOT_SET.to_owned(),
      // Development data the tracker already stringified; the development
      // section shows it properly.
      Self::Text(text)
        if text.contains("pullrequest=") || text.contains("\"pullrequest\"") =>
      {
        String::new()
      },
      Self::Text(text) => text.clone(),
      Self::Number(number) => {
        number
          .as_f64()
          .map_or_else(|| number.to_string(), |n| format!("{n:.2}"))
      },
      Self::Bool(true) => "yes".to_owned(),
      Self::Bool(false) => "no".to_owned(),
      Self::List(items) if items.is_empty() => NOT_SET.to_owned(),
      Self::List(items) => {
        items
          .iter()
          .map(|item| {
            match item {
              Value::Object(object) => {
                labelled(object, &["name", "value"]).unwrap_or_else(|| item.to_string())
              },
              other => value_text(other),
            }
          })
          .collect::<Vec<_>>()
          .join(", ")
      },
      Self::Object(object) => {
        labelled(object, &["name", "value", "displayName"])
          .unwrap_or_else(|| Value::Object(object.clone()).to_string())
      },
      Self::Development(field) => field.summary().unwrap_or_default(),
    }
  }

  /// Like [`CustomFieldValue::display`], but a development field also names
  /// the first pull request and its branch when details are available.
  #[must_use]
  pub fn display_with_dev_status(&self, dev_status: Option<&DevStatusDetail>) -> String {
    let Self::Development(field) = self else {
      return self.display();
    };
    let Some(dev_status) = dev_status.filter(|dev| !dev.is_empty()) else {
      return self.display();
    };

    let mut parts: Vec<String> = field.summary().into_iter().collect();
    if let Some(pr) = dev_status.first_pull_request() {
      if !pr.name.is_empty() {
        parts.push(format!("({})", pr.name));
      }
      if !pr.source.branch.is_empty() {
        parts.push(format!("[{}]", pr.source.branch));
      }
    }

    if parts.is_empty() {
      self.display()
    } else {
      parts.join(" ")
    }
  }
}
