//! Small formatting helpers shared by the document sections.
use jiff::{
  Timestamp,
  Zoned,
  civil::Date,
  fmt::strtime,
  tz::{Offset, TimeZone},
};
use migjira_config::Config;
use migjira_issue::{NOT_SET, User};
use toml::value::Datetime;

/// Timestamp layouts the tracker emits, tried in order.
const TIMESTAMP_FORMATS: &[&str] =
  &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M:%S%.f%:z"];

/// Parse a tracker timestamp such as `2026-01-22T00:43:07.025+0900`,
/// keeping its offset. RFC 3339 with a `Z` suffix is accepted as UTC.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<Zoned> {
  let value = value.trim();
  if value.is_empty() {
    return None;
  }

  for format in TIMESTAMP_FORMATS {
    let Ok(tm) = strtime::parse(format, value) else {
      continue;
    };
    let Ok(timestamp) = tm.to_timestamp() else {
      continue;
    };
    let offset = tm.offset().unwrap_or(Offset::UTC);
    return Some(timestamp.to_zoned(TimeZone::fixed(offset)));
  }

  value
    .parse::<Timestamp>()
    .ok()
    .map(|timestamp| timestamp.to_zoned(TimeZone::UTC))
}

/// Offset datetime for front matter, e.g. `2026-01-22T00:43:07+09:00`.
#[must_use]
pub fn rfc3339(value: &str) -> Option<Datetime> {
  parse_timestamp(value)?
    .strftime("%Y-%m-%dT%H:%M:%S%:z")
    .to_string()
    .parse()
    .ok()
}

/// `YYYY-MM-DD HH:MM:SS`, or [`NOT_SET`] when the value does not parse.
#[must_use]
pub fn datetime(value: Option<&str>) -> String {
  value
    .and_then(parse_timestamp)
    .map_or_else(
      || NOT_SET.to_string(),
      |zoned| zoned.strftime("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

/// `YYYY-MM-DD HH:MM`, falling back to the raw value.
#[must_use]
pub fn short_datetime(value: &str) -> String {
  parse_timestamp(value).map_or_else(
    || value.to_string(),
    |zoned| zoned.strftime("%Y-%m-%d %H:%M").to_string(),
  )
}

/// `YYYY-MM-DD HH:MM:SS`, falling back to the raw value.
#[must_use]
pub fn datetime_or_raw(value: &str) -> String {
  parse_timestamp(value).map_or_else(
    || value.to_string(),
    |zoned| zoned.strftime("%Y-%m-%d %H:%M:%S").to_string(),
  )
}

/// Calendar date (`YYYY-MM-DD`) of a due date field.
#[must_use]
pub fn date(value: Option<&str>) -> Option<String> {
  value
    .and_then(|value| value.trim().parse::<Date>().ok())
    .map(|date| date.strftime("%Y-%m-%d").to_string())
}

/// Seconds as hours with two decimals, e.g. `1.50h`.
#[must_use]
#[allow(
  clippy::cast_precision_loss,
  reason = "tracked time never approaches 2^52 seconds"
)]
pub fn hours(seconds: u64) -> String {
  format!("{:.2}h", seconds as f64 / 3600.0)
}

/// Icon shown next to an issue key for its issue type.
#[must_use]
pub fn issue_type_icon(issue_type: &str) -> &'static str {
  match issue_type {
    "Epic" | "エピック" => "🟣",
    "Story" | "ストーリー" => "📗",
    "Task" | "タスク" => "☑️",
    "Sub-task" | "Subtask" | "サブタスク" => "➡️",
    "Bug" | "バグ" => "🐞",
    _ => "📄",
  }
}

/// Icon used for project pages and breadcrumbs.
pub const PROJECT_ICON: &str = "📦";

/// Display name of a user. Deleted accounts are looked up in the
/// configured `deleted_users` table first.
#[must_use]
pub fn user_name(user: Option<&User>, config: &Config) -> String {
  let Some(user) = user else {
    return NOT_SET.to_string();
  };
  if user.is_deleted() && !user.account_id.is_empty() {
    if let Some(name) = config.deleted_user_name(&user.account_id) {
      return name.to_string();
    }
  }
  user.display_name.clone()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_tracker_timestamps_with_offset() {
    assert_eq!(
      rfc3339("2026-01-22T00:43:07.025+0900").map(|d| d.to_string()),
      Some("2026-01-22T00:43:07+09:00".to_string())
    );
    assert_eq!(
      datetime(Some("2026-01-22T00:43:07.025+0900")),
      "2026-01-22 00:43:07"
    );
    assert_eq!(short_datetime("2026-01-22T00:43:07+09:00"), "2026-01-22 00:43");
  }

  #[test]
  fn utc_suffix_is_accepted() {
    assert_eq!(
      rfc3339("2025-03-01T10:00:00Z").map(|d| d.to_string()),
      Some("2025-03-01T10:00:00+00:00".to_string())
    );
  }

  #[test]
  fn unparseable_timestamps_fall_back() {
    assert!(rfc3339("yesterday").is_none());
    assert_eq!(datetime(None), NOT_SET);
    assert_eq!(short_datetime("yesterday"), "yesterday");
    assert_eq!(datetime_or_raw(""), "");
  }

  #[test]
  fn due_dates_are_calendar_dates() {
    assert_eq!(date(Some("2025-01-31")).as_deref(), Some("2025-01-31"));
    assert_eq!(date(Some("31/01/2025")), None);
    assert_eq!(date(None), None);
  }

  #[test]
  fn hours_use_two_decimals() {
    assert_eq!(hours(5400), "1.50h");
    assert_eq!(hours(0), "0.00h");
  }

  #[test]
  fn icons_cover_known_types() {
    assert_eq!(issue_type_icon("Epic"), "🟣");
    assert_eq!(issue_type_icon("Subtask"), "➡️");
    assert_eq!(issue_type_icon("Spike"), "📄");
  }

  #[test]
  fn deleted_users_resolve_through_config() {
    let mut config = Config::default();
    config
      .deleted_users
      .insert("gone".to_string(), "Former Member".to_string());

    let deleted = User {
      account_id:   "gone".to_string(),
      display_name: "Former user".to_string(),
      account_type: "unknown".to_string(),
    };
    let active = User {
      account_id:   "here".to_string(),
      display_name: "Hanako".to_string(),
      account_type: "atlassian".to_string(),
    };

    assert_eq!(user_name(Some(&deleted), &config), "Former Member");
    assert_eq!(user_name(Some(&active), &config), "Hanako");
    assert_eq!(user_name(None, &config), NOT_SET);
  }
}
