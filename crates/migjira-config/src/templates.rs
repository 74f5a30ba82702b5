use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
  /// The requested configuration format is not supported.
  #[error("Unsupported config format: {0}")]
  UnsupportedFormat(String),
}

/// Default configuration in TOML, commented so a fresh `init` is
/// self-explanatory. Values match [`crate::Config::default`].
pub const DEFAULT_TOML_TEMPLATE: &str = r#"# migjira configuration file

# Number of worker threads for batch conversion (defaults to number of CPU cores)
# jobs = 4

[output]
# Directory that receives one Markdown file per issue, grouped by project
markdown_dir = "output/markdown"

# Directory holding downloaded attachments. Only files present here are
# linked from issue pages
attachments_dir = "output/attachments"

# Directory holding cached issue JSON records
json_dir = "output/json"

# URL prefix used when rewriting !image! references in converted markup
attachments_url = "/attachments"

[display]
# Custom field ids left out of the details list
hidden_custom_fields = []

# Custom field holding the issue rank, written to front matter as `rank`
rank_field_id = "customfield_10019"

# Custom field holding the start date, written to front matter as `startdate`
start_date_field_id = "customfield_10015"

# Display names for users whose accounts have been deleted, keyed by account id
[deleted_users]
# "557058:f0000000-0000-0000-0000-000000000000" = "Former Employee"
"#;

/// Default configuration in JSON.
pub const DEFAULT_JSON_TEMPLATE: &str = r#"{
  "output": {
    "markdown_dir": "output/markdown",
    "attachments_dir": "output/attachments",
    "json_dir": "output/json",
    "attachments_url": "/attachments"
  },
  "display": {
    "hidden_custom_fields": [],
    "rank_field_id": "customfield_10019",
    "start_date_field_id": "customfield_10015"
  },
  "deleted_users": {}
}
"#;

/// Get the default configuration template for `format` (`toml` or `json`).
///
/// # Errors
///
/// Returns [`TemplateError::UnsupportedFormat`] for any other format.
pub fn get_template(format: &str) -> Result<&'static str, TemplateError> {
  match format.to_lowercase().as_str() {
    "toml" => Ok(DEFAULT_TOML_TEMPLATE),
    "json" => Ok(DEFAULT_JSON_TEMPLATE),
    _ => Err(TemplateError::UnsupportedFormat(format.to_owned())),
  }
}
