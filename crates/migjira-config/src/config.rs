use std::{
  collections::HashMap,
  fs,
  path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, templates};

/// Default configuration file names, searched in order.
pub const CONFIG_FILENAMES: &[&str] = &[
  "migjira.toml",
  "migjira.json",
  ".config/migjira.toml",
  ".config/migjira.json",
];

/// Prefix every custom field id carries.
const CUSTOM_FIELD_PREFIX: &str = "customfield_";

/// Configuration for migjira.
///
/// Every field has a default, so an empty file (or no file at all) is a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Output locations.
  pub output: OutputConfig,

  /// What the rendered documents show.
  pub display: DisplayConfig,

  /// Display names for deleted accounts, keyed by account id.
  pub deleted_users: HashMap<String, String>,

  /// Number of worker threads for batch conversion.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub jobs: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
  /// Directory receiving `PROJECT/KEY.md` documents.
  pub markdown_dir: PathBuf,

  /// Directory holding downloaded attachments. Pages link only the stored
  /// names found here.
  pub attachments_dir: PathBuf,

  /// Directory holding cached issue records.
  pub json_dir: PathBuf,

  /// URL prefix for attachment references inside converted markup.
  pub attachments_url: String,
}

impl Default for OutputConfig {
  fn default() -> Self {
    Self {
      markdown_dir:    PathBuf::from("output/markdown"),
      attachments_dir: PathBuf::from("output/attachments"),
      json_dir:        PathBuf::from("output/json"),
      attachments_url: "/attachments".to_owned(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
  /// Custom field ids left out of the details list.
  pub hidden_custom_fields: Vec<String>,

  /// Custom field holding the issue rank.
  pub rank_field_id: String,

  /// Custom field holding the start date.
  pub start_date_field_id: String,
}

impl Default for DisplayConfig {
  fn default() -> Self {
    Self {
      hidden_custom_fields: Vec::new(),
      rank_field_id:        "customfield_10019".to_owned(),
      start_date_field_id:  "customfield_10015".to_owned(),
    }
  }
}

impl DisplayConfig {
  /// Whether `field_id` is hidden from the details list.
  #[must_use]
  pub fn is_hidden(&self, field_id: &str) -> bool {
    self.hidden_custom_fields.iter().any(|id| id == field_id)
  }
}

impl Default for Config {
  fn default() -> Self {
    Self {
      output:        OutputConfig::default(),
      display:       DisplayConfig::default(),
      deleted_users: HashMap::new(),
      jobs:          None,
    }
  }
}

impl Config {
  /// Load configuration from a TOML or JSON file, chosen by extension.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content =
      fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
      })?;

    let extension = path
      .extension()
      .and_then(|ext| ext.to_str())
      .map(str::to_lowercase);
    match extension.as_deref() {
      Some("toml") => {
        toml::from_str(&content).map_err(|source| ConfigError::Toml {
          path: path.to_path_buf(),
          source,
        })
      },
      Some("json") => {
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
          path: path.to_path_buf(),
          source,
        })
      },
      _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    }
  }

  /// Load the explicitly given file, else a discovered one, else defaults.
  ///
  /// Validation is left to the caller so CLI values can be merged first.
  ///
  /// # Errors
  ///
  /// Returns an error if the chosen file cannot be loaded.
  pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
    if let Some(path) = config_file {
      return Self::from_file(path);
    }

    let Ok(current_dir) = std::env::current_dir() else {
      return Ok(Self::default());
    };
    match Self::find_config_file(&current_dir) {
      Some(discovered) => {
        log::info!("Using discovered config file: {}", discovered.display());
        Self::from_file(&discovered)
      },
      None => {
        log::debug!("No config file found, using defaults");
        Ok(Self::default())
      },
    }
  }

  /// Search `dir` for one of the [`CONFIG_FILENAMES`].
  #[must_use]
  pub fn find_config_file(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
      .iter()
      .map(|name| dir.join(name))
      .find(|path| path.is_file())
  }

  /// Apply values given on the command line. Anything not given keeps the
  /// file's value.
  pub fn merge_with_cli(&mut self, output: Option<&Path>, jobs: Option<usize>) {
    if let Some(output) = output {
      self.output.markdown_dir = output.to_path_buf();
    }
    if jobs.is_some() {
      self.jobs = jobs;
    }
  }

  /// Apply `KEY=VALUE` overrides, where KEY is a dotted field path such as
  /// `output.attachments_url`.
  ///
  /// # Errors
  ///
  /// Returns an error for malformed overrides, unknown keys and values that do
  /// not parse as the field's type.
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;
      self.apply_override(key.trim(), value.trim())?;
    }
    Ok(())
  }

  fn apply_override(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
      "jobs" => {
        self.jobs = if value.is_empty() {
          None
        } else {
          Some(value.parse().map_err(|e| {
            ConfigError::Config(format!("Invalid value for '{key}': {e}"))
          })?)
        };
      },
      "output.markdown_dir" => self.output.markdown_dir = PathBuf::from(value),
      "output.attachments_dir" => {
        self.output.attachments_dir = PathBuf::from(value);
      },
      "output.json_dir" => self.output.json_dir = PathBuf::from(value),
      "output.attachments_url" => value.clone_into(&mut self.output.attachments_url),
      "display.rank_field_id" => value.clone_into(&mut self.display.rank_field_id),
      "display.start_date_field_id" => {
        value.clone_into(&mut self.display.start_date_field_id);
      },
      "display.hidden_custom_fields" => {
        self.display.hidden_custom_fields = value
          .split(',')
          .map(str::trim)
          .filter(|id| !id.is_empty())
          .map(str::to_owned)
          .collect();
      },
      _ => {
        if let Some(account_id) = key.strip_prefix("deleted_users.") {
          self
            .deleted_users
            .insert(account_id.to_owned(), value.to_owned());
        } else {
          return Err(ConfigError::Config(format!(
            "Unknown configuration key: '{key}'"
          )));
        }
      },
    }
    Ok(())
  }

  /// Check the merged configuration for values that cannot work.
  ///
  /// # Errors
  ///
  /// Returns every problem found, one per line.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    for (name, dir) in [
      ("output.markdown_dir", &self.output.markdown_dir),
      ("output.attachments_dir", &self.output.attachments_dir),
      ("output.json_dir", &self.output.json_dir),
    ] {
      if dir.as_os_str().is_empty() {
        errors.push(format!("{name} must not be empty"));
      }
    }

    if self.jobs == Some(0) {
      errors.push("jobs must be at least 1".to_owned());
    }

    let field_ids = [
      &self.display.rank_field_id,
      &self.display.start_date_field_id,
    ]
    .into_iter()
    .chain(&self.display.hidden_custom_fields);
    for id in field_ids {
      if !id.starts_with(CUSTOM_FIELD_PREFIX) {
        errors.push(format!(
          "Custom field id '{id}' must start with '{CUSTOM_FIELD_PREFIX}'"
        ));
      }
    }

    if !errors.is_empty() {
      return Err(ConfigError::Config(format!(
        "Configuration validation errors:\n{}",
        errors.join("\n")
      )));
    }
    Ok(())
  }

  /// Display name configured for a deleted account.
  #[must_use]
  pub fn deleted_user_name(&self, account_id: &str) -> Option<&str> {
    self.deleted_users.get(account_id).map(String::as_str)
  }

  /// Write a default configuration file with commented explanations.
  ///
  /// # Errors
  ///
  /// Returns an error if the format is unsupported or the file cannot be
  /// written.
  pub fn generate_default_config(
    format: &str,
    path: &Path,
  ) -> Result<(), ConfigError> {
    let content = templates::get_template(format)?;
    fs::write(path, content).map_err(|source| ConfigError::Write {
      path: path.to_path_buf(),
      source,
    })?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }
}
