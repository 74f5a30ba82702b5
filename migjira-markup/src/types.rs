//! Lookup tables and options consumed by the converter.
use std::collections::HashMap;

/// Account id to display name, for `[~accountid:...]` mentions.
pub type UserMapping = HashMap<String, String>;

/// Original attachment filename to the filename it was stored under.
pub type AttachmentMap = HashMap<String, String>;

/// Default URL prefix for attachment references.
pub const DEFAULT_ATTACHMENT_URL: &str = "/attachments";

/// Options for [`crate::Converter`].
#[derive(Debug, Clone)]
pub struct ConverterOptions {
  /// URL prefix that stored attachment names are appended to.
  pub attachment_url: String,

  /// Append a two-space hard break to every non-empty line that is followed
  /// by a newline.
  pub hard_breaks: bool,
}

impl Default for ConverterOptions {
  fn default() -> Self {
    Self {
      attachment_url: DEFAULT_ATTACHMENT_URL.to_owned(),
      hard_breaks:    true,
    }
  }
}

impl ConverterOptions {
  #[must_use]
  pub fn with_attachment_url(mut self, url: impl Into<String>) -> Self {
    self.attachment_url = url.into();
    self
  }

  #[must_use]
  pub const fn with_hard_breaks(mut self, hard_breaks: bool) -> Self {
    self.hard_breaks = hard_breaks;
    self
  }
}
