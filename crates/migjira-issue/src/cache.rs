use std::collections::HashMap;

use crate::types::{CUSTOM_FIELD_PREFIX, FieldMeta};

/// Custom field id to human name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldNameCache {
  names: HashMap<String, String>,
}

impl FieldNameCache {
  #[must_use]
  pub fn new(fields: &[FieldMeta]) -> Self {
    Self {
      names: fields
        .iter()
        .map(|field| (field.id.clone(), field.name.clone()))
        .collect(),
    }
  }

  /// The field's name, or a readable fallback built from its id.
  #[must_use]
  pub fn field_name(&self, field_id: &str) -> String {
    match self.names.get(field_id) {
      Some(name) if !name.is_empty() => name.clone(),
      _ => fallback_field_name(field_id),
    }
  }
}

/// `customfield_10001` becomes `Custom field 10001`; other ids are returned
/// unchanged.
#[must_use]
pub fn fallback_field_name(field_id: &str) -> String {
  field_id
    .strip_prefix(CUSTOM_FIELD_PREFIX)
    .map_or_else(|| field_id.to_owned(), |id| format!("Custom field {id}"))
}
