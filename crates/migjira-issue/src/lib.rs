//! # migjira-issue
//!
//! The issue side of migjira: cached issue records as written by the fetcher,
//! custom field values decoded into a sum type, and the lookup tables
//! (users, attachments, field names) the markup converter and document writer
//! need.

pub mod cache;
pub mod custom_field;
pub mod error;
pub mod mapping;
pub mod record;
pub mod types;

pub use cache::FieldNameCache;
pub use custom_field::{CustomFieldValue, DevelopmentField, NOT_SET};
pub use error::IssueError;
pub use record::{IssueRecord, collect_record_files};
pub use types::{Issue, IssueFields, User};
