//! Lookup tables the markup converter reads.
use migjira_markup::{AttachmentMap, UserMapping};

use crate::types::{Issue, User};

fn record_user(mapping: &mut UserMapping, user: &User) {
  if !user.account_id.is_empty() {
    mapping.insert(user.account_id.clone(), user.display_name.clone());
  }
}

/// Add every user named on `issue` to `mapping`: reporter, assignee, comment
/// authors and changelog authors. Later entries win.
pub fn extend_user_mapping(mapping: &mut UserMapping, issue: &Issue) {
  let fields = &issue.fields;
  let comment_authors = fields.comment_list().iter().filter_map(|c| c.author.as_ref());
  let history_authors = issue
    .changelog
    .iter()
    .flat_map(|changelog| &changelog.histories)
    .filter_map(|history| history.author.as_ref());

  fields
    .reporter
    .iter()
    .chain(&fields.assignee)
    .chain(comment_authors)
    .chain(history_authors)
    .for_each(|user| record_user(mapping, user));
}

/// Build a user mapping across `issues`.
#[must_use]
pub fn build_user_mapping<'a, I>(issues: I) -> UserMapping
where
  I: IntoIterator<Item = &'a Issue>,
{
  let mut mapping = UserMapping::new();
  for issue in issues {
    extend_user_mapping(&mut mapping, issue);
  }
  mapping
}

/// Make an attachment filename safe to store on disk.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
  filename
    .replace(['/', '\\'], "_")
    .replace("..", "_")
    .replace(':', "_")
}

/// Name an attachment of `issue_key` is stored under.
#[must_use]
pub fn stored_attachment_name(issue_key: &str, filename: &str) -> String {
  format!("{issue_key}_{}", sanitize_filename(filename))
}

/// Stored names for every attachment of `issue`, in attachment order.
#[must_use]
pub fn stored_attachment_names(issue: &Issue) -> Vec<String> {
  issue
    .fields
    .attachments
    .iter()
    .map(|attachment| stored_attachment_name(&issue.key, &attachment.filename))
    .collect()
}

/// Pair the issue's attachment list with `stored` names position by
/// position. Attachments past the end of `stored` are left out.
#[must_use]
pub fn build_attachment_map(issue: &Issue, stored: &[String]) -> AttachmentMap {
  issue
    .fields
    .attachments
    .iter()
    .zip(stored)
    .map(|(attachment, stored)| (attachment.filename.clone(), stored.clone()))
    .collect()
}
