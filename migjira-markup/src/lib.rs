//! # migjira-markup
//!
//! Converts Jira wiki markup into Markdown suitable for static-site
//! generators.
//!
//! ## Quick Start
//!
//! ```rust
//! use migjira_markup::{AttachmentMap, Converter, UserMapping};
//!
//! let users = UserMapping::from([("abc".to_owned(), "Taro".to_owned())]);
//! let attachments = AttachmentMap::new();
//! let converter = Converter::new(&users, &attachments);
//!
//! let markdown = converter.convert("h1. Title\n* *bold* item [~accountid:abc]");
//! assert_eq!(
//!   markdown,
//!   "# Title  \n- **bold** item <span class=\"mention\">@Taro</span>"
//! );
//! ```
//!
//! ## Pipeline
//!
//! Conversion is a fixed sequence of regex passes. Passes that share
//! delimiter characters are kept apart with a placeholder [`vault::Vault`]:
//! code is rendered and parked first, mentions are parked until the
//! decorations are done, headings are parked around the list
//! pass, and list markers and URLs are parked around the decoration passes.
//!
//! 1. code, noformat and inline code ([`code`])
//! 2. attachment references ([`links`])
//! 3. block macros ([`macros`])
//! 4. tables ([`tables`])
//! 5. mentions and piped links ([`links`])
//! 6. headings and lists ([`blocks`])
//! 7. bold, italic, strikethrough, superscript, subscript ([`inline`])
//! 8. hard line breaks
//!
//! Every pass is fail-open: markup that does not match its pattern is left as
//! literal text.

pub mod blocks;
pub mod code;
mod converter;
pub mod inline;
pub mod links;
pub mod macros;
pub mod tables;
mod types;
pub mod utils;
pub mod vault;

pub use crate::{
  converter::{Converter, add_hard_breaks, convert},
  types::{AttachmentMap, ConverterOptions, DEFAULT_ATTACHMENT_URL, UserMapping},
};
