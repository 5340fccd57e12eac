//! Formatting-preserving reader/editor for `key = value` configuration files.
//!
//! This library loads a human-authored config file as a list of raw lines and
//! lets callers read, set, comment and uncomment keys without disturbing
//! anything else: comments, blank lines, indentation and unrelated lines are
//! written back exactly as they were read.
//!
//! ## Main Features
//! - Line-oriented `key = value` grammar with `#` comment markers
//! - Get/set/comment/uncomment on the first matching line
//! - Loading from readers, strings and paths; saving to writers and paths
//! - The `conf-edit` command-line tool built on the same API

pub mod cli;
pub mod line;
pub mod store;

pub use line::{ConfLine, Entry};
pub use store::LineStore;

pub use conf_core::error::{ConfError, Result};
