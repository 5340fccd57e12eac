use std::fmt::{self, Display, Formatter};
use thiserror::Error;

/// Failures that can escape loading or saving a configuration file.
///
/// Lookups never produce one of these: a missing key is reported as `None`,
/// and lines that do not parse are kept as opaque text.
#[derive(Error, Debug)]
pub enum ConfError {
    Io(#[from] std::io::Error),
    Filesystem(String),
}

impl Display for ConfError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            ConfError::Io(e) => write!(f, "I/O error: {}", e),
            ConfError::Filesystem(s) => write!(f, "Filesystem error: {}", s),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfError>;
