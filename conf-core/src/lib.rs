pub mod error;
pub mod file_system;

pub use error::{ConfError, Result};
