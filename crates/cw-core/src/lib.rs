//! # cw-core
//!
//! Shared vocabulary for the COVID simulation web app: the error type,
//! the declarative parameter schema model and the flat numeric parameter
//! map handed to simulation engines.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{FlatParameters, ParameterGroup, ParameterSpec};

/// Crate version of the web app workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
