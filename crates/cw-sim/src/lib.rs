//! # cw-sim
//!
//! Seeded agent-based SEIR model with deaths, driven by a flat numeric
//! parameter map. The web app constructs a [`Sim`] with defaults, applies
//! user overrides, runs it and asks it for a multi-panel figure.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod parameters;
pub mod people;
pub mod plotting;
pub mod results;
pub mod sim;

pub use parameters::{make_pars, Parameters};
pub use results::{Results, Summary};
pub use sim::Sim;

/// Engine version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Release date of [`VERSION`].
pub const VERSION_DATE: &str = "2026-10-16";
