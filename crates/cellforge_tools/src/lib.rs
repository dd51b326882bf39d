//! # Cellforge Development Tools
//!
//! Command-line tools for development:
//! - Crater painting into the sandbox world
//! - Placement strategy runs
//! - Config and policy validators

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod load;
pub mod paint;
pub mod place;
pub mod validate;
