//! # CWC Development Tools
//!
//! Command-line tools for development:
//! - Match configuration validator

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod validate;
