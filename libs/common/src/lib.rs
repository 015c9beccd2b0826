//! Shared support library for the RF ring gateway
//!
//! Provides the pieces every binary in the workspace needs at startup:
//! - logging initialisation (console + optional daily file output)
//! - the basic error type used by that plumbing

pub mod error;
pub mod logging;

pub use error::{Error, Result};
