//! Common utilities for the nav-route toolkit

pub mod error;

pub use error::{suggest_correction, Error, Result};
