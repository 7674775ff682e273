//! Common types shared across the crate.

pub mod color;
pub mod error;
pub mod unit;

// Re-exports
pub use color::RGBColor;
pub use error::{Error, Result};
