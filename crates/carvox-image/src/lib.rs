#![deny(missing_docs)]
//! Image types for the carvox reconstruction crates.

/// image representation for computer vision purposes.
pub mod image;

/// Error types for the image module.
pub mod error;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
