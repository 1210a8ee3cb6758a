//! # Stance-Core
//!
//! Core types for the stance engine: COCO-17 joint frames, body orientation,
//! joint-angle geometry and the calibrated reference patterns that live
//! postures are scored against.

pub mod error;
pub mod geometry;
pub mod pattern;
pub mod types;

pub use error::{Error, Result};
pub use geometry::*;
pub use pattern::*;
pub use types::*;
