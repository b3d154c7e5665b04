//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the validated `Sample` and point `Estimate`
//! - grid and curve types for the likelihood surface
//! - configuration enums (`OptimMethod`, `GridSpacing`, `SamplerKind`, ...)
//! - the serializable `CurveFile`

pub mod types;

pub use types::*;
