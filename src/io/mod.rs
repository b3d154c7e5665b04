//! Input/output helpers.
//!
//! - estimates export (CSV) (`export`)
//! - likelihood curve JSON read/write (`curve`)

pub mod curve;
pub mod export;

pub use curve::*;
pub use export::*;
