//! Core data structures for meshdec
//!
//! This crate provides the indexed triangle mesh consumed by the readers,
//! writers and decimation engine: point and index-triple types, the mesh
//! container itself, and the shared error type.

pub mod point;
pub mod mesh;
pub mod traits;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};
