//! Mesh decimation
//!
//! This crate defines the interface the decimation pipeline drives
//! ([`MeshDecimationEngine`]) and an implementation of it based on
//! quadric-error-metric edge collapse ([`EdgeCollapseDecimator`]).

pub mod edge_collapse;

pub use edge_collapse::*;

use meshdec_core::{Float, IndexTriple, Point3f, Result};

/// Receives informational progress text from an engine.
///
/// Called synchronously from inside [`MeshDecimationEngine::decimate`], so it
/// must return quickly.
pub type ProgressCallback = Box<dyn FnMut(&str)>;

/// A polygon-reduction engine operating on an indexed triangle mesh.
///
/// The call sequence is `initialize`, `decimate`, then the result queries.
/// The engine reads the caller's buffers only during `initialize` and keeps
/// its own copy afterwards.
pub trait MeshDecimationEngine {
    /// Install the progress callback, replacing any previous one
    fn register_callback(&mut self, callback: ProgressCallback);

    /// Load the mesh to decimate
    fn initialize(&mut self, points: &[Point3f], triangles: &[IndexTriple]) -> Result<()>;

    /// Collapse edges until either count target is reached or the next
    /// collapse would introduce more than `max_error` geometric error
    fn decimate(
        &mut self,
        target_vertex_count: usize,
        target_triangle_count: usize,
        max_error: Float,
    ) -> Result<()>;

    /// Vertex count of the decimated mesh
    fn result_vertex_count(&self) -> usize;

    /// Triangle count of the decimated mesh
    fn result_triangle_count(&self) -> usize;

    /// Copy the decimated mesh into caller buffers sized to the result counts
    fn extract_result(&self, out_points: &mut [Point3f], out_triangles: &mut [IndexTriple]) -> Result<()>;
}
