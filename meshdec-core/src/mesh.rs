//! Indexed mesh data structure

use crate::point::*;
use serde::{Deserialize, Serialize};

/// A triangle surface stored as a point array plus index triples into it.
///
/// Readers append to both sequences in file order and never validate that
/// triangle indices fall inside `points`; see [`IndexedMesh::out_of_range_triangles`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexedMesh {
    pub points: Vec<Point3f>,
    pub triangles: Vec<IndexTriple>,
}

impl IndexedMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh from points and triangles
    pub fn from_parts(points: Vec<Point3f>, triangles: Vec<IndexTriple>) -> Self {
        Self { points, triangles }
    }

    /// Create a mesh with `vertex_count` origin points and `triangle_count`
    /// zeroed triangles, ready to be filled in place
    pub fn with_size(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            points: vec![Point3f::origin(); vertex_count],
            triangles: vec![IndexTriple::default(); triangle_count],
        }
    }

    /// Get the number of points
    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    /// Get the number of triangles
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() || self.triangles.is_empty()
    }

    /// Add a point to the mesh, returning its index
    pub fn add_point(&mut self, point: Point3f) -> usize {
        let index = self.points.len();
        self.points.push(point);
        index
    }

    /// Add a triangle to the mesh
    pub fn add_triangle(&mut self, triangle: IndexTriple) {
        self.triangles.push(triangle);
    }

    /// Positions of triangles referencing a point that does not exist
    pub fn out_of_range_triangles(&self) -> Vec<usize> {
        let vertex_count = self.points.len();
        self.triangles
            .iter()
            .enumerate()
            .filter(|(_, t)| t.to_usize(vertex_count).is_none())
            .map(|(i, _)| i)
            .collect()
    }

    /// Clear the mesh
    pub fn clear(&mut self) {
        self.points.clear();
        self.triangles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let mesh = IndexedMesh::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_with_size_zero_initializes() {
        let mesh = IndexedMesh::with_size(2, 3);
        assert_eq!(mesh.points, vec![Point3f::origin(); 2]);
        assert_eq!(mesh.triangles, vec![IndexTriple::new(0, 0, 0); 3]);
    }

    #[test]
    fn test_append_in_order() {
        let mut mesh = IndexedMesh::new();
        assert_eq!(mesh.add_point(Point3f::new(0.0, 0.0, 0.0)), 0);
        assert_eq!(mesh.add_point(Point3f::new(1.0, 0.0, 0.0)), 1);
        assert_eq!(mesh.add_point(Point3f::new(0.0, 1.0, 0.0)), 2);
        mesh.add_triangle(IndexTriple::new(0, 1, 2));

        assert!(!mesh.is_empty());
        assert_eq!(mesh.triangles[0], IndexTriple::new(0, 1, 2));
        assert!(mesh.out_of_range_triangles().is_empty());

        mesh.clear();
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_out_of_range_triangles_reported() {
        let mesh = IndexedMesh::from_parts(
            vec![Point3f::origin(), Point3f::new(1.0, 0.0, 0.0)],
            vec![IndexTriple::new(0, 1, 1), IndexTriple::new(0, 1, 2), IndexTriple::new(-1, 0, 1)],
        );
        assert_eq!(mesh.out_of_range_triangles(), vec![1, 2]);
    }
}
