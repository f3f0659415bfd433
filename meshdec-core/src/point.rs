//! Point and index-triple types

use std::fmt;
use std::ops::{Index, IndexMut};

use bytemuck::{Pod, Zeroable};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Scalar type used for mesh coordinates
pub type Float = f32;

/// A 3D point with floating point coordinates
pub type Point3f = Point3<Float>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<Float>;

/// Three vertex indices describing one triangle.
///
/// Indices are 0-based and signed: readers store what the file says without
/// bounds checking, so a malformed file can yield negative or out-of-range
/// values that later stages must reject. Components are addressable
/// positionally (`t[0]`) or by axis name (`t.x()`), like [`Point3f`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct IndexTriple(pub [i32; 3]);

impl IndexTriple {
    pub const fn new(i: i32, j: i32, k: i32) -> Self {
        Self([i, j, k])
    }

    pub fn x(&self) -> i32 {
        self.0[0]
    }

    pub fn y(&self) -> i32 {
        self.0[1]
    }

    pub fn z(&self) -> i32 {
        self.0[2]
    }

    pub fn x_mut(&mut self) -> &mut i32 {
        &mut self.0[0]
    }

    pub fn y_mut(&mut self) -> &mut i32 {
        &mut self.0[1]
    }

    pub fn z_mut(&mut self) -> &mut i32 {
        &mut self.0[2]
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.0.iter().copied()
    }

    /// True when two corners share an index (OFF placeholders are `(0, 0, 0)`)
    pub fn is_degenerate(&self) -> bool {
        let [i, j, k] = self.0;
        i == j || j == k || k == i
    }

    /// Convert to unsigned indices if every component lies in `[0, vertex_count)`
    pub fn to_usize(&self, vertex_count: usize) -> Option<[usize; 3]> {
        let mut out = [0usize; 3];
        for (slot, &index) in out.iter_mut().zip(self.0.iter()) {
            let index = usize::try_from(index).ok()?;
            if index >= vertex_count {
                return None;
            }
            *slot = index;
        }
        Some(out)
    }
}

impl Index<usize> for IndexTriple {
    type Output = i32;

    fn index(&self, index: usize) -> &i32 {
        &self.0[index]
    }
}

impl IndexMut<usize> for IndexTriple {
    fn index_mut(&mut self, index: usize) -> &mut i32 {
        &mut self.0[index]
    }
}

impl From<[i32; 3]> for IndexTriple {
    fn from(indices: [i32; 3]) -> Self {
        Self(indices)
    }
}

impl From<IndexTriple> for [i32; 3] {
    fn from(triple: IndexTriple) -> Self {
        triple.0
    }
}

impl fmt::Display for IndexTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.0[0], self.0[1], self.0[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_and_named_access_alias() {
        let mut t = IndexTriple::new(4, 5, 6);
        assert_eq!(t[0], t.x());
        assert_eq!(t[1], t.y());
        assert_eq!(t[2], t.z());

        t[1] = 9;
        assert_eq!(t.y(), 9);
        *t.z_mut() = 11;
        assert_eq!(t[2], 11);
    }

    #[test]
    fn test_point_positional_access() {
        let p = Point3f::new(1.0, 2.0, 3.0);
        assert_eq!(p[0], p.x);
        assert_eq!(p[2], p.z);
    }

    #[test]
    fn test_default_is_zero_placeholder() {
        let t = IndexTriple::default();
        assert_eq!(t, IndexTriple::new(0, 0, 0));
        assert!(t.is_degenerate());
        assert!(!IndexTriple::new(0, 1, 2).is_degenerate());
    }

    #[test]
    fn test_to_usize_bounds() {
        assert_eq!(IndexTriple::new(0, 1, 2).to_usize(3), Some([0, 1, 2]));
        assert_eq!(IndexTriple::new(0, 1, 3).to_usize(3), None);
        assert_eq!(IndexTriple::new(-1, 1, 2).to_usize(3), None);
    }
}
