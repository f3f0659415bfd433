//! Core traits for meshdec

use crate::{mesh::IndexedMesh, point::*};

/// Trait for objects with a spatial extent
pub trait Drawable {
    /// Get the bounding box of the object
    fn bounding_box(&self) -> (Point3f, Point3f);

    /// Get the center point of the object
    fn center(&self) -> Point3f {
        let (min, max) = self.bounding_box();
        Point3f::new(
            (min.x + max.x) / 2.0,
            (min.y + max.y) / 2.0,
            (min.z + max.z) / 2.0,
        )
    }

    /// Length of the bounding box diagonal
    fn diagonal(&self) -> Float {
        let (min, max) = self.bounding_box();
        (max - min).norm()
    }
}

impl Drawable for IndexedMesh {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        if self.points.is_empty() {
            return (Point3f::origin(), Point3f::origin());
        }

        let mut min = self.points[0];
        let mut max = self.points[0];

        for point in &self.points {
            min.x = min.x.min(point.x);
            min.y = min.y.min(point.y);
            min.z = min.z.min(point.z);

            max.x = max.x.max(point.x);
            max.y = max.y.max(point.y);
            max.z = max.z.max(point.z);
        }

        (min, max)
    }
}
