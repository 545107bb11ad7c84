//! Core traits for lodcrate

use crate::{mesh::*, point::*, transform::Transform3D};

/// Trait for drawable/renderable objects
pub trait Drawable {
    /// Get the bounding box of the object
    fn bounding_box(&self) -> (Point3f, Point3f);

    /// Get the center point of the object
    fn center(&self) -> Point3f {
        let (min, max) = self.bounding_box();
        nalgebra::center(&min, &max)
    }
}

/// Trait for objects that can be transformed
pub trait Transformable {
    /// Apply a transformation to the object
    fn transform(&mut self, transform: &Transform3D);
}

impl Drawable for TriangleMesh {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        let Some(&first) = self.vertices.first() else {
            return (Point3f::origin(), Point3f::origin());
        };

        self.vertices.iter().fold((first, first), |(min, max), v| {
            (min.inf(v), max.sup(v))
        })
    }
}

impl Transformable for TriangleMesh {
    fn transform(&mut self, transform: &Transform3D) {
        for vertex in &mut self.vertices {
            *vertex = transform.transform_point(vertex);
        }
        if let Some(ref mut normals) = self.normals {
            for normal in normals.iter_mut() {
                *normal = transform.transform_normal(normal);
            }
        }
        if let Some(ref mut tangents) = self.tangents {
            for tangent in tangents.iter_mut() {
                let mapped = transform.transform_vector(&tangent.vector);
                tangent.vector = mapped.try_normalize(1e-12).unwrap_or(tangent.vector);
            }
        }
    }
}
