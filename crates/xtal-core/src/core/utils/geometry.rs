use nalgebra::{Point3, Vector3};

/// Axis-aligned Cartesian bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub minimum: Point3<f64>,
    pub maximum: Point3<f64>,
}

impl BoundingBox {
    /// Smallest box enclosing all points, or `None` for an empty input.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3<f64>>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(
            Self {
                minimum: first,
                maximum: first,
            },
            |bbox, p| Self {
                minimum: bbox.minimum.inf(p),
                maximum: bbox.maximum.sup(p),
            },
        ))
    }

    pub fn widths(&self) -> Vector3<f64> {
        self.maximum - self.minimum
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.minimum, &self.maximum)
    }
}

/// Wraps a single fractional coordinate into `[0, 1)`.
///
/// `x - floor(x)` rounds to exactly 1.0 for tiny negative inputs; those map to 0.0
/// so that wrapping an already wrapped value is a no-op.
#[inline]
pub fn wrap_unit(x: f64) -> f64 {
    let wrapped = x - x.floor();
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}

#[inline]
pub fn wrap_fractional(p: &Point3<f64>) -> Point3<f64> {
    Point3::new(wrap_unit(p.x), wrap_unit(p.y), wrap_unit(p.z))
}

/// Angle between two vectors in degrees, in `[0, 180]`.
pub fn bend_angle_degrees(v1: &Vector3<f64>, v2: &Vector3<f64>) -> Option<f64> {
    let denominator = v1.norm() * v2.norm();
    if denominator <= f64::EPSILON {
        return None;
    }
    let cosine = (v1.dot(v2) / denominator).clamp(-1.0, 1.0);
    Some(cosine.acos().to_degrees())
}
