use super::error::ModelError;
use crate::core::utils::geometry::BoundingBox;
use nalgebra::{Matrix3, Point3, Vector3};

pub const DEFAULT_PRECISION: f64 = 1e-3;

const DEGENERATE_WIDTH: f64 = 1e-8;

/// A periodic unit cell and the geometry derived from it.
///
/// The unit-cell matrix holds the lattice vectors `a`, `b`, `c` as columns, so that
/// `cartesian = unit_cell * fractional`. The replica range only affects visualization
/// (bounding box) and the supercell transform; the content shift and flip are applied
/// by the content-shift transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    unit_cell: Matrix3<f64>,
    inverse_unit_cell: Matrix3<f64>,
    /// Lowest replica index along each axis (inclusive).
    pub minimum_replica: [i32; 3],
    /// Highest replica index along each axis (inclusive).
    pub maximum_replica: [i32; 3],
    /// Fractional translation applied by the content-shift transform.
    pub content_shift: Vector3<f64>,
    /// Axes mirrored by the content-shift transform.
    pub content_flip: [bool; 3],
    /// Numeric tolerance handed to symmetry collaborators.
    pub precision: f64,
}

impl Default for Cell {
    fn default() -> Self {
        let unit_cell = Matrix3::from_diagonal_element(20.0);
        Self::with_matrices(unit_cell, Matrix3::from_diagonal_element(1.0 / 20.0))
    }
}

impl Cell {
    fn with_matrices(unit_cell: Matrix3<f64>, inverse_unit_cell: Matrix3<f64>) -> Self {
        Self {
            unit_cell,
            inverse_unit_cell,
            minimum_replica: [0; 3],
            maximum_replica: [0; 3],
            content_shift: Vector3::zeros(),
            content_flip: [false; 3],
            precision: DEFAULT_PRECISION,
        }
    }

    /// Builds a cell from lattice parameters.
    ///
    /// `a` lies along x and `b` in the xy-plane.
    ///
    /// # Arguments
    ///
    /// * `lengths` - The lattice lengths `a`, `b`, `c` in Angstroms.
    /// * `angles` - The lattice angles `alpha`, `beta`, `gamma` in degrees.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidLattice`] for non-positive lengths or angles that do
    /// not describe a cell with positive volume.
    pub fn from_parameters(lengths: [f64; 3], angles: [f64; 3]) -> Result<Self, ModelError> {
        let [a, b, c] = lengths;
        if lengths.iter().any(|&l| !(l > 0.0) || !l.is_finite()) {
            return Err(ModelError::InvalidLattice(format!(
                "lengths must be positive, got {lengths:?}"
            )));
        }
        let [alpha, beta, gamma] = angles.map(f64::to_radians);
        let sin_gamma = gamma.sin();
        if sin_gamma.abs() < DEGENERATE_WIDTH {
            return Err(ModelError::InvalidLattice(format!(
                "gamma of {} degrees collapses the ab-plane",
                angles[2]
            )));
        }

        let cx = beta.cos();
        let cy = (alpha.cos() - beta.cos() * gamma.cos()) / sin_gamma;
        let cz_squared = 1.0 - cx * cx - cy * cy;
        if !(cz_squared > 0.0) {
            return Err(ModelError::InvalidLattice(format!(
                "angles {angles:?} do not form a cell with positive volume"
            )));
        }

        let unit_cell = Matrix3::new(
            a, b * gamma.cos(), c * cx,
            0.0, b * sin_gamma, c * cy,
            0.0, 0.0, c * cz_squared.sqrt(),
        );
        Self::from_matrix(unit_cell)
    }

    /// Builds a cell from a unit-cell matrix whose columns are the lattice vectors.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::SingularCell`] if the matrix cannot be inverted.
    pub fn from_matrix(unit_cell: Matrix3<f64>) -> Result<Self, ModelError> {
        let volume = unit_cell.determinant().abs();
        if volume < DEGENERATE_WIDTH {
            return Err(ModelError::SingularCell { volume });
        }
        let inverse_unit_cell = unit_cell
            .try_inverse()
            .ok_or(ModelError::SingularCell { volume })?;
        Ok(Self::with_matrices(unit_cell, inverse_unit_cell))
    }

    /// Orthorhombic cell with edge lengths `a`, `b`, `c`.
    pub fn orthorhombic(a: f64, b: f64, c: f64) -> Result<Self, ModelError> {
        Self::from_parameters([a, b, c], [90.0, 90.0, 90.0])
    }

    pub fn cubic(a: f64) -> Result<Self, ModelError> {
        Self::orthorhombic(a, a, a)
    }

    pub fn unit_cell(&self) -> &Matrix3<f64> {
        &self.unit_cell
    }

    pub fn inverse_unit_cell(&self) -> &Matrix3<f64> {
        &self.inverse_unit_cell
    }

    /// Lattice vector `axis` (0 = a, 1 = b, 2 = c).
    pub fn lattice_vector(&self, axis: usize) -> Vector3<f64> {
        self.unit_cell.column(axis).into_owned()
    }

    /// Lattice lengths `a`, `b`, `c`.
    pub fn lengths(&self) -> [f64; 3] {
        [0, 1, 2].map(|axis| self.lattice_vector(axis).norm())
    }

    /// Lattice angles `alpha`, `beta`, `gamma` in degrees.
    pub fn angles(&self) -> [f64; 3] {
        let [a, b, c] = [0, 1, 2].map(|axis| self.lattice_vector(axis));
        [b.angle(&c), c.angle(&a), a.angle(&b)].map(f64::to_degrees)
    }

    pub fn volume(&self) -> f64 {
        self.unit_cell.determinant().abs()
    }

    #[inline]
    pub fn to_cartesian(&self, fractional: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.unit_cell * fractional.coords)
    }

    #[inline]
    pub fn to_fractional(&self, cartesian: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.inverse_unit_cell * cartesian.coords)
    }

    /// Shortest periodic-equivalent of a fractional displacement.
    #[inline]
    pub fn minimum_image_fractional(&self, displacement: &Vector3<f64>) -> Vector3<f64> {
        displacement - displacement.map(f64::round)
    }

    /// Shortest periodic-equivalent of a Cartesian displacement.
    #[inline]
    pub fn minimum_image(&self, displacement: &Vector3<f64>) -> Vector3<f64> {
        let fractional = self.inverse_unit_cell * displacement;
        self.unit_cell * self.minimum_image_fractional(&fractional)
    }

    /// Thickness of the cell measured along each reciprocal normal.
    ///
    /// Width `i` is the distance between the two cell faces spanned by the other two
    /// lattice vectors.
    pub fn perpendicular_widths(&self) -> Vector3<f64> {
        let [a, b, c] = [0, 1, 2].map(|axis| self.lattice_vector(axis));
        let volume = self.volume();
        let width = |face: Vector3<f64>| {
            let area = face.norm();
            if area > 0.0 { volume / area } else { 0.0 }
        };
        Vector3::new(width(b.cross(&c)), width(c.cross(&a)), width(a.cross(&b)))
    }

    /// True when any perpendicular width collapses to zero.
    pub fn is_degenerate(&self) -> bool {
        self.perpendicular_widths()
            .iter()
            .any(|&w| w < DEGENERATE_WIDTH)
    }

    /// Number of cell images along each axis covered by the replica range.
    pub fn number_of_replicas(&self) -> [i32; 3] {
        [0, 1, 2].map(|axis| self.maximum_replica[axis] - self.minimum_replica[axis] + 1)
    }

    pub fn set_replicas(&mut self, minimum: [i32; 3], maximum: [i32; 3]) {
        for axis in 0..3 {
            self.minimum_replica[axis] = minimum[axis].min(maximum[axis]);
            self.maximum_replica[axis] = minimum[axis].max(maximum[axis]);
        }
    }

    /// Bounding box of the eight corners of the replicated cell.
    pub fn bounding_box(&self) -> BoundingBox {
        let lower = self.minimum_replica.map(f64::from);
        let upper = self.maximum_replica.map(|m| f64::from(m + 1));
        let corners: Vec<Point3<f64>> = (0..8)
            .map(|corner| {
                let pick = |axis: usize| {
                    if corner & (1 << axis) == 0 {
                        lower[axis]
                    } else {
                        upper[axis]
                    }
                };
                self.to_cartesian(&Point3::new(pick(0), pick(1), pick(2)))
            })
            .collect();
        BoundingBox::from_points(&corners).unwrap_or(BoundingBox {
            minimum: Point3::origin(),
            maximum: Point3::origin(),
        })
    }

    /// True when the content-shift transform would change anything.
    pub fn has_content_shift(&self) -> bool {
        self.content_shift.iter().any(|s| s.abs() > f64::EPSILON)
            || self.content_flip.iter().any(|&f| f)
    }

    /// Applies the configured flip and shift to a fractional position.
    pub fn apply_content_shift(&self, fractional: &Point3<f64>) -> Point3<f64> {
        let mut shifted = *fractional;
        for axis in 0..3 {
            if self.content_flip[axis] {
                shifted[axis] = -shifted[axis];
            }
        }
        shifted + self.content_shift
    }

    /// The cell enlarged by `factors` along each lattice vector.
    ///
    /// The result has a single replica and no content shift or flip.
    pub fn scaled(&self, factors: [i32; 3]) -> Result<Self, ModelError> {
        let mut unit_cell = self.unit_cell;
        for (axis, &factor) in factors.iter().enumerate() {
            if factor < 1 {
                return Err(ModelError::InvalidLattice(format!(
                    "supercell factor {factor} along axis {axis} must be positive"
                )));
            }
            unit_cell.set_column(axis, &(self.lattice_vector(axis) * f64::from(factor)));
        }
        let mut scaled = Self::from_matrix(unit_cell)?;
        scaled.precision = self.precision;
        Ok(scaled)
    }
}
