use super::SymmetryError;
use super::operation::SymmetryOperation;
use nalgebra::Point3;

/// The external orbit function consumed by symmetry expansion.
///
/// Implementations must be pure: the same fractional position always yields the same
/// images in the same order. A zero-length result is a legal degenerate case.
pub trait OrbitProvider {
    fn orbit(&self, fractional: &Point3<f64>) -> Vec<Point3<f64>>;
}

/// A space group represented by its full list of symmetry operations.
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceGroup {
    pub number: u16,
    pub symbol: String,
    operations: Vec<SymmetryOperation>,
}

impl Default for SpaceGroup {
    fn default() -> Self {
        Self::identity()
    }
}

impl SpaceGroup {
    /// Builds a space group from its operations.
    ///
    /// # Errors
    ///
    /// Returns [`SymmetryError::EmptySpaceGroup`] when no operations are given.
    pub fn new(
        number: u16,
        symbol: &str,
        operations: Vec<SymmetryOperation>,
    ) -> Result<Self, SymmetryError> {
        if operations.is_empty() {
            return Err(SymmetryError::EmptySpaceGroup { number });
        }
        Ok(Self {
            number,
            symbol: symbol.to_string(),
            operations,
        })
    }

    /// Parses every operation string and builds the group.
    pub fn from_operation_strings<S: AsRef<str>>(
        number: u16,
        symbol: &str,
        operations: &[S],
    ) -> Result<Self, SymmetryError> {
        let operations = operations
            .iter()
            .map(|op| op.as_ref().parse())
            .collect::<Result<Vec<SymmetryOperation>, _>>()?;
        Self::new(number, symbol, operations)
    }

    /// The trivial group P1.
    pub fn identity() -> Self {
        Self {
            number: 1,
            symbol: "P 1".to_string(),
            operations: vec![SymmetryOperation::identity()],
        }
    }

    pub fn is_identity(&self) -> bool {
        self.operations.len() == 1 && self.operations[0] == SymmetryOperation::identity()
    }

    pub fn operations(&self) -> &[SymmetryOperation] {
        &self.operations
    }

    pub fn order(&self) -> usize {
        self.operations.len()
    }

    /// Symmetry images of a fractional position, unwrapped.
    ///
    /// Images that coincide with an earlier image modulo a lattice translation (within
    /// `precision`, in fractional units) are dropped, so special positions produce
    /// shorter orbits. The surviving images keep the order of the operations.
    pub fn images(&self, fractional: &Point3<f64>, precision: f64) -> Vec<Point3<f64>> {
        let mut images: Vec<Point3<f64>> = Vec::with_capacity(self.operations.len());
        for operation in &self.operations {
            let image = operation.apply(fractional);
            let coincides = images.iter().any(|kept| {
                let delta = image - kept;
                (delta - delta.map(f64::round)).norm() < precision
            });
            if !coincides {
                images.push(image);
            }
        }
        images
    }

    /// Binds the group to a precision so it can act as an [`OrbitProvider`].
    pub fn with_precision(&self, precision: f64) -> SpaceGroupOrbit<'_> {
        SpaceGroupOrbit {
            space_group: self,
            precision,
        }
    }
}

/// A space group paired with the tolerance used to merge coinciding images.
#[derive(Debug, Clone, Copy)]
pub struct SpaceGroupOrbit<'a> {
    space_group: &'a SpaceGroup,
    precision: f64,
}

impl OrbitProvider for SpaceGroupOrbit<'_> {
    fn orbit(&self, fractional: &Point3<f64>) -> Vec<Point3<f64>> {
        self.space_group.images(fractional, self.precision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRECISION: f64 = 1e-3;

    fn p21_c() -> SpaceGroup {
        SpaceGroup::from_operation_strings(
            14,
            "P 1 21/c 1",
            &["x,y,z", "-x,y+1/2,-z+1/2", "-x,-y,-z", "x,-y+1/2,z+1/2"],
        )
        .unwrap()
    }

    #[test]
    fn identity_group_is_p1() {
        let group = SpaceGroup::identity();
        assert_eq!(group.number, 1);
        assert_eq!(group.order(), 1);
        assert!(group.is_identity());
        assert!(!p21_c().is_identity());
    }

    #[test]
    fn general_position_orbit_has_group_order() {
        let group = p21_c();
        let images = group.images(&Point3::new(0.1, 0.2, 0.3), PRECISION);
        assert_eq!(images.len(), group.order());
        assert_eq!(images[0], Point3::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn special_position_orbit_is_shorter() {
        let group = p21_c();
        // The inversion centre at the origin is fixed by x,y,z and -x,-y,-z.
        let images = group.images(&Point3::new(0.0, 0.0, 0.0), PRECISION);
        assert_eq!(images.len(), 2);
    }

    #[test]
    fn images_differing_by_a_lattice_vector_coincide() {
        let group = SpaceGroup::from_operation_strings(2, "P -1", &["x,y,z", "-x,-y,-z"]).unwrap();
        let images = group.images(&Point3::new(0.5, 0.0, 0.5), PRECISION);
        assert_eq!(images.len(), 1);
    }

    #[test]
    fn orbit_provider_uses_bound_precision() {
        let group = SpaceGroup::from_operation_strings(2, "P -1", &["x,y,z", "-x,-y,-z"]).unwrap();
        let near_centre = Point3::new(0.0001, 0.0, 0.0);
        assert_eq!(group.with_precision(1e-2).orbit(&near_centre).len(), 1);
        assert_eq!(group.with_precision(1e-6).orbit(&near_centre).len(), 2);
    }

    #[test]
    fn empty_operation_list_is_rejected() {
        assert!(matches!(
            SpaceGroup::new(5, "C 1 2 1", Vec::new()),
            Err(SymmetryError::EmptySpaceGroup { number: 5 })
        ));
    }
}
