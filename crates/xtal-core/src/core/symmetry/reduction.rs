use super::space_group::SpaceGroup;
use nalgebra::{Matrix3, Point3};

/// One atom site as exchanged with a symmetry library.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReductionSite {
    pub fractional: Point3<f64>,
    pub element: u8,
    pub occupancy: f64,
}

/// The result of a cell reduction or space-group imposition.
///
/// `sites` are fractional positions in `unit_cell`; for an imposed space group they
/// are the symmetry-distinct (asymmetric) sites only.
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedStructure {
    pub unit_cell: Matrix3<f64>,
    pub space_group: SpaceGroup,
    pub sites: Vec<ReductionSite>,
}

/// Cell-reduction and symmetry-search functions supplied by an external library.
///
/// Every method is pure. `None` means the library found no acceptable answer (for
/// example, the structure is incompatible with the requested space group).
pub trait CellReducer {
    fn find_primitive_cell(
        &self,
        unit_cell: &Matrix3<f64>,
        sites: &[ReductionSite],
        precision: f64,
    ) -> Option<ReducedStructure>;

    fn find_niggli_cell(
        &self,
        unit_cell: &Matrix3<f64>,
        sites: &[ReductionSite],
        precision: f64,
    ) -> Option<ReducedStructure>;

    fn find_imposed_space_group(
        &self,
        unit_cell: &Matrix3<f64>,
        sites: &[ReductionSite],
        space_group: &SpaceGroup,
        precision: f64,
    ) -> Option<ReducedStructure>;
}
