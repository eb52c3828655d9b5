use crate::core::models::atom::SymmetryType;
use crate::core::models::error::ModelError;
use crate::core::models::ids::AsymmetricAtomId;
use crate::core::models::structure::{CoordinateConvention, Structure};
use crate::core::symmetry::space_group::OrbitProvider;
use crate::core::utils::geometry::wrap_fractional;
use nalgebra::Point3;

/// Regenerates the copies of one asymmetric atom from `orbit`.
///
/// Existing copies are overwritten in place so bonds keep pointing at the same copy
/// ids; copies beyond the new orbit length are removed along with their bonds. Images
/// are wrapped into `[0, 1)` for fractional structures and stored as cell-relative
/// Cartesian positions otherwise. Container atoms end up with no copies.
///
/// # Return
///
/// The number of copies the atom now owns.
///
/// # Errors
///
/// Returns [`ModelError::AtomNotFound`] if `atom_id` is not in the structure.
pub fn expand_atom(
    structure: &mut Structure,
    atom_id: AsymmetricAtomId,
    orbit: &dyn OrbitProvider,
) -> Result<usize, ModelError> {
    let atom = structure
        .atom(atom_id)
        .ok_or(ModelError::AtomNotFound(atom_id))?;

    let positions: Vec<Point3<f64>> = match atom.symmetry_type {
        SymmetryType::Container => Vec::new(),
        SymmetryType::Asymmetric => {
            let fractional = structure.to_fractional(&atom.position);
            orbit
                .orbit(&fractional)
                .iter()
                .map(|image| match structure.coordinate_convention() {
                    CoordinateConvention::Fractional => wrap_fractional(image),
                    CoordinateConvention::Cartesian => structure.position_from_fractional(image),
                })
                .collect()
        }
    };

    let count = positions.len();
    structure.sync_copies(atom_id, positions)?;
    Ok(count)
}

/// Regenerates the copies of every asymmetric atom, in atom order.
///
/// # Return
///
/// The total number of copies in the structure.
pub fn expand_all(structure: &mut Structure, orbit: &dyn OrbitProvider) -> usize {
    let ids = structure.atom_ids().to_vec();
    ids.into_iter()
        .filter_map(|id| expand_atom(structure, id, orbit).ok())
        .sum()
}
