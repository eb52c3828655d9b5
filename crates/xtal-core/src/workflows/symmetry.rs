use super::bonds::recompute_bonds_with;
use crate::core::models::atom::AsymmetricAtom;
use crate::core::models::cell::Cell;
use crate::core::models::ids::AsymmetricAtomId;
use crate::core::models::structure::Structure;
use crate::core::symmetry::reduction::{CellReducer, ReducedStructure};
use crate::core::symmetry::space_group::SpaceGroup;
use crate::core::symmetry::table::SpaceGroupTable;
use crate::engine::config::BondingPolicy;
use crate::engine::error::EngineError;
use crate::engine::expansion::{expand_all, expand_atom};
use crate::engine::progress::{CancellationToken, ProgressReporter};
use nalgebra::Point3;
use tracing::{info, instrument, warn};

/// Regenerates the copies of every asymmetric atom under the active space group.
///
/// Bonds touching removed copies are dropped; the rest go stale until bonds are
/// recomputed.
///
/// # Return
///
/// The total number of copies.
#[instrument(skip_all, name = "expand_symmetry")]
pub fn expand_symmetry(structure: &mut Structure) -> usize {
    let group = structure.space_group().clone();
    let precision = structure.cell().precision;
    let count = expand_all(structure, &group.with_precision(precision));
    info!(
        atoms = structure.atom_count(),
        copies = count,
        space_group = group.number,
        "Symmetry expansion complete."
    );
    count
}

/// Regenerates the copies of a single asymmetric atom, typically after it moved.
///
/// # Errors
///
/// Returns [`EngineError::Model`] if the atom is not part of the structure.
pub fn expand_symmetry_for(
    structure: &mut Structure,
    atom_id: AsymmetricAtomId,
) -> Result<usize, EngineError> {
    let group = structure.space_group().clone();
    let precision = structure.cell().precision;
    Ok(expand_atom(structure, atom_id, &group.with_precision(precision))?)
}

/// Expands symmetry and recomputes bonds with the kind preset.
pub(crate) fn rebuild(structure: &mut Structure) {
    let policy = structure.kind().bonding_policy();
    rebuild_with(structure, &policy);
}

/// Expands symmetry and recomputes bonds with a fresh token and a silent reporter.
pub(crate) fn rebuild_with(structure: &mut Structure, policy: &BondingPolicy) {
    expand_symmetry(structure);
    recompute_bonds_with(
        structure,
        policy,
        &CancellationToken::new(),
        &ProgressReporter::new(),
    );
}

/// Re-expresses the structure in space group `number`.
///
/// The group is looked up in `table` and handed to the reducer, which finds the
/// asymmetric sites of the structure under that group.
///
/// # Return
///
/// A fresh structure with expanded copies and recomputed bonds, or `None` if the
/// structure is incompatible with the group.
///
/// # Errors
///
/// Returns [`EngineError::UnknownSpaceGroup`] if `table` has no such group.
#[instrument(skip_all, name = "set_space_group")]
pub fn set_space_group(
    structure: &Structure,
    number: u16,
    table: &dyn SpaceGroupTable,
    reducer: &dyn CellReducer,
) -> Result<Option<Structure>, EngineError> {
    let group = table
        .space_group(number)
        .ok_or(EngineError::UnknownSpaceGroup(number))?;
    let cell = structure.cell();
    let Some(reduced) = reducer.find_imposed_space_group(
        cell.unit_cell(),
        &structure.reduction_sites(),
        &group,
        cell.precision,
    ) else {
        warn!(number, "Structure is not compatible with the requested space group.");
        return Ok(None);
    };
    let result = from_reduced(structure, reduced, None)?;
    info!(
        number,
        atoms = result.atom_count(),
        "Space group imposed."
    );
    Ok(Some(result))
}

/// The primitive cell of the structure in P1, or `None` if the reducer finds none.
#[instrument(skip_all, name = "primitive_cell")]
pub fn primitive_cell(
    structure: &Structure,
    reducer: &dyn CellReducer,
) -> Result<Option<Structure>, EngineError> {
    let cell = structure.cell();
    reducer
        .find_primitive_cell(cell.unit_cell(), &structure.reduction_sites(), cell.precision)
        .map(|reduced| from_reduced(structure, reduced, Some(SpaceGroup::identity())))
        .transpose()
}

/// The Niggli-reduced cell of the structure in P1, or `None` if the reducer finds none.
#[instrument(skip_all, name = "niggli_cell")]
pub fn niggli_cell(
    structure: &Structure,
    reducer: &dyn CellReducer,
) -> Result<Option<Structure>, EngineError> {
    let cell = structure.cell();
    reducer
        .find_niggli_cell(cell.unit_cell(), &structure.reduction_sites(), cell.precision)
        .map(|reduced| from_reduced(structure, reduced, Some(SpaceGroup::identity())))
        .transpose()
}

/// Builds a structure from reducer output, carrying atom attributes over from the
/// nearest same-element copy of `source`.
fn from_reduced(
    source: &Structure,
    reduced: ReducedStructure,
    space_group: Option<SpaceGroup>,
) -> Result<Structure, EngineError> {
    let mut cell = Cell::from_matrix(reduced.unit_cell)?;
    cell.precision = source.cell().precision;

    let mut structure = Structure::new(source.kind(), cell)
        .with_space_group(space_group.unwrap_or(reduced.space_group));

    for site in &reduced.sites {
        let cartesian = structure.cell().to_cartesian(&site.fractional);
        let position = structure.position_from_fractional(&site.fractional);
        let atom = match nearest_template(source, site.element, &cartesian) {
            Some(template) => template.detached(position),
            None => AsymmetricAtom::new(site.element, position),
        }
        .with_occupancy(site.occupancy);
        structure.add_atom(atom);
    }

    rebuild(&mut structure);
    Ok(structure)
}

fn nearest_template<'a>(
    source: &'a Structure,
    element: u8,
    cartesian: &Point3<f64>,
) -> Option<&'a AsymmetricAtom> {
    source
        .copies_iter()
        .filter(|(_, copy)| copy.is_copy())
        .filter_map(|(id, copy)| {
            let parent = source.parent_of(id)?;
            if parent.element != element {
                return None;
            }
            let separation = cartesian - source.to_cartesian(&copy.position);
            let distance = source.cell().minimum_image(&separation).norm();
            Some((parent, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(parent, _)| parent)
}
