use super::bonds::recompute_bonds_with;
use super::symmetry::rebuild_with;
use crate::core::models::cell::Cell;
use crate::core::models::structure::{CoordinateConvention, Structure};
use crate::core::symmetry::space_group::SpaceGroup;
use crate::core::utils::geometry::wrap_fractional;
use crate::engine::config::BondingPolicy;
use crate::engine::error::EngineError;
use crate::engine::progress::{CancellationToken, ProgressReporter};
use itertools::iproduct;
use nalgebra::{Point3, Vector3};
use tracing::{debug, info, instrument};

/// Replicates the structure over its cell's replica range into one P1 cell.
///
/// Every copy-tagged copy is placed once per replica offset, as a new asymmetric atom.
/// The new cell starts at the minimum replica.
///
/// # Errors
///
/// Returns [`EngineError::Model`] if the replica range is empty along any axis.
pub fn super_cell(structure: &Structure) -> Result<Structure, EngineError> {
    super_cell_with(structure, &structure.kind().bonding_policy())
}

/// Same as [`super_cell`], bonding the result with `policy`.
#[instrument(skip_all, name = "super_cell")]
pub fn super_cell_with(
    structure: &Structure,
    policy: &BondingPolicy,
) -> Result<Structure, EngineError> {
    let cell = structure.cell();
    let factors = cell.number_of_replicas();
    let new_cell = cell.scaled(factors)?;
    let mut result = Structure::new(structure.kind(), new_cell);

    let minimum = Vector3::from(cell.minimum_replica.map(f64::from));
    let scale = Vector3::from(factors.map(f64::from));
    let [min_a, min_b, min_c] = cell.minimum_replica;
    let [max_a, max_b, max_c] = cell.maximum_replica;

    for (a, b, c) in iproduct!(min_a..=max_a, min_b..=max_b, min_c..=max_c) {
        let offset = Vector3::new(f64::from(a), f64::from(b), f64::from(c));
        for (id, copy) in structure.copies_iter().filter(|(_, copy)| copy.is_copy()) {
            let Some(parent) = structure.parent_of(id) else {
                continue;
            };
            let fractional = structure.to_fractional(&copy.position);
            let placed = (fractional.coords + offset - minimum).component_div(&scale);
            let position = result.position_from_fractional(&Point3::from(placed));
            result.add_atom(parent.detached(position));
        }
    }

    rebuild_with(&mut result, policy);
    info!(
        factors = ?factors,
        atoms = result.atom_count(),
        bonds = result.bonds().len(),
        "Supercell built."
    );
    Ok(result)
}

/// Moves every asymmetric atom and copy into the home cell.
///
/// Wrapping is performed in fractional coordinates; Cartesian structures are converted
/// back afterwards. Bonds are recomputed.
pub fn wrap_atoms_to_cell(structure: &Structure) -> Structure {
    wrap_atoms_to_cell_with(structure, &structure.kind().bonding_policy())
}

/// Same as [`wrap_atoms_to_cell`], bonding the result with `policy`.
#[instrument(skip_all, name = "wrap_atoms_to_cell")]
pub fn wrap_atoms_to_cell_with(structure: &Structure, policy: &BondingPolicy) -> Structure {
    let mut result = structure.clone();
    map_positions(&mut result, |_, fractional| wrap_fractional(fractional));
    recompute_bonds_with(
        &mut result,
        policy,
        &CancellationToken::new(),
        &ProgressReporter::new(),
    );
    debug!(copies = result.copy_count(), "Atoms wrapped into the cell.");
    result
}

/// Applies the cell's content flip and shift, then builds the supercell.
///
/// # Return
///
/// `None` when the cell has neither a shift nor a flip. Otherwise the supercell of the
/// shifted content, whose own shift and flip are cleared.
pub fn apply_cell_content_shift(structure: &Structure) -> Result<Option<Structure>, EngineError> {
    apply_cell_content_shift_with(structure, &structure.kind().bonding_policy())
}

/// Same as [`apply_cell_content_shift`], bonding the supercell with `policy`.
#[instrument(skip_all, name = "apply_cell_content_shift")]
pub fn apply_cell_content_shift_with(
    structure: &Structure,
    policy: &BondingPolicy,
) -> Result<Option<Structure>, EngineError> {
    if !structure.cell().has_content_shift() {
        return Ok(None);
    }
    let mut shifted = structure.clone();
    let convention = shifted.coordinate_convention();
    map_positions(&mut shifted, |cell, fractional| {
        let moved = cell.apply_content_shift(fractional);
        match convention {
            CoordinateConvention::Fractional => wrap_fractional(&moved),
            CoordinateConvention::Cartesian => moved,
        }
    });
    let cell = shifted.cell_mut();
    cell.content_shift = Vector3::zeros();
    cell.content_flip = [false; 3];

    super_cell_with(&shifted, policy).map(Some)
}

/// Turns every copy-tagged copy into an independent asymmetric atom in P1.
///
/// The cell is kept; bonds are re-derived.
pub fn removed_symmetry(structure: &Structure) -> Structure {
    removed_symmetry_with(structure, &structure.kind().bonding_policy())
}

/// Same as [`removed_symmetry`], bonding the result with `policy`.
#[instrument(skip_all, name = "removed_symmetry")]
pub fn removed_symmetry_with(structure: &Structure, policy: &BondingPolicy) -> Structure {
    let mut result = Structure::new(structure.kind(), structure.cell().clone())
        .with_space_group(SpaceGroup::identity());
    for (id, copy) in structure.copies_iter().filter(|(_, copy)| copy.is_copy()) {
        if let Some(parent) = structure.parent_of(id) {
            result.add_atom(parent.detached(copy.position));
        }
    }
    rebuild_with(&mut result, policy);
    info!(
        atoms = result.atom_count(),
        bonds = result.bonds().len(),
        "Symmetry removed."
    );
    result
}

/// Rewrites every atom and copy position through `transform`, in fractional space.
fn map_positions<F>(structure: &mut Structure, transform: F)
where
    F: Fn(&Cell, &Point3<f64>) -> Point3<f64>,
{
    let cell = structure.cell().clone();
    let convert = |structure: &Structure, position: &Point3<f64>| {
        let fractional = structure.to_fractional(position);
        structure.position_from_fractional(&transform(&cell, &fractional))
    };

    for atom_id in structure.atom_ids().to_vec() {
        let Some(atom) = structure.atom(atom_id) else {
            continue;
        };
        let position = convert(structure, &atom.position);
        if let Some(atom) = structure.atom_mut(atom_id) {
            atom.position = position;
        }
    }
    for copy_id in structure.copy_ids() {
        let Some(copy) = structure.copy(copy_id) else {
            continue;
        };
        let position = convert(structure, &copy.position);
        if let Some(copy) = structure.copy_mut(copy_id) {
            copy.position = position;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::AsymmetricAtom;
    use crate::core::models::elements::{CARBON, OXYGEN};
    use crate::core::models::structure::StructureKind;
    use crate::core::models::topology::BoundaryType;
    use crate::core::symmetry::table::{SpaceGroupCatalog, SpaceGroupTable};
    use crate::workflows::symmetry::{expand_symmetry, rebuild};

    const EPSILON: f64 = 1e-9;

    fn structure(kind: StructureKind, cell: Cell, atoms: &[(u8, [f64; 3])]) -> Structure {
        let mut structure = Structure::new(kind, cell);
        for &(element, position) in atoms {
            structure.add_atom(AsymmetricAtom::new(element, Point3::from(position)));
        }
        rebuild(&mut structure);
        structure
    }

    fn positions(structure: &Structure) -> Vec<Point3<f64>> {
        structure.copies_iter().map(|(_, copy)| copy.position).collect()
    }

    fn assert_close(a: &[Point3<f64>], b: &[Point3<f64>]) {
        assert_eq!(a.len(), b.len());
        for (p, q) in a.iter().zip(b) {
            assert!((p - q).norm() < EPSILON, "{p} != {q}");
        }
    }

    mod supercell {
        use super::*;

        #[test]
        fn replicates_every_copy_over_the_replica_range() {
            let mut crystal = structure(
                StructureKind::Crystal,
                Cell::cubic(10.0).unwrap(),
                &[(CARBON, [0.1, 0.2, 0.3]), (OXYGEN, [0.5, 0.5, 0.5])],
            );
            crystal.cell_mut().set_replicas([0, 0, 0], [1, 2, 0]);

            let result = super_cell(&crystal).unwrap();

            assert_eq!(result.atom_count(), 2 * 6);
            assert_eq!(result.copy_count(), 2 * 6);
            assert!(result.space_group().is_identity());
            assert_eq!(result.cell().lengths(), [20.0, 30.0, 10.0]);
            assert_eq!(result.cell().number_of_replicas(), [1, 1, 1]);
        }

        #[test]
        fn places_replicas_at_scaled_fractional_positions() {
            let mut crystal = structure(
                StructureKind::Crystal,
                Cell::cubic(10.0).unwrap(),
                &[(CARBON, [0.2, 0.4, 0.6])],
            );
            crystal.cell_mut().set_replicas([-1, 0, 0], [0, 0, 0]);

            let result = super_cell(&crystal).unwrap();

            let placed: Vec<Point3<f64>> = result.atoms_iter().map(|(_, a)| a.position).collect();
            assert_close(
                &placed,
                &[Point3::new(0.1, 0.4, 0.6), Point3::new(0.6, 0.4, 0.6)],
            );
        }

        #[test]
        fn symmetric_structure_is_expanded_before_replication() {
            let table = SpaceGroupCatalog::builtin().unwrap();
            let mut crystal = Structure::new(StructureKind::Crystal, Cell::cubic(10.0).unwrap())
                .with_space_group(table.space_group(14).unwrap());
            crystal.add_atom(AsymmetricAtom::new(CARBON, Point3::new(0.1, 0.2, 0.3)));
            expand_symmetry(&mut crystal);
            crystal.cell_mut().set_replicas([0, 0, 0], [1, 0, 0]);

            let result = super_cell(&crystal).unwrap();
            assert_eq!(result.atom_count(), 8);
        }

        #[test]
        fn duplicates_are_not_replicated() {
            let crystal = structure(
                StructureKind::Crystal,
                Cell::cubic(10.0).unwrap(),
                &[(CARBON, [0.1, 0.1, 0.1]), (CARBON, [0.1, 0.1, 0.1])],
            );
            let result = super_cell(&crystal).unwrap();
            assert_eq!(result.atom_count(), 1);
        }

        #[test]
        fn bonds_across_the_old_boundary_become_internal() {
            let mut crystal = structure(
                StructureKind::Crystal,
                Cell::cubic(10.0).unwrap(),
                &[(CARBON, [0.05, 0.5, 0.5]), (CARBON, [0.95, 0.5, 0.5])],
            );
            // 1 Å apart through the periodic boundary.
            assert_eq!(crystal.bonds().len(), 1);
            assert_eq!(crystal.bonds()[0].boundary, BoundaryType::External);

            crystal.cell_mut().set_replicas([0, 0, 0], [1, 0, 0]);
            let result = super_cell(&crystal).unwrap();

            let internal = result
                .bonds()
                .iter()
                .filter(|bond| bond.boundary == BoundaryType::Internal)
                .count();
            assert_eq!(result.bonds().len(), 2);
            assert_eq!(internal, 1);
        }

        #[test]
        fn explicit_policy_is_used_for_the_new_bonds() {
            let mut crystal = structure(
                StructureKind::Crystal,
                Cell::cubic(30.0).unwrap(),
                &[(CARBON, [0.1, 0.5, 0.5]), (CARBON, [0.18, 0.5, 0.5])],
            );
            crystal.cell_mut().set_replicas([0, 0, 0], [0, 0, 0]);
            // 2.4 Å apart: beyond the preset tolerance.
            assert!(super_cell(&crystal).unwrap().bonds().is_empty());

            let mut policy = StructureKind::Crystal.bonding_policy();
            policy.bond_tolerance_offset = 1.0;
            let result = super_cell_with(&crystal, &policy).unwrap();
            assert_eq!(result.bonds().len(), 1);
        }
    }

    mod wrapping {
        use super::*;

        #[test]
        fn wrap_is_idempotent_for_cartesian_structures() {
            let mut crystal = structure(
                StructureKind::MolecularCrystal,
                Cell::cubic(10.0).unwrap(),
                &[(CARBON, [-1.0, 12.0, 3.0]), (OXYGEN, [25.0, -0.5, 9.9])],
            );
            crystal.cell_mut().set_replicas([0, 0, 0], [0, 0, 0]);

            let once = wrap_atoms_to_cell(&crystal);
            let twice = wrap_atoms_to_cell(&once);

            assert_close(
                &positions(&once),
                &[Point3::new(9.0, 2.0, 3.0), Point3::new(5.0, 9.5, 9.9)],
            );
            assert_close(&positions(&once), &positions(&twice));
            assert_eq!(once.bonds(), twice.bonds());
        }

        #[test]
        fn wrap_moves_representatives_too() {
            let crystal = structure(
                StructureKind::Molecule,
                Cell::cubic(10.0).unwrap(),
                &[(CARBON, [-1.0, 0.5, 0.5])],
            );
            let wrapped = wrap_atoms_to_cell(&crystal);
            let (_, atom) = wrapped.atoms_iter().next().unwrap();
            assert!((atom.position - Point3::new(9.0, 0.5, 0.5)).norm() < EPSILON);
        }

        #[test]
        fn wrap_leaves_fractional_crystals_unchanged() {
            let crystal = structure(
                StructureKind::Crystal,
                Cell::cubic(10.0).unwrap(),
                &[(CARBON, [0.1, 0.2, 0.3])],
            );
            let wrapped = wrap_atoms_to_cell(&crystal);
            assert_close(&positions(&wrapped), &positions(&crystal));
        }
    }

    mod content_shift {
        use super::*;

        #[test]
        fn no_shift_means_no_result() {
            let crystal = structure(
                StructureKind::Crystal,
                Cell::cubic(10.0).unwrap(),
                &[(CARBON, [0.1, 0.2, 0.3])],
            );
            assert!(apply_cell_content_shift(&crystal).unwrap().is_none());
        }

        #[test]
        fn shift_and_flip_are_applied_and_cleared() {
            let mut crystal = structure(
                StructureKind::Crystal,
                Cell::cubic(10.0).unwrap(),
                &[(CARBON, [0.1, 0.2, 0.3])],
            );
            crystal.cell_mut().content_shift = Vector3::new(0.5, 0.0, 0.0);
            crystal.cell_mut().content_flip = [false, true, false];

            let result = apply_cell_content_shift(&crystal).unwrap().unwrap();

            assert!(!result.cell().has_content_shift());
            assert_close(&positions(&result), &[Point3::new(0.6, 0.8, 0.3)]);
        }

        #[test]
        fn shift_is_combined_with_replication() {
            let mut crystal = structure(
                StructureKind::Crystal,
                Cell::cubic(10.0).unwrap(),
                &[(CARBON, [0.1, 0.2, 0.3])],
            );
            crystal.cell_mut().content_shift = Vector3::new(0.0, 0.0, 0.25);
            crystal.cell_mut().set_replicas([0, 0, 0], [0, 0, 1]);

            let result = apply_cell_content_shift(&crystal).unwrap().unwrap();

            assert_eq!(result.atom_count(), 2);
            assert_close(
                &positions(&result),
                &[Point3::new(0.1, 0.2, 0.275), Point3::new(0.1, 0.2, 0.775)],
            );
        }
    }

    mod desymmetrize {
        use super::*;

        #[test]
        fn every_copy_becomes_an_asymmetric_atom() {
            let table = SpaceGroupCatalog::builtin().unwrap();
            let mut crystal = Structure::new(StructureKind::Crystal, Cell::cubic(10.0).unwrap())
                .with_space_group(table.space_group(14).unwrap());
            crystal.add_atom(AsymmetricAtom::new(CARBON, Point3::new(0.1, 0.2, 0.3)).with_name("C1"));
            rebuild(&mut crystal);

            let result = removed_symmetry(&crystal);

            assert!(result.space_group().is_identity());
            assert_eq!(result.atom_count(), 4);
            assert_eq!(result.copy_count(), 4);
            assert_eq!(result.cell().lengths(), crystal.cell().lengths());
            assert!(result.atoms_iter().all(|(_, atom)| atom.display_name == "C1"));
            assert_close(&positions(&result), &positions(&crystal));
        }

        #[test]
        fn bonds_are_rederived_not_copied() {
            let crystal = structure(
                StructureKind::Crystal,
                Cell::cubic(30.0).unwrap(),
                &[(CARBON, [0.0, 0.0, 0.0]), (CARBON, [0.05, 0.0, 0.0])],
            );
            let result = removed_symmetry(&crystal);
            assert_eq!(result.bonds().len(), 1);
            let bond = result.bonds()[0];
            assert!(result.copy(bond.atom1_id).is_some());
            assert!(result.copy(bond.atom2_id).is_some());
            assert_eq!(bond.boundary, BoundaryType::Internal);
        }
    }
}
