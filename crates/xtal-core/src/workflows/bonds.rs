use crate::core::models::atom::CopyType;
use crate::core::models::ids::AtomCopyId;
use crate::core::models::structure::Structure;
use crate::core::models::topology::Bond;
use crate::engine::bonding::{BondCandidate, infer_bonds};
use crate::engine::config::BondingPolicy;
use crate::engine::progress::{CancellationToken, ProgressReporter};
use crate::engine::typing;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BondReport {
    pub bonds: usize,
    pub duplicates: usize,
    pub cancelled: bool,
}

/// Replaces the bond set of `structure` using the preset policy of its kind.
///
/// See [`recompute_bonds_with`].
#[instrument(skip_all, name = "recompute_bonds")]
pub fn recompute_bonds(
    structure: &mut Structure,
    cancel: &CancellationToken,
    reporter: &ProgressReporter,
) -> BondReport {
    let policy = structure.kind().bonding_policy();
    recompute_bonds_with(structure, &policy, cancel, reporter)
}

/// Replaces the bond set of `structure` using an explicit policy.
///
/// Every copy is first reset to [`CopyType::Copy`]; copies found on top of another copy
/// are then flagged as duplicates and excluded from the new bonds. The previous bond
/// set is always discarded. When cancelled, the structure is left without bonds.
/// Positions are read in the structure's own coordinate convention.
pub fn recompute_bonds_with(
    structure: &mut Structure,
    policy: &BondingPolicy,
    cancel: &CancellationToken,
    reporter: &ProgressReporter,
) -> BondReport {
    for id in structure.copy_ids() {
        if let Some(copy) = structure.copy_mut(id) {
            copy.copy_type = CopyType::Copy;
        }
    }
    if policy.coordinate_convention != structure.coordinate_convention() {
        warn!(
            policy = ?policy.coordinate_convention,
            stored = ?structure.coordinate_convention(),
            "Policy coordinate convention differs from the structure; using the stored convention."
        );
    }

    let (ids, candidates): (Vec<AtomCopyId>, Vec<BondCandidate>) = structure
        .copies_iter()
        .filter_map(|(id, copy)| {
            let parent = structure.atom(copy.asymmetric_parent)?;
            let candidate = BondCandidate {
                position: structure.to_cartesian(&copy.position),
                bond_distance_criteria: parent.bond_distance_criteria,
                occupancy: parent.occupancy,
                parent: copy.asymmetric_parent,
            };
            Some((id, candidate))
        })
        .unzip();

    let outcome = infer_bonds(&candidates, structure.cell(), policy, cancel, reporter);
    if outcome.cancelled {
        structure.set_bonds(Vec::new());
        info!("Bond recomputation cancelled; bond set cleared.");
        return BondReport {
            cancelled: true,
            ..BondReport::default()
        };
    }

    for &index in &outcome.duplicates {
        if let Some(copy) = structure.copy_mut(ids[index]) {
            copy.copy_type = CopyType::Duplicate;
        }
    }
    let bonds: Vec<Bond> = outcome
        .bonds
        .iter()
        .map(|bond| Bond::new(ids[bond.first], ids[bond.second], bond.boundary))
        .collect();

    let report = BondReport {
        bonds: bonds.len(),
        duplicates: outcome.duplicates.len(),
        cancelled: false,
    };
    structure.set_bonds(bonds);
    info!(
        bonds = report.bonds,
        duplicates = report.duplicates,
        "Bond recomputation complete."
    );
    report
}

/// Assigns bond orders to the current bond set, dropping bonds of over-connected atoms.
///
/// # Return
///
/// The number of bonds that received an order.
#[instrument(skip_all, name = "assign_bond_orders")]
pub fn assign_bond_orders(structure: &mut Structure) -> usize {
    let typed = typing::assign_bond_orders(structure, structure.bonds());
    let count = typed.iter().filter(|bond| bond.order.is_typed()).count();
    info!(
        typed = count,
        total = typed.len(),
        "Bond order assignment complete."
    );
    structure.set_bonds(typed);
    count
}
