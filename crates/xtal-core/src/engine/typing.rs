//! Rule-based bond-order assignment from connectivity and geometry.

use crate::core::models::elements::{
    CARBON, HYDROGEN, NITROGEN, OXYGEN, PHOSPHORUS, SULFUR, is_halogen,
};
use crate::core::models::ids::AtomCopyId;
use crate::core::models::structure::Structure;
use crate::core::models::topology::{Bond, BondOrder};
use crate::core::utils::geometry::bend_angle_degrees;
use nalgebra::Vector3;
use std::collections::HashMap;
use tracing::debug;

const LINEAR_ANGLE_MINIMUM: f64 = 175.0;
const LINEAR_ANGLE_MAXIMUM: f64 = 185.0;

/// The largest number of bonds an element keeps during over-connection repair.
fn maximum_connectivity(element: u8) -> Option<usize> {
    match element {
        CARBON | NITROGEN => Some(4),
        PHOSPHORUS => Some(5),
        SULFUR => Some(6),
        _ => None,
    }
}

struct TypingGraph<'a> {
    structure: &'a Structure,
    bonds: Vec<Bond>,
    /// Bond indices per copy, in bond order.
    incident: HashMap<AtomCopyId, Vec<usize>>,
}

impl<'a> TypingGraph<'a> {
    fn new(structure: &'a Structure, bonds: Vec<Bond>) -> Self {
        let mut incident: HashMap<AtomCopyId, Vec<usize>> = HashMap::new();
        for (index, bond) in bonds.iter().enumerate() {
            incident.entry(bond.atom1_id).or_default().push(index);
            incident.entry(bond.atom2_id).or_default().push(index);
        }
        Self {
            structure,
            bonds,
            incident,
        }
    }

    fn element(&self, copy: AtomCopyId) -> u8 {
        self.structure
            .parent_of(copy)
            .map_or(0, |parent| parent.element)
    }

    fn connectivity(&self, copy: AtomCopyId) -> usize {
        self.incident.get(&copy).map_or(0, Vec::len)
    }

    fn bonds_of(&self, copy: AtomCopyId) -> &[usize] {
        self.incident.get(&copy).map(Vec::as_slice).unwrap_or(&[])
    }

    fn partner(&self, bond: usize, copy: AtomCopyId) -> AtomCopyId {
        self.bonds[bond].partner(copy).unwrap_or(copy)
    }

    /// The shortest vector from `from` to `to`, honouring periodicity.
    fn vector(&self, from: AtomCopyId, to: AtomCopyId) -> Vector3<f64> {
        let (Some(a), Some(b)) = (
            self.structure.copy_cartesian_position(from),
            self.structure.copy_cartesian_position(to),
        ) else {
            return Vector3::zeros();
        };
        let separation = b - a;
        if self.structure.kind().is_periodic() {
            self.structure.cell().minimum_image(&separation)
        } else {
            separation
        }
    }

    fn set(&mut self, bond: usize, order: BondOrder) {
        if !self.bonds[bond].order.is_typed() {
            self.bonds[bond].order = order;
        }
    }
}

/// Drops the longest bonds of atoms bonded beyond their element's capacity.
fn repair_over_connection(structure: &Structure, bonds: Vec<Bond>) -> Vec<Bond> {
    let graph = TypingGraph::new(structure, bonds);
    let mut removed = vec![false; graph.bonds.len()];

    for copy in structure.copy_ids() {
        let Some(maximum) = maximum_connectivity(graph.element(copy)) else {
            continue;
        };
        let mut retained: Vec<(usize, f64)> = graph
            .bonds_of(copy)
            .iter()
            .filter(|&&bond| !removed[bond])
            .map(|&bond| (bond, graph.vector(copy, graph.partner(bond, copy)).norm()))
            .collect();
        if retained.len() <= maximum {
            continue;
        }
        retained.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        for &(bond, _) in &retained[maximum..] {
            removed[bond] = true;
        }
    }

    let dropped = removed.iter().filter(|&&r| r).count();
    if dropped > 0 {
        debug!(dropped, "Removed bonds from over-connected atoms.");
    }
    graph
        .bonds
        .into_iter()
        .zip(removed)
        .filter_map(|(bond, removed)| (!removed).then_some(bond))
        .collect()
}

fn type_terminal(graph: &mut TypingGraph, copy: AtomCopyId, element: u8) {
    let bond = graph.bonds_of(copy)[0];
    let partner_element = graph.element(graph.partner(bond, copy));
    if is_halogen(element) || element == HYDROGEN {
        graph.set(bond, BondOrder::Single);
    } else if element == SULFUR && partner_element == PHOSPHORUS {
        graph.set(bond, BondOrder::Double);
    } else if element == NITROGEN && partner_element == SULFUR {
        graph.set(bond, BondOrder::Double);
    }
}

fn type_two_connected(graph: &mut TypingGraph, copy: AtomCopyId) {
    let (first, second) = (graph.bonds_of(copy)[0], graph.bonds_of(copy)[1]);
    let neighbours = [graph.partner(first, copy), graph.partner(second, copy)];
    let angle = bend_angle_degrees(
        &graph.vector(copy, neighbours[0]),
        &graph.vector(copy, neighbours[1]),
    );
    let linear =
        angle.is_some_and(|a| (LINEAR_ANGLE_MINIMUM..=LINEAR_ANGLE_MAXIMUM).contains(&a));

    if linear && graph.connectivity(neighbours[0]) == 2 {
        graph.set(first, BondOrder::Triple);
        graph.set(second, BondOrder::Single);
    } else if linear && graph.connectivity(neighbours[1]) == 2 {
        graph.set(second, BondOrder::Triple);
        graph.set(first, BondOrder::Single);
    } else if matches!(graph.element(neighbours[0]), CARBON | NITROGEN) {
        graph.set(first, BondOrder::Single);
        graph.set(second, BondOrder::Double);
    } else if matches!(graph.element(neighbours[1]), CARBON | NITROGEN) {
        graph.set(second, BondOrder::Single);
        graph.set(first, BondOrder::Double);
    } else {
        graph.set(first, BondOrder::Double);
        graph.set(second, BondOrder::Double);
    }
}

fn type_saturated(graph: &mut TypingGraph, copy: AtomCopyId) {
    let bonds = graph.bonds_of(copy).to_vec();
    let acid = bonds.iter().any(|&bond| {
        let partner = graph.partner(bond, copy);
        graph.element(partner) == OXYGEN && graph.connectivity(partner) == 1
    });
    if acid {
        return;
    }
    for bond in bonds {
        graph.set(bond, BondOrder::Single);
    }
}

/// Assigns bond orders to a bond set.
///
/// Over-connected carbon, nitrogen, phosphorus and sulfur atoms first lose their
/// longest bonds. Orders are then assigned per atom in copy order; a bond keeps the
/// first order it receives and bonds no rule matches stay untyped. Incoming orders are
/// discarded, so the result depends only on geometry and connectivity.
///
/// # Return
///
/// The retained bonds with their assigned orders.
pub fn assign_bond_orders(structure: &Structure, bonds: &[Bond]) -> Vec<Bond> {
    let reset = bonds
        .iter()
        .map(|bond| Bond {
            order: BondOrder::Untyped,
            ..*bond
        })
        .collect();
    let retained = repair_over_connection(structure, reset);
    let mut graph = TypingGraph::new(structure, retained);

    for copy in structure.copy_ids() {
        let element = graph.element(copy);
        match graph.connectivity(copy) {
            1 => type_terminal(&mut graph, copy, element),
            2 if matches!(element, CARBON | SULFUR) => type_two_connected(&mut graph, copy),
            3 if matches!(element, NITROGEN | PHOSPHORUS | SULFUR) || is_halogen(element) => {
                type_saturated(&mut graph, copy)
            }
            4 if matches!(element, CARBON | NITROGEN | PHOSPHORUS | SULFUR)
                || is_halogen(element) =>
            {
                type_saturated(&mut graph, copy)
            }
            _ => {}
        }
    }

    graph.bonds
}
