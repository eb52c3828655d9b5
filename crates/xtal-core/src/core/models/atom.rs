use super::elements;
use super::ids::{AsymmetricAtomId, AtomCopyId};
use nalgebra::Point3;
use std::str::FromStr;

/// Whether an asymmetric atom is a real site or a grouping node.
///
/// Container atoms carry no position of their own and are never expanded
/// into copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SymmetryType {
    #[default]
    Asymmetric,
    Container,
}

/// Classification of an atom copy.
///
/// Copies become `Duplicate` when a bond-recomputation pass finds them on top of
/// another copy; only `Copy` instances take part in bonds and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CopyType {
    #[default]
    Copy,
    Duplicate,
}

/// The symmetry-distinct representative of an atom site.
///
/// The representative position is stored in the coordinate convention of the owning
/// structure (fractional for crystals, cell-relative Cartesian otherwise). The copy
/// list is owned by the atom but the copies themselves live in the structure's arena;
/// it is kept equal to the orbit of `position` under the active space group.
#[derive(Debug, Clone, PartialEq)]
pub struct AsymmetricAtom {
    /// The display name of the atom (e.g., "C1", "O3").
    pub display_name: String,
    /// Atomic number; 0 denotes an unknown/dummy element.
    pub element: u8,
    /// The force field atom type (e.g., "C_R", "O_3").
    pub force_field_type: String,
    /// Representative position in the structure's coordinate convention.
    pub position: Point3<f64>,
    /// Partial charge in elementary charge units.
    pub charge: f64,
    /// Site occupancy; values below 1.0 mark partially occupied (disordered) sites.
    pub occupancy: f64,
    /// Covalent-radius-like scalar summed pairwise to decide bonding.
    pub bond_distance_criteria: f64,
    /// Axes along which the atom is held fixed by an editor.
    pub is_fixed: [bool; 3],
    pub symmetry_type: SymmetryType,
    pub(crate) copies: Vec<AtomCopyId>,
}

impl AsymmetricAtom {
    /// Creates a new asymmetric atom for an element at a representative position.
    ///
    /// The display name defaults to the element symbol and the bond-distance criterion
    /// to the element's covalent radius. Occupancy starts at 1.0.
    ///
    /// # Arguments
    ///
    /// * `element` - The atomic number.
    /// * `position` - The representative position in the structure's coordinate convention.
    pub fn new(element: u8, position: Point3<f64>) -> Self {
        Self {
            display_name: elements::symbol(element).to_string(),
            element,
            force_field_type: String::new(),
            position,
            charge: 0.0,
            occupancy: 1.0,
            bond_distance_criteria: elements::covalent_radius(element),
            is_fixed: [false; 3],
            symmetry_type: SymmetryType::default(),
            copies: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.display_name = name.to_string();
        self
    }

    pub fn with_occupancy(mut self, occupancy: f64) -> Self {
        self.occupancy = occupancy;
        self
    }

    pub fn with_bond_distance_criteria(mut self, criteria: f64) -> Self {
        self.bond_distance_criteria = criteria;
        self
    }

    pub fn with_charge(mut self, charge: f64) -> Self {
        self.charge = charge;
        self
    }

    /// The handles of this atom's copies, in orbit order.
    pub fn copies(&self) -> &[AtomCopyId] {
        &self.copies
    }

    pub fn is_partially_occupied(&self) -> bool {
        self.occupancy < 1.0
    }

    /// Clones the site description without its copies, for seeding a derived structure.
    pub fn detached(&self, position: Point3<f64>) -> Self {
        Self {
            position,
            copies: Vec::new(),
            symmetry_type: SymmetryType::Asymmetric,
            ..self.clone()
        }
    }
}

/// One symmetry-equivalent (or replica) instance of an asymmetric atom.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomCopy {
    /// The owning asymmetric atom.
    pub asymmetric_parent: AsymmetricAtomId,
    /// Position in the structure's coordinate convention.
    pub position: Point3<f64>,
    pub copy_type: CopyType,
    /// Stable integer identity assigned by [`Structure::tag`](super::structure::Structure::tag).
    pub tag: usize,
}

impl AtomCopy {
    pub fn new(asymmetric_parent: AsymmetricAtomId, position: Point3<f64>) -> Self {
        Self {
            asymmetric_parent,
            position,
            copy_type: CopyType::Copy,
            tag: 0,
        }
    }

    pub fn is_copy(&self) -> bool {
        self.copy_type == CopyType::Copy
    }
}

impl FromStr for SymmetryType {
    type Err = ();

    /// Parses `"asymmetric"` or `"container"` (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asymmetric" | "atom" => Ok(SymmetryType::Asymmetric),
            "container" | "group" => Ok(SymmetryType::Container),
            _ => Err(()),
        }
    }
}
