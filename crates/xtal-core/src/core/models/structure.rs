use super::atom::{AsymmetricAtom, AtomCopy, CopyType};
use super::cell::Cell;
use super::error::ModelError;
use super::ids::{AsymmetricAtomId, AtomCopyId};
use super::topology::Bond;
use crate::core::symmetry::reduction::ReductionSite;
use crate::core::symmetry::space_group::SpaceGroup;
use crate::core::utils::geometry::BoundingBox;
use nalgebra::Point3;
use serde::Deserialize;
use slotmap::{SecondaryMap, SlotMap};
use std::fmt;
use std::str::FromStr;

/// How atom positions of a structure are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoordinateConvention {
    /// Fractional coordinates of the unit cell, wrapped into `[0, 1)`.
    Fractional,
    /// Cartesian coordinates relative to the cell origin, never wrapped.
    Cartesian,
}

/// The kinds of structure an editor works with.
///
/// The kind fixes the coordinate convention and periodicity, and selects the default
/// bonding policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StructureKind {
    #[default]
    Crystal,
    MolecularCrystal,
    Molecule,
    ProteinCrystal,
    Protein,
}

impl StructureKind {
    pub fn coordinate_convention(self) -> CoordinateConvention {
        match self {
            Self::Crystal => CoordinateConvention::Fractional,
            _ => CoordinateConvention::Cartesian,
        }
    }

    pub fn is_periodic(self) -> bool {
        !matches!(self, Self::Molecule | Self::Protein)
    }

    pub fn is_protein(self) -> bool {
        matches!(self, Self::ProteinCrystal | Self::Protein)
    }
}

impl FromStr for StructureKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "crystal" => Ok(Self::Crystal),
            "molecular-crystal" => Ok(Self::MolecularCrystal),
            "molecule" => Ok(Self::Molecule),
            "protein-crystal" => Ok(Self::ProteinCrystal),
            "protein" => Ok(Self::Protein),
            _ => Err(()),
        }
    }
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Crystal => "crystal",
            Self::MolecularCrystal => "molecular-crystal",
            Self::Molecule => "molecule",
            Self::ProteinCrystal => "protein-crystal",
            Self::Protein => "protein",
        };
        write!(f, "{name}")
    }
}

/// A complete atomic structure: cell, active space group, asymmetric atoms, their
/// copies and the current bond set.
///
/// Asymmetric atoms and copies live in slot maps and refer to each other by key; the
/// structure keeps the insertion order of asymmetric atoms so that flattened copy
/// lists, tags and bond inference are deterministic.
#[derive(Debug, Clone)]
pub struct Structure {
    kind: StructureKind,
    cell: Cell,
    space_group: SpaceGroup,
    /// Primary storage for asymmetric atoms.
    atoms: SlotMap<AsymmetricAtomId, AsymmetricAtom>,
    /// Insertion order of asymmetric atoms.
    atom_order: Vec<AsymmetricAtomId>,
    /// Primary storage for atom copies; each is listed by exactly one asymmetric atom.
    copies: SlotMap<AtomCopyId, AtomCopy>,
    bonds: Vec<Bond>,
    /// Indices into `bonds`, per copy.
    bond_adjacency: SecondaryMap<AtomCopyId, Vec<usize>>,
}

impl Structure {
    /// Creates an empty structure in the trivial space group P1.
    ///
    /// # Arguments
    ///
    /// * `kind` - The structure kind, fixing convention and periodicity.
    /// * `cell` - The unit cell (for aperiodic kinds, the cell positions are relative to).
    pub fn new(kind: StructureKind, cell: Cell) -> Self {
        Self {
            kind,
            cell,
            space_group: SpaceGroup::identity(),
            atoms: SlotMap::with_key(),
            atom_order: Vec::new(),
            copies: SlotMap::with_key(),
            bonds: Vec::new(),
            bond_adjacency: SecondaryMap::new(),
        }
    }

    /// Sets the active space group during construction.
    pub fn with_space_group(mut self, space_group: SpaceGroup) -> Self {
        self.space_group = space_group;
        self
    }

    pub fn kind(&self) -> StructureKind {
        self.kind
    }

    pub fn coordinate_convention(&self) -> CoordinateConvention {
        self.kind.coordinate_convention()
    }

    pub fn cell(&self) -> &Cell {
        &self.cell
    }

    /// Mutable access to the cell. Copies and bonds go stale until they are regenerated.
    pub fn cell_mut(&mut self) -> &mut Cell {
        &mut self.cell
    }

    pub fn space_group(&self) -> &SpaceGroup {
        &self.space_group
    }

    /// Replaces the active space group. Copies and bonds go stale until symmetry is
    /// re-expanded and bonds are recomputed.
    pub fn set_active_space_group(&mut self, space_group: SpaceGroup) {
        self.space_group = space_group;
    }

    /// Adds an asymmetric atom. The atom starts without copies; expand symmetry to
    /// populate them.
    pub fn add_atom(&mut self, mut atom: AsymmetricAtom) -> AsymmetricAtomId {
        atom.copies.clear();
        let id = self.atoms.insert(atom);
        self.atom_order.push(id);
        id
    }

    /// Removes an asymmetric atom together with its copies and every bond touching them.
    pub fn remove_atom(&mut self, atom_id: AsymmetricAtomId) -> Option<AsymmetricAtom> {
        let atom = self.atoms.remove(atom_id)?;
        self.atom_order.retain(|&id| id != atom_id);
        for &copy_id in &atom.copies {
            self.copies.remove(copy_id);
        }
        self.drop_bonds_touching(&atom.copies);
        Some(atom)
    }

    pub fn atom(&self, id: AsymmetricAtomId) -> Option<&AsymmetricAtom> {
        self.atoms.get(id)
    }

    /// Mutable access to an asymmetric atom. Moving it leaves its copies stale until
    /// symmetry is re-expanded for it.
    pub fn atom_mut(&mut self, id: AsymmetricAtomId) -> Option<&mut AsymmetricAtom> {
        self.atoms.get_mut(id)
    }

    /// Asymmetric atoms in insertion order.
    pub fn atoms_iter(&self) -> impl Iterator<Item = (AsymmetricAtomId, &AsymmetricAtom)> {
        self.atom_order.iter().map(|&id| (id, &self.atoms[id]))
    }

    pub fn atom_ids(&self) -> &[AsymmetricAtomId] {
        &self.atom_order
    }

    pub fn atom_count(&self) -> usize {
        self.atom_order.len()
    }

    pub fn copy(&self, id: AtomCopyId) -> Option<&AtomCopy> {
        self.copies.get(id)
    }

    pub(crate) fn copy_mut(&mut self, id: AtomCopyId) -> Option<&mut AtomCopy> {
        self.copies.get_mut(id)
    }

    /// All copies, flattened in asymmetric-atom order and then orbit order.
    pub fn copies_iter(&self) -> impl Iterator<Item = (AtomCopyId, &AtomCopy)> {
        self.atom_order
            .iter()
            .flat_map(|&atom_id| self.atoms[atom_id].copies.iter())
            .map(|&copy_id| (copy_id, &self.copies[copy_id]))
    }

    pub fn copy_ids(&self) -> Vec<AtomCopyId> {
        self.copies_iter().map(|(id, _)| id).collect()
    }

    pub fn copy_count(&self) -> usize {
        self.copies.len()
    }

    /// The asymmetric atom that owns a copy.
    pub fn parent_of(&self, copy_id: AtomCopyId) -> Option<&AsymmetricAtom> {
        self.copies
            .get(copy_id)
            .and_then(|copy| self.atoms.get(copy.asymmetric_parent))
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    /// Bonds in which a copy participates.
    pub fn bonds_of(&self, copy_id: AtomCopyId) -> impl Iterator<Item = &Bond> {
        self.bond_adjacency
            .get(copy_id)
            .into_iter()
            .flatten()
            .map(|&index| &self.bonds[index])
    }

    pub fn bonded_neighbors(&self, copy_id: AtomCopyId) -> Vec<AtomCopyId> {
        self.bonds_of(copy_id)
            .filter_map(|bond| bond.partner(copy_id))
            .collect()
    }

    /// Replaces the whole bond set.
    pub(crate) fn set_bonds(&mut self, bonds: Vec<Bond>) {
        self.bonds = bonds;
        self.rebuild_bond_adjacency();
    }

    fn rebuild_bond_adjacency(&mut self) {
        self.bond_adjacency.clear();
        for (index, bond) in self.bonds.iter().enumerate() {
            for endpoint in [bond.atom1_id, bond.atom2_id] {
                if let Some(entry) = self.bond_adjacency.entry(endpoint) {
                    entry.or_default().push(index);
                }
            }
        }
    }

    fn drop_bonds_touching(&mut self, removed: &[AtomCopyId]) {
        if removed.is_empty() {
            return;
        }
        let before = self.bonds.len();
        self.bonds
            .retain(|bond| !removed.iter().any(|&id| bond.contains(id)));
        if self.bonds.len() != before {
            self.rebuild_bond_adjacency();
        }
    }

    /// Makes the copy list of an atom match `positions`, reusing existing copies.
    ///
    /// Existing copies are overwritten in place (position and classification), so
    /// bonds referencing them stay valid. Extra positions append new copies; surplus
    /// copies are removed together with their bonds.
    pub(crate) fn sync_copies(
        &mut self,
        atom_id: AsymmetricAtomId,
        positions: Vec<Point3<f64>>,
    ) -> Result<(), ModelError> {
        let existing = self
            .atoms
            .get(atom_id)
            .ok_or(ModelError::AtomNotFound(atom_id))?
            .copies
            .clone();

        let mut kept = Vec::with_capacity(positions.len());
        for (index, position) in positions.into_iter().enumerate() {
            match existing.get(index).and_then(|&id| self.copies.get_mut(id).map(|c| (id, c))) {
                Some((id, copy)) => {
                    copy.position = position;
                    copy.copy_type = CopyType::Copy;
                    kept.push(id);
                }
                None => kept.push(self.copies.insert(AtomCopy::new(atom_id, position))),
            }
        }

        let surplus: Vec<AtomCopyId> = existing.iter().skip(kept.len()).copied().collect();
        for &id in &surplus {
            self.copies.remove(id);
        }
        self.drop_bonds_touching(&surplus);

        if let Some(atom) = self.atoms.get_mut(atom_id) {
            atom.copies = kept;
        }
        Ok(())
    }

    /// Converts a stored position to Cartesian coordinates.
    pub fn to_cartesian(&self, position: &Point3<f64>) -> Point3<f64> {
        match self.coordinate_convention() {
            CoordinateConvention::Fractional => self.cell.to_cartesian(position),
            CoordinateConvention::Cartesian => *position,
        }
    }

    /// Converts a stored position to fractional coordinates.
    pub fn to_fractional(&self, position: &Point3<f64>) -> Point3<f64> {
        match self.coordinate_convention() {
            CoordinateConvention::Fractional => *position,
            CoordinateConvention::Cartesian => self.cell.to_fractional(position),
        }
    }

    /// Converts a fractional position to the structure's stored representation.
    pub fn position_from_fractional(&self, fractional: &Point3<f64>) -> Point3<f64> {
        match self.coordinate_convention() {
            CoordinateConvention::Fractional => *fractional,
            CoordinateConvention::Cartesian => self.cell.to_cartesian(fractional),
        }
    }

    pub fn copy_cartesian_position(&self, copy_id: AtomCopyId) -> Option<Point3<f64>> {
        self.copies
            .get(copy_id)
            .map(|copy| self.to_cartesian(&copy.position))
    }

    /// Assigns every copy a stable integer tag in flattened order and returns the count.
    pub fn tag(&mut self) -> usize {
        let ordered = self.copy_ids();
        for (tag, id) in ordered.iter().enumerate() {
            self.copies[*id].tag = tag;
        }
        ordered.len()
    }

    /// Finds a copy by the tag assigned in the last [`tag`](Self::tag) pass.
    pub fn copy_by_tag(&self, tag: usize) -> Option<AtomCopyId> {
        self.copies_iter()
            .find(|(_, copy)| copy.tag == tag)
            .map(|(id, _)| id)
    }

    /// Copy-tagged copies as sites for an external symmetry library.
    pub fn reduction_sites(&self) -> Vec<ReductionSite> {
        self.copies_iter()
            .filter(|(_, copy)| copy.is_copy())
            .map(|(_, copy)| {
                let parent = &self.atoms[copy.asymmetric_parent];
                ReductionSite {
                    fractional: self.to_fractional(&copy.position),
                    element: parent.element,
                    occupancy: parent.occupancy,
                }
            })
            .collect()
    }

    /// The region a viewer should frame.
    ///
    /// Periodic structures use the corners of the replicated cell; aperiodic ones the
    /// extent of their copies (falling back to the cell when there are none).
    pub fn bounding_box(&self) -> BoundingBox {
        if self.kind.is_periodic() {
            return self.cell.bounding_box();
        }
        let positions: Vec<Point3<f64>> = self
            .copies_iter()
            .map(|(_, copy)| self.to_cartesian(&copy.position))
            .collect();
        BoundingBox::from_points(&positions).unwrap_or_else(|| self.cell.bounding_box())
    }
}
