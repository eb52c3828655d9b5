use crate::error::{CliError, Result};
use nalgebra::{Point3, Vector3};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;
use xtalkit::core::models::atom::{AsymmetricAtom, SymmetryType};
use xtalkit::core::models::cell::Cell;
use xtalkit::core::models::elements;
use xtalkit::core::models::structure::{Structure, StructureKind};
use xtalkit::core::symmetry::table::{SpaceGroupCatalog, SpaceGroupTable};
use xtalkit::engine::config::{BondingPolicy, BondingPolicyBuilder, DuplicateGuard};
use xtalkit::engine::error::EngineError;

fn read_toml<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct FileCell {
    lengths: [f64; 3],
    #[serde(default = "right_angles")]
    angles: [f64; 3],
    #[serde(rename = "minimum-replica", default)]
    minimum_replica: [i32; 3],
    #[serde(rename = "maximum-replica", default)]
    maximum_replica: [i32; 3],
    #[serde(rename = "content-shift", default)]
    content_shift: [f64; 3],
    #[serde(rename = "content-flip", default)]
    content_flip: [bool; 3],
    precision: Option<f64>,
}

fn right_angles() -> [f64; 3] {
    [90.0; 3]
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct FileAtom {
    element: String,
    position: [f64; 3],
    name: Option<String>,
    occupancy: Option<f64>,
    charge: Option<f64>,
    #[serde(rename = "bond-distance-criteria")]
    bond_distance_criteria: Option<f64>,
    #[serde(rename = "symmetry-type")]
    symmetry_type: Option<String>,
}

/// A structure description: kind, cell, space group and asymmetric atoms.
///
/// Atom positions are fractional for crystals and Cartesian (Angstroms) for every
/// other kind.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct StructureFile {
    kind: String,
    cell: FileCell,
    #[serde(rename = "space-group", default = "p1")]
    space_group: u16,
    #[serde(rename = "space-group-table")]
    space_group_table: Option<String>,
    #[serde(default)]
    atoms: Vec<FileAtom>,
}

fn p1() -> u16 {
    1
}

impl StructureFile {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading structure description from file: {:?}", path);
        read_toml(path)
    }

    /// Builds the structure without expanding its copies.
    ///
    /// A relative `space-group-table` path is resolved against `base_dir`; without one,
    /// the built-in table is used.
    pub fn into_structure(self, base_dir: &Path) -> Result<Structure> {
        let kind: StructureKind = self
            .kind
            .parse()
            .map_err(|_| CliError::Config(format!("Unknown structure kind '{}'.", self.kind)))?;

        let mut cell = Cell::from_parameters(self.cell.lengths, self.cell.angles)
            .map_err(EngineError::from)?;
        cell.set_replicas(self.cell.minimum_replica, self.cell.maximum_replica);
        cell.content_shift = Vector3::from(self.cell.content_shift);
        cell.content_flip = self.cell.content_flip;
        if let Some(precision) = self.cell.precision {
            cell.precision = precision;
        }

        let table = match &self.space_group_table {
            Some(path) => SpaceGroupCatalog::load(&base_dir.join(path)),
            None => SpaceGroupCatalog::builtin(),
        }
        .map_err(EngineError::from)?;
        let group = table
            .space_group(self.space_group)
            .ok_or(EngineError::UnknownSpaceGroup(self.space_group))?;

        let mut structure = Structure::new(kind, cell).with_space_group(group);
        for atom in self.atoms {
            structure.add_atom(atom.into_atom()?);
        }
        debug!(
            kind = %kind,
            atoms = structure.atom_count(),
            space_group = self.space_group,
            "Structure description loaded."
        );
        Ok(structure)
    }
}

impl FileAtom {
    fn into_atom(self) -> Result<AsymmetricAtom> {
        let element = elements::atomic_number(&self.element)
            .ok_or_else(|| CliError::Config(format!("Unknown element symbol '{}'.", self.element)))?;
        let mut atom = AsymmetricAtom::new(element, Point3::from(self.position));
        if let Some(name) = &self.name {
            atom = atom.with_name(name);
        }
        if let Some(occupancy) = self.occupancy {
            atom = atom.with_occupancy(occupancy);
        }
        if let Some(charge) = self.charge {
            atom = atom.with_charge(charge);
        }
        if let Some(criteria) = self.bond_distance_criteria {
            atom = atom.with_bond_distance_criteria(criteria);
        }
        if let Some(symmetry_type) = &self.symmetry_type {
            atom.symmetry_type = symmetry_type.parse().map_err(|_| {
                CliError::Config(format!("Unknown symmetry type '{symmetry_type}'."))
            })?;
        }
        Ok(atom)
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialBondingPolicy {
    #[serde(rename = "applies-periodic-boundary")]
    applies_periodic_boundary: Option<bool>,
    #[serde(rename = "bond-tolerance-offset")]
    bond_tolerance_offset: Option<f64>,
    #[serde(rename = "duplicate-guard")]
    duplicate_guard: Option<DuplicateGuard>,
    #[serde(rename = "cell-list-cutoff")]
    cell_list_cutoff: Option<f64>,
    #[serde(rename = "duplicate-threshold")]
    duplicate_threshold: Option<f64>,
    #[serde(rename = "minimum-bond-length")]
    minimum_bond_length: Option<f64>,
    #[serde(rename = "checkpoint-interval")]
    checkpoint_interval: Option<usize>,
}

/// Policy overrides read from `--config`; unset fields keep the kind preset.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct PartialPolicyConfig {
    bonding: Option<PartialBondingPolicy>,
}

impl PartialPolicyConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading policy overrides from file: {:?}", path);
        read_toml(path)
    }

    pub fn merge_onto(self, kind: StructureKind) -> Result<BondingPolicy> {
        let preset = kind.bonding_policy();
        let Some(partial) = self.bonding else {
            return Ok(preset);
        };

        let mut builder = BondingPolicyBuilder::from_policy(&preset);
        if let Some(periodic) = partial.applies_periodic_boundary {
            builder = builder.applies_periodic_boundary(periodic);
        }
        if let Some(offset) = partial.bond_tolerance_offset {
            builder = builder.bond_tolerance_offset(offset);
        }
        if let Some(guard) = partial.duplicate_guard {
            builder = builder.duplicate_guard(guard);
        }
        if let Some(cutoff) = partial.cell_list_cutoff {
            builder = builder.cell_list_cutoff(cutoff);
        }
        if let Some(threshold) = partial.duplicate_threshold {
            builder = builder.duplicate_threshold(threshold);
        }
        if let Some(length) = partial.minimum_bond_length {
            builder = builder.minimum_bond_length(length);
        }
        if let Some(interval) = partial.checkpoint_interval {
            builder = builder.checkpoint_interval(interval);
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }
}

/// Loads the policy for `kind`, applying overrides from `path` when given.
pub fn resolve_policy(path: Option<&Path>, kind: StructureKind) -> Result<BondingPolicy> {
    match path {
        Some(path) => PartialPolicyConfig::from_file(path)?.merge_onto(kind),
        None => Ok(kind.bonding_policy()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{TempDir, tempdir};
    use xtalkit::core::models::elements::{CARBON, OXYGEN};

    fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    const CRYSTAL: &str = r#"
        kind = "crystal"
        space-group = 14

        [cell]
        lengths = [10.0, 11.0, 12.0]
        maximum-replica = [1, 0, 0]
        content-flip = [false, true, false]

        [[atoms]]
        element = "C"
        position = [0.1, 0.2, 0.3]
        name = "C1"

        [[atoms]]
        element = "O"
        position = [0.4, 0.2, 0.3]
        occupancy = 0.5
        symmetry-type = "asymmetric"
    "#;

    mod structure_file {
        use super::*;

        #[test]
        fn loads_cell_group_and_atoms() {
            let dir = tempdir().unwrap();
            let path = write_file(&dir, "crystal.toml", CRYSTAL);

            let structure = StructureFile::from_file(&path)
                .unwrap()
                .into_structure(dir.path())
                .unwrap();

            assert_eq!(structure.kind(), StructureKind::Crystal);
            assert_eq!(structure.space_group().number, 14);
            assert_eq!(structure.cell().number_of_replicas(), [2, 1, 1]);
            assert!(structure.cell().has_content_shift());
            assert_eq!(structure.copy_count(), 0);

            let atoms: Vec<_> = structure.atoms_iter().map(|(_, atom)| atom).collect();
            assert_eq!(atoms.len(), 2);
            assert_eq!(atoms[0].element, CARBON);
            assert_eq!(atoms[0].display_name, "C1");
            assert_eq!(atoms[1].element, OXYGEN);
            assert_eq!(atoms[1].occupancy, 0.5);
        }

        #[test]
        fn custom_space_group_table_is_resolved_next_to_the_file() {
            let dir = tempdir().unwrap();
            write_file(
                &dir,
                "groups.toml",
                r#"
                [[space-group]]
                number = 3
                symbol = "P 1 2 1"
                operations = ["x,y,z", "-x,y,-z"]
                "#,
            );
            let path = write_file(
                &dir,
                "custom.toml",
                r#"
                kind = "crystal"
                space-group = 3
                space-group-table = "groups.toml"
                [cell]
                lengths = [8.0, 8.0, 8.0]
                "#,
            );

            let structure = StructureFile::from_file(&path)
                .unwrap()
                .into_structure(dir.path())
                .unwrap();
            assert_eq!(structure.space_group().order(), 2);
        }

        #[test]
        fn unknown_element_is_rejected() {
            let dir = tempdir().unwrap();
            let path = write_file(
                &dir,
                "bad.toml",
                r#"
                kind = "molecule"
                [cell]
                lengths = [20.0, 20.0, 20.0]
                [[atoms]]
                element = "Xx"
                position = [0.0, 0.0, 0.0]
                "#,
            );
            let result = StructureFile::from_file(&path)
                .unwrap()
                .into_structure(dir.path());
            assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("Xx")));
        }

        #[test]
        fn unknown_kind_is_rejected() {
            let dir = tempdir().unwrap();
            let path = write_file(&dir, "bad.toml", "kind = \"liquid\"\n[cell]\nlengths = [5.0, 5.0, 5.0]\n");
            let result = StructureFile::from_file(&path)
                .unwrap()
                .into_structure(dir.path());
            assert!(matches!(result, Err(CliError::Config(_))));
        }

        #[test]
        fn space_group_missing_from_the_table_is_a_kernel_error() {
            let dir = tempdir().unwrap();
            let path = write_file(
                &dir,
                "bad.toml",
                "kind = \"crystal\"\nspace-group = 230\n[cell]\nlengths = [5.0, 5.0, 5.0]\n",
            );
            let result = StructureFile::from_file(&path)
                .unwrap()
                .into_structure(dir.path());
            assert!(matches!(
                result,
                Err(CliError::Kernel(EngineError::UnknownSpaceGroup(230)))
            ));
        }

        #[test]
        fn unknown_fields_fail_to_parse() {
            let dir = tempdir().unwrap();
            let path = write_file(
                &dir,
                "bad.toml",
                "kind = \"crystal\"\ncolour = \"red\"\n[cell]\nlengths = [5.0, 5.0, 5.0]\n",
            );
            assert!(matches!(
                StructureFile::from_file(&path),
                Err(CliError::FileParsing { .. })
            ));
        }
    }

    mod policy {
        use super::*;

        #[test]
        fn missing_config_keeps_the_preset() {
            let policy = resolve_policy(None, StructureKind::Protein).unwrap();
            assert_eq!(policy, StructureKind::Protein.bonding_policy());
        }

        #[test]
        fn file_overrides_only_the_fields_it_sets() {
            let dir = tempdir().unwrap();
            let path = write_file(
                &dir,
                "policy.toml",
                r#"
                [bonding]
                bond-tolerance-offset = 0.6
                duplicate-guard = "unguarded"
                minimum-bond-length = 0.5
                "#,
            );

            let policy = resolve_policy(Some(&path), StructureKind::Crystal).unwrap();
            let preset = StructureKind::Crystal.bonding_policy();

            assert_eq!(policy.bond_tolerance_offset, 0.6);
            assert_eq!(policy.duplicate_guard, DuplicateGuard::Unguarded);
            assert_eq!(policy.minimum_bond_length, 0.5);
            assert_eq!(policy.cell_list_cutoff, preset.cell_list_cutoff);
            assert_eq!(policy.coordinate_convention, preset.coordinate_convention);
            assert!(policy.applies_periodic_boundary);
        }

        #[test]
        fn empty_file_keeps_the_preset() {
            let dir = tempdir().unwrap();
            let path = write_file(&dir, "policy.toml", "");
            let policy = resolve_policy(Some(&path), StructureKind::Molecule).unwrap();
            assert_eq!(policy, StructureKind::Molecule.bonding_policy());
        }

        #[test]
        fn invalid_override_is_a_config_error() {
            let dir = tempdir().unwrap();
            let path = write_file(&dir, "policy.toml", "[bonding]\ncell-list-cutoff = -1.0\n");
            assert!(matches!(
                resolve_policy(Some(&path), StructureKind::Crystal),
                Err(CliError::Config(_))
            ));
        }

        #[test]
        fn unknown_policy_field_fails_to_parse() {
            let dir = tempdir().unwrap();
            let path = write_file(&dir, "policy.toml", "[bonding]\ncutoff = 2.0\n");
            assert!(matches!(
                resolve_policy(Some(&path), StructureKind::Crystal),
                Err(CliError::FileParsing { .. })
            ));
        }

        #[test]
        fn coordinate_convention_is_not_overridable() {
            let dir = tempdir().unwrap();
            let path = write_file(
                &dir,
                "policy.toml",
                "[bonding]\ncoordinate-convention = \"cartesian\"\n",
            );
            assert!(matches!(
                resolve_policy(Some(&path), StructureKind::Crystal),
                Err(CliError::FileParsing { .. })
            ));
        }

        #[test]
        fn missing_file_is_an_io_error() {
            let dir = tempdir().unwrap();
            let path = dir.path().join("absent.toml");
            assert!(matches!(
                resolve_policy(Some(&path), StructureKind::Crystal),
                Err(CliError::Io(_))
            ));
        }
    }
}
