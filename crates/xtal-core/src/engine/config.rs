use crate::core::models::structure::{CoordinateConvention, StructureKind};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CELL_LIST_CUTOFF: f64 = 3.0;
pub const DEFAULT_DUPLICATE_THRESHOLD: f64 = 0.1;
pub const DEFAULT_MINIMUM_BOND_LENGTH: f64 = 0.8;
pub const DEFAULT_CHECKPOINT_INTERVAL: usize = 100;

const INORGANIC_TOLERANCE: f64 = 0.4;
const PROTEIN_TOLERANCE: f64 = 0.56;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// When two copies closer than the duplicate threshold may be merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateGuard {
    /// Both fully occupied, or both copies of the same asymmetric atom.
    OccupancyOrIdentity,
    /// Both fully occupied.
    OccupancyAware,
    /// Both copies of the same asymmetric atom.
    IdentityAware,
    /// Always.
    Unguarded,
}

impl DuplicateGuard {
    pub fn allows(self, both_fully_occupied: bool, same_parent: bool) -> bool {
        match self {
            Self::OccupancyOrIdentity => both_fully_occupied || same_parent,
            Self::OccupancyAware => both_fully_occupied,
            Self::IdentityAware => same_parent,
            Self::Unguarded => true,
        }
    }
}

/// Parameters of bond inference.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct BondingPolicy {
    pub applies_periodic_boundary: bool,
    /// Added to the sum of both bond-distance criteria.
    pub bond_tolerance_offset: f64,
    pub coordinate_convention: CoordinateConvention,
    pub duplicate_guard: DuplicateGuard,
    #[serde(default = "default_cell_list_cutoff")]
    pub cell_list_cutoff: f64,
    #[serde(default = "default_duplicate_threshold")]
    pub duplicate_threshold: f64,
    #[serde(default = "default_minimum_bond_length")]
    pub minimum_bond_length: f64,
    #[serde(default = "default_checkpoint_interval")]
    pub checkpoint_interval: usize,
}

fn default_cell_list_cutoff() -> f64 {
    DEFAULT_CELL_LIST_CUTOFF
}
fn default_duplicate_threshold() -> f64 {
    DEFAULT_DUPLICATE_THRESHOLD
}
fn default_minimum_bond_length() -> f64 {
    DEFAULT_MINIMUM_BOND_LENGTH
}
fn default_checkpoint_interval() -> usize {
    DEFAULT_CHECKPOINT_INTERVAL
}

impl BondingPolicy {
    /// The threshold below which a pair is a bond.
    #[inline]
    pub fn bond_criteria(&self, first: f64, second: f64) -> f64 {
        first + second + self.bond_tolerance_offset
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |name: &'static str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::InvalidParameter {
                    name,
                    reason: format!("expected a positive finite number, got {value}"),
                })
            }
        };
        positive("cell_list_cutoff", self.cell_list_cutoff)?;
        positive("duplicate_threshold", self.duplicate_threshold)?;
        positive("minimum_bond_length", self.minimum_bond_length)?;
        if !self.bond_tolerance_offset.is_finite() {
            return Err(ConfigError::InvalidParameter {
                name: "bond_tolerance_offset",
                reason: "must be finite".to_string(),
            });
        }
        if self.duplicate_threshold > self.minimum_bond_length {
            return Err(ConfigError::InvalidParameter {
                name: "duplicate_threshold",
                reason: format!(
                    "must not exceed minimum_bond_length ({})",
                    self.minimum_bond_length
                ),
            });
        }
        if self.checkpoint_interval == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "checkpoint_interval",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl StructureKind {
    /// The bonding preset of this kind of structure.
    pub fn bonding_policy(self) -> BondingPolicy {
        let (tolerance, guard) = match self {
            Self::Crystal => (INORGANIC_TOLERANCE, DuplicateGuard::OccupancyOrIdentity),
            Self::MolecularCrystal => (INORGANIC_TOLERANCE, DuplicateGuard::OccupancyAware),
            Self::Molecule => (INORGANIC_TOLERANCE, DuplicateGuard::Unguarded),
            Self::ProteinCrystal => (PROTEIN_TOLERANCE, DuplicateGuard::OccupancyAware),
            Self::Protein => (PROTEIN_TOLERANCE, DuplicateGuard::Unguarded),
        };
        BondingPolicy {
            applies_periodic_boundary: self.is_periodic(),
            bond_tolerance_offset: tolerance,
            coordinate_convention: self.coordinate_convention(),
            duplicate_guard: guard,
            cell_list_cutoff: DEFAULT_CELL_LIST_CUTOFF,
            duplicate_threshold: DEFAULT_DUPLICATE_THRESHOLD,
            minimum_bond_length: DEFAULT_MINIMUM_BOND_LENGTH,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
        }
    }
}

#[derive(Default)]
pub struct BondingPolicyBuilder {
    applies_periodic_boundary: Option<bool>,
    bond_tolerance_offset: Option<f64>,
    coordinate_convention: Option<CoordinateConvention>,
    duplicate_guard: Option<DuplicateGuard>,
    cell_list_cutoff: Option<f64>,
    duplicate_threshold: Option<f64>,
    minimum_bond_length: Option<f64>,
    checkpoint_interval: Option<usize>,
}

impl BondingPolicyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing policy, typically a kind preset.
    pub fn from_policy(policy: &BondingPolicy) -> Self {
        Self {
            applies_periodic_boundary: Some(policy.applies_periodic_boundary),
            bond_tolerance_offset: Some(policy.bond_tolerance_offset),
            coordinate_convention: Some(policy.coordinate_convention),
            duplicate_guard: Some(policy.duplicate_guard),
            cell_list_cutoff: Some(policy.cell_list_cutoff),
            duplicate_threshold: Some(policy.duplicate_threshold),
            minimum_bond_length: Some(policy.minimum_bond_length),
            checkpoint_interval: Some(policy.checkpoint_interval),
        }
    }

    pub fn applies_periodic_boundary(mut self, periodic: bool) -> Self {
        self.applies_periodic_boundary = Some(periodic);
        self
    }
    pub fn bond_tolerance_offset(mut self, offset: f64) -> Self {
        self.bond_tolerance_offset = Some(offset);
        self
    }
    pub fn coordinate_convention(mut self, convention: CoordinateConvention) -> Self {
        self.coordinate_convention = Some(convention);
        self
    }
    pub fn duplicate_guard(mut self, guard: DuplicateGuard) -> Self {
        self.duplicate_guard = Some(guard);
        self
    }
    pub fn cell_list_cutoff(mut self, cutoff: f64) -> Self {
        self.cell_list_cutoff = Some(cutoff);
        self
    }
    pub fn duplicate_threshold(mut self, threshold: f64) -> Self {
        self.duplicate_threshold = Some(threshold);
        self
    }
    pub fn minimum_bond_length(mut self, length: f64) -> Self {
        self.minimum_bond_length = Some(length);
        self
    }
    pub fn checkpoint_interval(mut self, interval: usize) -> Self {
        self.checkpoint_interval = Some(interval);
        self
    }

    pub fn build(self) -> Result<BondingPolicy, ConfigError> {
        let policy = BondingPolicy {
            applies_periodic_boundary: self
                .applies_periodic_boundary
                .ok_or(ConfigError::MissingParameter("applies_periodic_boundary"))?,
            bond_tolerance_offset: self
                .bond_tolerance_offset
                .ok_or(ConfigError::MissingParameter("bond_tolerance_offset"))?,
            coordinate_convention: self
                .coordinate_convention
                .ok_or(ConfigError::MissingParameter("coordinate_convention"))?,
            duplicate_guard: self
                .duplicate_guard
                .ok_or(ConfigError::MissingParameter("duplicate_guard"))?,
            cell_list_cutoff: self.cell_list_cutoff.unwrap_or(DEFAULT_CELL_LIST_CUTOFF),
            duplicate_threshold: self
                .duplicate_threshold
                .unwrap_or(DEFAULT_DUPLICATE_THRESHOLD),
            minimum_bond_length: self
                .minimum_bond_length
                .unwrap_or(DEFAULT_MINIMUM_BOND_LENGTH),
            checkpoint_interval: self
                .checkpoint_interval
                .unwrap_or(DEFAULT_CHECKPOINT_INTERVAL),
        };
        policy.validate()?;
        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod presets {
        use super::*;

        #[test]
        fn crystal_preset_is_periodic_fractional_with_combined_guard() {
            let policy = StructureKind::Crystal.bonding_policy();
            assert!(policy.applies_periodic_boundary);
            assert_eq!(policy.bond_tolerance_offset, 0.4);
            assert_eq!(policy.coordinate_convention, CoordinateConvention::Fractional);
            assert_eq!(policy.duplicate_guard, DuplicateGuard::OccupancyOrIdentity);
            assert_eq!(policy.cell_list_cutoff, 3.0);
        }

        #[test]
        fn protein_presets_use_wider_tolerance() {
            assert_eq!(StructureKind::Protein.bonding_policy().bond_tolerance_offset, 0.56);
            let crystal = StructureKind::ProteinCrystal.bonding_policy();
            assert_eq!(crystal.bond_tolerance_offset, 0.56);
            assert!(crystal.applies_periodic_boundary);
            assert_eq!(crystal.coordinate_convention, CoordinateConvention::Cartesian);
        }

        #[test]
        fn aperiodic_presets_are_unguarded() {
            for kind in [StructureKind::Molecule, StructureKind::Protein] {
                let policy = kind.bonding_policy();
                assert!(!policy.applies_periodic_boundary);
                assert_eq!(policy.duplicate_guard, DuplicateGuard::Unguarded);
            }
        }

        #[test]
        fn every_preset_is_valid() {
            for kind in [
                StructureKind::Crystal,
                StructureKind::MolecularCrystal,
                StructureKind::Molecule,
                StructureKind::ProteinCrystal,
                StructureKind::Protein,
            ] {
                assert_eq!(kind.bonding_policy().validate(), Ok(()));
            }
        }
    }

    mod guards {
        use super::*;

        #[test]
        fn guards_follow_their_rules() {
            use DuplicateGuard::*;
            assert!(OccupancyOrIdentity.allows(false, true));
            assert!(OccupancyOrIdentity.allows(true, false));
            assert!(!OccupancyOrIdentity.allows(false, false));
            assert!(!OccupancyAware.allows(false, true));
            assert!(!IdentityAware.allows(true, false));
            assert!(Unguarded.allows(false, false));
        }
    }

    mod builder {
        use super::*;

        #[test]
        fn build_succeeds_with_required_fields_and_defaults() {
            let policy = BondingPolicyBuilder::new()
                .applies_periodic_boundary(true)
                .bond_tolerance_offset(0.5)
                .coordinate_convention(CoordinateConvention::Cartesian)
                .duplicate_guard(DuplicateGuard::IdentityAware)
                .build()
                .unwrap();
            assert_eq!(policy.bond_tolerance_offset, 0.5);
            assert_eq!(policy.checkpoint_interval, DEFAULT_CHECKPOINT_INTERVAL);
            assert_eq!(policy.minimum_bond_length, DEFAULT_MINIMUM_BOND_LENGTH);
        }

        #[test]
        fn build_fails_if_a_required_field_is_missing() {
            let result = BondingPolicyBuilder::new()
                .applies_periodic_boundary(true)
                .coordinate_convention(CoordinateConvention::Cartesian)
                .duplicate_guard(DuplicateGuard::Unguarded)
                .build();
            assert_eq!(
                result,
                Err(ConfigError::MissingParameter("bond_tolerance_offset"))
            );
        }

        #[test]
        fn build_rejects_invalid_values() {
            let preset = StructureKind::Crystal.bonding_policy();
            let result = BondingPolicyBuilder::from_policy(&preset)
                .cell_list_cutoff(0.0)
                .build();
            assert!(matches!(
                result,
                Err(ConfigError::InvalidParameter { name: "cell_list_cutoff", .. })
            ));

            let result = BondingPolicyBuilder::from_policy(&preset)
                .duplicate_threshold(1.0)
                .build();
            assert!(matches!(
                result,
                Err(ConfigError::InvalidParameter { name: "duplicate_threshold", .. })
            ));

            let result = BondingPolicyBuilder::from_policy(&preset)
                .checkpoint_interval(0)
                .build();
            assert!(result.is_err());
        }

        #[test]
        fn from_policy_round_trips_a_preset() {
            let preset = StructureKind::MolecularCrystal.bonding_policy();
            let rebuilt = BondingPolicyBuilder::from_policy(&preset).build().unwrap();
            assert_eq!(rebuilt, preset);
        }
    }

    mod deserialization {
        use super::*;

        #[test]
        fn policy_deserializes_from_kebab_case_toml() {
            let policy: BondingPolicy = toml::from_str(
                r#"
applies-periodic-boundary = false
bond-tolerance-offset = 0.45
coordinate-convention = "cartesian"
duplicate-guard = "occupancy-aware"
cell-list-cutoff = 2.5
"#,
            )
            .unwrap();
            assert!(!policy.applies_periodic_boundary);
            assert_eq!(policy.duplicate_guard, DuplicateGuard::OccupancyAware);
            assert_eq!(policy.cell_list_cutoff, 2.5);
            assert_eq!(policy.duplicate_threshold, DEFAULT_DUPLICATE_THRESHOLD);
        }

        #[test]
        fn unknown_fields_are_rejected() {
            let result: Result<BondingPolicy, _> = toml::from_str(
                r#"
applies-periodic-boundary = false
bond-tolerance-offset = 0.45
coordinate-convention = "cartesian"
duplicate-guard = "unguarded"
grid-size = 4
"#,
            );
            assert!(result.is_err());
        }
    }
}
