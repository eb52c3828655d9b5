use super::ids::AtomCopyId;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Integer bond order; `Untyped` (0) until the typing pass assigns something.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum BondOrder {
    #[default]
    Untyped = 0,
    Single = 1,
    Double = 2,
    Triple = 3,
}

impl BondOrder {
    pub fn as_int(self) -> u8 {
        self as u8
    }

    pub fn from_int(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Untyped),
            1 => Some(Self::Single),
            2 => Some(Self::Double),
            3 => Some(Self::Triple),
            _ => None,
        }
    }

    pub fn is_typed(self) -> bool {
        self != Self::Untyped
    }
}

#[derive(Debug, Error)]
#[error("Invalid bond order string")]
pub struct ParseBondOrderError;

impl FromStr for BondOrder {
    type Err = ParseBondOrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "0" | "u" | "untyped" => Ok(Self::Untyped),
            "1" | "s" | "single" => Ok(Self::Single),
            "2" | "d" | "double" => Ok(Self::Double),
            "3" | "t" | "triple" => Ok(Self::Triple),
            _ => Err(ParseBondOrderError),
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Untyped => "Untyped",
                Self::Single => "Single",
                Self::Double => "Double",
                Self::Triple => "Triple",
            }
        )
    }
}

/// Whether a bond joins two atoms of the same cell image or crosses a periodic boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BoundaryType {
    #[default]
    Internal,
    External,
}

impl fmt::Display for BoundaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal => write!(f, "internal"),
            Self::External => write!(f, "external"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bond {
    pub atom1_id: AtomCopyId, // first endpoint copy
    pub atom2_id: AtomCopyId, // second endpoint copy
    pub boundary: BoundaryType,
    pub order: BondOrder,
}

impl Bond {
    pub fn new(atom1_id: AtomCopyId, atom2_id: AtomCopyId, boundary: BoundaryType) -> Self {
        Self {
            atom1_id,
            atom2_id,
            boundary,
            order: BondOrder::Untyped,
        }
    }

    pub fn contains(&self, atom_id: AtomCopyId) -> bool {
        self.atom1_id == atom_id || self.atom2_id == atom_id
    }

    /// Returns the opposite endpoint, or `None` if `atom_id` is not part of this bond.
    pub fn partner(&self, atom_id: AtomCopyId) -> Option<AtomCopyId> {
        if self.atom1_id == atom_id {
            Some(self.atom2_id)
        } else if self.atom2_id == atom_id {
            Some(self.atom1_id)
        } else {
            None
        }
    }

    /// Bonds are directionless: `(a, b)` and `(b, a)` join the same pair.
    pub fn same_pair(&self, other: &Bond) -> bool {
        (self.atom1_id == other.atom1_id && self.atom2_id == other.atom2_id)
            || (self.atom1_id == other.atom2_id && self.atom2_id == other.atom1_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn dummy_copy_id(n: u64) -> AtomCopyId {
        AtomCopyId::from(KeyData::from_ffi(n))
    }

    #[test]
    fn bond_order_from_str_parses_valid_strings() {
        assert_eq!("0".parse::<BondOrder>().unwrap(), BondOrder::Untyped);
        assert_eq!("untyped".parse::<BondOrder>().unwrap(), BondOrder::Untyped);
        assert_eq!("1".parse::<BondOrder>().unwrap(), BondOrder::Single);
        assert_eq!("S".parse::<BondOrder>().unwrap(), BondOrder::Single);
        assert_eq!("double".parse::<BondOrder>().unwrap(), BondOrder::Double);
        assert_eq!("T".parse::<BondOrder>().unwrap(), BondOrder::Triple);
    }

    #[test]
    fn bond_order_from_str_rejects_invalid_strings() {
        assert!("".parse::<BondOrder>().is_err());
        assert!("quadruple".parse::<BondOrder>().is_err());
        assert!("4".parse::<BondOrder>().is_err());
    }

    #[test]
    fn bond_order_int_conversion_matches_discriminants() {
        assert_eq!(BondOrder::Untyped.as_int(), 0);
        assert_eq!(BondOrder::Triple.as_int(), 3);
        assert_eq!(BondOrder::from_int(2), Some(BondOrder::Double));
        assert_eq!(BondOrder::from_int(7), None);
        assert!(!BondOrder::default().is_typed());
    }

    #[test]
    fn bond_new_starts_untyped() {
        let bond = Bond::new(dummy_copy_id(1), dummy_copy_id(2), BoundaryType::External);
        assert_eq!(bond.order, BondOrder::Untyped);
        assert_eq!(bond.boundary, BoundaryType::External);
    }

    #[test]
    fn partner_returns_opposite_endpoint() {
        let (a, b, c) = (dummy_copy_id(10), dummy_copy_id(20), dummy_copy_id(30));
        let bond = Bond::new(a, b, BoundaryType::Internal);
        assert_eq!(bond.partner(a), Some(b));
        assert_eq!(bond.partner(b), Some(a));
        assert_eq!(bond.partner(c), None);
        assert!(bond.contains(a) && bond.contains(b) && !bond.contains(c));
    }

    #[test]
    fn same_pair_ignores_direction() {
        let (a, b) = (dummy_copy_id(1), dummy_copy_id(2));
        let forward = Bond::new(a, b, BoundaryType::Internal);
        let backward = Bond::new(b, a, BoundaryType::Internal);
        assert!(forward.same_pair(&backward));
    }
}
