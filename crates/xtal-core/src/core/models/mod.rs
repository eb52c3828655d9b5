//! # Core Models Module
//!
//! Data structures describing a periodic or non-periodic atomic structure.
//!
//! - [`atom`] - Asymmetric atoms and their symmetry copies
//! - [`cell`] - The unit cell and its geometry (conversions, minimum image, widths)
//! - [`elements`] - Element symbols and covalent radii
//! - [`error`] - Model-level errors
//! - [`ids`] - Arena keys for asymmetric atoms and atom copies
//! - [`structure`] - The structure arena: atoms, copies, bonds, cell and space group
//! - [`topology`] - Bonds, bond orders and boundary types
//!
//! ```ignore
//! use xtalkit::core::models::{atom::AsymmetricAtom, cell::Cell, elements::CARBON};
//! use xtalkit::core::models::structure::{Structure, StructureKind};
//!
//! let mut structure = Structure::new(StructureKind::Crystal, Cell::cubic(10.0)?);
//! let id = structure.add_atom(AsymmetricAtom::new(CARBON, Point3::new(0.0, 0.0, 0.0)));
//! ```

pub mod atom;
pub mod cell;
pub mod elements;
pub mod error;
pub mod ids;
pub mod structure;
pub mod topology;
