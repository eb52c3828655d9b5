//! # Symmetry Module
//!
//! Space-group data and the narrow interfaces through which the kernel consumes an
//! external symmetry library.
//!
//! - [`operation`] - Seitz operations parsed from `x,y,z` notation
//! - [`space_group`] - Space groups as operation lists, and the [`OrbitProvider`](space_group::OrbitProvider) seam
//! - [`table`] - Lookup of space groups by number, built-in or loaded from TOML
//! - [`reduction`] - The [`CellReducer`](reduction::CellReducer) seam for primitive/Niggli
//!   reduction and space-group imposition

pub mod operation;
pub mod reduction;
pub mod space_group;
pub mod table;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SymmetryError {
    #[error("Invalid symmetry operation '{operation}': {reason}")]
    InvalidOperation { operation: String, reason: String },

    #[error("Space group {number} has no symmetry operations")]
    EmptySpaceGroup { number: u16 },

    #[error("Space group {number} is defined more than once")]
    DuplicateSpaceGroup { number: u16 },

    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}
