//! # Core Module
//!
//! Stateless building blocks of the kernel: the structure data model, element data,
//! space-group operations and the geometric helpers everything else is built on.
//!
//! - **Structure Representation** ([`models`]) - Cells, asymmetric atoms, atom copies,
//!   bonds and the [`Structure`](models::structure::Structure) arena that owns them
//! - **Symmetry** ([`symmetry`]) - Symmetry operations, space groups, tables and the
//!   interfaces to external symmetry libraries
//! - **Utilities** ([`utils`]) - Bounding boxes, fractional wrapping, angles

pub mod models;
pub mod symmetry;
pub mod utils;
