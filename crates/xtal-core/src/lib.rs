//! # xtalkit Core Library
//!
//! The geometric and crystallographic kernel underneath a molecular- and crystal-structure
//! editor. For a periodic or non-periodic atomic structure it infers chemical bonds from
//! coordinates under periodic boundary conditions, expands symmetry-distinct atoms into their
//! full space-group orbits, and assigns heuristic bond orders from the inferred connectivity.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Structure`, `Cell`, atoms, bonds),
//!   element data, space-group operations and the narrow interfaces to external symmetry
//!   libraries.
//!
//! - **[`engine`]: The Algorithms.** The linked-cell spatial index, the policy-driven bond
//!   inference engine, orbit expansion bookkeeping, bond-order typing, progress reporting and
//!   cooperative cancellation.
//!
//! - **[`workflows`]: The Public API.** The caller-visible operation surface: in-place
//!   `recompute_bonds` / `expand_symmetry`, and pure lattice transforms that return a fresh
//!   structure (`super_cell`, `wrap_atoms_to_cell`, `apply_cell_content_shift`,
//!   `removed_symmetry`, `set_space_group`).

pub mod core;
pub mod engine;
pub mod workflows;
