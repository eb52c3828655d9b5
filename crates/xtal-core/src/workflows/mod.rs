//! # Workflows Module
//!
//! The operation surface an editor calls. Each workflow sequences the engine algorithms
//! over a [`Structure`](crate::core::models::structure::Structure) and reports what it did
//! through `tracing`.
//!
//! ## Overview
//!
//! Two kinds of operations live here. In-place maintenance keeps a structure's derived
//! state current after edits: symmetry copies are regenerated and the bond set is
//! replaced wholesale. Lattice transforms never touch their input; they return a fresh
//! structure whose copies are expanded and whose bonds are already inferred.
//!
//! ## Architecture
//!
//! - **Bonds** ([`bonds`]) - Bond recomputation under a kind preset or an explicit policy,
//!   with cancellation and progress, plus bond-order assignment.
//! - **Symmetry** ([`symmetry`]) - Orbit expansion for one atom or the whole structure, and
//!   the reducer-backed transforms (imposed space group, primitive and Niggli cells).
//! - **Lattice** ([`lattice`]) - Supercell, wrapping into the home cell, content shift and
//!   symmetry removal.

pub mod bonds;
pub mod lattice;
pub mod symmetry;
