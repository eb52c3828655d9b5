//! # Engine Module
//!
//! The algorithms of the kernel, written against plain slices and the structure arena
//! so that the workflows layer only has to sequence them.
//!
//! - **Configuration** ([`config`]) - Bonding policy, per-kind presets and the policy builder
//! - **Cell list** ([`cell_list`]) - Linked-cell spatial hash with a half-space stencil
//! - **Bond inference** ([`bonding`]) - Distance classification into bonds and duplicates
//! - **Symmetry expansion** ([`expansion`]) - Regenerating atom copies from an orbit
//! - **Bond typing** ([`typing`]) - Connectivity and geometry rules for bond orders
//! - **Progress** ([`progress`]) - Progress events and cooperative cancellation
//! - **Errors** ([`error`]) - Engine-level error type wrapping the lower layers

pub mod bonding;
pub mod cell_list;
pub mod config;
pub mod error;
pub mod expansion;
pub mod progress;
pub mod typing;
