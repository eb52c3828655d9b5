use super::ids::{AsymmetricAtomId, AtomCopyId};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ModelError {
    #[error("Invalid lattice parameters: {0}")]
    InvalidLattice(String),

    #[error("Unit cell matrix is singular (volume {volume:.3e})")]
    SingularCell { volume: f64 },

    #[error("Asymmetric atom not found: {0:?}")]
    AtomNotFound(AsymmetricAtomId),

    #[error("Atom copy not found: {0:?}")]
    CopyNotFound(AtomCopyId),
}
