use thiserror::Error;

use super::config::ConfigError;
use crate::core::models::error::ModelError;
use crate::core::symmetry::SymmetryError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Structure model error: {source}")]
    Model {
        #[from]
        source: ModelError,
    },

    #[error("Symmetry error: {source}")]
    Symmetry {
        #[from]
        source: SymmetryError,
    },

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Space group {0} is not in the space-group table")]
    UnknownSpaceGroup(u16),

    #[error("Cell reduction produced an unusable cell: {0}")]
    Reduction(String),
}
