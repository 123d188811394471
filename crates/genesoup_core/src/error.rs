//! Error types for the simulation core.
//!
//! Only construction-time defects are errors. Missing targets, a full
//! population and unmet mutation preconditions are ordinary no-ops.

use genesoup_data::ProgramError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    /// A program was built outside the length bounds or with a bad gene.
    #[error("Invalid program: {0}")]
    Program(#[from] ProgramError),

    /// A catalog lookup used an index past the end of the table.
    #[error("Unknown gene catalog index {0}")]
    UnknownGene(usize),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    #[must_use]
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}
