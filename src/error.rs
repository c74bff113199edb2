// src/error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreemapError {
    #[error("Insufficient points for operation: expected at least {expected}, got {actual}")]
    InsufficientPoints { expected: usize, actual: usize },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Geometric calculation failed: {operation}")]
    GeometricFailure { operation: String },

    #[error("Tree has no nodes.")]
    EmptyTree,

    #[error("Node {0:?} does not exist in this tree")]
    UnknownNode(crate::tree::NodeId),
}

pub type TreemapResult<T> = Result<T, TreemapError>;
