use thiserror::Error;
use vista_math::MathError;

use crate::node::NodeId;

/// Errors raised by the scene graph.
///
/// Setters validate eagerly and return these. Errors raised while drawing
/// are caught per node, logged and the node is destroyed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VistaError {
    /// The backend has no usable drawing context (zero color bits, window gone).
    #[error("context not set: {0}")]
    ContextUnavailable(String),

    /// A texture could not be allocated, even after downsampling.
    #[error("texture upload failed: {0}")]
    UploadFailure(String),

    #[error("shader program failed to compile: {0}")]
    ShaderCompileFailure(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("out of range: {0}")]
    OutOfRange(String),

    /// The node was destroyed, or the id belongs to another figure.
    #[error("node {0:?} is destroyed")]
    DestroyedNode(NodeId),
}

impl VistaError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

impl From<MathError> for VistaError {
    fn from(e: MathError) -> Self {
        match e {
            MathError::InvalidArgument(m) => VistaError::InvalidArgument(m),
            MathError::OutOfRange(m) => VistaError::OutOfRange(m),
        }
    }
}

pub type Result<T, E = VistaError> = std::result::Result<T, E>;
