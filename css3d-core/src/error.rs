/// Error types for the CSS3D renderer
use thiserror::Error;

use crate::scene::NodeId;

/// Main error type for the renderer.
#[derive(Error, Debug)]
pub enum Error {
    /// The host DOM rejected an operation
    #[error("DOM error: {0}")]
    Dom(String),

    /// A node id that is not (or no longer) part of the scene arena
    #[error("Unknown scene node: {0:?}")]
    UnknownNode(NodeId),

    /// Renderer options could not be parsed
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias using the renderer's Error type.
pub type Result<T> = std::result::Result<T, Error>;
