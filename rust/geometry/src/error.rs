use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during geometry processing
#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Vertex index {index} out of range (vertex pool has {len} vertices)")]
    VertexIndexOutOfRange { index: u32, len: usize },

    #[error("Triangulation failed: {0}")]
    TriangulationError(String),

    #[error("Core decoding error: {0}")]
    CoreError(#[from] cityjson_lite_core::Error),
}
