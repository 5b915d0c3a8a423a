use std::io;

/// Errors surfaced by the render pipeline.
///
/// Numeric degeneracy in shading is deliberately absent: a NaN-producing
/// pixel is contained to that pixel (rendered black) rather than failing the
/// render. These variants cover conditions the render cannot proceed past.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("chunk grid of {chunks} divisions does not evenly tile {width}x{height}")]
    InvalidChunkGrid {
        width: u32,
        height: u32,
        chunks: u32,
    },

    #[error("chunk count must be nonzero; call calc_optimal_chunks or set_num_chunks first")]
    NoChunks,

    #[error("object transform is singular and cannot be inverted")]
    SingularTransform,

    #[error("failed to spawn render thread: {0}")]
    Spawn(#[from] io::Error),

    #[error("display surface rejected a pixel block: {0}")]
    Present(String),

    #[error("render cancelled before completion")]
    Cancelled,

    #[error("scene description is invalid: {0}")]
    SceneDescription(String),
}

pub type RenderResult<T> = Result<T, RenderError>;
