use thiserror::Error;

/// Errors raised while assembling scene data, never while tracing a ray.
///
/// Per-ray intersection kernels are infallible by design (they signal misses
/// with `false`/`None`). Degenerate or out-of-range faces are a *policy*
/// matter, not an error: [`crate::scene::Mesh::new`] logs and discards them
/// rather than failing the whole mesh, so that case has no variant here.
/// This type only covers conditions a caller must actually react to.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RayTracerError {
    #[error("invalid material: {reason}")]
    InvalidMaterial { reason: String },
}
