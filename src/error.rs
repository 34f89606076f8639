use thiserror::Error;

// ---------------------------------------------------------------------------
// SeriesError – failures of the series store, partitioning and transforms
// ---------------------------------------------------------------------------

/// Errors raised by the core series operations.
///
/// File-level helpers in [`crate::data::loader`] report through `anyhow`; the
/// store wraps those into [`SeriesError::SourceRead`] so the caller gets one
/// error type with the loader's context chain intact.
#[derive(Debug, Error)]
pub enum SeriesError {
    /// A numeric parameter is out of range (`cycle_pts == 0`, `wavelength <= 0`, bad hex colour…).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// `|Q·λ / 4π| > 1`, so no scattering angle exists for the sample.
    #[error("arcsine argument {argument} out of [-1, 1] at index {index} (Q = {value})")]
    DomainError {
        index: usize,
        value: f64,
        argument: f64,
    },

    #[error("tag '{0}' is already registered")]
    DuplicateTag(String),

    #[error("tag '{0}' is not registered")]
    UnknownTag(String),

    /// The injected load operation failed; surfaced as-is.
    #[error("failed to load '{tag}': {source:#}")]
    SourceRead {
        tag: String,
        #[source]
        source: anyhow::Error,
    },

    /// Columns sharing a tag must have the same number of samples.
    #[error("column '{column}' has {actual} samples, expected {expected}")]
    LengthMismatch {
        column: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Paired partitions produced different cycle counts under a strict policy.
    #[error("cycle count mismatch: {a} vs {b}")]
    CycleMismatch { a: usize, b: usize },

    #[error("tag '{tag}' holds {actual} data, expected {expected}")]
    KindMismatch {
        tag: String,
        expected: &'static str,
        actual: &'static str,
    },
}
