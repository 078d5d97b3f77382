//! Kernel error type

/// Errors raised when a kernel primitive or operation rejects its inputs
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    /// Primitive or subdivision resolution outside the supported range
    #[error("invalid resolution for {what}: {value} (expected {min}..={max})")]
    InvalidResolution {
        what: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    /// A dimension that must be positive was zero, negative or not finite
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// An operation needed at least one vertex or face and got none
    #[error("empty selection: {0}")]
    EmptySelection(&'static str),

    /// Writing an export file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Check that `value` lies in `min..=max`
pub(crate) fn check_resolution(
    what: &'static str,
    value: u32,
    min: u32,
    max: u32,
) -> Result<u32, KernelError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(KernelError::InvalidResolution {
            what,
            value,
            min,
            max,
        })
    }
}

/// Check that a length is finite and strictly positive
pub(crate) fn check_positive(what: &str, value: f32) -> Result<f32, KernelError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(KernelError::DegenerateGeometry(format!(
            "{what} must be > 0.0, got {value}"
        )))
    }
}
