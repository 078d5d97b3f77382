//! Generator error types

use pumpkin_kernel::KernelError;

/// Errors raised while planning or building pumpkins
#[derive(Debug, thiserror::Error)]
pub enum PumpkinError {
    /// Options or style ranges rejected before any geometry is built
    #[error("parameter `{name}` out of range: {reason}")]
    ParameterOutOfRange { name: String, reason: String },

    /// A kernel primitive or deformation rejected its inputs
    #[error("geometry construction failed: {0}")]
    GeometryConstruction(#[from] KernelError),

    /// Carving produced an unusable solid
    #[error("boolean subtraction failed: {0}")]
    BooleanOp(BooleanOpFailure),

    /// A working namespace was allocated twice
    #[error("naming collision: `{0}` already exists in the scene")]
    NamingCollision(String),
}

impl PumpkinError {
    pub(crate) fn out_of_range(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ParameterOutOfRange {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// True for failures that only affect the pumpkin being built
    pub fn is_isolated(&self) -> bool {
        matches!(self, Self::GeometryConstruction(_) | Self::BooleanOp(_))
    }
}

/// Why a carve result was rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BooleanOpFailure {
    #[error("the carved body has no triangles left")]
    Empty,

    #[error("{cutters} cutters left the enclosed volume unchanged ({volume:.6})")]
    Unchanged { cutters: usize, volume: f32 },

    #[error("the carved body is not closed ({open_edges} open edges)")]
    NonManifold { open_edges: usize },
}

pub type Result<T, E = PumpkinError> = std::result::Result<T, E>;
