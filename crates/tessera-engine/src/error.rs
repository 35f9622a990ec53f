use thiserror::Error;

use crate::render::PrimitiveClass;

/// Errors reported by the batching and rendering layers.
///
/// Buffer overflow and stack underflow are deliberately absent: the former is
/// handled by an internal flush, the latter by the stack floor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    /// `2 * radius` exceeds the rectangle's width or height.
    #[error("corner radius {radius} does not fit a {width}x{height} rectangle")]
    CornerRadiusTooLarge { radius: f32, width: f32, height: f32 },

    /// Negative, NaN or infinite corner radius.
    #[error("corner radius must be finite and non-negative, got {0}")]
    InvalidCornerRadius(f32),

    /// A batch buffer was configured to hold zero primitives.
    #[error("batch capacity for {0:?} must hold at least one primitive")]
    ZeroCapacity(PrimitiveClass),

    #[error("batch session already active; call end() first")]
    SessionActive,

    #[error("no batch session is active; call begin() first")]
    NoSession,

    #[error("frame already started; call end_frame() first")]
    FrameActive,

    #[error("no frame is active; call start_frame() first")]
    NoFrame,
}
