//! # Horizon module
//!
//! The horizon buffer is the fixed-size state shared with the optimizer. It holds, for each of
//! the `H` stages of the prediction horizon:
//!
//! - a reference vector `[x, y, heading, long_vel]` the controller is steered towards,
//! - a diagonal weight matrix over the reference dimensions,
//! - the predicted plant state and the control input produced by the last solve,
//!
//! plus a distinguished terminal stage (reference and weight) which sits outside the `[0, H)`
//! stage range and approximates the cost beyond the end of the horizon.
//!
//! Weights and references are deliberately independent: a stage whose reference slot holds stale
//! data is made cost-free by zeroing its weight rather than rewriting the reference.
//!
//! All storage is sized once in `HorizonBuffer::new` and only ever overwritten afterwards.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod buffer;
mod heading;
mod refs;
mod shift;
mod weights;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Matrix4, Vector2, Vector4};

pub use buffer::*;
pub use heading::*;
pub use weights::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Indices into `StateVec`.
pub const IDX_X: usize = 0;
pub const IDX_Y: usize = 1;
pub const IDX_HEADING: usize = 2;
pub const IDX_VEL_LONG: usize = 3;

/// Indices into `RefVec`, shared by the stages and the terminal stage.
pub const IDY_X: usize = 0;
pub const IDY_Y: usize = 1;
pub const IDY_HEADING: usize = 2;
pub const IDY_VEL_LONG: usize = 3;

/// Indices into `ControlVec`.
pub const IDU_ACCEL: usize = 0;
pub const IDU_WHEEL_ANGLE: usize = 1;

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// Plant state `[x, y, heading, long_vel]`.
pub type StateVec = Vector4<f64>;

/// Reference `[x, y, heading, long_vel]`.
pub type RefVec = Vector4<f64>;

/// Weight matrix over the reference dimensions.
pub type WeightMat = Matrix4<f64>;

/// Control input `[long_accel, front_wheel_angle]`.
pub type ControlVec = Vector2<f64>;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Contract violations on the horizon buffer.
///
/// These indicate an indexing bug in the caller, not an expected runtime condition.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HorizonError {
    #[error("Inconsistent bounds [{start}, {end}), there's likely an indexing bug somewhere")]
    InvalidRange { start: usize, end: usize },

    #[error("{what} {index} is out of bounds (limit {limit}), there's likely an indexing bug somewhere")]
    OutOfBounds {
        what: &'static str,
        index: usize,
        limit: usize,
    },

    #[error("A horizon must contain at least one stage")]
    ZeroHorizon,
}
