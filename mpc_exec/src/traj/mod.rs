//! # Trajectory module
//!
//! A trajectory is the ordered sequence of reference points the controller is asked to follow.
//! Points are sampled monotonically in time, each carrying a position in the local frame, a
//! heading and a longitudinal velocity.
//!
//! The heading is carried as a unit complex number rather than a raw angle so that a trajectory
//! never holds an ambiguous (multiple-of-2pi) heading. The controller converts it to a scalar
//! angle when writing references into the horizon buffer.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod sample;
pub mod spoof;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::UnitComplex;
use serde::{Deserialize, Serialize};

// Internal
pub use sample::sample;
pub use spoof::{spoof, SpoofParams, SpoofShape};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single point of a reference trajectory.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajPoint {
    /// Time of this point relative to the start of the trajectory.
    ///
    /// Units: seconds
    pub time_from_start_s: f64,

    /// Position along the local X axis.
    ///
    /// Units: meters
    pub x_m: f64,

    /// Position along the local Y axis.
    ///
    /// Units: meters
    pub y_m: f64,

    /// Heading (rotation from the local X axis).
    pub heading: UnitComplex<f64>,

    /// Longitudinal velocity.
    ///
    /// Units: meters/second
    pub long_vel_ms: f64,
}

/// A reference trajectory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub points: Vec<TrajPoint>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors that can occur while building or resampling trajectories.
#[derive(Debug, thiserror::Error)]
pub enum TrajError {
    #[error("Time step must be positive and finite, got {0}")]
    InvalidTimeStep(f64),

    #[error("Trajectory times must be strictly increasing, point {0} is not after the previous point")]
    NonMonotonicTime(usize),

    #[error("Point {0} has a non-finite time")]
    NonFiniteTime(usize),

    #[error("Resampling would produce {required} points, more than the limit of {limit}")]
    TooManySamples { required: f64, limit: usize },

    #[error("Invalid spoof shape: {0}")]
    InvalidShape(String),

    #[error("Speed must be finite, got {0}")]
    InvalidSpeed(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajPoint {
    /// Create a new point from a scalar heading in radians.
    pub fn new(time_from_start_s: f64, x_m: f64, y_m: f64, heading_rad: f64, long_vel_ms: f64) -> Self {
        Self {
            time_from_start_s,
            x_m,
            y_m,
            heading: UnitComplex::new(heading_rad),
            long_vel_ms,
        }
    }

    /// The heading as a scalar angle in the range [-pi, pi].
    pub fn heading_rad(&self) -> f64 {
        self.heading.angle()
    }
}

impl Trajectory {
    /// Create a new empty trajectory
    pub fn new_empty() -> Self {
        Self { points: Vec::new() }
    }

    /// Create an empty trajectory able to hold `capacity` points without reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Get the number of points in the trajectory
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TrajPoint> {
        self.points.get(index)
    }

    /// Replace the contents of this trajectory with those of `other`, reusing the existing
    /// allocation where it is large enough.
    pub fn copy_from(&mut self, other: &Trajectory) {
        self.points.clear();
        self.points.extend_from_slice(&other.points);
    }
}

impl From<Vec<TrajPoint>> for Trajectory {
    fn from(points: Vec<TrajPoint>) -> Self {
        Self { points }
    }
}
