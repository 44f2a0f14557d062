//! Trajectory spoofing
//!
//! Generates simple reference trajectories (straight lines and circular arcs) at a constant speed,
//! for driving the controller without a planner.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::{TrajError, TrajPoint, Trajectory};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the trajectory spoofer.
#[derive(Debug, Clone, Deserialize)]
pub struct SpoofParams {
    /// The shape of the trajectory.
    pub shape: SpoofShape,

    /// Constant longitudinal speed along the trajectory.
    ///
    /// Units: meters/second
    pub speed_ms: f64,

    /// Number of points to generate.
    pub num_points: usize,

    /// Time between consecutive points.
    ///
    /// Units: seconds
    pub time_step_s: f64,

    /// Start position along the local X axis.
    ///
    /// Units: meters
    #[serde(default)]
    pub start_x_m: f64,

    /// Start position along the local Y axis.
    ///
    /// Units: meters
    #[serde(default)]
    pub start_y_m: f64,

    /// Start heading.
    ///
    /// Units: radians
    #[serde(default)]
    pub start_heading_rad: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible trajectory shapes.
#[derive(Debug, Copy, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum SpoofShape {
    /// Straight line along the start heading.
    Straight,

    /// Circular arc. A positive radius turns left, a negative radius turns right.
    Circle { radius_m: f64 },
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Generate a trajectory from the given parameters.
pub fn spoof(params: &SpoofParams) -> Result<Trajectory, TrajError> {
    if !params.time_step_s.is_finite() || params.time_step_s <= 0.0 {
        return Err(TrajError::InvalidTimeStep(params.time_step_s));
    }
    if !params.speed_ms.is_finite() {
        return Err(TrajError::InvalidSpeed(params.speed_ms));
    }

    let h0 = params.start_heading_rad;
    let (x0, y0) = (params.start_x_m, params.start_y_m);

    let mut traj = Trajectory::with_capacity(params.num_points);

    match params.shape {
        SpoofShape::Straight => {
            for i in 0..params.num_points {
                let t = i as f64 * params.time_step_s;
                let s = params.speed_ms * t;
                traj.points.push(TrajPoint::new(
                    t,
                    x0 + s * h0.cos(),
                    y0 + s * h0.sin(),
                    h0,
                    params.speed_ms,
                ));
            }
        }
        SpoofShape::Circle { radius_m } => {
            if !radius_m.is_finite() || radius_m == 0.0 {
                return Err(TrajError::InvalidShape(format!(
                    "circle radius must be finite and non-zero, got {}",
                    radius_m
                )));
            }

            // Centre of rotation sits one radius along the left normal of the start heading
            let cx = x0 - radius_m * h0.sin();
            let cy = y0 + radius_m * h0.cos();

            for i in 0..params.num_points {
                let t = i as f64 * params.time_step_s;
                let heading_rad = h0 + params.speed_ms * t / radius_m;
                traj.points.push(TrajPoint::new(
                    t,
                    cx + radius_m * heading_rad.sin(),
                    cy - radius_m * heading_rad.cos(),
                    heading_rad,
                    params.speed_ms,
                ));
            }
        }
    }

    Ok(traj)
}
