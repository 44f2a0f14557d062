//! Parameters structure for MpcCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::horizon::{StateWeight, HEADING_DISCONTINUITY_THRESHOLD_RAD};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for MPC control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// Number of stages in the prediction horizon.
    pub horizon: usize,

    /// Time between consecutive stages of the horizon.
    ///
    /// Units: seconds
    pub solver_time_step_s: f64,

    /// If true incoming trajectories are resampled at `solver_time_step_s` before being loaded,
    /// otherwise each trajectory point is assumed to correspond to one stage.
    #[serde(default)]
    pub resample_trajectory: bool,

    /// Stage weights.
    pub weights: OptimizationWeights,

    /// Accumulated heading change across the horizon above which the references are reported as
    /// discontinuous.
    ///
    /// Units: radians
    #[serde(default = "default_heading_threshold")]
    pub heading_discontinuity_threshold_rad: f64,
}

/// Weight configuration applied to the horizon.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OptimizationWeights {
    /// Weights of every stage backed by trajectory data.
    pub nominal: StateWeight,

    /// Weights of the terminal stage, or of the last stage with data when the trajectory ends
    /// inside the horizon.
    pub terminal: StateWeight,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check the parameters are usable, returning a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.horizon == 0 {
            return Err("horizon must contain at least one stage".into());
        }
        if !self.solver_time_step_s.is_finite() || self.solver_time_step_s <= 0.0 {
            return Err(format!(
                "solver_time_step_s must be positive, got {}",
                self.solver_time_step_s
            ));
        }
        if !(self.heading_discontinuity_threshold_rad > 0.0) {
            return Err(format!(
                "heading_discontinuity_threshold_rad must be positive, got {}",
                self.heading_discontinuity_threshold_rad
            ));
        }
        Ok(())
    }
}

fn default_heading_threshold() -> f64 {
    HEADING_DISCONTINUITY_THRESHOLD_RAD
}
