//! # MPC control module
//!
//! Receding-horizon reference and weight management for the MPC motion controller.
//!
//! Each cycle the module:
//!
//! 1. sets the plant state as the initial condition of the horizon,
//! 2. either loads a newly received trajectory into the horizon, or advances the horizon by the
//!    number of stages elapsed since the last cycle and backfills the vacated tail from the
//!    active trajectory,
//! 3. unwraps the reference headings against the plant heading,
//! 4. runs the optimizer over the horizon and outputs the first control of the solution.
//!
//! Stages with no trajectory data behind them are made cost-free by zeroing their weights, and
//! the last stage with data stands in for the terminal stage when the trajectory ends inside the
//! horizon. The same rule is used for new trajectories and for backfilling, see `policy`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
pub mod policy;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use state::*;

use crate::{horizon::HorizonError, solver::SolverError, traj::TrajError};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during MpcCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum MpcCtrlError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("The horizon buffer has {buffer} stages but the parameters specify {params}")]
    HorizonMismatch { buffer: usize, params: usize },

    #[error("Received a trajectory with no points")]
    EmptyTrajectory,

    #[error("Expected an active trajectory but none has been loaded")]
    NoTrajectory,

    #[error("Horizon error: {0}")]
    Horizon(#[from] HorizonError),

    #[error("Trajectory error: {0}")]
    Traj(#[from] TrajError),

    #[error("Optimizer error: {0}")]
    Solver(#[from] SolverError),
}
