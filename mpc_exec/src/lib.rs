//! # MPC controller library.
//!
//! This library holds the receding-horizon reference and weight management used to drive a model
//! predictive motion controller, along with the trajectory types it consumes and the interface to
//! the optimizer which solves over the horizon.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Horizon buffer - per-stage references, weights, predicted states and controls
pub mod horizon;

/// MPC control module - keeps the horizon buffer in step with the reference trajectory
pub mod mpc_ctrl;

/// Optimizer interface and the reference rollout solver
pub mod solver;

/// Trajectory types, resampling and spoofing
pub mod traj;
