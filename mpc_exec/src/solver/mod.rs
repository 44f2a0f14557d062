//! # Optimizer interface
//!
//! The optimizer owns nothing: it is handed the horizon buffer for the duration of a single
//! `solve` call, reads the initial state, references and weights, and overwrites the predicted
//! states and controls. The call must complete before the buffer is shifted or backfilled for the
//! next cycle, which the borrow makes impossible to get wrong.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod rollout;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use crate::horizon::HorizonBuffer;

pub use rollout::*;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A finite-horizon optimal control solver operating on a `HorizonBuffer`.
pub trait Optimizer {
    /// Solve over the buffer, writing the predicted states and controls back into it.
    fn solve(&mut self, buffer: &mut HorizonBuffer) -> Result<SolveReport, SolverError>;
}

impl<O: Optimizer + ?Sized> Optimizer for Box<O> {
    fn solve(&mut self, buffer: &mut HorizonBuffer) -> Result<SolveReport, SolverError> {
        (**self).solve(buffer)
    }
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Summary of a single solve.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct SolveReport {
    /// Number of iterations taken.
    pub iterations: usize,

    /// Value of the objective at the solution.
    pub cost: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors reported by an optimizer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolverError {
    #[error("The optimizer did not converge after {0} iterations")]
    NotConverged(usize),

    #[error("The optimizer produced a non-finite value at stage {0}")]
    NonFinite(usize),

    #[error("Invalid optimizer configuration: {0}")]
    InvalidConfig(String),
}
