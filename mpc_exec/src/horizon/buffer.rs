//! Horizon buffer storage and accessors

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Dense per-stage storage shared between the controller and the optimizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HorizonBuffer {
    /// Number of stages, `H`.
    pub(super) horizon: usize,

    /// Current plant state, the initial condition of the next solve.
    pub(super) x0: StateVec,

    /// Predicted states, `H + 1` entries (stages `0..=H`).
    pub(super) states: Vec<StateVec>,

    /// Control inputs, `H` entries.
    pub(super) controls: Vec<ControlVec>,

    /// Stage references, `H` entries.
    pub(super) refs: Vec<RefVec>,

    /// Stage weights, `H` entries.
    pub(super) weights: Vec<WeightMat>,

    pub(super) terminal_ref: RefVec,
    pub(super) terminal_weight: WeightMat,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl HorizonBuffer {
    /// Allocate a zeroed buffer for a horizon of `horizon` stages.
    pub fn new(horizon: usize) -> Result<Self, HorizonError> {
        if horizon == 0 {
            return Err(HorizonError::ZeroHorizon);
        }

        Ok(Self {
            horizon,
            x0: StateVec::zeros(),
            states: vec![StateVec::zeros(); horizon + 1],
            controls: vec![ControlVec::zeros(); horizon],
            refs: vec![RefVec::zeros(); horizon],
            weights: vec![WeightMat::zeros(); horizon],
            terminal_ref: RefVec::zeros(),
            terminal_weight: WeightMat::zeros(),
        })
    }

    /// Number of stages in the horizon.
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn x0(&self) -> &StateVec {
        &self.x0
    }

    /// Set the current plant state.
    pub fn set_x0(&mut self, x0: StateVec) {
        self.x0 = x0;
    }

    /// Predicted states for stages `0..=H`.
    pub fn states(&self) -> &[StateVec] {
        &self.states
    }

    pub fn states_mut(&mut self) -> &mut [StateVec] {
        &mut self.states
    }

    pub fn controls(&self) -> &[ControlVec] {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut [ControlVec] {
        &mut self.controls
    }

    pub fn reference(&self, stage: usize) -> Option<&RefVec> {
        self.refs.get(stage)
    }

    pub fn references(&self) -> &[RefVec] {
        &self.refs
    }

    pub fn weight(&self, stage: usize) -> Option<&WeightMat> {
        self.weights.get(stage)
    }

    pub fn weights(&self) -> &[WeightMat] {
        &self.weights
    }

    pub fn terminal_reference(&self) -> &RefVec {
        &self.terminal_ref
    }

    pub fn terminal_weight(&self) -> &WeightMat {
        &self.terminal_weight
    }

    /// Validate a stage range, returning the end clamped to the horizon.
    ///
    /// Clamping `end` is intended, but `start > end` after clamping is an error.
    pub(super) fn clamp_range(&self, start: usize, end: usize) -> Result<usize, HorizonError> {
        let end = end.min(self.horizon);
        if start > end {
            return Err(HorizonError::InvalidRange { start, end });
        }
        Ok(end)
    }
}
