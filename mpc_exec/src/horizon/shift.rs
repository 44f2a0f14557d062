//! Advancing the horizon for warm-starting

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;

use super::*;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl HorizonBuffer {
    /// Shift the predicted states, references and controls left by `count` stages.
    ///
    /// Stage `i` takes the value previously held by stage `i + count`. The vacated tail keeps its
    /// previous contents (the optimizer's prior extrapolation) until it is backfilled. Weights are
    /// not shifted.
    ///
    /// Requires `count < H`, advancing by the whole horizon would discard every warm-start value.
    pub fn advance(&mut self, count: usize) -> Result<(), HorizonError> {
        if count >= self.horizon {
            return Err(HorizonError::OutOfBounds {
                what: "Advance count",
                index: count,
                limit: self.horizon,
            });
        }

        self.states.copy_within(count.., 0);
        self.refs.copy_within(count.., 0);
        self.controls.copy_within(count.., 0);

        trace!("Advanced horizon by {} stages", count);

        Ok(())
    }
}
