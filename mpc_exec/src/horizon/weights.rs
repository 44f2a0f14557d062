//! Weight management over the horizon

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use serde::{Deserialize, Serialize};

use super::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Diagonal cost weights applied to the reference tracking error of a stage.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateWeight {
    /// Weight on the x and y position error.
    pub pose: f64,

    /// Weight on the heading error.
    pub heading: f64,

    /// Weight on the longitudinal velocity error.
    pub long_vel: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl StateWeight {
    /// Write these weights onto the diagonal of `mat`. Off-diagonal entries are not touched.
    fn write_diagonal(&self, mat: &mut WeightMat) {
        mat[(IDY_X, IDY_X)] = self.pose;
        mat[(IDY_Y, IDY_Y)] = self.pose;
        mat[(IDY_HEADING, IDY_HEADING)] = self.heading;
        mat[(IDY_VEL_LONG, IDY_VEL_LONG)] = self.long_vel;
    }

    /// The full weight matrix for these weights.
    pub fn to_matrix(&self) -> WeightMat {
        let mut mat = WeightMat::zeros();
        self.write_diagonal(&mut mat);
        mat
    }
}

impl HorizonBuffer {
    /// Apply `nominal` weights to every stage and `terminal` weights to the terminal stage.
    pub fn apply_weights(&mut self, nominal: &StateWeight, terminal: &StateWeight) {
        for w in self.weights.iter_mut() {
            nominal.write_diagonal(w);
        }
        self.set_terminal_weights(terminal);
    }

    /// Apply `weights` to the stages in `[start, min(end, H))`.
    ///
    /// Fails with `InvalidRange` if `start` is greater than the clamped `end`.
    pub fn apply_stage_weights(
        &mut self,
        weights: &StateWeight,
        start: usize,
        end: usize,
    ) -> Result<(), HorizonError> {
        let end = self.clamp_range(start, end)?;

        for w in self.weights[start..end].iter_mut() {
            weights.write_diagonal(w);
        }

        trace!("Applied weights {:?} to stages [{}, {})", weights, start, end);

        Ok(())
    }

    /// Zero the weights of the stages in `[start, min(end, H))`, making them cost-free.
    ///
    /// Same range semantics as `apply_stage_weights`.
    pub fn zero_stage_weights(&mut self, start: usize, end: usize) -> Result<(), HorizonError> {
        let end = self.clamp_range(start, end)?;

        for w in self.weights[start..end].iter_mut() {
            w.fill(0.0);
        }

        trace!("Zeroed weights of stages [{}, {})", start, end);

        Ok(())
    }

    /// Apply `weights` to the single stage `index`.
    pub fn apply_stage_weights_single(
        &mut self,
        weights: &StateWeight,
        index: usize,
    ) -> Result<(), HorizonError> {
        if index >= self.horizon {
            return Err(HorizonError::OutOfBounds {
                what: "Weight stage",
                index,
                limit: self.horizon,
            });
        }
        self.apply_stage_weights(weights, index, index + 1)
    }

    pub fn set_terminal_weights(&mut self, weights: &StateWeight) {
        weights.write_diagonal(&mut self.terminal_weight);
    }

    pub fn zero_terminal_weights(&mut self) {
        self.terminal_weight.fill(0.0);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const H: usize = 10;

    fn nominal() -> StateWeight {
        StateWeight {
            pose: 10.0,
            heading: 5.0,
            long_vel: 1.0,
        }
    }

    fn terminal() -> StateWeight {
        StateWeight {
            pose: 100.0,
            heading: 50.0,
            long_vel: 10.0,
        }
    }

    #[test]
    fn test_to_matrix() {
        let m = nominal().to_matrix();
        assert_eq!(m[(IDY_X, IDY_X)], 10.0);
        assert_eq!(m[(IDY_Y, IDY_Y)], 10.0);
        assert_eq!(m[(IDY_HEADING, IDY_HEADING)], 5.0);
        assert_eq!(m[(IDY_VEL_LONG, IDY_VEL_LONG)], 1.0);
        assert_eq!(m.sum(), 26.0);
    }

    #[test]
    fn test_apply_weights() {
        let mut buf = HorizonBuffer::new(H).unwrap();
        buf.apply_weights(&nominal(), &terminal());

        assert!(buf.weights().iter().all(|w| *w == nominal().to_matrix()));
        assert_eq!(*buf.terminal_weight(), terminal().to_matrix());
    }

    #[test]
    fn test_stage_weights_touch_only_range() {
        // Every valid (start, end) pair, including ends past the horizon
        for start in 0..=H {
            for end in start..(H + 3) {
                let mut buf = HorizonBuffer::new(H).unwrap();
                buf.apply_weights(&terminal(), &terminal());
                let before = buf.clone();

                buf.apply_stage_weights(&nominal(), start, end).unwrap();

                for i in 0..H {
                    if i >= start && i < end.min(H) {
                        assert_eq!(buf.weights()[i], nominal().to_matrix());
                    } else {
                        assert_eq!(buf.weights()[i], before.weights()[i]);
                    }
                }
                assert_eq!(buf.terminal_weight(), before.terminal_weight());
                assert_eq!(buf.references(), before.references());

                buf.zero_stage_weights(start, end).unwrap();

                for i in 0..H {
                    if i >= start && i < end.min(H) {
                        assert_eq!(buf.weights()[i], WeightMat::zeros());
                    } else {
                        assert_eq!(buf.weights()[i], before.weights()[i]);
                    }
                }
            }
        }
    }

    #[test]
    fn test_stage_weights_invalid_range() {
        let mut buf = HorizonBuffer::new(H).unwrap();
        buf.apply_weights(&nominal(), &terminal());
        let before = buf.clone();

        assert_eq!(
            buf.apply_stage_weights(&terminal(), 4, 3),
            Err(HorizonError::InvalidRange { start: 4, end: 3 })
        );
        assert_eq!(
            buf.zero_stage_weights(H + 1, H + 5),
            Err(HorizonError::InvalidRange { start: H + 1, end: H })
        );
        assert_eq!(buf, before);
    }

    #[test]
    fn test_single_stage_weights() {
        let mut buf = HorizonBuffer::new(H).unwrap();

        buf.apply_stage_weights_single(&terminal(), H - 1).unwrap();
        assert_eq!(buf.weights()[H - 1], terminal().to_matrix());
        assert!(buf.weights()[..H - 1].iter().all(|w| *w == WeightMat::zeros()));

        assert!(matches!(
            buf.apply_stage_weights_single(&terminal(), H),
            Err(HorizonError::OutOfBounds { index: H, limit: H, .. })
        ));
    }

    #[test]
    fn test_terminal_weights() {
        let mut buf = HorizonBuffer::new(H).unwrap();

        buf.set_terminal_weights(&terminal());
        assert_eq!(*buf.terminal_weight(), terminal().to_matrix());

        buf.zero_terminal_weights();
        assert_eq!(*buf.terminal_weight(), WeightMat::zeros());

        // Stage weights are independent of the terminal weights
        assert!(buf.weights().iter().all(|w| *w == WeightMat::zeros()));
    }
}
