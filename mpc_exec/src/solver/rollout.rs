//! Reference rollout solver
//!
//! Not an optimizer in the strict sense: it rolls a kinematic bicycle model forward from the
//! current state, choosing at each stage the control a pair of proportional trackers (speed and
//! heading/cross-track) would pick to reach the next weighted reference. Stages whose reference
//! carries no weight are coasted through. It fills the same buffer slots a real solver would and
//! reports the resulting objective value, which is enough to close the loop in the executable and
//! in tests.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use serde::Deserialize;
use util::maths::{clamp, wrap_to_pi};

use super::{Optimizer, SolveReport, SolverError};
use crate::horizon::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the rollout solver.
#[derive(Debug, Clone, Deserialize)]
pub struct RolloutParams {
    /// Distance between the front and rear axles.
    ///
    /// Units: meters
    pub wheelbase_m: f64,

    /// Acceleration demand per unit of speed error.
    ///
    /// Units: 1/seconds
    pub vel_gain: f64,

    /// Wheel angle demand per unit of heading error.
    pub heading_gain: f64,

    /// Heading correction per unit of cross-track error.
    ///
    /// Units: radians/meter
    pub cross_track_gain: f64,

    /// Maximum absolute acceleration demand.
    ///
    /// Units: meters/second^2
    pub max_accel_mps2: f64,

    /// Maximum absolute front wheel angle.
    ///
    /// Units: radians
    pub max_wheel_angle_rad: f64,
}

/// Kinematic bicycle rollout standing in for a numerical optimizer.
pub struct RolloutSolver {
    params: RolloutParams,
    time_step_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RolloutSolver {
    pub fn new(params: RolloutParams, time_step_s: f64) -> Result<Self, SolverError> {
        if !time_step_s.is_finite() || time_step_s <= 0.0 {
            return Err(SolverError::InvalidConfig(format!(
                "time step must be positive, got {}",
                time_step_s
            )));
        }
        if !params.wheelbase_m.is_finite() || params.wheelbase_m <= 0.0 {
            return Err(SolverError::InvalidConfig(format!(
                "wheelbase must be positive, got {}",
                params.wheelbase_m
            )));
        }

        Ok(Self {
            params,
            time_step_s,
        })
    }

    /// Control which steers `x` towards `target`.
    fn track(&self, x: &StateVec, target: &RefVec) -> ControlVec {
        let p = &self.params;

        let accel = p.vel_gain * (target[IDY_VEL_LONG] - x[IDX_VEL_LONG]);

        // Cross-track error of the state relative to the target's heading line
        let (sin_h, cos_h) = target[IDY_HEADING].sin_cos();
        let dx = x[IDX_X] - target[IDY_X];
        let dy = x[IDX_Y] - target[IDY_Y];
        let cross_track_m = -sin_h * dx + cos_h * dy;

        let head_err = wrap_to_pi(target[IDY_HEADING] - x[IDX_HEADING]);
        let wheel_angle = p.heading_gain * (head_err - p.cross_track_gain * cross_track_m);

        ControlVec::new(
            clamp(&accel, &-p.max_accel_mps2, &p.max_accel_mps2),
            clamp(&wheel_angle, &-p.max_wheel_angle_rad, &p.max_wheel_angle_rad),
        )
    }

    /// Integrate the kinematic bicycle model over one time step.
    fn step(&self, x: &StateVec, u: &ControlVec) -> StateVec {
        let dt = self.time_step_s;
        let v = x[IDX_VEL_LONG];
        let h = x[IDX_HEADING];

        let mut next = *x;
        next[IDX_X] += v * h.cos() * dt;
        next[IDX_Y] += v * h.sin() * dt;
        next[IDX_HEADING] += v / self.params.wheelbase_m * u[IDU_WHEEL_ANGLE].tan() * dt;
        next[IDX_VEL_LONG] += u[IDU_ACCEL] * dt;
        next
    }
}

impl Optimizer for RolloutSolver {
    fn solve(&mut self, buffer: &mut HorizonBuffer) -> Result<SolveReport, SolverError> {
        let horizon = buffer.horizon();
        let x0 = *buffer.x0();

        let mut cost = 0.0;
        let mut x = x0;
        buffer.states_mut()[0] = x0;

        for i in 0..horizon {
            // Stage cost on the current state against this stage's reference
            cost += stage_cost(&x, &buffer.references()[i], &buffer.weights()[i]);

            // Aim for the next reference, the terminal one at the end of the horizon
            let (target, weight) = match i + 1 < horizon {
                true => (buffer.references()[i + 1], buffer.weights()[i + 1]),
                false => (*buffer.terminal_reference(), *buffer.terminal_weight()),
            };

            let u = match weight.iter().any(|w| *w != 0.0) {
                true => self.track(&x, &target),
                false => ControlVec::zeros(),
            };

            x = self.step(&x, &u);

            if !x.iter().all(|v| v.is_finite()) || !u.iter().all(|v| v.is_finite()) {
                return Err(SolverError::NonFinite(i));
            }

            buffer.controls_mut()[i] = u;
            buffer.states_mut()[i + 1] = x;
        }

        cost += stage_cost(&x, buffer.terminal_reference(), buffer.terminal_weight());

        trace!("Rollout cost: {:.4}", cost);

        Ok(SolveReport {
            iterations: 1,
            cost,
        })
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Weighted squared tracking error `e^T W e`, with the heading error wrapped.
fn stage_cost(x: &StateVec, reference: &RefVec, weight: &WeightMat) -> f64 {
    let mut err = x - reference;
    err[IDY_HEADING] = wrap_to_pi(err[IDY_HEADING]);
    err.dot(&(weight * err))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::traj::{spoof, SpoofParams, SpoofShape};

    const H: usize = 20;
    const DT: f64 = 0.1;

    fn params() -> RolloutParams {
        RolloutParams {
            wheelbase_m: 2.5,
            vel_gain: 1.0,
            heading_gain: 1.5,
            cross_track_gain: 0.3,
            max_accel_mps2: 3.0,
            max_wheel_angle_rad: 0.5,
        }
    }

    fn weights() -> (StateWeight, StateWeight) {
        (
            StateWeight {
                pose: 10.0,
                heading: 5.0,
                long_vel: 1.0,
            },
            StateWeight {
                pose: 100.0,
                heading: 50.0,
                long_vel: 10.0,
            },
        )
    }

    fn straight_buffer() -> HorizonBuffer {
        let traj = spoof(&SpoofParams {
            shape: SpoofShape::Straight,
            speed_ms: 2.0,
            num_points: H + 1,
            time_step_s: DT,
            start_x_m: 0.0,
            start_y_m: 0.0,
            start_heading_rad: 0.0,
        })
        .unwrap();

        let mut buf = HorizonBuffer::new(H).unwrap();
        let (nominal, terminal) = weights();
        buf.write_references(&traj, 0, 0, H).unwrap();
        buf.apply_weights(&nominal, &terminal);
        buf.set_terminal_reference(&traj.points[H]);
        buf
    }

    #[test]
    fn test_tracks_straight_line() {
        let mut buf = straight_buffer();
        buf.set_x0(StateVec::new(0.0, 0.0, 0.0, 2.0));

        let mut solver = RolloutSolver::new(params(), DT).unwrap();
        let report = solver.solve(&mut buf).unwrap();

        // Already on the reference, so the prediction follows it exactly
        assert!(report.cost.abs() < 1e-9);
        for (x, r) in buf.states().iter().zip(buf.references().iter()) {
            assert!((x - r).norm() < 1e-9);
        }
        assert!(buf.controls().iter().all(|u| u.norm() < 1e-9));
    }

    #[test]
    fn test_corrects_offset() {
        let mut buf = straight_buffer();
        buf.set_x0(StateVec::new(0.0, 0.5, 0.0, 1.0));

        let mut solver = RolloutSolver::new(params(), DT).unwrap();
        solver.solve(&mut buf).unwrap();

        // Turns right towards the line and speeds up
        assert!(buf.controls()[0][IDU_WHEEL_ANGLE] < 0.0);
        assert!(buf.controls()[0][IDU_ACCEL] > 0.0);
        assert!(buf.states()[H][IDX_Y] < 0.5);
        assert!(buf.states()[H][IDX_VEL_LONG] > 1.0);
    }

    #[test]
    fn test_coasts_through_zero_weights() {
        let mut buf = straight_buffer();
        buf.zero_stage_weights(5, H).unwrap();
        buf.zero_terminal_weights();
        buf.set_x0(StateVec::new(0.0, 0.5, 0.0, 1.0));

        let mut solver = RolloutSolver::new(params(), DT).unwrap();
        solver.solve(&mut buf).unwrap();

        assert!(buf.controls()[3].norm() > 0.0);
        assert!(buf.controls()[4..].iter().all(|u| *u == ControlVec::zeros()));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            RolloutSolver::new(params(), 0.0),
            Err(SolverError::InvalidConfig(_))
        ));

        let mut p = params();
        p.wheelbase_m = -1.0;
        assert!(matches!(
            RolloutSolver::new(p, DT),
            Err(SolverError::InvalidConfig(_))
        ));

        let mut buf = straight_buffer();
        buf.set_x0(StateVec::new(std::f64::NAN, 0.0, 0.0, 1.0));
        let mut solver = RolloutSolver::new(params(), DT).unwrap();
        assert_eq!(solver.solve(&mut buf), Err(SolverError::NonFinite(0)));
    }
}
