//! Implementations for the MpcCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace};
use serde::Serialize;

// Internal
use super::{policy, MpcCtrlError, Params};
use crate::{
    horizon::{
        ControlVec, HeadingCheck, HorizonBuffer, StateVec, IDU_ACCEL, IDU_WHEEL_ANGLE,
        IDX_HEADING, IDX_VEL_LONG, IDX_X, IDX_Y,
    },
    solver::{Optimizer, SolveReport},
    traj::{sample, Trajectory},
};
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// MPC control module state.
pub struct MpcCtrl<O> {
    params: Params,

    buffer: HorizonBuffer,

    optimizer: O,

    /// The active trajectory. Storage is reused between trajectories.
    trajectory: Trajectory,

    /// Resampling target, swapped with `trajectory` once the resample is known to be usable.
    resampled: Trajectory,

    /// True once a trajectory has been successfully loaded.
    has_trajectory: bool,

    /// Index of the trajectory point referenced by stage 0.
    reference_index: usize,

    report: StatusReport,
}

/// Data needed to initialise MpcCtrl.
pub struct InitData<O> {
    pub params: Params,
    pub optimizer: O,
}

/// Input data to MPC control.
#[derive(Debug, Clone, Default)]
pub struct InputData {
    /// Current estimate of the plant state.
    pub plant_state: PlantState,

    /// A newly received trajectory, or `None` if there is no new trajectory on this cycle.
    pub new_trajectory: Option<Trajectory>,

    /// Number of horizon stages which have elapsed since the previous cycle. Ignored when a new
    /// trajectory is given.
    pub stages_elapsed: usize,
}

/// Estimated state of the plant.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct PlantState {
    /// Units: meters
    pub x_m: f64,

    /// Units: meters
    pub y_m: f64,

    /// Units: radians
    pub heading_rad: f64,

    /// Longitudinal velocity.
    ///
    /// Units: meters/second
    pub long_vel_ms: f64,
}

/// Output command from MpcCtrl, the first control of the optimal sequence.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct OutputData {
    /// Units: meters/second^2
    pub long_accel_mps2: f64,

    /// Units: radians
    pub front_wheel_angle_rad: f64,
}

/// Status report for MpcCtrl processing.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct StatusReport {
    /// A new trajectory was loaded on this cycle.
    pub new_trajectory: bool,

    /// Number of stages the horizon was advanced by.
    pub stages_advanced: usize,

    /// Number of reference stages written from the trajectory.
    pub stages_written: usize,

    /// Number of stages at the end of the horizon with zero weight.
    pub stages_zero_weighted: usize,

    /// A trajectory point beyond the horizon is the terminal reference.
    pub terminal_active: bool,

    /// The plant has reached the last point of the trajectory.
    pub trajectory_complete: bool,

    /// Result of unwrapping the reference headings.
    pub heading: HeadingCheck,

    /// Result of the solve.
    pub solve: SolveReport,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PlantState {
    pub fn to_state_vec(&self) -> StateVec {
        let mut x = StateVec::zeros();
        x[IDX_X] = self.x_m;
        x[IDX_Y] = self.y_m;
        x[IDX_HEADING] = self.heading_rad;
        x[IDX_VEL_LONG] = self.long_vel_ms;
        x
    }

    pub fn from_state_vec(x: &StateVec) -> Self {
        Self {
            x_m: x[IDX_X],
            y_m: x[IDX_Y],
            heading_rad: x[IDX_HEADING],
            long_vel_ms: x[IDX_VEL_LONG],
        }
    }
}

impl From<&ControlVec> for OutputData {
    fn from(u: &ControlVec) -> Self {
        Self {
            long_accel_mps2: u[IDU_ACCEL],
            front_wheel_angle_rad: u[IDU_WHEEL_ANGLE],
        }
    }
}

impl<O: Optimizer> MpcCtrl<O> {
    /// Build the controller around an existing horizon buffer.
    ///
    /// The buffer must have the horizon length given in the parameters. Nominal and terminal
    /// weights are applied over the whole horizon.
    pub fn with_buffer(
        params: Params,
        mut buffer: HorizonBuffer,
        optimizer: O,
    ) -> Result<Self, MpcCtrlError> {
        params.validate().map_err(MpcCtrlError::InvalidParams)?;

        if buffer.horizon() != params.horizon {
            return Err(MpcCtrlError::HorizonMismatch {
                buffer: buffer.horizon(),
                params: params.horizon,
            });
        }

        buffer.apply_weights(&params.weights.nominal, &params.weights.terminal);

        Ok(Self {
            params,
            buffer,
            optimizer,
            trajectory: Trajectory::new_empty(),
            resampled: Trajectory::new_empty(),
            has_trajectory: false,
            reference_index: 0,
            report: StatusReport::default(),
        })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn buffer(&self) -> &HorizonBuffer {
        &self.buffer
    }

    /// The active trajectory, if one has been loaded.
    pub fn trajectory(&self) -> Option<&Trajectory> {
        match self.has_trajectory {
            true => Some(&self.trajectory),
            false => None,
        }
    }

    /// Index of the trajectory point referenced by stage 0.
    pub fn reference_index(&self) -> usize {
        self.reference_index
    }

    pub fn report(&self) -> &StatusReport {
        &self.report
    }

    /// Load a new trajectory into the horizon, replacing the active one.
    ///
    /// The trajectory is resampled at the solver time step first if so configured. Returns the
    /// trajectory as stored. An empty trajectory is rejected without modifying anything.
    pub fn handle_new_trajectory(&mut self, traj: &Trajectory) -> Result<&Trajectory, MpcCtrlError> {
        if traj.is_empty() {
            return Err(MpcCtrlError::EmptyTrajectory);
        }

        match self.params.resample_trajectory {
            true => {
                sample(traj, &mut self.resampled, self.params.solver_time_step_s)?;
                if self.resampled.is_empty() {
                    return Err(MpcCtrlError::EmptyTrajectory);
                }
                std::mem::swap(&mut self.trajectory, &mut self.resampled);
            }
            false => self.trajectory.copy_from(traj),
        }
        self.has_trajectory = false;

        let load = policy::load_new(&mut self.buffer, &self.params.weights, &self.trajectory)?;

        self.reference_index = 0;
        self.has_trajectory = true;

        self.report.new_trajectory = true;
        self.report.stages_written = load.stages_written;
        self.report.stages_zero_weighted = load.stages_zero_weighted;
        self.report.terminal_active = load.terminal_active;

        info!(
            "New trajectory of {} points loaded ({} received)",
            self.trajectory.len(),
            traj.len()
        );

        Ok(&self.trajectory)
    }

    /// Advance the horizon by `count` stages, moving the reference index along the trajectory.
    ///
    /// The vacated tail still holds the old data and must be backfilled before the next solve.
    pub fn advance(&mut self, count: usize) -> Result<(), MpcCtrlError> {
        self.buffer.advance(count)?;
        self.reference_index += count;
        self.report.stages_advanced += count;

        trace!("Advanced horizon by {}, reference index {}", count, self.reference_index);

        Ok(())
    }

    /// Fill the last `count` stages of the horizon from the active trajectory.
    pub fn backfill(&mut self, count: usize) -> Result<(), MpcCtrlError> {
        if !self.has_trajectory {
            return Err(MpcCtrlError::NoTrajectory);
        }

        let load = policy::backfill(
            &mut self.buffer,
            &self.params.weights,
            &self.trajectory,
            self.reference_index,
            count,
        )?;

        self.report.stages_written = load.stages_written;
        self.report.stages_zero_weighted = load.stages_zero_weighted;
        self.report.terminal_active = load.terminal_active;

        Ok(())
    }

    /// Unwrap the reference headings of the first `span` stages and the terminal stage against
    /// the plant heading.
    pub fn reconcile_headings(&mut self, span: usize) -> HeadingCheck {
        let check = self
            .buffer
            .reconcile_headings(span, self.params.heading_discontinuity_threshold_rad);
        self.report.heading = check;
        check
    }
}

impl<O: Optimizer> State for MpcCtrl<O> {
    type InitData = InitData<O>;
    type InitError = MpcCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = MpcCtrlError;

    /// Initialise the MpcCtrl module, allocating a horizon buffer of the configured length.
    fn init(init_data: Self::InitData) -> Result<Self, Self::InitError> {
        let buffer = HorizonBuffer::new(init_data.params.horizon)?;
        Self::with_buffer(init_data.params, buffer, init_data.optimizer)
    }

    /// Perform cyclic processing of MPC control.
    ///
    /// If any step before the solve fails the optimizer is not run and the error is returned.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        self.buffer.set_x0(input_data.plant_state.to_state_vec());

        match input_data.new_trajectory {
            Some(ref traj) => {
                self.handle_new_trajectory(traj)?;
            }
            None => {
                if !self.has_trajectory {
                    return Err(MpcCtrlError::NoTrajectory);
                }

                if input_data.stages_elapsed > 0 {
                    self.advance(input_data.stages_elapsed)?;
                    self.backfill(input_data.stages_elapsed)?;
                }
            }
        }

        self.report.trajectory_complete = self.reference_index + 1 >= self.trajectory.len();

        self.reconcile_headings(self.params.horizon);

        self.report.solve = self.optimizer.solve(&mut self.buffer)?;

        let output = self
            .buffer
            .controls()
            .first()
            .map(OutputData::from)
            .unwrap_or_default();

        debug!(
            "MpcCtrl output: accel {:.3} m/s^2, wheel angle {:.3} rad, cost {:.3}",
            output.long_accel_mps2, output.front_wheel_angle_rad, self.report.solve.cost
        );

        Ok((output, self.report))
    }
}
