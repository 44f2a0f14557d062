//! Main MPC executable entry point.
//!
//! # Architecture
//!
//! The executable closes the loop around the MPC controller without any external hardware:
//!
//!     - Initialise the session, logging and parameters
//!     - Spoof a reference trajectory and initialise MpcCtrl
//!     - Main loop:
//!         - MpcCtrl processing, loading the trajectory on the first cycle
//!         - Plant propagation, taking the predicted state a number of stages ahead as the new
//!           plant state
//!     - Save the cycle records and the final horizon buffer to the session directory
//!
//! An optional single argument overrides the maximum number of cycles to run.
//!
//! # Modules
//!
//! All modules (e.g. `mpc_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use mpc_lib::{
    mpc_ctrl::{self, InitData, InputData, MpcCtrl, OutputData, PlantState, StatusReport},
    solver::{RolloutParams, RolloutSolver},
    traj::{spoof, SpoofParams},
};
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the executable.
#[derive(Debug, Clone, Deserialize)]
struct ExecParams {
    /// Target period of one cycle. Zero runs the loop as fast as possible.
    ///
    /// Units: seconds
    cycle_period_s: f64,

    /// Number of horizon stages the plant moves on by each cycle.
    stages_per_cycle: usize,

    /// Maximum number of cycles to run.
    max_num_cycles: usize,

    mpc_ctrl: mpc_ctrl::Params,

    rollout: RolloutParams,

    spoof: SpoofParams,
}

/// Record of a single cycle, saved at the end of the run.
#[derive(Debug, Serialize)]
struct CycleRecord {
    cycle: usize,
    elapsed_s: f64,
    plant_state: PlantState,
    output: OutputData,
    report: StatusReport,
}

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Longest accepted cycle period.
const MAX_CYCLE_PERIOD_S: f64 = 3600.0;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ExecParams {
    /// Check the loop parameters can be used to drive the cycle.
    fn validate(&self) -> Result<(), Report> {
        if !(0.0..=MAX_CYCLE_PERIOD_S).contains(&self.cycle_period_s) {
            return Err(eyre!(
                "cycle_period_s must be between 0 and {} s, got {}",
                MAX_CYCLE_PERIOD_S,
                self.cycle_period_s
            ));
        }

        if self.stages_per_cycle >= self.mpc_ctrl.horizon {
            return Err(eyre!(
                "stages_per_cycle ({}) must be less than the horizon ({})",
                self.stages_per_cycle,
                self.mpc_ctrl.horizon
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("mpc_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    info!("MPC Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let mut params: ExecParams =
        util::params::load("mpc_exec.toml").wrap_err("Could not load exec params")?;

    let args: Vec<String> = env::args().collect();
    debug!("CLI arguments: {:?}", args);

    if let Some(arg) = args.get(1) {
        params.max_num_cycles = arg
            .parse()
            .wrap_err_with(|| format!("Invalid maximum number of cycles \"{}\"", arg))?;
    }

    params.validate()?;

    info!("Exec parameters loaded");

    // ---- INITIALISE MODULES ----

    let traj = spoof(&params.spoof).wrap_err("Failed to spoof a trajectory")?;
    info!(
        "Spoofed {:?} trajectory of {} points",
        params.spoof.shape,
        traj.len()
    );

    let solver = RolloutSolver::new(params.rollout.clone(), params.mpc_ctrl.solver_time_step_s)
        .wrap_err("Failed to initialise the solver")?;

    let mut mpc_ctrl = MpcCtrl::init(InitData {
        params: params.mpc_ctrl.clone(),
        optimizer: solver,
    })
    .wrap_err("Failed to initialise MpcCtrl")?;

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    let mut plant_state = PlantState {
        x_m: params.spoof.start_x_m,
        y_m: params.spoof.start_y_m,
        heading_rad: params.spoof.start_heading_rad,
        long_vel_ms: 0.0,
    };
    let mut new_trajectory = Some(traj);
    let mut records = Vec::with_capacity(params.max_num_cycles);

    let cycle_period = Duration::from_secs_f64(params.cycle_period_s);

    info!("Begining main loop\n");

    for cycle in 0..params.max_num_cycles {
        let cycle_start_instant = Instant::now();

        let input = InputData {
            plant_state,
            stages_elapsed: match new_trajectory {
                Some(_) => 0,
                None => params.stages_per_cycle,
            },
            new_trajectory: new_trajectory.take(),
        };

        let (output, report) = mpc_ctrl
            .proc(&input)
            .wrap_err_with(|| format!("MpcCtrl processing failed on cycle {}", cycle))?;

        records.push(CycleRecord {
            cycle,
            elapsed_s: session::get_elapsed_seconds(),
            plant_state,
            output,
            report,
        });

        if report.trajectory_complete {
            info!("Trajectory complete after {} cycles", cycle + 1);
            break;
        }

        // Propagate the plant along the predicted states
        plant_state = match mpc_ctrl.buffer().states().get(params.stages_per_cycle) {
            Some(x) => PlantState::from_state_vec(x),
            None => return Err(eyre!("No predicted state {}", params.stages_per_cycle)),
        };

        let cycle_dur = Instant::now() - cycle_start_instant;

        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None if params.cycle_period_s > 0.0 => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
            ),
            None => (),
        }
    }

    // ---- SHUTDOWN ----

    session
        .save_json("cycles.json", &records)
        .wrap_err("Failed to save the cycle records")?;
    session
        .save_json("horizon.json", mpc_ctrl.buffer())
        .wrap_err("Failed to save the horizon buffer")?;

    info!("End of execution");

    Ok(())
}
