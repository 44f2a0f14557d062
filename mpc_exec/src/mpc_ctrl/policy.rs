//! Loading trajectory data into the horizon
//!
//! A fresh trajectory and a backfill after an advance both end up with the same horizon layout:
//!
//! - stages `[0, end)` hold references taken from the trajectory and carry nominal weights,
//! - stages `[end, H)` have no trajectory data behind them and carry zero weight,
//! - if the trajectory has a point beyond the last stage it becomes the terminal reference with
//!   terminal weights, otherwise the terminal weights are zeroed and stage `end - 1` is given the
//!   terminal weights in its place.
//!
//! `end` is the number of stages the trajectory still covers from the current reference index.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use serde::Serialize;

use super::OptimizationWeights;
use crate::{
    horizon::{HorizonBuffer, HorizonError},
    traj::Trajectory,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// What a load left in the horizon.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    /// Number of reference stages written from the trajectory.
    pub stages_written: usize,

    /// Number of stages at the end of the horizon which carry zero weight.
    pub stages_zero_weighted: usize,

    /// True if a trajectory point beyond the horizon is the terminal reference.
    pub terminal_active: bool,

    /// The stage given terminal weights in place of the terminal stage, if any.
    pub pseudo_terminal: Option<usize>,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a new trajectory into the horizon, starting from its first point.
///
/// The first `min(len, H)` points become the stage references.
pub fn load_new(
    buffer: &mut HorizonBuffer,
    weights: &OptimizationWeights,
    traj: &Trajectory,
) -> Result<LoadReport, HorizonError> {
    let end = traj.len().min(buffer.horizon());

    buffer.write_references(traj, 0, 0, end)?;

    let mut report = apply_truncation(buffer, weights, traj, 0, end, end)?;
    report.stages_written = end;

    debug!(
        "Loaded trajectory of {} points into horizon of {} stages",
        traj.len(),
        buffer.horizon()
    );

    Ok(report)
}

/// Refill the last `count` stages of the horizon after it has been advanced by `count`.
///
/// `reference_index` is the trajectory index of stage 0 after the advance, so the vacated tail
/// starts at trajectory index `reference_index + H - count`. Only trajectory points which exist
/// are read. `count` must be less than the horizon length.
pub fn backfill(
    buffer: &mut HorizonBuffer,
    weights: &OptimizationWeights,
    traj: &Trajectory,
    reference_index: usize,
    count: usize,
) -> Result<LoadReport, HorizonError> {
    let horizon = buffer.horizon();
    if count >= horizon {
        return Err(HorizonError::OutOfBounds {
            what: "Backfill count",
            index: count,
            limit: horizon,
        });
    }
    let tail_start = horizon - count;

    let len = traj.len();
    let traj_start = reference_index.saturating_add(tail_start).min(len);
    let traj_end = traj_start.saturating_add(count).min(len);
    let available = traj_end - traj_start;

    buffer.write_references(traj, tail_start, traj_start, available)?;

    // Stages covered by the trajectory from the current reference index. Equal to
    // `tail_start + available` unless the trajectory ran out before the tail.
    let end = len.saturating_sub(reference_index).min(horizon);

    let mut report = apply_truncation(
        buffer,
        weights,
        traj,
        tail_start.min(end),
        end,
        reference_index.saturating_add(horizon),
    )?;
    report.stages_written = available;

    if available < count {
        debug!(
            "Backfilled {} of {} stages, trajectory ends at stage {}",
            available, count, end
        );
    }

    Ok(report)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Weight the horizon so that only stages `[0, end)` carry cost.
///
/// Nominal weights are applied to `[weight_start, end)`, the remainder of the horizon is zeroed,
/// and the terminal stage is set from trajectory point `terminal_index` if it exists.
fn apply_truncation(
    buffer: &mut HorizonBuffer,
    weights: &OptimizationWeights,
    traj: &Trajectory,
    weight_start: usize,
    end: usize,
    terminal_index: usize,
) -> Result<LoadReport, HorizonError> {
    let horizon = buffer.horizon();

    buffer.apply_stage_weights(&weights.nominal, weight_start, end)?;
    buffer.zero_stage_weights(end, horizon)?;

    let mut report = LoadReport {
        stages_zero_weighted: horizon - end,
        ..Default::default()
    };

    match traj.get(terminal_index) {
        Some(pt) => {
            buffer.set_terminal_reference(pt);
            buffer.set_terminal_weights(&weights.terminal);
            report.terminal_active = true;
        }
        None => {
            buffer.zero_terminal_weights();

            // Nothing is left to emphasise once the trajectory is exhausted
            if let Some(last) = end.checked_sub(1) {
                buffer.apply_stage_weights_single(&weights.terminal, last)?;
                report.pseudo_terminal = Some(last);
            }
        }
    }

    Ok(report)
}
