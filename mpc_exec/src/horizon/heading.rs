//! Heading consistency across the horizon
//!
//! References are written with headings normalised to [-pi, pi], so a trajectory which turns
//! through the +/-pi boundary produces a 2pi step between neighbouring stages. The optimizer would
//! see that step as a real heading error, so the heading channel is unwrapped before each solve.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::warn;
use serde::Serialize;
use util::maths::wrap_to_pi;

use super::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default limit on the accumulated heading change before the references are considered to
/// contain an implausible jump.
pub const HEADING_DISCONTINUITY_THRESHOLD_RAD: f64 = std::f64::consts::PI;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Result of reconciling the reference headings.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct HeadingCheck {
    /// Sum of the absolute wrapped heading changes between consecutive visited headings, starting
    /// from the plant heading.
    ///
    /// Units: radians
    pub error_rad: f64,

    /// True if `error_rad` exceeded the threshold.
    pub discontinuity: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl HorizonBuffer {
    /// Unwrap the reference headings of stages `[0, min(span, H))` followed by the terminal
    /// heading, starting from the current plant heading.
    ///
    /// Each heading `h` is replaced by `last + atan2(sin(h - last), cos(h - last))`, where `last`
    /// is the previous unwrapped heading. The headings are always left unwrapped, the returned
    /// check only reports whether the accumulated change exceeded `threshold_rad`, which points at
    /// a jump in the planned headings rather than a controller fault.
    pub fn reconcile_headings(&mut self, span: usize, threshold_rad: f64) -> HeadingCheck {
        let span = span.min(self.horizon);

        let mut last = self.x0[IDX_HEADING];
        let mut error_rad = 0.0;

        let mut unwrap_heading = |heading: &mut f64| {
            let delta = wrap_to_pi(*heading - last);
            *heading = last + delta;
            error_rad += delta.abs();
            last = *heading;
        };

        for r in self.refs[..span].iter_mut() {
            unwrap_heading(&mut r[IDY_HEADING]);
        }
        unwrap_heading(&mut self.terminal_ref[IDY_HEADING]);

        let discontinuity = error_rad > threshold_rad;
        if discontinuity {
            warn!(
                "Reference heading discontinuity: accumulated change of {:.3} rad exceeds {:.3} rad",
                error_rad, threshold_rad
            );
        }

        HeadingCheck {
            error_rad,
            discontinuity,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{PI, TAU};

    const H: usize = 10;

    fn buffer_with_headings(headings: &[f64], terminal: f64) -> HorizonBuffer {
        let mut buf = HorizonBuffer::new(H).unwrap();
        for (r, h) in buf.refs.iter_mut().zip(headings.iter()) {
            r[IDY_HEADING] = *h;
        }
        buf.terminal_ref[IDY_HEADING] = terminal;
        buf
    }

    #[test]
    fn test_detects_discontinuity() {
        let mut buf = buffer_with_headings(&[0.0, 3.0, -3.0, 0.0], 0.0);

        let check = buf.reconcile_headings(4, HEADING_DISCONTINUITY_THRESHOLD_RAD);

        assert!(check.discontinuity);
        assert!(check.error_rad > PI);

        // The -3.0 continues on from 3.0 rather than jumping back
        let refs = buf.references();
        assert!((refs[1][IDY_HEADING] - 3.0).abs() < 1e-12);
        assert!((refs[2][IDY_HEADING] - (TAU - 3.0)).abs() < 1e-12);
        assert!((refs[3][IDY_HEADING] - TAU).abs() < 1e-12);
        assert!((buf.terminal_reference()[IDY_HEADING] - TAU).abs() < 1e-12);

        // Stages outside the span are untouched
        assert_eq!(refs[4][IDY_HEADING], 0.0);
    }

    #[test]
    fn test_smooth_wrap_is_not_an_anomaly() {
        // A smooth turn through +pi, as normalised headings
        let mut buf = buffer_with_headings(&[2.9, 3.05, -3.1, -2.95], -2.8);
        buf.x0[IDX_HEADING] = 2.8;

        let check = buf.reconcile_headings(4, HEADING_DISCONTINUITY_THRESHOLD_RAD);

        let refs = buf.references();
        assert!((refs[2][IDY_HEADING] - (TAU - 3.1)).abs() < 1e-12);
        assert!((refs[3][IDY_HEADING] - (TAU - 2.95)).abs() < 1e-12);
        assert!((buf.terminal_reference()[IDY_HEADING] - (TAU - 2.8)).abs() < 1e-12);

        // 0.1 + 0.15 + (2pi - 6.15) + 0.15 + 0.15
        assert!((check.error_rad - (0.55 + TAU - 6.15)).abs() < 1e-9);
        assert!(!check.discontinuity);
    }

    #[test]
    fn test_idempotent() {
        let mut buf = buffer_with_headings(&[0.0, 3.0, -3.0, 0.0, 1.0, -2.0, 3.1], -3.1);

        let first = buf.reconcile_headings(H, HEADING_DISCONTINUITY_THRESHOLD_RAD);
        let once = buf.clone();

        let second = buf.reconcile_headings(H, HEADING_DISCONTINUITY_THRESHOLD_RAD);

        for (a, b) in buf.references().iter().zip(once.references().iter()) {
            assert!((a[IDY_HEADING] - b[IDY_HEADING]).abs() < 1e-9);
        }
        assert!(
            (buf.terminal_reference()[IDY_HEADING] - once.terminal_reference()[IDY_HEADING]).abs()
                < 1e-9
        );
        assert!((first.error_rad - second.error_rad).abs() < 1e-9);
        assert_eq!(first.discontinuity, second.discontinuity);
    }

    #[test]
    fn test_span_clamped_and_seeded() {
        // Seed two turns away pulls every heading into the seed's turn
        let mut buf = buffer_with_headings(&[0.1; H], 0.1);
        buf.x0[IDX_HEADING] = 2.0 * TAU;

        let check = buf.reconcile_headings(H + 20, HEADING_DISCONTINUITY_THRESHOLD_RAD);

        assert!(buf
            .references()
            .iter()
            .all(|r| (r[IDY_HEADING] - (2.0 * TAU + 0.1)).abs() < 1e-9));
        assert!((buf.terminal_reference()[IDY_HEADING] - (2.0 * TAU + 0.1)).abs() < 1e-9);
        assert!((check.error_rad - 0.1).abs() < 1e-9);
        assert!(!check.discontinuity);

        // A zero span still visits the terminal heading
        let mut buf = buffer_with_headings(&[0.1; H], -TAU);
        let check = buf.reconcile_headings(0, HEADING_DISCONTINUITY_THRESHOLD_RAD);
        assert!(buf.terminal_reference()[IDY_HEADING].abs() < 1e-9);
        assert!((buf.references()[0][IDY_HEADING] - 0.1).abs() < 1e-12);
        assert!(check.error_rad < 1e-9);
    }
}
