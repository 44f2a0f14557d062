//! Resampling of trajectories onto a fixed time step

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::UnitComplex;
use util::maths::{lin_map, unwrap_from};

use super::{TrajError, TrajPoint, Trajectory};

/// Tolerance used when deciding whether the final sample lands on the end of the source.
const TIME_EPSILON_S: f64 = 1e-9;

/// Upper limit on the number of points a single resample may produce.
pub const MAX_SAMPLES: usize = 1_000_000;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Resample `src` onto a fixed time step, writing the result into `dst`.
///
/// Samples start at the time of the first source point and continue while they lie within the
/// source. Position and velocity are interpolated linearly, heading along the shortest arc.
///
/// `dst` is only cleared once `src` has been validated, its allocation is reused. At most
/// `MAX_SAMPLES` points are produced.
pub fn sample(src: &Trajectory, dst: &mut Trajectory, time_step_s: f64) -> Result<(), TrajError> {
    if !time_step_s.is_finite() || time_step_s <= 0.0 {
        return Err(TrajError::InvalidTimeStep(time_step_s));
    }

    // Validate the times before touching the output
    if let Some(i) = src
        .points
        .iter()
        .position(|p| !p.time_from_start_s.is_finite())
    {
        return Err(TrajError::NonFiniteTime(i));
    }
    for (i, pair) in src.points.windows(2).enumerate() {
        if pair[1].time_from_start_s <= pair[0].time_from_start_s {
            return Err(TrajError::NonMonotonicTime(i + 1));
        }
    }

    let (first, last) = match (src.points.first(), src.points.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => {
            dst.points.clear();
            return Ok(());
        }
    };

    // Number of steps after the first sample. Finite since both times are finite and the step is
    // positive, but may still be too large to allocate.
    let duration_s = last.time_from_start_s - first.time_from_start_s;
    let num_steps = (duration_s / time_step_s + TIME_EPSILON_S).floor();
    if !(num_steps < MAX_SAMPLES as f64) {
        return Err(TrajError::TooManySamples {
            required: num_steps + 1.0,
            limit: MAX_SAMPLES,
        });
    }
    let num_samples = num_steps as usize + 1;

    dst.points.clear();

    // Index of the source segment start for the current sample
    let mut seg = 0;

    for i in 0..num_samples {
        // Computed from the start each time so errors don't accumulate
        let t = first.time_from_start_s + i as f64 * time_step_s;

        while seg + 2 < src.len() && src.points[seg + 1].time_from_start_s < t {
            seg += 1;
        }

        let point = match src.points.get(seg + 1) {
            Some(next) => interpolate(&src.points[seg], next, t),
            None => src.points[seg],
        };

        dst.points.push(point);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn interpolate(p0: &TrajPoint, p1: &TrajPoint, t: f64) -> TrajPoint {
    let times = (p0.time_from_start_s, p1.time_from_start_s);

    let h0 = p0.heading_rad();
    let h1 = unwrap_from(h0, p1.heading_rad());

    TrajPoint {
        time_from_start_s: t,
        x_m: lin_map(times, (p0.x_m, p1.x_m), t),
        y_m: lin_map(times, (p0.y_m, p1.y_m), t),
        heading: UnitComplex::new(lin_map(times, (h0, h1), t)),
        long_vel_ms: lin_map(times, (p0.long_vel_ms, p1.long_vel_ms), t),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_sample_linear() {
        let src: Trajectory = vec![
            TrajPoint::new(0.0, 0.0, 0.0, 0.0, 1.0),
            TrajPoint::new(1.0, 1.0, 2.0, 0.0, 3.0),
        ]
        .into();
        let mut dst = Trajectory::new_empty();

        sample(&src, &mut dst, 0.25).unwrap();

        assert_eq!(dst.len(), 5);
        assert!((dst.points[2].time_from_start_s - 0.5).abs() < 1e-12);
        assert!((dst.points[2].x_m - 0.5).abs() < 1e-12);
        assert!((dst.points[2].y_m - 1.0).abs() < 1e-12);
        assert!((dst.points[2].long_vel_ms - 2.0).abs() < 1e-12);
        assert!((dst.points[4].x_m - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sample_heading_shortest_arc() {
        // Going from just below +pi to just above -pi should pass through pi, not 0
        let src: Trajectory = vec![
            TrajPoint::new(0.0, 0.0, 0.0, PI - 0.1, 1.0),
            TrajPoint::new(1.0, 0.0, 0.0, -PI + 0.1, 1.0),
        ]
        .into();
        let mut dst = Trajectory::new_empty();

        sample(&src, &mut dst, 0.5).unwrap();

        assert_eq!(dst.len(), 3);
        assert!((dst.points[1].heading_rad().abs() - PI).abs() < 1e-9);
    }

    #[test]
    fn test_sample_multiple_segments() {
        let src: Trajectory = vec![
            TrajPoint::new(0.0, 0.0, 0.0, 0.0, 1.0),
            TrajPoint::new(0.3, 0.3, 0.0, 0.0, 1.0),
            TrajPoint::new(1.0, 0.3, 0.7, 0.0, 1.0),
        ]
        .into();
        let mut dst = Trajectory::new_empty();

        sample(&src, &mut dst, 0.2).unwrap();

        // 0.0, 0.2, 0.4, 0.6, 0.8, 1.0
        assert_eq!(dst.len(), 6);
        assert!((dst.points[1].x_m - 0.2).abs() < 1e-12);
        assert!((dst.points[2].x_m - 0.3).abs() < 1e-12);
        assert!((dst.points[2].y_m - 0.1).abs() < 1e-12);
        assert!((dst.points[5].y_m - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_sample_edge_cases() {
        let mut dst: Trajectory = vec![TrajPoint::new(0.0, 9.0, 9.0, 0.0, 0.0)].into();

        // Empty source clears the destination
        sample(&Trajectory::new_empty(), &mut dst, 0.1).unwrap();
        assert!(dst.is_empty());

        // Single point is passed through
        let single: Trajectory = vec![TrajPoint::new(0.0, 1.0, 2.0, 0.5, 3.0)].into();
        sample(&single, &mut dst, 0.1).unwrap();
        assert_eq!(dst, single);

        // Bad time steps
        assert!(matches!(
            sample(&single, &mut dst, 0.0),
            Err(TrajError::InvalidTimeStep(_))
        ));
        assert!(matches!(
            sample(&single, &mut dst, std::f64::NAN),
            Err(TrajError::InvalidTimeStep(_))
        ));

        // Non-monotonic times
        let bad: Trajectory = vec![
            TrajPoint::new(0.0, 0.0, 0.0, 0.0, 1.0),
            TrajPoint::new(1.0, 0.0, 0.0, 0.0, 1.0),
            TrajPoint::new(1.0, 0.0, 0.0, 0.0, 1.0),
        ]
        .into();
        assert!(matches!(
            sample(&bad, &mut dst, 0.1),
            Err(TrajError::NonMonotonicTime(2))
        ));
    }

    #[test]
    fn test_sample_rejects_bad_times() {
        let prev: Trajectory = vec![TrajPoint::new(0.0, 1.0, 2.0, 0.5, 3.0)].into();
        let mut dst = prev.clone();

        // Infinite end time
        let inf: Trajectory = vec![
            TrajPoint::new(0.0, 0.0, 0.0, 0.0, 1.0),
            TrajPoint::new(std::f64::INFINITY, 1.0, 0.0, 0.0, 1.0),
        ]
        .into();
        assert!(matches!(
            sample(&inf, &mut dst, 0.1),
            Err(TrajError::NonFiniteTime(1))
        ));

        // NaN time, which would pass the ordering check
        let nan: Trajectory = vec![
            TrajPoint::new(std::f64::NAN, 0.0, 0.0, 0.0, 1.0),
            TrajPoint::new(1.0, 1.0, 0.0, 0.0, 1.0),
        ]
        .into();
        assert!(matches!(
            sample(&nan, &mut dst, 0.1),
            Err(TrajError::NonFiniteTime(0))
        ));

        // Finite but far too long for the time step
        let long: Trajectory = vec![
            TrajPoint::new(0.0, 0.0, 0.0, 0.0, 1.0),
            TrajPoint::new(1e12, 1.0, 0.0, 0.0, 1.0),
        ]
        .into();
        assert!(matches!(
            sample(&long, &mut dst, 0.1),
            Err(TrajError::TooManySamples { limit: MAX_SAMPLES, .. })
        ));

        // The destination is untouched by every failure
        assert_eq!(dst, prev);
    }
}
