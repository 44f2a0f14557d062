//! Writing trajectory samples into the horizon references

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;

use super::*;
use crate::traj::{TrajPoint, Trajectory};

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl HorizonBuffer {
    /// Copy `count` trajectory points starting at `src_start` into the stage references starting
    /// at `dest_start`.
    ///
    /// Requires `dest_start + count <= H` and `src_start + count <= trajectory length`, fails with
    /// `OutOfBounds` otherwise, leaving the references untouched.
    pub fn write_references(
        &mut self,
        traj: &Trajectory,
        dest_start: usize,
        src_start: usize,
        count: usize,
    ) -> Result<(), HorizonError> {
        let dest_end = dest_start.checked_add(count).unwrap_or(usize::MAX);
        if dest_end > self.horizon {
            return Err(HorizonError::OutOfBounds {
                what: "Reference stage",
                index: dest_end,
                limit: self.horizon,
            });
        }

        let src_end = src_start.checked_add(count).unwrap_or(usize::MAX);
        if src_end > traj.len() {
            return Err(HorizonError::OutOfBounds {
                what: "Trajectory point",
                index: src_end,
                limit: traj.len(),
            });
        }

        for (dest, pt) in self.refs[dest_start..dest_end]
            .iter_mut()
            .zip(traj.points[src_start..src_end].iter())
        {
            *dest = point_to_ref(pt);
        }

        trace!(
            "Wrote trajectory points [{}, {}) to reference stages [{}, {})",
            src_start,
            src_end,
            dest_start,
            dest_end
        );

        Ok(())
    }

    /// Set the terminal reference from a single trajectory point.
    pub fn set_terminal_reference(&mut self, point: &TrajPoint) {
        self.terminal_ref = point_to_ref(point);
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn point_to_ref(pt: &TrajPoint) -> RefVec {
    let mut r = RefVec::zeros();
    r[IDY_X] = pt.x_m;
    r[IDY_Y] = pt.y_m;
    r[IDY_HEADING] = pt.heading_rad();
    r[IDY_VEL_LONG] = pt.long_vel_ms;
    r
}

#[cfg(test)]
mod test {
    use super::*;

    const H: usize = 10;

    fn traj(len: usize) -> Trajectory {
        (0..len)
            .map(|i| {
                TrajPoint::new(
                    0.1 * i as f64,
                    i as f64,
                    -2.0 * i as f64,
                    0.7 * i as f64,
                    0.5 + i as f64,
                )
            })
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_write_full_horizon() {
        let t = traj(H);
        let mut buf = HorizonBuffer::new(H).unwrap();

        buf.write_references(&t, 0, 0, H).unwrap();

        for (r, p) in buf.references().iter().zip(t.points.iter()) {
            assert_eq!(r[IDY_X], p.x_m);
            assert_eq!(r[IDY_Y], p.y_m);
            assert_eq!(r[IDY_VEL_LONG], p.long_vel_ms);
            // Heading matches up to normalisation
            let d = util::maths::wrap_to_pi(r[IDY_HEADING] - p.heading_rad());
            assert!(d.abs() < 1e-12);
            assert!(r[IDY_HEADING].abs() <= std::f64::consts::PI);
        }
    }

    #[test]
    fn test_write_offsets() {
        let t = traj(20);
        let mut buf = HorizonBuffer::new(H).unwrap();

        buf.write_references(&t, 7, 12, 3).unwrap();

        assert!(buf.references()[..7].iter().all(|r| *r == RefVec::zeros()));
        assert_eq!(buf.references()[7][IDY_X], 12.0);
        assert_eq!(buf.references()[9][IDY_X], 14.0);

        // Zero count is a no-op, even at the very end
        let before = buf.clone();
        buf.write_references(&t, H, 20, 0).unwrap();
        assert_eq!(buf, before);
    }

    #[test]
    fn test_write_out_of_bounds() {
        let t = traj(5);
        let mut buf = HorizonBuffer::new(H).unwrap();
        let before = buf.clone();

        assert!(matches!(
            buf.write_references(&t, 8, 0, 3),
            Err(HorizonError::OutOfBounds { index: 11, limit: H, .. })
        ));
        assert!(matches!(
            buf.write_references(&t, 0, 3, 3),
            Err(HorizonError::OutOfBounds { index: 6, limit: 5, .. })
        ));
        assert!(matches!(
            buf.write_references(&t, 0, usize::MAX, 2),
            Err(HorizonError::OutOfBounds { .. })
        ));
        assert_eq!(buf, before);
    }

    #[test]
    fn test_terminal_reference() {
        let t = traj(3);
        let mut buf = HorizonBuffer::new(H).unwrap();

        buf.set_terminal_reference(&t.points[2]);

        assert_eq!(buf.terminal_reference()[IDY_X], 2.0);
        assert_eq!(buf.terminal_reference()[IDY_Y], -4.0);
        assert_eq!(buf.terminal_reference()[IDY_VEL_LONG], 2.5);
        assert!((buf.terminal_reference()[IDY_HEADING] - 1.4).abs() < 1e-12);
        assert!(buf.references().iter().all(|r| *r == RefVec::zeros()));
    }
}
