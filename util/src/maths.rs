//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where 
    T: Float 
{
    target_range.0 
        + ((value - source_range.0) 
        * (target_range.1 - target_range.0) 
        / (source_range.1 - source_range.0))
}

pub fn clamp<T>(value: &T, min: &T, max: &T) -> T 
where
    T: Float
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Wrap an angle into the range [-pi, pi].
pub fn wrap_to_pi<T>(angle: T) -> T
where
    T: Float
{
    angle.sin().atan2(angle.cos())
}

/// Return the angle equivalent to `angle` (modulo 2pi) which is closest to
/// `reference`.
///
/// Applied along a sequence of angles, with `reference` being the previous
/// unwrapped output, this removes the 2pi jumps from the sequence.
pub fn unwrap_from<T>(reference: T, angle: T) -> T
where
    T: Float
{
    reference + wrap_to_pi(angle - reference)
}
