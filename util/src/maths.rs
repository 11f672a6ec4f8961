//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Clamp a value into `[min, max]`.
///
/// Unlike `f64::clamp` a `NaN` value is mapped to zero (or the nearest bound if zero is outside
/// the range), so the result is always inside the range.
pub fn clamp<T>(value: T, min: T, max: T) -> T 
where
    T: Float
{
    let mut ret = if value.is_nan() { T::zero() } else { value };

    if ret > max {
        ret = max
    }
    if ret < min {
        ret = min
    }

    ret
}

/// Arithmetic mean of the values, or `None` if there are none.
pub fn mean<T>(values: &[T]) -> Option<T>
where
    T: Float
{
    if values.is_empty() {
        return None;
    }

    let sum = values.iter().fold(T::zero(), |acc, &v| acc + v);

    Some(sum / T::from(values.len())?)
}

/// Population standard deviation (zero degrees of freedom) of the values, or `None` if there
/// are none.
pub fn std_dev<T>(values: &[T]) -> Option<T>
where
    T: Float
{
    let mu = mean(values)?;

    let sq_sum = values.iter().fold(T::zero(), |acc, &v| acc + (v - mu).powi(2));

    Some((sq_sum / T::from(values.len())?).sqrt())
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
/// 
/// This function is taken from the std library as num is missing it.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Get the unsigned distance of an angle in degrees from zero, accounting for wrapping at 360.
///
/// The result is in the range [0, 180].
pub fn ang_from_zero_deg<T>(angle_deg: T) -> T
where
    T: Float
{
    let full = T::from(360.0).unwrap_or_else(T::max_value);
    let wrapped = rem_euclid(angle_deg, full);

    if wrapped > full / (T::one() + T::one()) {
        full - wrapped
    }
    else {
        wrapped
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(20.0, -15.0, 15.0), 15.0);
        assert_eq!(clamp(-20.0, -15.0, 15.0), -15.0);
        assert_eq!(clamp(3.0, -15.0, 15.0), 3.0);
        assert_eq!(clamp(f64::NAN, -15.0, 15.0), 0.0);
        assert_eq!(clamp(f64::INFINITY, -15.0, 15.0), 15.0);
        assert_eq!(clamp(f64::NAN, 1.0, 2.0), 1.0);
    }

    #[test]
    fn test_mean_std() {
        assert_eq!(mean::<f64>(&[]), None);
        assert_eq!(std_dev::<f64>(&[]), None);
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
        assert_eq!(std_dev(&[2.0, 4.0]), Some(1.0));
        assert_eq!(std_dev(&[5.0]), Some(0.0));
    }

    #[test]
    fn test_ang_from_zero_deg() {
        assert!((ang_from_zero_deg(359.5f64) - 0.5).abs() < 1e-9);
        assert!((ang_from_zero_deg(0.5f64) - 0.5).abs() < 1e-9);
        assert!((ang_from_zero_deg(-0.5f64) - 0.5).abs() < 1e-9);
        assert!((ang_from_zero_deg(180.0f64) - 180.0).abs() < 1e-9);
        assert!((ang_from_zero_deg(720.25f64) - 0.25).abs() < 1e-9);
    }
}
