//! Numeric types a monitor can track
//!
//! Firmware variables come as floats, raw ADC integers or fixed-point
//! values. The monitor only needs to compare them, average them and take
//! differences, and it does the arithmetic in `f64` so integer sums never
//! overflow and slopes keep their fraction.

use core::fmt::Debug;

/// Scalar that can be stored and analysed by a monitor
pub trait MonitorValue: Copy + PartialOrd + Default + Debug {
    /// Widen to `f64` for sums and slopes
    fn to_f64(self) -> f64;

    /// Narrow an aggregate back to the tracked type
    ///
    /// Integer types truncate toward zero and saturate at their bounds.
    fn from_f64(value: f64) -> Self;

    /// Larger of two values, keeping `self` when they compare equal
    fn max_of(self, other: Self) -> Self {
        if other > self { other } else { self }
    }

    /// Smaller of two values, keeping `self` when they compare equal
    fn min_of(self, other: Self) -> Self {
        if other < self { other } else { self }
    }
}

impl MonitorValue for f32 {
    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl MonitorValue for f64 {
    fn to_f64(self) -> f64 {
        self
    }

    fn from_f64(value: f64) -> Self {
        value
    }
}

macro_rules! impl_integer_value {
    ($($ty:ty),*) => {
        $(
            impl MonitorValue for $ty {
                fn to_f64(self) -> f64 {
                    self as f64
                }

                fn from_f64(value: f64) -> Self {
                    // `as` truncates toward zero and saturates, NaN maps to 0
                    value as $ty
                }
            }
        )*
    };
}

impl_integer_value!(i8, i16, i32, i64, u8, u16, u32);

#[cfg(feature = "fixed")]
mod fixed_point {
    use super::MonitorValue;
    use fixed::types::{I16F16, I20F12};

    macro_rules! impl_fixed_value {
        ($($ty:ty),*) => {
            $(
                impl MonitorValue for $ty {
                    fn to_f64(self) -> f64 {
                        self.to_num::<f64>()
                    }

                    fn from_f64(value: f64) -> Self {
                        <$ty>::saturating_from_num(value)
                    }
                }
            )*
        };
    }

    impl_fixed_value!(I16F16, I20F12);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_narrowing_truncates() {
        assert_eq!(i32::from_f64(2.9), 2);
        assert_eq!(i32::from_f64(-2.9), -2);
        assert_eq!(u8::from_f64(300.0), 255);
        assert_eq!(u16::from_f64(-4.0), 0);
    }

    #[test]
    fn float_round_trip() {
        assert_eq!(f32::from_f64(1.5f32.to_f64()), 1.5);
        assert_eq!(f64::from_f64(-0.25), -0.25);
    }

    #[test]
    fn min_max_helpers() {
        assert_eq!(3i32.max_of(7), 7);
        assert_eq!(3i32.min_of(7), 3);
        assert_eq!(2.0f32.max_of(-1.0), 2.0);
    }
}
