//! Fixed-point time and resource arithmetic.
//!
//! Every timing computation in the engine uses fixed-point numbers so a
//! build order always produces the same schedule on every platform.
//! "Never" is an explicit [`Time`] variant instead of a floating-point
//! infinity, and it orders after every finite instant.

use std::fmt;
use std::ops::{Add, Sub};

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Serde support for `Option<Fixed>`.
pub mod option_fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize an optional fixed-point number.
    pub fn serialize<S>(value: &Option<Fixed>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => v.to_bits().serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize an optional fixed-point number.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Fixed>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt = Option::<i64>::deserialize(deserializer)?;
        Ok(opt.map(Fixed::from_bits))
    }
}

/// Serde support for `Vec<Fixed>`.
pub mod vec_fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a list of fixed-point numbers.
    pub fn serialize<S>(values: &[Fixed], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let bits: Vec<i64> = values.iter().map(|v| v.to_bits()).collect();
        bits.serialize(serializer)
    }

    /// Deserialize a list of fixed-point numbers.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Fixed>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = Vec::<i64>::deserialize(deserializer)?;
        Ok(bits.into_iter().map(Fixed::from_bits).collect())
    }
}

/// A point on the build order timeline, in seconds since the game started.
///
/// `Never` answers "this can not happen with the current state" and is
/// greater than any finite time, so `max` over a set of constraints
/// propagates it naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Time {
    /// A finite instant.
    At(#[serde(with = "fixed_serde")] Fixed),
    /// The instant that never arrives.
    Never,
}

impl Time {
    /// Game start.
    pub const ZERO: Self = Self::At(Fixed::ZERO);

    /// Alias for [`Time::Never`].
    pub const NEVER: Self = Self::Never;

    /// A finite time from whole seconds.
    #[must_use]
    pub fn from_secs(secs: i32) -> Self {
        Self::At(Fixed::from_num(secs))
    }

    /// The finite value, if any.
    #[must_use]
    pub const fn secs(self) -> Option<Fixed> {
        match self {
            Self::At(t) => Some(t),
            Self::Never => None,
        }
    }

    /// Whether this is [`Time::Never`].
    #[must_use]
    pub const fn is_never(self) -> bool {
        matches!(self, Self::Never)
    }

    /// Whether this is a finite time.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        matches!(self, Self::At(_))
    }

    /// Whether this time is at or before the finite instant `t`.
    #[must_use]
    pub fn at_or_before(self, t: Fixed) -> bool {
        self <= Self::At(t)
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::Never
    }
}

impl From<Fixed> for Time {
    fn from(value: Fixed) -> Self {
        Self::At(value)
    }
}

impl Add<Fixed> for Time {
    type Output = Self;

    fn add(self, rhs: Fixed) -> Self::Output {
        match self {
            Self::At(t) => Self::At(t.saturating_add(rhs)),
            Self::Never => Self::Never,
        }
    }
}

impl Sub<Fixed> for Time {
    type Output = Self;

    fn sub(self, rhs: Fixed) -> Self::Output {
        match self {
            Self::At(t) => Self::At(t.saturating_sub(rhs)),
            Self::Never => Self::Never,
        }
    }
}

impl fmt::Display for Time {
    /// Formats as `m:ss`, the way build orders are written.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At(t) => {
                let total = t.round().to_num::<i64>();
                write!(f, "{}:{:02}", total / 60, total % 60)
            }
            Self::Never => write!(f, "never"),
        }
    }
}

/// Mineral and gas amounts travelling together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resources {
    /// Minerals.
    #[serde(with = "fixed_serde")]
    pub minerals: Fixed,
    /// Gas.
    #[serde(with = "fixed_serde")]
    pub gas: Fixed,
}

impl Resources {
    /// No resources.
    pub const ZERO: Self = Self {
        minerals: Fixed::ZERO,
        gas: Fixed::ZERO,
    };

    /// Create from fixed-point amounts.
    #[must_use]
    pub const fn new(minerals: Fixed, gas: Fixed) -> Self {
        Self { minerals, gas }
    }

    /// Create from whole amounts.
    #[must_use]
    pub fn whole(minerals: i32, gas: i32) -> Self {
        Self::new(Fixed::from_num(minerals), Fixed::from_num(gas))
    }

    /// Both amounts rounded half away from zero.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self::new(self.minerals.round(), self.gas.round())
    }

    /// Scale both amounts by `factor`.
    #[must_use]
    pub fn scaled(self, factor: Fixed) -> Self {
        Self::new(
            self.minerals.saturating_mul(factor),
            self.gas.saturating_mul(factor),
        )
    }

    /// Whether both amounts are zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.minerals == Fixed::ZERO && self.gas == Fixed::ZERO
    }
}

impl Add for Resources {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.minerals + rhs.minerals, self.gas + rhs.gas)
    }
}

impl Sub for Resources {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.minerals - rhs.minerals, self.gas - rhs.gas)
    }
}

/// Round to the nearest whole number, ties away from zero.
#[must_use]
pub fn round_whole(value: Fixed) -> i32 {
    value.round().to_num::<i32>()
}

/// Length of the overlap between `[a_start, a_end]` and `[b_start, b_end]`.
#[must_use]
pub fn overlap(a_start: Fixed, a_end: Fixed, b_start: Fixed, b_end: Fixed) -> Fixed {
    let start = a_start.max(b_start);
    let end = a_end.min(b_end);
    if end > start {
        end - start
    } else {
        Fixed::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_orders_after_finite() {
        let late = Time::from_secs(1_000_000);
        assert!(late < Time::Never);
        assert_eq!(late.max(Time::Never), Time::Never);
        assert_eq!(late.min(Time::Never), late);
    }

    #[test]
    fn test_time_arithmetic() {
        let t = Time::from_secs(10) + Fixed::from_num(5);
        assert_eq!(t, Time::from_secs(15));
        assert_eq!(Time::Never + Fixed::from_num(5), Time::Never);
        assert_eq!(Time::from_secs(10) - Fixed::from_num(4), Time::from_secs(6));
    }

    #[test]
    fn test_time_display() {
        assert_eq!(Time::from_secs(75).to_string(), "1:15");
        assert_eq!(Time::ZERO.to_string(), "0:00");
        assert_eq!(Time::Never.to_string(), "never");
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_whole(Fixed::from_num(2.5)), 3);
        assert_eq!(round_whole(Fixed::from_num(-2.5)), -3);
        assert_eq!(round_whole(Fixed::from_num(2.49)), 2);
    }

    #[test]
    fn test_overlap() {
        let f = Fixed::from_num;
        assert_eq!(overlap(f(0), f(10), f(5), f(20)), f(5));
        assert_eq!(overlap(f(0), f(10), f(10), f(20)), Fixed::ZERO);
        assert_eq!(overlap(f(3), f(4), f(0), f(20)), f(1));
    }

    #[test]
    fn test_resources_ops() {
        let a = Resources::whole(100, 25);
        let b = Resources::whole(40, 25);
        assert_eq!(a - b, Resources::whole(60, 0));
        assert_eq!((a + b).gas, Fixed::from_num(50));
        assert!((a - a).is_zero());
    }

    #[test]
    fn test_time_serde_keeps_bits() {
        let t = Time::At(Fixed::from_bits(0x1234_5678_9abc));
        let text = ron::to_string(&t).unwrap();
        let back: Time = ron::from_str(&text).unwrap();
        assert_eq!(t, back);
    }
}
