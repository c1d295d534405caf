//! Typed column values that carry no native Rust representation.

use std::{cmp::Ordering, fmt::Display};

use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Days between 0001-01-01 (day 1 of the common era) and 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

/// A calendar date, stored as the number of days since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(i64);

impl Date {
    /// Create a [`Date`] from a day offset relative to 1970-01-01.
    pub const fn from_days_since_epoch(days: i64) -> Self {
        Self(days)
    }

    /// Number of days since 1970-01-01; negative before the epoch.
    pub const fn days_since_epoch(&self) -> i64 {
        self.0
    }

    /// Convert into a [`NaiveDate`], if it is within the range `chrono` can represent.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        let days_from_ce = i32::try_from(self.0 + UNIX_EPOCH_DAYS_FROM_CE).ok()?;
        NaiveDate::from_num_days_from_ce_opt(days_from_ce)
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Self(i64::from(date.num_days_from_ce()) - UNIX_EPOCH_DAYS_FROM_CE)
    }
}

impl Display for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_naive_date() {
            Some(date) => Display::fmt(&date, f),
            None => write!(f, "{} days since epoch", self.0),
        }
    }
}

/// A point in time with second precision, stored as seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create a [`Timestamp`] from seconds relative to 1970-01-01T00:00:00Z.
    pub const fn from_seconds_since_epoch(seconds: i64) -> Self {
        Self(seconds)
    }

    /// Seconds since the epoch.
    pub const fn seconds_since_epoch(&self) -> i64 {
        self.0
    }

    /// Convert into a UTC [`DateTime`], if representable.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.0, 0)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value.timestamp())
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_datetime() {
            Some(datetime) => Display::fmt(&datetime, f),
            None => write!(f, "{} seconds since epoch", self.0),
        }
    }
}

/// A fixed-point decimal: `unscaled * 10^-scale`.
///
/// Two decimals with different scales compare by value, so `1.50` equals `1.5`.
#[derive(Debug, Clone, Copy)]
pub struct Decimal {
    unscaled: i128,
    scale: u8,
}

impl Decimal {
    /// Largest supported scale. `10^38` is the largest power of ten that fits an `i128`.
    pub const MAX_SCALE: u8 = 38;

    /// Create a new decimal.
    ///
    /// # Panics
    /// Panics if `scale` exceeds [`Self::MAX_SCALE`].
    pub fn new(unscaled: i128, scale: u8) -> Self {
        assert!(
            scale <= Self::MAX_SCALE,
            "decimal scale {scale} exceeds maximum of {}",
            Self::MAX_SCALE
        );
        Self { unscaled, scale }
    }

    /// Unscaled integer representation.
    pub fn unscaled(&self) -> i128 {
        self.unscaled
    }

    /// Number of digits after the decimal point.
    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// Lossy conversion to a float.
    pub fn to_f64(&self) -> f64 {
        self.unscaled as f64 / 10_f64.powi(i32::from(self.scale))
    }

    /// Build a decimal with the given scale from a float, rounding half away from zero.
    ///
    /// Values outside of the representable range saturate.
    pub fn from_f64(value: f64, scale: u8) -> Self {
        let scale = scale.min(Self::MAX_SCALE);
        let unscaled = (value * 10_f64.powi(i32::from(scale))).round() as i128;
        Self { unscaled, scale }
    }

    /// The unscaled representation of this value at a larger `scale`.
    ///
    /// Returns `None` if `scale` is smaller than [`Self::scale`] or the
    /// result does not fit an `i128`.
    pub fn unscaled_at(&self, scale: u8) -> Option<i128> {
        let factor = 10_i128.checked_pow(u32::from(scale.checked_sub(self.scale)?))?;
        self.unscaled.checked_mul(factor)
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let scale = self.scale.max(other.scale);
        match (self.unscaled_at(scale), other.unscaled_at(scale)) {
            (Some(a), Some(b)) => a.cmp(&b),
            // too wide to align exactly
            _ => self.to_f64().total_cmp(&other.to_f64()),
        }
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl Display for Decimal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.unscaled);
        }

        let factor = 10_u128.pow(u32::from(self.scale));
        let abs = self.unscaled.unsigned_abs();
        let sign = if self.unscaled < 0 { "-" } else { "" };
        write!(
            f,
            "{sign}{}.{:0width$}",
            abs / factor,
            abs % factor,
            width = usize::from(self.scale)
        )
    }
}
