//! Per-type value operations used by the aggregator.
//!
//! One generic engine handles every column type; the type-specific numeric
//! semantics (what "distance" means for a date, how a decimal is projected
//! along a line, ...) live in the [`StatsValue`] implementations below.

use std::{cmp::Ordering, fmt::Debug};

use bytes::Bytes;
use data_types::{ColumnStats, ColumnStatsData, Date, Decimal, Timestamp};

/// Value operations required to merge and extrapolate column statistics.
pub trait StatsValue: Clone + Debug + Send + Sync + 'static {
    /// Whether partial coverage may be extrapolated for this type.
    ///
    /// When false every call takes the direct-merge path.
    const EXTRAPOLATES: bool = true;

    /// Upper bound on the number of distinct values of this type, if any.
    const MAX_DISTINCT: Option<u64> = None;

    /// Total order over values.
    fn compare(&self, other: &Self) -> Ordering;

    /// Non-negative gap between two values.
    ///
    /// For scalar types this is the absolute difference in the type's natural
    /// unit (days for dates, seconds for timestamps). For strings and binary
    /// it is only a byte-length proxy, not a metric.
    fn distance(&self, other: &Self) -> f64;

    /// The value at `from + (toward - from) * numerator / denominator`.
    ///
    /// Types without a numeric embedding return `toward`, i.e. the projection
    /// never leaves the observed range.
    fn project(from: &Self, toward: &Self, numerator: f64, denominator: f64) -> Self;

    /// Borrow the typed statistics out of the type-erased form.
    fn from_data(data: &ColumnStatsData) -> Option<&ColumnStats<Self>>;

    /// Wrap typed statistics into the type-erased form.
    fn into_data(stats: ColumnStats<Self>) -> ColumnStatsData;

    /// The smaller of two values; `a` on ties.
    fn min<'a>(a: &'a Self, b: &'a Self) -> &'a Self {
        match b.compare(a) {
            Ordering::Less => b,
            _ => a,
        }
    }

    /// The larger of two values; `a` on ties.
    fn max<'a>(a: &'a Self, b: &'a Self) -> &'a Self {
        match b.compare(a) {
            Ordering::Greater => b,
            _ => a,
        }
    }
}

/// Linear projection over integers, truncated toward zero.
///
/// The difference is taken in 128 bits so it is exact before it is converted
/// to a float. The final conversion saturates at the `i64` range.
fn project_i64(from: i64, toward: i64, numerator: f64, denominator: f64) -> i64 {
    let delta = (i128::from(toward) - i128::from(from)) as f64;
    (from as f64 + delta * numerator / denominator) as i64
}

fn distance_i64(a: i64, b: i64) -> f64 {
    (i128::from(a) - i128::from(b)).unsigned_abs() as f64
}

/// Both unscaled values at the wider of the two scales.
fn aligned(a: &Decimal, b: &Decimal) -> Option<(i128, i128, u8)> {
    let scale = a.scale().max(b.scale());
    Some((a.unscaled_at(scale)?, b.unscaled_at(scale)?, scale))
}

fn distance_len(a: usize, b: usize) -> f64 {
    a.abs_diff(b) as f64
}

macro_rules! erased_variant {
    ($variant:ident) => {
        fn from_data(data: &ColumnStatsData) -> Option<&ColumnStats<Self>> {
            match data {
                ColumnStatsData::$variant(stats) => Some(stats),
                _ => None,
            }
        }

        fn into_data(stats: ColumnStats<Self>) -> ColumnStatsData {
            ColumnStatsData::$variant(stats)
        }
    };
}

impl StatsValue for i64 {
    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn distance(&self, other: &Self) -> f64 {
        distance_i64(*self, *other)
    }

    fn project(from: &Self, toward: &Self, numerator: f64, denominator: f64) -> Self {
        project_i64(*from, *toward, numerator, denominator)
    }

    erased_variant!(Long);
}

impl StatsValue for f64 {
    fn compare(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }

    fn distance(&self, other: &Self) -> f64 {
        (self - other).abs()
    }

    fn project(from: &Self, toward: &Self, numerator: f64, denominator: f64) -> Self {
        from + (toward - from) * numerator / denominator
    }

    erased_variant!(Double);
}

impl StatsValue for Decimal {
    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn distance(&self, other: &Self) -> f64 {
        match aligned(self, other) {
            Some((a, b, scale)) => match a.checked_sub(b) {
                Some(diff) => diff.unsigned_abs() as f64 / 10_f64.powi(i32::from(scale)),
                None => (self.to_f64() - other.to_f64()).abs(),
            },
            None => (self.to_f64() - other.to_f64()).abs(),
        }
    }

    fn project(from: &Self, toward: &Self, numerator: f64, denominator: f64) -> Self {
        let exact = aligned(from, toward).and_then(|(from_unscaled, toward_unscaled, scale)| {
            let delta = toward_unscaled.checked_sub(from_unscaled)?;
            let step = (delta as f64 * numerator / denominator).round() as i128;
            Some(Self::new(from_unscaled.saturating_add(step), scale))
        });

        exact.unwrap_or_else(|| {
            // too wide to align exactly
            let from_f64 = from.to_f64();
            let projected = from_f64 + (toward.to_f64() - from_f64) * numerator / denominator;
            Self::from_f64(projected, from.scale().max(toward.scale()))
        })
    }

    erased_variant!(Decimal);
}

impl StatsValue for Date {
    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn distance(&self, other: &Self) -> f64 {
        distance_i64(self.days_since_epoch(), other.days_since_epoch())
    }

    fn project(from: &Self, toward: &Self, numerator: f64, denominator: f64) -> Self {
        Self::from_days_since_epoch(project_i64(
            from.days_since_epoch(),
            toward.days_since_epoch(),
            numerator,
            denominator,
        ))
    }

    erased_variant!(Date);
}

impl StatsValue for Timestamp {
    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn distance(&self, other: &Self) -> f64 {
        distance_i64(self.seconds_since_epoch(), other.seconds_since_epoch())
    }

    fn project(from: &Self, toward: &Self, numerator: f64, denominator: f64) -> Self {
        Self::from_seconds_since_epoch(project_i64(
            from.seconds_since_epoch(),
            toward.seconds_since_epoch(),
            numerator,
            denominator,
        ))
    }

    erased_variant!(Timestamp);
}

impl StatsValue for String {
    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn distance(&self, other: &Self) -> f64 {
        distance_len(self.len(), other.len())
    }

    fn project(_from: &Self, toward: &Self, _numerator: f64, _denominator: f64) -> Self {
        toward.clone()
    }

    erased_variant!(String);
}

impl StatsValue for Bytes {
    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn distance(&self, other: &Self) -> f64 {
        distance_len(self.len(), other.len())
    }

    fn project(_from: &Self, toward: &Self, _numerator: f64, _denominator: f64) -> Self {
        toward.clone()
    }

    erased_variant!(Binary);
}

impl StatsValue for bool {
    const EXTRAPOLATES: bool = false;
    const MAX_DISTINCT: Option<u64> = Some(2);

    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn distance(&self, other: &Self) -> f64 {
        if self == other {
            0.0
        } else {
            1.0
        }
    }

    fn project(_from: &Self, toward: &Self, _numerator: f64, _denominator: f64) -> Self {
        *toward
    }

    erased_variant!(Boolean);
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    #[test]
    fn min_max_prefer_first_on_ties() {
        let a = Decimal::new(10, 1);
        let b = Decimal::new(100, 2);
        assert_eq!(StatsValue::min(&a, &b).scale(), 1);
        assert_eq!(StatsValue::max(&a, &b).scale(), 1);

        assert_eq!(*StatsValue::min(&3_i64, &-4), -4);
        assert_eq!(*StatsValue::max(&3_i64, &-4), 3);
    }

    #[test]
    fn integral_projection_truncates() {
        // 20 + (26 - 20) * 4 / 3
        assert_eq!(i64::project(&20, &26, 4.0, 3.0), 28);
        // 16 - (16 - 10) * 9 / 3
        assert_eq!(i64::project(&16, &10, 9.0, 3.0), -2);
        // 0 + 10 * 1 / 3 = 3.33
        assert_eq!(i64::project(&0, &10, 1.0, 3.0), 3);
        // truncation is toward zero
        assert_eq!(i64::project(&0, &-10, 1.0, 3.0), -3);
    }

    #[test]
    fn integral_projection_saturates() {
        assert_eq!(i64::project(&0, &i64::MAX, 10.0, 1.0), i64::MAX);
        assert_eq!(i64::project(&0, &i64::MIN, 10.0, 1.0), i64::MIN);
        assert_eq!(distance_i64(i64::MAX, i64::MIN), u64::MAX as f64);
    }

    #[test]
    fn date_distance_in_days() {
        let a = Date::from(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let b = Date::from(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(a.distance(&b), 60.0);
        assert_eq!(b.distance(&a), 60.0);

        let projected = Date::project(&a, &b, 2.0, 1.0);
        assert_eq!(
            projected.to_naive_date(),
            NaiveDate::from_ymd_opt(2024, 4, 30)
        );
    }

    #[test]
    fn decimal_projection_keeps_widest_scale() {
        let from = Decimal::new(100, 1); // 10.0
        let toward = Decimal::new(1250, 2); // 12.50
        let projected = Decimal::project(&from, &toward, 2.0, 1.0);
        assert_eq!(projected, Decimal::new(1500, 2));
        assert_eq!(projected.scale(), 2);
        assert_eq!(from.distance(&toward), 2.5);
    }

    #[test]
    fn decimal_arithmetic_is_exact_beyond_float_precision() {
        let a = Decimal::new(100_000_000_000_000_000, 0);
        let b = Decimal::new(100_000_000_000_000_001, 0);
        assert_eq!(a.distance(&b), 1.0);
        assert_eq!(b.distance(&a), 1.0);

        let c = Decimal::new(100_000_000_000_000_003, 0);
        let projected = Decimal::project(&a, &c, 2.0, 1.0);
        assert_eq!(projected.unscaled(), 100_000_000_000_000_006);

        // 0.3 toward 0.35 at a ratio of 1 / 3, rounded at scale 2
        let projected = Decimal::project(&Decimal::new(3, 1), &Decimal::new(35, 2), 1.0, 3.0);
        assert_eq!(projected, Decimal::new(32, 2));
        assert_eq!(projected.scale(), 2);
    }

    #[test]
    fn decimal_falls_back_to_floats_when_scales_cannot_align() {
        let wide = Decimal::new(i128::MAX / 10, 0);
        let fine = Decimal::new(5, Decimal::MAX_SCALE);
        assert!(wide.distance(&fine) > 1e36);

        let projected = Decimal::project(&fine, &wide, 1.0, 2.0);
        assert_eq!(projected.scale(), Decimal::MAX_SCALE);
    }

    #[test]
    fn timestamp_distance_in_seconds() {
        let a = Timestamp::from_seconds_since_epoch(1_700_000_000);
        let b = Timestamp::from_seconds_since_epoch(1_700_000_060);
        assert_eq!(a.distance(&b), 60.0);
        assert_eq!(b.distance(&a), 60.0);

        // 100 + 60 * 2
        let projected = Timestamp::project(
            &Timestamp::from_seconds_since_epoch(100),
            &Timestamp::from_seconds_since_epoch(160),
            2.0,
            1.0,
        );
        assert_eq!(projected.seconds_since_epoch(), 220);

        // 1_700_000_000 + 60 * 1 / 7, truncated
        let projected = Timestamp::project(&a, &b, 1.0, 7.0);
        assert_eq!(projected.seconds_since_epoch(), 1_700_000_008);
        // 1_700_000_060 - 60 * 1 / 7, truncated
        let projected = Timestamp::project(&b, &a, 1.0, 7.0);
        assert_eq!(projected.seconds_since_epoch(), 1_700_000_051);
    }

    #[test]
    fn double_ordering_is_total() {
        assert_eq!(f64::NAN.compare(&1.0), Ordering::Greater);
        assert_eq!((-0.0_f64).compare(&0.0), Ordering::Less);
        assert_eq!(f64::project(&1.0, &2.0, 3.0, 2.0), 2.5);
    }

    #[test]
    fn strings_never_leave_the_observed_range() {
        let low = "apple".to_string();
        let high = "pear".to_string();
        assert_eq!(String::project(&high, &low, 100.0, 1.0), low);
        assert_eq!(low.distance(&high), 1.0);

        let a = Bytes::from_static(b"\x00\x01");
        let b = Bytes::from_static(b"\x02");
        assert_eq!(Bytes::project(&a, &b, 5.0, 2.0), b);
        assert_eq!(a.distance(&b), 1.0);
    }

    #[test]
    fn booleans_do_not_extrapolate() {
        assert!(!<bool as StatsValue>::EXTRAPOLATES);
        assert_eq!(<bool as StatsValue>::MAX_DISTINCT, Some(2));
        assert_eq!(true.distance(&false), 1.0);
        assert_eq!(true.distance(&true), 0.0);
    }

    #[test]
    fn erased_round_trip_checks_variant() {
        let data = i64::into_data(ColumnStats::new(1, 5, 0, 5));
        assert!(i64::from_data(&data).is_some());
        assert!(f64::from_data(&data).is_none());
        assert!(Date::from_data(&data).is_none());

        let ts = Timestamp::from_seconds_since_epoch(60);
        let data = Timestamp::into_data(ColumnStats::new(ts, ts, 0, 1));
        assert_matches!(&data, ColumnStatsData::Timestamp(_));
        assert!(Timestamp::from_data(&data).is_some());
        assert!(i64::from_data(&data).is_none());
    }
}
