//! `xs:duration` and its two totally ordered subtypes.
//!
//! A duration is kept in canonical form: a signed month count and a signed second count.
//! Both parts of a parsed value always share the same sign.

use core::cmp::Ordering;
use core::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use fancy_regex::Regex;
use rust_decimal::Decimal;
use tracing::error;

use crate::error::{Error, ErrorCode};
use crate::values::{AtomicType, Origin};

/// Forms the main pattern would accept but XSD rejects: no components at all, or a `T`
/// without any time component.
const INCOMPLETE_DURATION: &str = r"^-?P$|T$";

const DURATION: &str = concat!(
    r"^(-)?P(?:([0-9]+)Y)?(?:([0-9]+)M)?(?:([0-9]+)D)?",
    r"(?:T(?:([0-9]+)H)?(?:([0-9]+)M)?(?:([0-9]+(?:\.[0-9]*)?|\.[0-9]+)S)?)?$",
);

static INCOMPLETE_DURATION_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(INCOMPLETE_DURATION));
static DURATION_RE: LazyLock<Option<Regex>> = LazyLock::new(|| compile(DURATION));

fn compile(pattern: &str) -> Option<Regex> {
    Regex::new(pattern).inspect_err(|e| error!(%e, pattern, "invalid duration pattern")).ok()
}

const MONTHS_PER_YEAR: i64 = 12;
const HOURS_PER_DAY: i64 = 24;
const MINUTES_PER_HOUR: i64 = 60;
const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_HOUR: i64 = 3_600;

/// Which of the duration types a value is annotated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DurationKind {
    Duration,
    YearMonth,
    DayTime,
}

impl DurationKind {
    pub fn atomic_type(self) -> AtomicType {
        match self {
            DurationKind::Duration => AtomicType::Duration,
            DurationKind::YearMonth => AtomicType::YearMonthDuration,
            DurationKind::DayTime => AtomicType::DayTimeDuration,
        }
    }
}

#[derive(Debug, Clone)]
pub struct XsDuration {
    pub months: i64,
    pub seconds: Decimal,
    pub kind: DurationKind,
    pub origin: Origin,
}

/// Lexical components captured from a duration string.
#[derive(Debug, Default)]
struct Components<'a> {
    negative: bool,
    years: Option<&'a str>,
    months: Option<&'a str>,
    days: Option<&'a str>,
    hours: Option<&'a str>,
    minutes: Option<&'a str>,
    seconds: Option<&'a str>,
}

impl<'a> Components<'a> {
    fn parse(lexical: &'a str) -> Option<Self> {
        let incomplete = INCOMPLETE_DURATION_RE.as_ref()?;
        let duration = DURATION_RE.as_ref()?;
        if incomplete.is_match(lexical).ok()? {
            return None;
        }
        let captures = duration.captures(lexical).ok()??;
        let group = |i: usize| captures.get(i).map(|m| m.as_str());
        Some(Self {
            negative: group(1).is_some(),
            years: group(2),
            months: group(3),
            days: group(4),
            hours: group(5),
            minutes: group(6),
            seconds: group(7),
        })
    }

    fn has_year_month(&self) -> bool {
        self.years.is_some() || self.months.is_some()
    }

    fn has_day_time(&self) -> bool {
        self.days.is_some()
            || self.hours.is_some()
            || self.minutes.is_some()
            || self.seconds.is_some()
    }

    fn total_months(&self) -> Option<i64> {
        let years = parse_int(self.years)?;
        let months = parse_int(self.months)?;
        years.checked_mul(MONTHS_PER_YEAR)?.checked_add(months)
    }

    fn total_seconds(&self) -> Option<Decimal> {
        let days = parse_decimal(self.days)?;
        let hours = parse_decimal(self.hours)?;
        let minutes = parse_decimal(self.minutes)?;
        let seconds = parse_decimal(self.seconds)?;
        days.checked_mul(Decimal::from(HOURS_PER_DAY))?
            .checked_add(hours)?
            .checked_mul(Decimal::from(MINUTES_PER_HOUR))?
            .checked_add(minutes)?
            .checked_mul(Decimal::from(SECONDS_PER_MINUTE))?
            .checked_add(seconds)
    }

    fn into_duration(self, kind: DurationKind) -> Option<XsDuration> {
        let mut months = self.total_months()?;
        let mut seconds = self.total_seconds()?;
        if self.negative {
            months = months.checked_neg()?;
            seconds = -seconds;
        }
        Some(XsDuration { months, seconds, kind, origin: Origin::none() })
    }
}

fn parse_int(digits: Option<&str>) -> Option<i64> {
    digits.map_or(Some(0), |d| d.parse().ok())
}

fn parse_decimal(digits: Option<&str>) -> Option<Decimal> {
    let Some(digits) = digits else {
        return Some(Decimal::ZERO);
    };
    let digits = digits.strip_suffix('.').unwrap_or(digits);
    if let Some(fraction) = digits.strip_prefix('.') {
        return Decimal::from_str(&format!("0.{fraction}")).ok();
    }
    Decimal::from_str(digits).ok()
}

/// Parse an `xs:duration` lexical form into its canonical `(months, seconds)` value.
///
/// Returns `None` for malformed input and when either part overflows.
pub fn to_xs_duration(lexical: &str) -> Option<XsDuration> {
    XsDuration::parse(lexical, DurationKind::Duration).ok()
}

/// Like [`to_xs_duration`] but only accepts year and month components.
pub fn to_xs_year_month_duration(lexical: &str) -> Option<XsDuration> {
    XsDuration::parse(lexical, DurationKind::YearMonth).ok()
}

/// Like [`to_xs_duration`] but only accepts day and time components.
pub fn to_xs_day_time_duration(lexical: &str) -> Option<XsDuration> {
    XsDuration::parse(lexical, DurationKind::DayTime).ok()
}

impl XsDuration {
    /// Parses `lexical` as a value of `kind`.
    ///
    /// Malformed input and components of the wrong family are `FORG0001`; a well-formed value
    /// whose month or second total does not fit is `FODT0002`.
    pub fn parse(lexical: &str, kind: DurationKind) -> Result<Self, Error> {
        let invalid = || {
            Error::from_code(
                ErrorCode::FORG0001,
                format!("invalid lexical form for {}: '{lexical}'", kind.atomic_type()),
            )
        };
        let components = Components::parse(lexical).ok_or_else(invalid)?;
        let wrong_family = match kind {
            DurationKind::Duration => false,
            DurationKind::YearMonth => components.has_day_time(),
            DurationKind::DayTime => components.has_year_month(),
        };
        if wrong_family {
            return Err(invalid());
        }
        components.into_duration(kind).ok_or_else(|| {
            Error::from_code(
                ErrorCode::FODT0002,
                format!("{} '{lexical}' is out of range", kind.atomic_type()),
            )
        })
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    pub fn is_negative(&self) -> bool {
        self.months < 0 || (self.seconds.is_sign_negative() && !self.seconds.is_zero())
    }

    pub fn years(&self) -> i64 {
        self.months / MONTHS_PER_YEAR
    }

    /// Month component (`-11..=11`), not the total month count.
    pub fn months_part(&self) -> i64 {
        self.months % MONTHS_PER_YEAR
    }

    pub fn days(&self) -> Decimal {
        (self.seconds / Decimal::from(SECONDS_PER_DAY)).trunc()
    }

    pub fn hours(&self) -> Decimal {
        ((self.seconds % Decimal::from(SECONDS_PER_DAY)) / Decimal::from(SECONDS_PER_HOUR)).trunc()
    }

    pub fn minutes(&self) -> Decimal {
        ((self.seconds % Decimal::from(SECONDS_PER_HOUR)) / Decimal::from(SECONDS_PER_MINUTE))
            .trunc()
    }

    /// Seconds component including the fractional part.
    pub fn seconds_part(&self) -> Decimal {
        self.seconds % Decimal::from(SECONDS_PER_MINUTE)
    }
}

impl PartialEq for XsDuration {
    fn eq(&self, other: &Self) -> bool {
        self.months == other.months && self.seconds == other.seconds
    }
}

impl PartialOrd for XsDuration {
    /// Durations are only comparable within one subfamily: both without a month part or
    /// both without a second part.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        if self.months == 0 && other.months == 0 {
            return self.seconds.partial_cmp(&other.seconds);
        }
        if self.seconds.is_zero() && other.seconds.is_zero() {
            return self.months.partial_cmp(&other.months);
        }
        None
    }
}

impl fmt::Display for XsDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.months == 0 && self.seconds.is_zero() {
            return f.write_str(if self.kind == DurationKind::YearMonth { "P0M" } else { "PT0S" });
        }
        if self.is_negative() {
            f.write_str("-")?;
        }
        f.write_str("P")?;
        let years = self.years().abs();
        let months = self.months_part().abs();
        if years != 0 {
            write!(f, "{years}Y")?;
        }
        if months != 0 {
            write!(f, "{months}M")?;
        }
        let days = self.days().abs();
        if !days.is_zero() {
            write!(f, "{days}D")?;
        }
        let hours = self.hours().abs();
        let minutes = self.minutes().abs();
        let seconds = self.seconds_part().abs().normalize();
        if hours.is_zero() && minutes.is_zero() && seconds.is_zero() {
            return Ok(());
        }
        f.write_str("T")?;
        if !hours.is_zero() {
            write!(f, "{hours}H")?;
        }
        if !minutes.is_zero() {
            write!(f, "{minutes}M")?;
        }
        if !seconds.is_zero() {
            write!(f, "{seconds}S")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("P")]
    #[case("-P")]
    #[case("PT")]
    #[case("P1YT")]
    #[case("")]
    #[case("1Y")]
    #[case("P-1Y")]
    #[case("--P1Y")]
    #[case("+P1Y")]
    #[case("P1S")]
    #[case("PT1D")]
    #[case("P1M1Y")]
    #[case("PT1.5H")]
    #[case("PT.S")]
    fn rejects_invalid_forms(#[case] lexical: &str) {
        assert_eq!(to_xs_duration(lexical), None);
    }

    #[rstest]
    #[case("P1Y2M", 14, "0")]
    #[case("P1DT2H3M4.5S", 0, "93784.5")]
    #[case("-P1Y2M3D", -14, "-259200")]
    #[case("PT0S", 0, "0")]
    #[case("PT.5S", 0, "0.5")]
    #[case("PT1.S", 0, "1")]
    #[case("PT36H", 0, "129600")]
    fn canonical_fields(#[case] lexical: &str, #[case] months: i64, #[case] seconds: &str) {
        let duration = to_xs_duration(lexical).unwrap();
        assert_eq!(duration.months, months);
        assert_eq!(duration.seconds, Decimal::from_str(seconds).unwrap());
    }

    #[rstest]
    #[case("P999999999999999999Y", DurationKind::Duration)]
    #[case("P99999999999999999999M", DurationKind::YearMonth)]
    #[case("P99999999999999999999999999D", DurationKind::DayTime)]
    fn overflowing_totals_are_fodt0002(#[case] lexical: &str, #[case] kind: DurationKind) {
        let err = XsDuration::parse(lexical, kind).unwrap_err();
        assert_eq!(err.code_enum(), ErrorCode::FODT0002);
        assert_eq!(to_xs_duration(lexical), None);
    }

    #[rstest]
    #[case("P1Y1D", DurationKind::YearMonth)]
    #[case("PT", DurationKind::Duration)]
    fn malformed_or_foreign_forms_stay_forg0001(
        #[case] lexical: &str,
        #[case] kind: DurationKind,
    ) {
        let err = XsDuration::parse(lexical, kind).unwrap_err();
        assert_eq!(err.code_enum(), ErrorCode::FORG0001);
    }

    #[rstest]
    fn subfamilies_reject_foreign_components() {
        assert!(to_xs_year_month_duration("P1Y2M").is_some());
        assert!(to_xs_year_month_duration("P1D").is_none());
        assert!(to_xs_day_time_duration("P1DT1H").is_some());
        assert!(to_xs_day_time_duration("P1M").is_none());
        let err = XsDuration::parse("P1M", DurationKind::DayTime).unwrap_err();
        assert_eq!(err.code_enum(), ErrorCode::FORG0001);
    }

    #[rstest]
    #[case("P1Y2M", "P1Y2M")]
    #[case("P14M", "P1Y2M")]
    #[case("PT36H", "P1DT12H")]
    #[case("-PT90M", "-PT1H30M")]
    #[case("PT1.50S", "PT1.5S")]
    #[case("P0Y", "PT0S")]
    fn canonical_display(#[case] lexical: &str, #[case] expected: &str) {
        assert_eq!(to_xs_duration(lexical).unwrap().to_string(), expected);
    }

    #[rstest]
    fn components_follow_the_sign() {
        let d = to_xs_duration("-P1Y3M2DT5H6M7.5S").unwrap();
        assert_eq!(d.years(), -1);
        assert_eq!(d.months_part(), -3);
        assert_eq!(d.days(), Decimal::from(-2));
        assert_eq!(d.hours(), Decimal::from(-5));
        assert_eq!(d.minutes(), Decimal::from(-6));
        assert_eq!(d.seconds_part(), Decimal::from_str("-7.5").unwrap());
    }

    #[rstest]
    fn ordering_only_within_a_subfamily() {
        let one_day = to_xs_duration("P1D").unwrap();
        let hours = to_xs_duration("PT25H").unwrap();
        let month = to_xs_duration("P1M").unwrap();
        let year = to_xs_duration("P1Y").unwrap();
        assert!(one_day < hours);
        assert!(month < year);
        assert_eq!(one_day.partial_cmp(&month), None);
        assert_eq!(to_xs_duration("PT24H"), to_xs_duration("P1D"));
    }
}
