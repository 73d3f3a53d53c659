use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
#[cfg(feature = "bigint")]
use num_bigint::BigInt;
#[cfg(not(feature = "bigint"))]
use std::convert::Infallible;

const NANOS_PER_SEC: i128 = 1_000_000_000;
const NANOS_PER_MILLI: i128 = 1_000_000;

// --- Errors ---

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The input matched no recognized timestamp shape.
    #[error("unable to parse {0:?} as a timestamp")]
    Parse(String),

    /// The instant falls outside the representable date range.
    #[error("instant is outside the representable date range")]
    OutOfRange,

    /// Raised by operations that must return an arbitrary-precision integer
    /// when the `bigint` feature is disabled.
    #[error("arbitrary-precision integers are not available on this build; use `{alternative}` instead")]
    UnsupportedPlatform { alternative: &'static str },
}

// --- Protobuf-style timestamp ---

/// Whole seconds since the Unix epoch plus a non-negative nanosecond
/// remainder that counts forward in time, even when `seconds` is negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp {
    pub seconds: i64,
    /// 0..=999_999_999
    pub nanos: i32,
}

impl Timestamp {
    /// Accepts any wrapped integer type convertible to `i64` for the
    /// seconds field, e.g. the `Long`-style wrappers produced by protobuf
    /// decoders.
    pub fn new(seconds: impl Into<i64>, nanos: i32) -> Self {
        Self {
            seconds: seconds.into(),
            nanos,
        }
    }
}

// --- Universal parser input ---

/// Any input shape [`PreciseDate::parse_full`] understands.
#[derive(Debug, Clone)]
pub enum TimeValue {
    /// `{seconds, nanos}` timestamp struct.
    Struct(Timestamp),
    /// `(seconds, nanos)` pair.
    Pair(i64, i32),
    /// Full nanosecond count since the epoch.
    Nanos(i128),
    /// Millisecond epoch value.
    Millis(i64),
    /// A wall-clock date, read at millisecond resolution.
    Date(DateTime<Utc>),
    /// Digit string, extended ISO-8601 string, or anything the base date
    /// parser accepts.
    Text(String),
}

impl From<Timestamp> for TimeValue {
    fn from(ts: Timestamp) -> Self {
        TimeValue::Struct(ts)
    }
}

impl From<(i64, i32)> for TimeValue {
    fn from((seconds, nanos): (i64, i32)) -> Self {
        TimeValue::Pair(seconds, nanos)
    }
}

impl From<i128> for TimeValue {
    fn from(nanos: i128) -> Self {
        TimeValue::Nanos(nanos)
    }
}

impl From<i64> for TimeValue {
    fn from(millis: i64) -> Self {
        TimeValue::Millis(millis)
    }
}

impl From<DateTime<Utc>> for TimeValue {
    fn from(date: DateTime<Utc>) -> Self {
        TimeValue::Date(date)
    }
}

impl From<&str> for TimeValue {
    fn from(text: &str) -> Self {
        TimeValue::Text(text.to_string())
    }
}

impl From<String> for TimeValue {
    fn from(text: String) -> Self {
        TimeValue::Text(text)
    }
}

impl From<PreciseDate> for TimeValue {
    fn from(date: PreciseDate) -> Self {
        TimeValue::Nanos(date.total_nanos())
    }
}

#[cfg(feature = "bigint")]
impl From<BigInt> for TimeValue {
    fn from(nanos: BigInt) -> Self {
        TimeValue::Text(nanos.to_string())
    }
}

/// A full-precision time value for [`PreciseDate::set_full_time`]: either a
/// native nanosecond count or its decimal string form.
#[derive(Debug, Clone)]
pub enum FullTime {
    Nanos(i128),
    Text(String),
}

impl From<i128> for FullTime {
    fn from(nanos: i128) -> Self {
        FullTime::Nanos(nanos)
    }
}

impl From<i64> for FullTime {
    fn from(nanos: i64) -> Self {
        FullTime::Nanos(nanos as i128)
    }
}

impl From<&str> for FullTime {
    fn from(text: &str) -> Self {
        FullTime::Text(text.to_string())
    }
}

impl From<String> for FullTime {
    fn from(text: String) -> Self {
        FullTime::Text(text)
    }
}

#[cfg(feature = "bigint")]
impl From<BigInt> for FullTime {
    fn from(nanos: BigInt) -> Self {
        FullTime::Text(nanos.to_string())
    }
}

// --- PreciseDate ---

/// A wall-clock instant with nanosecond precision.
///
/// Wraps a millisecond-resolution `DateTime<Utc>` and layers microsecond and
/// nanosecond fields on top, each normalized to `0..=999` and counting
/// forward in time. The canonical representation is the signed decimal count
/// of total nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PreciseDate {
    base: DateTime<Utc>,
    micros: u32,
    nanos: u32,
}

impl PreciseDate {
    /// Returns the current instant with zero sub-millisecond fields.
    pub fn now() -> Self {
        let now = Utc::now();
        let base = DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);
        Self {
            base,
            micros: 0,
            nanos: 0,
        }
    }

    /// Constructs from a millisecond epoch value.
    pub fn from_millis(millis: i64) -> Result<Self, Error> {
        let base = DateTime::from_timestamp_millis(millis).ok_or(Error::OutOfRange)?;
        Ok(Self {
            base,
            micros: 0,
            nanos: 0,
        })
    }

    /// Local-time calendar constructor, mirroring a conventional date
    /// constructor with microsecond and nanosecond trailing fields. The
    /// trailing fields pass through the dedicated setters, so out-of-range
    /// values carry into coarser fields rather than being rejected.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        millisecond: u32,
        microsecond: i64,
        nanosecond: i64,
    ) -> Option<Self> {
        let local = Local
            .with_ymd_and_hms(year, month, day, hour, minute, second)
            .single()?;
        let base = local
            .with_timezone(&Utc)
            .checked_add_signed(Duration::milliseconds(millisecond as i64))?;
        let mut date = Self {
            base,
            micros: 0,
            nanos: 0,
        };
        date.set_microseconds(microsecond).ok()?;
        date.set_nanoseconds(nanosecond).ok()?;
        Some(date)
    }

    /// UTC calendar constructor with microsecond and nanosecond trailing
    /// fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_utc(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        millisecond: u32,
        microsecond: i64,
        nanosecond: i64,
    ) -> Result<Self, Error> {
        let base = Utc
            .with_ymd_and_hms(year, month, day, hour, minute, second)
            .single()
            .ok_or(Error::OutOfRange)?
            .checked_add_signed(Duration::milliseconds(millisecond as i64))
            .ok_or(Error::OutOfRange)?;
        let mut date = Self {
            base,
            micros: 0,
            nanos: 0,
        };
        date.set_microseconds(microsecond)?;
        date.set_nanoseconds(nanosecond)?;
        Ok(date)
    }

    /// Constructs from any recognized timestamp shape.
    pub fn parse(value: impl Into<TimeValue>) -> Result<Self, Error> {
        let mut date = Self::default();
        date.apply_total(resolve(value.into())?)?;
        Ok(date)
    }

    /// Resolves any recognized timestamp shape to the canonical decimal
    /// string of total nanoseconds since the epoch.
    pub fn parse_full(value: impl Into<TimeValue>) -> Result<String, Error> {
        Ok(resolve(value.into())?.to_string())
    }

    /// Like [`PreciseDate::from_utc`], returning the canonical nanosecond
    /// string.
    #[allow(clippy::too_many_arguments)]
    pub fn full_utc_string(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        millisecond: u32,
        microsecond: i64,
        nanosecond: i64,
    ) -> Result<String, Error> {
        let date = Self::from_utc(
            year,
            month,
            day,
            hour,
            minute,
            second,
            millisecond,
            microsecond,
            nanosecond,
        )?;
        Ok(date.full_time_string())
    }

    /// Like [`PreciseDate::full_utc_string`], returning a big integer.
    #[cfg(feature = "bigint")]
    #[allow(clippy::too_many_arguments)]
    pub fn full_utc(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        millisecond: u32,
        microsecond: i64,
        nanosecond: i64,
    ) -> Result<BigInt, Error> {
        let date = Self::from_utc(
            year,
            month,
            day,
            hour,
            minute,
            second,
            millisecond,
            microsecond,
            nanosecond,
        )?;
        date.full_time()
    }

    /// Always fails with [`Error::UnsupportedPlatform`] on builds without
    /// the `bigint` feature; use [`PreciseDate::full_utc_string`] instead.
    #[cfg(not(feature = "bigint"))]
    #[allow(clippy::too_many_arguments)]
    pub fn full_utc(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        millisecond: u32,
        microsecond: i64,
        nanosecond: i64,
    ) -> Result<Infallible, Error> {
        Self::from_utc(
            year,
            month,
            day,
            hour,
            minute,
            second,
            millisecond,
            microsecond,
            nanosecond,
        )?;
        Err(Error::UnsupportedPlatform {
            alternative: "full_utc_string",
        })
    }

    /// The wrapped millisecond-resolution base date.
    pub fn date_time(&self) -> DateTime<Utc> {
        self.base
    }

    /// Millisecond epoch value of the base date.
    pub fn time(&self) -> i64 {
        self.base.timestamp_millis()
    }

    /// Sets the base date to the given millisecond epoch value and resets
    /// both sub-millisecond fields to zero. Switching the base time always
    /// discards finer precision; re-apply the sub-millisecond fields
    /// afterwards.
    pub fn set_time(&mut self, millis: i64) -> Result<(), Error> {
        self.base = DateTime::from_timestamp_millis(millis).ok_or(Error::OutOfRange)?;
        self.micros = 0;
        self.nanos = 0;
        Ok(())
    }

    /// Millisecond component of the base date (0..=999).
    pub fn milliseconds(&self) -> u32 {
        self.base.timestamp_subsec_millis()
    }

    pub fn microseconds(&self) -> u32 {
        self.micros
    }

    /// Adds `value` to the microsecond field, carrying whole milliseconds
    /// into the base date and leaving the remainder in `0..=999`.
    pub fn set_microseconds(&mut self, value: i64) -> Result<(), Error> {
        let combined = (self.micros as i64)
            .checked_add(value)
            .ok_or(Error::OutOfRange)?;
        let base = self
            .base
            .checked_add_signed(Duration::milliseconds(combined.div_euclid(1_000)))
            .ok_or(Error::OutOfRange)?;
        self.base = base;
        self.micros = combined.rem_euclid(1_000) as u32;
        Ok(())
    }

    pub fn nanoseconds(&self) -> u32 {
        self.nanos
    }

    /// Adds `value` to the nanosecond field, carrying whole microseconds
    /// into the microsecond field (which cascades onward) and leaving the
    /// remainder in `0..=999`.
    pub fn set_nanoseconds(&mut self, value: i64) -> Result<(), Error> {
        let combined = (self.nanos as i64)
            .checked_add(value)
            .ok_or(Error::OutOfRange)?;
        self.set_microseconds(combined.div_euclid(1_000))?;
        self.nanos = combined.rem_euclid(1_000) as u32;
        Ok(())
    }

    /// Canonical signed decimal string of total nanoseconds since the epoch.
    pub fn full_time_string(&self) -> String {
        self.total_nanos().to_string()
    }

    /// Total nanoseconds since the epoch as a big integer.
    #[cfg(feature = "bigint")]
    pub fn full_time(&self) -> Result<BigInt, Error> {
        Ok(BigInt::from(self.total_nanos()))
    }

    /// Always fails with [`Error::UnsupportedPlatform`] on builds without
    /// the `bigint` feature; use [`PreciseDate::full_time_string`] instead.
    #[cfg(not(feature = "bigint"))]
    pub fn full_time(&self) -> Result<Infallible, Error> {
        Err(Error::UnsupportedPlatform {
            alternative: "full_time_string",
        })
    }

    /// Sets the instant from a total nanosecond count: a native integer or
    /// its decimal string form. No field is mutated when parsing fails.
    pub fn set_full_time(&mut self, time: impl Into<FullTime>) -> Result<(), Error> {
        let total = match time.into() {
            FullTime::Nanos(nanos) => nanos,
            FullTime::Text(text) => parse_digits(&text)?,
        };
        self.apply_total(total)
    }

    /// Whole seconds and a non-negative nanosecond remainder. Pre-epoch
    /// instants with a nonzero remainder report the floored (more negative)
    /// second with the forward distance from it.
    pub fn to_struct(&self) -> Timestamp {
        let total = self.total_nanos();
        Timestamp {
            seconds: total.div_euclid(NANOS_PER_SEC) as i64,
            nanos: total.rem_euclid(NANOS_PER_SEC) as i32,
        }
    }

    /// Same values as [`PreciseDate::to_struct`], positional.
    pub fn to_tuple(&self) -> (i64, i32) {
        let ts = self.to_struct();
        (ts.seconds, ts.nanos)
    }

    /// Extended ISO-8601 string with nine fractional digits, e.g.
    /// `2019-01-12T00:30:35.381101032Z`.
    pub fn to_iso_string(&self) -> String {
        format!(
            "{}{:03}{:03}Z",
            self.base.format("%Y-%m-%dT%H:%M:%S%.3f"),
            self.micros,
            self.nanos
        )
    }

    fn total_nanos(&self) -> i128 {
        self.base.timestamp_millis() as i128 * NANOS_PER_MILLI
            + (self.micros * 1_000 + self.nanos) as i128
    }

    fn apply_total(&mut self, total: i128) -> Result<(), Error> {
        let millis =
            i64::try_from(total.div_euclid(NANOS_PER_MILLI)).map_err(|_| Error::OutOfRange)?;
        let base = DateTime::from_timestamp_millis(millis).ok_or(Error::OutOfRange)?;
        let rem = total.rem_euclid(NANOS_PER_MILLI) as u32;
        self.base = base;
        self.micros = rem / 1_000;
        self.nanos = rem % 1_000;
        Ok(())
    }
}

impl Default for PreciseDate {
    fn default() -> Self {
        Self {
            base: DateTime::UNIX_EPOCH,
            micros: 0,
            nanos: 0,
        }
    }
}

impl From<DateTime<Utc>> for PreciseDate {
    fn from(date: DateTime<Utc>) -> Self {
        let base = DateTime::from_timestamp_millis(date.timestamp_millis()).unwrap_or(date);
        Self {
            base,
            micros: 0,
            nanos: 0,
        }
    }
}

impl From<PreciseDate> for Timestamp {
    fn from(date: PreciseDate) -> Self {
        date.to_struct()
    }
}

impl FromStr for PreciseDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Self::parse(s)
    }
}

impl fmt::Display for PreciseDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso_string())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for PreciseDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_iso_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for PreciseDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error as _;
        use serde::Deserialize as _;
        let text = String::deserialize(deserializer)?;
        Self::parse(text.as_str()).map_err(D::Error::custom)
    }
}

// --- Parser internals ---

fn resolve(value: TimeValue) -> Result<i128, Error> {
    match value {
        TimeValue::Struct(ts) => Ok(combine(ts.seconds, ts.nanos)),
        TimeValue::Pair(seconds, nanos) => Ok(combine(seconds, nanos)),
        TimeValue::Nanos(nanos) => Ok(nanos),
        TimeValue::Millis(millis) => Ok(millis as i128 * NANOS_PER_MILLI),
        TimeValue::Date(date) => Ok(date.timestamp_millis() as i128 * NANOS_PER_MILLI),
        TimeValue::Text(text) => resolve_text(&text),
    }
}

fn combine(seconds: i64, nanos: i32) -> i128 {
    seconds as i128 * NANOS_PER_SEC + nanos as i128
}

fn resolve_text(text: &str) -> Result<i128, Error> {
    if is_digit_string(text) {
        return parse_digits(text);
    }
    if let Some((prefix, fraction)) = split_fractional_iso(text) {
        return resolve_fractional_iso(text, prefix, fraction);
    }
    Ok(resolve_base_date(text)? as i128 * NANOS_PER_MILLI)
}

fn is_digit_string(text: &str) -> bool {
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn parse_digits(text: &str) -> Result<i128, Error> {
    if !is_digit_string(text) {
        return Err(Error::Parse(text.to_string()));
    }
    text.parse::<i128>().map_err(|_| Error::OutOfRange)
}

/// Splits `<prefix>.<fraction>Z` when the fraction is all digits and the
/// prefix looks like a date-time.
fn split_fractional_iso(text: &str) -> Option<(&str, &str)> {
    let body = text.strip_suffix('Z')?;
    let (prefix, fraction) = body.rsplit_once('.')?;
    if !prefix.contains('T') || fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    Some((prefix, fraction))
}

fn resolve_fractional_iso(original: &str, prefix: &str, fraction: &str) -> Result<i128, Error> {
    // 3, 6 and 9 fractional digits mean milli-, micro- and nanosecond
    // precision; any other count is ambiguous.
    let padded = match fraction.len() {
        3 | 6 | 9 => format!("{:0<9}", fraction),
        _ => return Err(Error::Parse(original.to_string())),
    };
    let base = DateTime::parse_from_rfc3339(&format!("{}.{}Z", prefix, &padded[..3]))
        .map_err(|_| Error::Parse(original.to_string()))?;
    let sub_millis: u32 = padded[3..]
        .parse()
        .map_err(|_| Error::Parse(original.to_string()))?;
    Ok(base.timestamp_millis() as i128 * NANOS_PER_MILLI + sub_millis as i128)
}

/// Millisecond epoch of anything the base date collaborator can parse.
fn resolve_base_date(text: &str) -> Result<i64, Error> {
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Ok(date.timestamp_millis());
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(text) {
        return Ok(date.timestamp_millis());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc().timestamp_millis());
    }
    if let Some(midnight) = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc().timestamp_millis());
    }
    Err(Error::Parse(text.to_string()))
}
