//! Mission time handling.
//!
//! Times are carried as `f64` seconds since 1998-01-01T00:00:00 TT ("CXC
//! seconds"). Dates use the `YYYY:DOY:HH:MM:SS.sss` layout used throughout
//! load review products and are read as UTC.

use arrayvec::ArrayString;
use core::fmt::Write;
use hifitime::{Epoch, TimeUnits, Unit};
use thiserror::Error;

/// Fixed-capacity date string, e.g. `2024:123:04:05:06.789`.
pub type DateString = ArrayString<24>;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// TT runs ahead of TAI by a fixed offset.
const TT_MINUS_TAI_S: f64 = 32.184;

/// Formatting clamps to about +/- 3000 years around the epoch.
const MAX_FORMAT_SECS: f64 = 1.0e11;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    #[error("invalid date '{0}': expected YYYY:DOY[:HH[:MM[:SS.sss]]] or CXC seconds")]
    Malformed(String),

    #[error("date '{0}' is before 1998:001")]
    BeforeEpoch(String),

    #[error("field out of range in date '{0}'")]
    OutOfRange(String),
}

/// 1998-01-01T00:00:00 TT.
fn cxc_epoch() -> Epoch {
    Epoch::from_gregorian_tai_at_midnight(1998, 1, 1) - TT_MINUS_TAI_S.seconds()
}

pub fn epoch_from_secs(secs: f64) -> Epoch {
    cxc_epoch() + secs.seconds()
}

pub fn secs_from_epoch(epoch: Epoch) -> f64 {
    (epoch - cxc_epoch()).to_seconds()
}

/// Midnight starting day `doy` of `year`, on a calendar without leap
/// seconds, or `None` when the day is outside the year.
fn day_start(year: i32, doy: u32) -> Option<Epoch> {
    let start = Epoch::from_gregorian_tai_at_midnight(year, 1, 1) + i64::from(doy.checked_sub(1)?).days();
    (start.to_gregorian_tai().0 == year).then_some(start)
}

/// Parses a date string or a plain number of CXC seconds.
pub fn parse_time(text: &str) -> Result<f64, TimeError> {
    let text = text.trim();
    if !text.contains(':') {
        return text
            .parse::<f64>()
            .map_err(|_| TimeError::Malformed(text.to_string()));
    }

    let fields: Vec<&str> = text.split(':').collect();
    if fields.len() < 2 || fields.len() > 5 {
        return Err(TimeError::Malformed(text.to_string()));
    }

    let malformed = || TimeError::Malformed(text.to_string());
    let out_of_range = || TimeError::OutOfRange(text.to_string());
    let year: i32 = fields[0].parse().map_err(|_| malformed())?;
    let doy: u32 = fields[1].parse().map_err(|_| malformed())?;
    let hour: u8 = fields.get(2).map_or(Ok(0), |f| f.parse()).map_err(|_| malformed())?;
    let minute: u8 = fields.get(3).map_or(Ok(0), |f| f.parse()).map_err(|_| malformed())?;
    let second: f64 = fields.get(4).map_or(Ok(0.0), |f| f.parse()).map_err(|_| malformed())?;

    if year < 1998 {
        return Err(TimeError::BeforeEpoch(text.to_string()));
    }
    if !(0.0..61.0).contains(&second) {
        return Err(out_of_range());
    }

    let (_, month, day, ..) = day_start(year, doy).ok_or_else(out_of_range)?.to_gregorian_tai();
    let whole = second.floor();
    let nanos = (((second - whole) * 1e9).round() as u32).min(999_999_999);
    let epoch = Epoch::maybe_from_gregorian_utc(year, month, day, hour, minute, whole as u8, nanos)
        .map_err(|_| out_of_range())?;
    Ok(secs_from_epoch(epoch))
}

/// Formats CXC seconds as `YYYY:DOY:HH:MM:SS.sss`, UTC.
pub fn format_time(secs: f64) -> DateString {
    let secs = if secs.is_nan() {
        0.0
    } else {
        secs.clamp(-MAX_FORMAT_SECS, MAX_FORMAT_SECS)
    };
    let epoch = epoch_from_secs(secs).round(1_i64.milliseconds());
    let (year, month, day, hour, minute, second, nanos) = epoch.to_gregorian_utc();

    let days_into_year = Epoch::from_gregorian_tai_at_midnight(year, month, day)
        - Epoch::from_gregorian_tai_at_midnight(year, 1, 1);
    let doy = days_into_year.to_unit(Unit::Day).round() as i64 + 1;

    let mut out = DateString::new();
    // Years up to five digits fit in the 24 byte buffer.
    let _ = write!(
        out,
        "{year:04}:{doy:03}:{hour:02}:{minute:02}:{second:02}.{:03}",
        nanos / 1_000_000
    );
    out
}
