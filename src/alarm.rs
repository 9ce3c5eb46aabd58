//! Alarm register payloads for the DS3231.
//!
//! Each alarm is described by a rate, ordered from "fires every tick" up to
//! "match everything including the day". Fields the rate does not match on
//! are written with the mask bit ([`ALARM_NOT_SET`]) so the chip ignores
//! them. The last byte of each block is either a day of week (with
//! [`ALARM_WEEKDAY`] set) or a day of month, never both.
//!
//! ## Alarm 1 (0x07, 4 bytes: seconds, minutes, hours, day/date)
//!
//! | rate | sec | min | hour | day/date |
//! |---|---|---|---|---|
//! | `EverySecond` | masked | masked | masked | masked |
//! | `MatchSeconds` | match | masked | masked | masked |
//! | `MatchMinutesSeconds` | match | match | masked | masked |
//! | `MatchHoursMinutesSeconds` | match | match | match | masked |
//! | `MatchDay` | match | match | match | weekday |
//! | `MatchDate` | match | match | match | day of month |
//!
//! ## Alarm 2 (0x0B, 3 bytes: minutes, hours, day/date)
//!
//! Same as alarm 1 without the seconds column. Alarm 2 always fires at 00
//! seconds of the matching minute.

use crate::datetime::{encode_bcd, CivilTime};
use crate::registers::{RegAddr, ALARM_NOT_SET, ALARM_WEEKDAY, STATUS_ALARM_1, STATUS_ALARM_2};

/// Alarm selection.
///
/// The discriminants are the bit patterns shared by the status flags
/// (A1F/A2F) and the control interrupt enables (A1IE/A2IE).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Alarm {
    /// No alarms
    None = 0,
    /// Alarm 1 only
    Alarm1 = 1,
    /// Alarm 2 only
    Alarm2 = 2,
    /// Both alarms
    Both = 3,
}

impl Alarm {
    /// Register bits for this selection.
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Builds a selection from the low two bits of a status or control byte.
    pub fn from_bits(bits: u8) -> Self {
        match bits & (STATUS_ALARM_1 | STATUS_ALARM_2) {
            0 => Alarm::None,
            STATUS_ALARM_1 => Alarm::Alarm1,
            STATUS_ALARM_2 => Alarm::Alarm2,
            _ => Alarm::Both,
        }
    }

    /// Whether alarm 1 is part of the selection.
    pub fn includes_alarm1(self) -> bool {
        self.bits() & STATUS_ALARM_1 != 0
    }

    /// Whether alarm 2 is part of the selection.
    pub fn includes_alarm2(self) -> bool {
        self.bits() & STATUS_ALARM_2 != 0
    }
}

/// Alarm 1 rate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Alarm1Rate {
    /// Once per second
    EverySecond = 0,
    /// When seconds match
    MatchSeconds,
    /// When minutes and seconds match
    MatchMinutesSeconds,
    /// When hours, minutes and seconds match (daily)
    MatchHoursMinutesSeconds,
    /// When day of week, hours, minutes and seconds match (weekly)
    MatchDay,
    /// When day of month, hours, minutes and seconds match (monthly)
    MatchDate,
}

/// Alarm 2 rate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Alarm2Rate {
    /// Once per minute, at 00 seconds
    EveryMinute = 0,
    /// When minutes match
    MatchMinutes,
    /// When hours and minutes match (daily)
    MatchHoursMinutes,
    /// When day of week, hours and minutes match (weekly)
    MatchDay,
    /// When day of month, hours and minutes match (monthly)
    MatchDate,
}

/// Error type for alarm configuration operations.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmError {
    /// The selected alarm's rate needs a time but none was given
    MissingTime(Alarm),
    /// A field the rate matches on is out of range
    InvalidTime(&'static str),
}

impl core::fmt::Display for AlarmError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AlarmError::MissingTime(alarm) => write!(f, "no time given for {:?}", alarm),
            AlarmError::InvalidTime(msg) => write!(f, "invalid alarm time: {}", msg),
        }
    }
}

/// Which day field, if any, the last alarm byte matches on.
#[derive(Copy, Clone, PartialEq)]
enum DayMatch {
    None,
    Weekday,
    Date,
}

fn require_time(
    time: Option<&CivilTime>,
    alarm: Alarm,
) -> Result<&CivilTime, AlarmError> {
    time.ok_or_else(|| {
        warn!("alarm {:?} needs a time for its rate", alarm);
        AlarmError::MissingTime(alarm)
    })
}

fn field(armed: bool, value: u8, max: u8, what: &'static str) -> Result<u8, AlarmError> {
    if !armed {
        return Ok(ALARM_NOT_SET);
    }
    if value > max {
        return Err(AlarmError::InvalidTime(what));
    }
    Ok(encode_bcd(value))
}

fn day_date_field(time: &CivilTime, day_match: DayMatch) -> Result<u8, AlarmError> {
    match day_match {
        DayMatch::None => Ok(ALARM_NOT_SET),
        DayMatch::Weekday => {
            if time.weekday > 6 {
                return Err(AlarmError::InvalidTime("weekday must be 0-6"));
            }
            Ok(encode_bcd(time.weekday + 1) | ALARM_WEEKDAY)
        }
        DayMatch::Date => {
            if !(1..=31).contains(&time.day) {
                return Err(AlarmError::InvalidTime("day of month must be 1-31"));
            }
            Ok(encode_bcd(time.day))
        }
    }
}

/// Builds the 4 alarm 1 register bytes for `rate`.
///
/// `time` may be `None` only for [`Alarm1Rate::EverySecond`].
///
/// # Errors
///
/// [`AlarmError::MissingTime`] if the rate needs a time and none was given,
/// [`AlarmError::InvalidTime`] if a matched field is out of range.
pub fn alarm1_registers(
    time: Option<&CivilTime>,
    rate: Alarm1Rate,
) -> Result<[u8; 4], AlarmError> {
    if rate == Alarm1Rate::EverySecond {
        return Ok([ALARM_NOT_SET; 4]);
    }
    let time = require_time(time, Alarm::Alarm1)?;
    let day_match = match rate {
        Alarm1Rate::MatchDay => DayMatch::Weekday,
        Alarm1Rate::MatchDate => DayMatch::Date,
        _ => DayMatch::None,
    };
    Ok([
        field(rate >= Alarm1Rate::MatchSeconds, time.second, 59, "seconds must be 0-59")?,
        field(
            rate >= Alarm1Rate::MatchMinutesSeconds,
            time.minute,
            59,
            "minutes must be 0-59",
        )?,
        field(
            rate >= Alarm1Rate::MatchHoursMinutesSeconds,
            time.hour,
            23,
            "hours must be 0-23",
        )?,
        day_date_field(time, day_match)?,
    ])
}

/// Builds the 3 alarm 2 register bytes for `rate`.
///
/// `time` may be `None` only for [`Alarm2Rate::EveryMinute`].
///
/// # Errors
///
/// [`AlarmError::MissingTime`] if the rate needs a time and none was given,
/// [`AlarmError::InvalidTime`] if a matched field is out of range.
pub fn alarm2_registers(
    time: Option<&CivilTime>,
    rate: Alarm2Rate,
) -> Result<[u8; 3], AlarmError> {
    if rate == Alarm2Rate::EveryMinute {
        return Ok([ALARM_NOT_SET; 3]);
    }
    let time = require_time(time, Alarm::Alarm2)?;
    let day_match = match rate {
        Alarm2Rate::MatchDay => DayMatch::Weekday,
        Alarm2Rate::MatchDate => DayMatch::Date,
        _ => DayMatch::None,
    };
    Ok([
        field(rate >= Alarm2Rate::MatchMinutes, time.minute, 59, "minutes must be 0-59")?,
        field(
            rate >= Alarm2Rate::MatchHoursMinutes,
            time.hour,
            23,
            "hours must be 0-23",
        )?,
        day_date_field(time, day_match)?,
    ])
}

/// A single register write covering the selected alarm block(s).
///
/// The alarm 1 and alarm 2 blocks are contiguous, so setting both is one
/// 7 byte write starting at alarm 1.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AlarmWrite {
    start: RegAddr,
    data: [u8; 7],
    len: usize,
}

impl AlarmWrite {
    /// Plans the write for `alarms`.
    ///
    /// Returns `Ok(None)` for [`Alarm::None`]: nothing needs to be written.
    /// Time/rate pairs of alarms that are not selected are ignored.
    ///
    /// # Errors
    ///
    /// See [`alarm1_registers`] and [`alarm2_registers`].
    pub fn plan(
        alarms: Alarm,
        time1: Option<&CivilTime>,
        rate1: Alarm1Rate,
        time2: Option<&CivilTime>,
        rate2: Alarm2Rate,
    ) -> Result<Option<Self>, AlarmError> {
        let mut data = [0u8; 7];
        let mut len = 0;
        if alarms.includes_alarm1() {
            let a1 = alarm1_registers(time1, rate1)?;
            data[..4].copy_from_slice(&a1);
            len += 4;
        }
        if alarms.includes_alarm2() {
            let a2 = alarm2_registers(time2, rate2)?;
            data[len..len + 3].copy_from_slice(&a2);
            len += 3;
        }
        let start = match alarms {
            Alarm::None => return Ok(None),
            Alarm::Alarm2 => RegAddr::Alarm2,
            Alarm::Alarm1 | Alarm::Both => RegAddr::Alarm1,
        };
        Ok(Some(Self { start, data, len }))
    }

    /// First register of the write.
    pub fn start(&self) -> RegAddr {
        self.start
    }

    /// Register bytes to write, starting at [`AlarmWrite::start`].
    pub fn data(&self) -> &[u8] {
        &self.data[..self.len]
    }
}
