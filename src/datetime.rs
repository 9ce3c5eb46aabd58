//! BCD helpers and the time block codec.
//!
//! The DS3231 stores date and time in 7 consecutive BCD registers starting at
//! 0x00: seconds, minutes, hours, day, date, month, year. [`CivilTime`] is the
//! caller-facing view of that block and [`encode_time`]/[`decode_time`]
//! convert between the two.
//!
//! # Conventions
//!
//! - `weekday` is 0-based (0 = Sunday) in [`CivilTime`] and 1-based on the wire.
//! - `month` is 1-based on both sides.
//! - `year` is the full year; the chip only stores the offset from 2000.
//! - Time is always written in 24 hour format. Reading accepts both formats.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::registers::{Hours, TimeRepresentation, HOUR_12_MASK, MONTH_MASK};

/// First year representable in the year register.
pub const BASE_YEAR: u16 = 2000;

/// Converts a BCD byte to its decimal value.
///
/// Bytes that are not valid BCD produce a meaningless value, the same way the
/// chip would interpret them.
pub fn decode_bcd(value: u8) -> u8 {
    (value >> 4).wrapping_mul(10).wrapping_add(value & 0x0F)
}

/// Converts a decimal value in 0..=99 to BCD.
///
/// Values above 99 do not fit in two digits and produce a meaningless byte.
pub fn encode_bcd(value: u8) -> u8 {
    ((value / 10) << 4).wrapping_add(value % 10)
}

/// A calendar date and time of day as stored by the RTC.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CivilTime {
    /// Seconds (0-59)
    pub second: u8,
    /// Minutes (0-59)
    pub minute: u8,
    /// Hours in 24 hour format (0-23)
    pub hour: u8,
    /// Day of week (0-6, 0 = Sunday)
    pub weekday: u8,
    /// Day of month (1-31)
    pub day: u8,
    /// Month (1-12)
    pub month: u8,
    /// Full year (2000-2099)
    pub year: u16,
}

impl CivilTime {
    /// Checks every field against the range the time registers can hold.
    ///
    /// # Errors
    ///
    /// Returns [`DS3231DateTimeError::YearNotAfter1999`] or
    /// [`DS3231DateTimeError::YearNotBefore2100`] for a year outside the
    /// register's century, and [`DS3231DateTimeError::InvalidDateTime`] for any
    /// other field out of range.
    pub fn validate(&self) -> Result<(), DS3231DateTimeError> {
        if self.year < BASE_YEAR {
            error!("Year {} is too early! must be greater than 1999", self.year);
            return Err(DS3231DateTimeError::YearNotAfter1999);
        }
        if self.year > BASE_YEAR + 99 {
            error!("Year {} is too late! must be before 2100", self.year);
            return Err(DS3231DateTimeError::YearNotBefore2100);
        }
        if self.second > 59
            || self.minute > 59
            || self.hour > 23
            || self.weekday > 6
            || !(1..=31).contains(&self.day)
            || !(1..=12).contains(&self.month)
        {
            return Err(DS3231DateTimeError::InvalidDateTime);
        }
        Ok(())
    }

    /// Builds a `CivilTime` from a chrono date and time.
    ///
    /// Sub-second precision is dropped. The year is not range checked here,
    /// [`CivilTime::validate`] does that.
    ///
    /// # Errors
    ///
    /// Returns [`DS3231DateTimeError::InvalidDateTime`] if the year does not fit
    /// in a `u16`.
    pub fn from_datetime(datetime: &NaiveDateTime) -> Result<Self, DS3231DateTimeError> {
        let year =
            u16::try_from(datetime.year()).map_err(|_| DS3231DateTimeError::InvalidDateTime)?;
        // chrono guarantees these ranges, so the narrowing casts are lossless
        Ok(Self {
            second: datetime.second() as u8,
            minute: datetime.minute() as u8,
            hour: datetime.hour() as u8,
            weekday: datetime.weekday().num_days_from_sunday() as u8,
            day: datetime.day() as u8,
            month: datetime.month() as u8,
            year,
        })
    }

    /// Converts to a chrono date and time.
    ///
    /// The weekday is ignored; chrono derives it from the date.
    ///
    /// # Errors
    ///
    /// Returns [`DS3231DateTimeError::InvalidDateTime`] if the fields do not
    /// form a real calendar date and time.
    pub fn to_datetime(&self) -> Result<NaiveDateTime, DS3231DateTimeError> {
        NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )
        .and_then(|d| {
            d.and_hms_opt(
                u32::from(self.hour),
                u32::from(self.minute),
                u32::from(self.second),
            )
        })
        .ok_or(DS3231DateTimeError::InvalidDateTime)
    }
}

/// Encodes a time into the 7 byte register block.
///
/// The hour is always written in 24 hour format. Fields are not range
/// checked; call [`CivilTime::validate`] first if the input is untrusted.
pub fn encode_time(time: &CivilTime) -> [u8; 7] {
    // only the low two digits survive, the register has no room for more
    let year_offset = (time.year.wrapping_sub(BASE_YEAR) % 100) as u8;
    [
        encode_bcd(time.second),
        encode_bcd(time.minute),
        encode_bcd(time.hour),
        encode_bcd(time.weekday.wrapping_add(1)),
        encode_bcd(time.day),
        encode_bcd(time.month),
        encode_bcd(year_offset),
    ]
}

/// Decodes the 7 byte register block.
///
/// Handles both 12 and 24 hour formats in the hours byte and ignores the
/// century bit in the month byte.
pub fn decode_time(data: &[u8; 7]) -> CivilTime {
    let hours = Hours::from(data[2]);
    let hour = match hours.time_representation() {
        TimeRepresentation::TwelveHour => {
            let hour12 = decode_bcd(data[2] & HOUR_12_MASK);
            let hour = hour12 % 12;
            if hours.pm_or_twenty_hours() {
                hour + 12
            } else {
                hour
            }
        }
        TimeRepresentation::TwentyFourHour => decode_bcd(data[2]),
    };
    trace!("raw_hour={:#x} hour={}", data[2], hour);

    CivilTime {
        second: decode_bcd(data[0]),
        minute: decode_bcd(data[1]),
        hour,
        weekday: decode_bcd(data[3]).wrapping_sub(1),
        day: decode_bcd(data[4]),
        month: decode_bcd(data[5] & MONTH_MASK),
        year: BASE_YEAR + u16::from(decode_bcd(data[6])),
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Errors that can occur during DS3231 date/time conversion or validation.
pub enum DS3231DateTimeError {
    /// The provided or decoded date/time is invalid (e.g., out of range, not representable)
    InvalidDateTime,
    /// The year is not before 2100 (the year register only holds 00-99)
    YearNotBefore2100,
    /// The year is not after 1999
    YearNotAfter1999,
}

impl core::fmt::Display for DS3231DateTimeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DS3231DateTimeError::InvalidDateTime => f.write_str("invalid date/time"),
            DS3231DateTimeError::YearNotBefore2100 => f.write_str("year must be before 2100"),
            DS3231DateTimeError::YearNotAfter1999 => f.write_str("year must be after 1999"),
        }
    }
}
