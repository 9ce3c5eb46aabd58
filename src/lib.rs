//! A register-level, platform-agnostic driver for the DS3231 real-time clock.
//!
//! The driver turns time, alarm, status and temperature requests into the
//! DS3231's byte-level register protocol over any [`embedded_hal::i2c::I2c`]
//! bus. Every operation is one register transaction, or a read followed by a
//! write for bit updates.
//!
//! # Features
//!
//! - Time read/write as [`CivilTime`] or chrono [`NaiveDateTime`]
//! - Alarm 1 and alarm 2 configuration by match rate
//! - Alarm flags and alarm interrupt control
//! - Square wave and 32kHz output control
//! - Temperature as raw quarter degrees, whole degrees or `f32`
//! - Optional async driver (`async` feature) in [`asynch`]
//! - Optional logging through `log` or `defmt`
//!
//! # Example
//!
//! ```rust,ignore
//! use ds3231_regs::{Alarm, Alarm1Rate, Alarm2Rate, CivilTime, DS3231};
//!
//! let mut rtc = DS3231::new(i2c);
//! rtc.set_time(&CivilTime {
//!     second: 0,
//!     minute: 30,
//!     hour: 15,
//!     weekday: 4,
//!     day: 14,
//!     month: 3,
//!     year: 2024,
//! })?;
//!
//! // Fire alarm 1 every day at 07:00:00
//! let wake = CivilTime { hour: 7, minute: 0, second: 0, ..rtc.time()? };
//! rtc.set_alarm(Alarm::Alarm1, Some(&wake), Alarm1Rate::MatchHoursMinutesSeconds, None, Alarm2Rate::EveryMinute)?;
//! rtc.clear_alarm_flags(Alarm::Alarm1)?;
//! rtc.enable_alarm_interrupts(Alarm::Alarm1)?;
//! ```
//!
//! # Concurrency
//!
//! Bit updates are a read followed by a write and are not atomic with
//! respect to anything else on the bus. All methods take `&mut self`; if the
//! bus is shared, serialize access to the device yourself.
#![no_std]

mod fmt;

pub mod alarm;
#[cfg(feature = "async")]
pub mod asynch;
pub mod datetime;
pub mod flags;
pub mod registers;
pub mod temperature;

use chrono::NaiveDateTime;
use embedded_hal::i2c::I2c;

pub use crate::alarm::{Alarm, Alarm1Rate, Alarm2Rate, AlarmError, AlarmWrite};
pub use crate::datetime::{
    decode_bcd, decode_time, encode_bcd, encode_time, CivilTime, DS3231DateTimeError,
};
pub use crate::flags::FlagMode;
pub use crate::registers::{
    AgingOffset, Control, InterruptControl, RegAddr, SquareWaveFrequency, Status,
    TimeRepresentation, DEVICE_ADDRESS,
};
use crate::registers::{
    CONTROL_ALARM_INTERRUPTS, CONTROL_CONVERT_TEMPERATURE, CONTROL_RATE_SELECT, STATUS_32KHZ,
    STATUS_ALARM_1, STATUS_ALARM_2, STATUS_BUSY, STATUS_OSCILLATOR_STOPPED,
};

/// Longest register write the driver issues (both alarm blocks).
const MAX_WRITE: usize = 7;

/// Output settings applied by [`DS3231::configure`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Square wave frequency, used while the pin is in square wave mode
    pub square_wave_frequency: SquareWaveFrequency,
    /// Function of the INT/SQW pin
    pub interrupt_control: InterruptControl,
    /// Drive the 32kHz pin
    pub enable_32khz_output: bool,
}

impl Default for Config {
    /// The chip's power-on state.
    fn default() -> Self {
        Self {
            square_wave_frequency: SquareWaveFrequency::Hz8192,
            interrupt_control: InterruptControl::Interrupt,
            enable_32khz_output: true,
        }
    }
}

/// Errors returned by the driver.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DS3231Error<I2CE> {
    /// The bus transaction failed; the register state is unknown
    I2c(I2CE),
    /// The date/time could not be converted
    DateTime(DS3231DateTimeError),
    /// The alarm request could not be encoded
    Alarm(AlarmError),
}

impl<I2CE> From<I2CE> for DS3231Error<I2CE> {
    fn from(e: I2CE) -> Self {
        DS3231Error::I2c(e)
    }
}

/// Generates typed getters and setters for single byte registers.
macro_rules! register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        $(
            paste::item! {
                #[doc = concat!("Writes the ", stringify!($name), " register.")]
                pub fn [< set_ $name >](&mut self, value: $typ) -> Result<(), DS3231Error<I2C::Error>> {
                    let raw: u8 = value.into();
                    self.write_registers($regaddr, &[raw])
                }
            }

            #[doc = concat!("Reads the ", stringify!($name), " register.")]
            pub fn $name(&mut self) -> Result<$typ, DS3231Error<I2C::Error>> {
                let mut data = [0];
                self.read_registers($regaddr, &mut data)?;
                Ok(<$typ>::from(data[0]))
            }
        )+
    }
}

/// DS3231 Real-Time Clock driver.
///
/// Owns the I2C bus handle for its lifetime; [`DS3231::destroy`] hands it
/// back. The device keeps no state of its own beyond the bus and address.
pub struct DS3231<I2C: I2c> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> DS3231<I2C> {
    /// Creates a driver for the DS3231 at its fixed address (0x68).
    ///
    /// The bus must already be configured (port, pins, speed) by the HAL.
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            address: DEVICE_ADDRESS,
        }
    }

    /// Releases the I2C bus.
    pub fn destroy(self) -> I2C {
        self.i2c
    }

    fn write_registers(
        &mut self,
        reg: RegAddr,
        data: &[u8],
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let len = data.len().min(MAX_WRITE);
        let mut buf = [0u8; MAX_WRITE + 1];
        buf[0] = reg as u8;
        buf[1..=len].copy_from_slice(&data[..len]);
        trace!("write reg={:#x} len={}", reg as u8, len);
        self.i2c.write(self.address, &buf[..=len])?;
        Ok(())
    }

    fn read_registers(
        &mut self,
        reg: RegAddr,
        data: &mut [u8],
    ) -> Result<(), DS3231Error<I2C::Error>> {
        trace!("read reg={:#x} len={}", reg as u8, data.len());
        self.i2c.write_read(self.address, &[reg as u8], data)?;
        Ok(())
    }

    /// Reads a register and applies `f`, writing the result back.
    ///
    /// Returns the value written. If the read fails nothing is written.
    pub fn modify_register<F>(&mut self, reg: RegAddr, f: F) -> Result<u8, DS3231Error<I2C::Error>>
    where
        F: FnOnce(u8) -> u8,
    {
        let mut data = [0];
        self.read_registers(reg, &mut data)?;
        let value = f(data[0]);
        debug!("modify reg={:#x}: {:#x} -> {:#x}", reg as u8, data[0], value);
        self.write_registers(reg, &[value])?;
        Ok(value)
    }

    /// Reads a register and returns only the bits in `mask`.
    pub fn get_flag(&mut self, reg: RegAddr, mask: u8) -> Result<u8, DS3231Error<I2C::Error>> {
        let mut data = [0];
        self.read_registers(reg, &mut data)?;
        Ok(data[0] & mask)
    }

    /// Sets, clears or replaces bits in a register (read-modify-write).
    pub fn set_flag(
        &mut self,
        reg: RegAddr,
        bits: u8,
        mode: FlagMode,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.modify_register(reg, |current| mode.apply(current, bits))?;
        Ok(())
    }

    /// Sets the time. The hour is written in 24 hour format.
    ///
    /// # Errors
    ///
    /// [`DS3231Error::DateTime`] if `time` does not fit the registers, in
    /// which case nothing is written.
    pub fn set_time(&mut self, time: &CivilTime) -> Result<(), DS3231Error<I2C::Error>> {
        time.validate().map_err(DS3231Error::DateTime)?;
        let data = encode_time(time);
        debug!("set_time raw={:?}", data);
        self.write_registers(RegAddr::Time, &data)
    }

    /// Reads the time.
    pub fn time(&mut self) -> Result<CivilTime, DS3231Error<I2C::Error>> {
        let mut data = [0; 7];
        self.read_registers(RegAddr::Time, &mut data)?;
        Ok(decode_time(&data))
    }

    /// Sets the time from a chrono date and time.
    pub fn set_datetime(&mut self, datetime: &NaiveDateTime) -> Result<(), DS3231Error<I2C::Error>> {
        let time = CivilTime::from_datetime(datetime).map_err(DS3231Error::DateTime)?;
        self.set_time(&time)
    }

    /// Reads the time as a chrono date and time.
    pub fn datetime(&mut self) -> Result<NaiveDateTime, DS3231Error<I2C::Error>> {
        self.time()?.to_datetime().map_err(DS3231Error::DateTime)
    }

    /// Programs one or both alarms.
    ///
    /// `time1`/`rate1` describe alarm 1 and `time2`/`rate2` alarm 2; the pair
    /// for an alarm that is not selected is ignored. A time may be `None`
    /// only for the every-tick rates. Setting both alarms is a single write.
    ///
    /// This does not enable alarm interrupts, see
    /// [`DS3231::enable_alarm_interrupts`].
    pub fn set_alarm(
        &mut self,
        alarms: Alarm,
        time1: Option<&CivilTime>,
        rate1: Alarm1Rate,
        time2: Option<&CivilTime>,
        rate2: Alarm2Rate,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        match AlarmWrite::plan(alarms, time1, rate1, time2, rate2).map_err(DS3231Error::Alarm)? {
            Some(write) => {
                debug!("set_alarm {:?} at {:#x}", alarms, write.start() as u8);
                self.write_registers(write.start(), write.data())
            }
            None => Ok(()),
        }
    }

    /// Whether the oscillator has stopped at some point (power loss, battery
    /// removed, oscillator disabled) since the flag was last cleared.
    pub fn oscillator_stop_flag(&mut self) -> Result<bool, DS3231Error<I2C::Error>> {
        Ok(self.get_flag(RegAddr::Status, STATUS_OSCILLATOR_STOPPED)? != 0)
    }

    /// Clears the oscillator stop flag.
    pub fn clear_oscillator_stop_flag(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_flag(RegAddr::Status, STATUS_OSCILLATOR_STOPPED, FlagMode::Clear)
    }

    /// Which alarms have matched since their flags were last cleared.
    pub fn alarm_flags(&mut self) -> Result<Alarm, DS3231Error<I2C::Error>> {
        let flags = self.get_flag(RegAddr::Status, STATUS_ALARM_1 | STATUS_ALARM_2)?;
        Ok(Alarm::from_bits(flags))
    }

    /// Clears the matched flag of the selected alarms.
    pub fn clear_alarm_flags(&mut self, alarms: Alarm) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_flag(RegAddr::Status, alarms.bits(), FlagMode::Clear)
    }

    /// Enables interrupts for the selected alarms and switches the INT/SQW
    /// pin to interrupt output, which stops the square wave.
    ///
    /// The other alarm's enable bit is left alone. Clear stale alarm flags
    /// first or the interrupt fires immediately.
    pub fn enable_alarm_interrupts(&mut self, alarms: Alarm) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_flag(
            RegAddr::Control,
            CONTROL_ALARM_INTERRUPTS | alarms.bits(),
            FlagMode::Set,
        )
    }

    /// Disables interrupts for the selected alarms.
    ///
    /// The pin stays in interrupt mode; use [`DS3231::enable_square_wave`] to
    /// get the square wave back.
    pub fn disable_alarm_interrupts(&mut self, alarms: Alarm) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_flag(RegAddr::Control, alarms.bits(), FlagMode::Clear)
    }

    /// Outputs the square wave on INT/SQW, which disables alarm interrupts.
    pub fn enable_square_wave(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_flag(RegAddr::Control, CONTROL_ALARM_INTERRUPTS, FlagMode::Clear)
    }

    /// Stops the square wave and returns INT/SQW to interrupt output.
    ///
    /// Individual alarm interrupts still need enabling.
    pub fn disable_square_wave(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_flag(RegAddr::Control, CONTROL_ALARM_INTERRUPTS, FlagMode::Set)
    }

    /// Selects the square wave frequency. Does not enable the output.
    pub fn set_square_wave_frequency(
        &mut self,
        frequency: SquareWaveFrequency,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.modify_register(RegAddr::Control, |control| {
            FlagMode::Replace.apply(control, (control & !CONTROL_RATE_SELECT) | frequency.bits())
        })?;
        Ok(())
    }

    /// Enables the 32kHz output.
    pub fn enable_32khz_output(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_flag(RegAddr::Status, STATUS_32KHZ, FlagMode::Set)
    }

    /// Disables the 32kHz output.
    pub fn disable_32khz_output(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_flag(RegAddr::Status, STATUS_32KHZ, FlagMode::Clear)
    }

    /// Raw temperature in units of 0.25 °C.
    pub fn raw_temperature(&mut self) -> Result<i16, DS3231Error<I2C::Error>> {
        let mut data = [0; 2];
        self.read_registers(RegAddr::Temperature, &mut data)?;
        Ok(temperature::decode_raw(data))
    }

    /// Temperature in whole degrees Celsius.
    pub fn temperature(&mut self) -> Result<i8, DS3231Error<I2C::Error>> {
        Ok(temperature::to_celsius(self.raw_temperature()?))
    }

    /// Temperature in degrees Celsius, 0.25 °C resolution.
    pub fn temperature_f32(&mut self) -> Result<f32, DS3231Error<I2C::Error>> {
        Ok(temperature::to_celsius_f32(self.raw_temperature()?))
    }

    /// Starts a temperature conversion outside the regular 64 second cycle.
    ///
    /// Poll [`DS3231::busy`] for completion.
    pub fn convert_temperature(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_flag(RegAddr::Control, CONTROL_CONVERT_TEMPERATURE, FlagMode::Set)
    }

    /// Whether a temperature conversion is in progress.
    pub fn busy(&mut self) -> Result<bool, DS3231Error<I2C::Error>> {
        Ok(self.get_flag(RegAddr::Status, STATUS_BUSY)? != 0)
    }

    /// Applies output settings.
    ///
    /// One read-modify-write of the control register followed by one of the
    /// status register.
    pub fn configure(&mut self, config: &Config) -> Result<(), DS3231Error<I2C::Error>> {
        debug!("configure: {:?}", config);
        self.modify_register(RegAddr::Control, |value| {
            let mut control = Control::from(value);
            control.set_square_wave_frequency(config.square_wave_frequency);
            control.set_interrupt_control(config.interrupt_control);
            control.into()
        })?;
        self.modify_register(RegAddr::Status, |value| {
            let mut status = Status::from(value);
            status.set_enable_32khz_output(config.enable_32khz_output);
            status.into()
        })?;
        Ok(())
    }

    register_access!(
        (control, RegAddr::Control, Control),
        (status, RegAddr::Status, Status),
        (aging_offset, RegAddr::AgingOffset, AgingOffset)
    );
}

#[cfg(test)]
mod tests {
    extern crate alloc;
    use super::*;
    use alloc::vec;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

    const ADDR: u8 = DEVICE_ADDRESS;

    fn setup(expectations: &[I2cTrans]) -> DS3231<I2cMock> {
        DS3231::new(I2cMock::new(expectations))
    }

    fn finish(dev: DS3231<I2cMock>) {
        let mut i2c = dev.destroy();
        i2c.done();
    }

    fn sample_time() -> CivilTime {
        CivilTime {
            second: 0,
            minute: 30,
            hour: 15,
            weekday: 4,
            day: 14,
            month: 3,
            year: 2024,
        }
    }

    #[test]
    fn test_set_time() {
        let mut dev = setup(&[I2cTrans::write(
            ADDR,
            vec![0x00, 0x00, 0x30, 0x15, 0x05, 0x14, 0x03, 0x24],
        )]);
        dev.set_time(&sample_time()).unwrap();
        finish(dev);
    }

    #[test]
    fn test_set_time_rejects_out_of_range_year() {
        let mut dev = setup(&[]);
        let mut time = sample_time();
        time.year = 2100;
        assert!(matches!(
            dev.set_time(&time),
            Err(DS3231Error::DateTime(DS3231DateTimeError::YearNotBefore2100))
        ));
        finish(dev);
    }

    #[test]
    fn test_time() {
        let mut dev = setup(&[I2cTrans::write_read(
            ADDR,
            vec![0x00],
            vec![0x00, 0x30, 0x15, 0x05, 0x14, 0x03, 0x24],
        )]);
        assert_eq!(dev.time().unwrap(), sample_time());
        finish(dev);
    }

    #[test]
    fn test_datetime_round_trip_over_bus() {
        let dt = chrono::NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap();
        let raw = vec![0x00, 0x30, 0x15, 0x05, 0x14, 0x03, 0x24];
        let mut write = vec![0x00];
        write.extend_from_slice(&raw);
        let mut dev = setup(&[
            I2cTrans::write(ADDR, write),
            I2cTrans::write_read(ADDR, vec![0x00], raw),
        ]);
        dev.set_datetime(&dt).unwrap();
        assert_eq!(dev.datetime().unwrap(), dt);
        finish(dev);
    }

    #[test]
    fn test_datetime_invalid_registers() {
        // February 30th
        let mut dev = setup(&[I2cTrans::write_read(
            ADDR,
            vec![0x00],
            vec![0x00, 0x00, 0x00, 0x01, 0x30, 0x02, 0x24],
        )]);
        assert!(matches!(
            dev.datetime(),
            Err(DS3231Error::DateTime(DS3231DateTimeError::InvalidDateTime))
        ));
        finish(dev);
    }

    #[test]
    fn test_read_failure_propagates() {
        let mut dev = setup(&[
            I2cTrans::write_read(ADDR, vec![0x00], vec![0; 7]).with_error(ErrorKind::Other),
        ]);
        assert!(matches!(dev.time(), Err(DS3231Error::I2c(ErrorKind::Other))));
        finish(dev);
    }

    #[test]
    fn test_set_alarm_both_is_one_write() {
        let t = sample_time();
        let mut dev = setup(&[I2cTrans::write(
            ADDR,
            vec![0x07, 0x00, 0x30, 0x15, 0x80, 0x30, 0x15, 0x05 | 0x40],
        )]);
        dev.set_alarm(
            Alarm::Both,
            Some(&t),
            Alarm1Rate::MatchHoursMinutesSeconds,
            Some(&t),
            Alarm2Rate::MatchDay,
        )
        .unwrap();
        finish(dev);
    }

    #[test]
    fn test_set_alarm2_only() {
        let t = sample_time();
        let mut dev = setup(&[I2cTrans::write(ADDR, vec![0x0B, 0x30, 0x15, 0x14])]);
        dev.set_alarm(
            Alarm::Alarm2,
            None,
            Alarm1Rate::MatchDate,
            Some(&t),
            Alarm2Rate::MatchDate,
        )
        .unwrap();
        finish(dev);
    }

    #[test]
    fn test_set_alarm1_every_second_without_time() {
        let mut dev = setup(&[I2cTrans::write(
            ADDR,
            vec![0x07, 0x80, 0x80, 0x80, 0x80],
        )]);
        dev.set_alarm(
            Alarm::Alarm1,
            None,
            Alarm1Rate::EverySecond,
            None,
            Alarm2Rate::EveryMinute,
        )
        .unwrap();
        finish(dev);
    }

    #[test]
    fn test_set_alarm_none_is_no_traffic() {
        let mut dev = setup(&[]);
        dev.set_alarm(
            Alarm::None,
            None,
            Alarm1Rate::MatchDate,
            None,
            Alarm2Rate::MatchDate,
        )
        .unwrap();
        finish(dev);
    }

    #[test]
    fn test_set_alarm_missing_time() {
        let mut dev = setup(&[]);
        assert!(matches!(
            dev.set_alarm(
                Alarm::Both,
                None,
                Alarm1Rate::EverySecond,
                None,
                Alarm2Rate::MatchMinutes,
            ),
            Err(DS3231Error::Alarm(AlarmError::MissingTime(Alarm::Alarm2)))
        ));
        finish(dev);
    }

    #[test]
    fn test_get_flag_masks() {
        let mut dev = setup(&[I2cTrans::write_read(ADDR, vec![0x0F], vec![0x8B])]);
        assert_eq!(dev.get_flag(RegAddr::Status, 0x03).unwrap(), 0x03);
        finish(dev);
    }

    #[test]
    fn test_set_flag_clear_writes_back() {
        let mut dev = setup(&[
            I2cTrans::write_read(ADDR, vec![0x0F], vec![0x90]),
            I2cTrans::write(ADDR, vec![0x0F, 0x10]),
        ]);
        dev.set_flag(RegAddr::Status, 0x80, FlagMode::Clear).unwrap();
        finish(dev);
    }

    #[test]
    fn test_set_flag_modes() {
        let mut dev = setup(&[
            I2cTrans::write_read(ADDR, vec![0x0E], vec![0x18]),
            I2cTrans::write(ADDR, vec![0x0E, 0x1C]),
            I2cTrans::write_read(ADDR, vec![0x0E], vec![0x1C]),
            I2cTrans::write(ADDR, vec![0x0E, 0x42]),
        ]);
        dev.set_flag(RegAddr::Control, 0x04, FlagMode::Set).unwrap();
        dev.set_flag(RegAddr::Control, 0x42, FlagMode::Replace).unwrap();
        finish(dev);
    }

    #[test]
    fn test_set_flag_read_failure_skips_write() {
        let mut dev = setup(&[
            I2cTrans::write_read(ADDR, vec![0x0F], vec![0x00]).with_error(ErrorKind::Other),
        ]);
        assert!(matches!(
            dev.set_flag(RegAddr::Status, 0x80, FlagMode::Clear),
            Err(DS3231Error::I2c(ErrorKind::Other))
        ));
        finish(dev);
    }

    #[test]
    fn test_set_flag_write_failure_propagates() {
        let mut dev = setup(&[
            I2cTrans::write_read(ADDR, vec![0x0F], vec![0x90]),
            I2cTrans::write(ADDR, vec![0x0F, 0x10]).with_error(ErrorKind::Other),
        ]);
        assert!(matches!(
            dev.clear_oscillator_stop_flag(),
            Err(DS3231Error::I2c(ErrorKind::Other))
        ));
        finish(dev);
    }

    #[test]
    fn test_oscillator_stop_flag() {
        let mut dev = setup(&[
            I2cTrans::write_read(ADDR, vec![0x0F], vec![0x88]),
            I2cTrans::write_read(ADDR, vec![0x0F], vec![0x88]),
            I2cTrans::write(ADDR, vec![0x0F, 0x08]),
            I2cTrans::write_read(ADDR, vec![0x0F], vec![0x08]),
        ]);
        assert!(dev.oscillator_stop_flag().unwrap());
        dev.clear_oscillator_stop_flag().unwrap();
        assert!(!dev.oscillator_stop_flag().unwrap());
        finish(dev);
    }

    #[test]
    fn test_alarm_flags() {
        let mut dev = setup(&[
            I2cTrans::write_read(ADDR, vec![0x0F], vec![0x8A]),
            I2cTrans::write_read(ADDR, vec![0x0F], vec![0x8B]),
            I2cTrans::write(ADDR, vec![0x0F, 0x8A]),
            I2cTrans::write_read(ADDR, vec![0x0F], vec![0x8A]),
            I2cTrans::write(ADDR, vec![0x0F, 0x88]),
        ]);
        assert_eq!(dev.alarm_flags().unwrap(), Alarm::Alarm2);
        dev.clear_alarm_flags(Alarm::Alarm1).unwrap();
        dev.clear_alarm_flags(Alarm::Both).unwrap();
        finish(dev);
    }

    #[test]
    fn test_alarm_interrupts() {
        let mut dev = setup(&[
            // square wave mode, 8kHz
            I2cTrans::write_read(ADDR, vec![0x0E], vec![0x18]),
            I2cTrans::write(ADDR, vec![0x0E, 0x1F]),
            I2cTrans::write_read(ADDR, vec![0x0E], vec![0x1F]),
            I2cTrans::write(ADDR, vec![0x0E, 0x1E]),
        ]);
        dev.enable_alarm_interrupts(Alarm::Both).unwrap();
        // Leaves INTCN set
        dev.disable_alarm_interrupts(Alarm::Alarm1).unwrap();
        finish(dev);
    }

    #[test]
    fn test_square_wave_toggles_interrupt_control() {
        let mut dev = setup(&[
            I2cTrans::write_read(ADDR, vec![0x0E], vec![0x1D]),
            I2cTrans::write(ADDR, vec![0x0E, 0x19]),
            I2cTrans::write_read(ADDR, vec![0x0E], vec![0x19]),
            I2cTrans::write(ADDR, vec![0x0E, 0x1D]),
        ]);
        dev.enable_square_wave().unwrap();
        dev.disable_square_wave().unwrap();
        finish(dev);
    }

    #[test]
    fn test_set_square_wave_frequency() {
        let mut dev = setup(&[
            I2cTrans::write_read(ADDR, vec![0x0E], vec![0x1C]),
            I2cTrans::write(ADDR, vec![0x0E, 0x0C]),
            I2cTrans::write_read(ADDR, vec![0x0E], vec![0x05]),
            I2cTrans::write(ADDR, vec![0x0E, 0x15]),
        ]);
        dev.set_square_wave_frequency(SquareWaveFrequency::Hz1024)
            .unwrap();
        dev.set_square_wave_frequency(SquareWaveFrequency::Hz4096)
            .unwrap();
        finish(dev);
    }

    #[test]
    fn test_32khz_output() {
        let mut dev = setup(&[
            I2cTrans::write_read(ADDR, vec![0x0F], vec![0x00]),
            I2cTrans::write(ADDR, vec![0x0F, 0x08]),
            I2cTrans::write_read(ADDR, vec![0x0F], vec![0x89]),
            I2cTrans::write(ADDR, vec![0x0F, 0x81]),
        ]);
        dev.enable_32khz_output().unwrap();
        dev.disable_32khz_output().unwrap();
        finish(dev);
    }

    #[test]
    fn test_temperature() {
        let mut dev = setup(&[
            I2cTrans::write_read(ADDR, vec![0x11], vec![0x19, 0x40]),
            I2cTrans::write_read(ADDR, vec![0x11], vec![0x19, 0x40]),
            I2cTrans::write_read(ADDR, vec![0x11], vec![0x19, 0x00]),
        ]);
        assert_eq!(dev.raw_temperature().unwrap(), 0x65);
        assert_eq!(dev.temperature().unwrap(), 25);
        assert_eq!(dev.temperature_f32().unwrap(), 25.0);
        finish(dev);
    }

    #[test]
    fn test_negative_temperature() {
        let mut dev = setup(&[I2cTrans::write_read(ADDR, vec![0x11], vec![0xF5, 0x80])]);
        assert_eq!(dev.temperature().unwrap(), -11);
        finish(dev);
    }

    #[test]
    fn test_convert_temperature_and_busy() {
        let mut dev = setup(&[
            I2cTrans::write_read(ADDR, vec![0x0E], vec![0x1C]),
            I2cTrans::write(ADDR, vec![0x0E, 0x3C]),
            I2cTrans::write_read(ADDR, vec![0x0F], vec![0x0C]),
            I2cTrans::write_read(ADDR, vec![0x0F], vec![0x08]),
        ]);
        dev.convert_temperature().unwrap();
        assert!(dev.busy().unwrap());
        assert!(!dev.busy().unwrap());
        finish(dev);
    }

    #[test]
    fn test_register_access() {
        let mut dev = setup(&[
            I2cTrans::write_read(ADDR, vec![0x0E], vec![0x1C]),
            I2cTrans::write(ADDR, vec![0x0E, 0x04]),
            I2cTrans::write_read(ADDR, vec![0x0F], vec![0x88]),
            I2cTrans::write_read(ADDR, vec![0x10], vec![0xFE]),
            I2cTrans::write(ADDR, vec![0x10, 0x05]),
        ]);
        let control = dev.control().unwrap();
        assert_eq!(control.square_wave_frequency(), SquareWaveFrequency::Hz8192);
        assert_eq!(control.interrupt_control(), InterruptControl::Interrupt);
        let mut control = control;
        control.set_square_wave_frequency(SquareWaveFrequency::Hz1);
        dev.set_control(control).unwrap();

        let status = dev.status().unwrap();
        assert!(status.oscillator_stop_flag());
        assert!(status.enable_32khz_output());

        assert_eq!(dev.aging_offset().unwrap().aging_offset(), -2);
        dev.set_aging_offset(AgingOffset::from(0x05)).unwrap();
        finish(dev);
    }

    #[test]
    fn test_configure() {
        let config = Config {
            square_wave_frequency: SquareWaveFrequency::Hz1,
            interrupt_control: InterruptControl::SquareWave,
            enable_32khz_output: false,
        };
        let mut dev = setup(&[
            I2cTrans::write_read(ADDR, vec![0x0E], vec![0x1C]),
            I2cTrans::write(ADDR, vec![0x0E, 0x00]),
            I2cTrans::write_read(ADDR, vec![0x0F], vec![0x88]),
            I2cTrans::write(ADDR, vec![0x0F, 0x80]),
        ]);
        dev.configure(&config).unwrap();
        finish(dev);
    }

    #[test]
    fn test_configure_defaults() {
        let mut dev = setup(&[
            I2cTrans::write_read(ADDR, vec![0x0E], vec![0x00]),
            I2cTrans::write(ADDR, vec![0x0E, 0x1C]),
            I2cTrans::write_read(ADDR, vec![0x0F], vec![0x00]),
            I2cTrans::write(ADDR, vec![0x0F, 0x08]),
        ]);
        dev.configure(&Config::default()).unwrap();
        finish(dev);
    }
}
