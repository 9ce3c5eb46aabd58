//! Async implementation of the DS3231 driver.
//!
//! This module provides an async interface to the DS3231 RTC device using
//! `embedded-hal-async` traits. It is only available when the `async` feature
//! is enabled. The register encoding is shared with the blocking driver; only
//! the bus calls are awaited.
//!
//! # Example
//!
//! ```rust,ignore
//! use ds3231_regs::asynch::DS3231;
//!
//! let mut rtc = DS3231::new(i2c);
//! let time = rtc.time().await?;
//! let celsius = rtc.temperature_f32().await?;
//! ```

use chrono::NaiveDateTime;
use embedded_hal_async::i2c::I2c;
use paste::paste;

use crate::registers::{
    CONTROL_ALARM_INTERRUPTS, CONTROL_CONVERT_TEMPERATURE, CONTROL_RATE_SELECT, STATUS_32KHZ,
    STATUS_ALARM_1, STATUS_ALARM_2, STATUS_BUSY, STATUS_OSCILLATOR_STOPPED,
};
use crate::{
    decode_time, encode_time, temperature, AgingOffset, Alarm, Alarm1Rate, Alarm2Rate,
    AlarmWrite, CivilTime, Config, Control, DS3231Error, FlagMode, RegAddr, SquareWaveFrequency,
    Status, DEVICE_ADDRESS, MAX_WRITE,
};

/// DS3231 Real-Time Clock async driver.
///
/// Same operations as [`crate::DS3231`], over an `embedded-hal-async` bus.
pub struct DS3231<I2C: I2c> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> DS3231<I2C> {
    /// Creates a driver for the DS3231 at its fixed address (0x68).
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

    async fn write_registers(
        &mut self,
        reg: RegAddr,
        data: &[u8],
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let len = data.len().min(MAX_WRITE);
        let mut buf = [0u8; MAX_WRITE + 1];
        buf[0] = reg as u8;
        buf[1..=len].copy_from_slice(&data[..len]);
        trace!("write reg={:#x} len={}", reg as u8, len);
        self.i2c.write(self.address, &buf[..=len]).await?;
        Ok(())
    }

    async fn read_registers(
        &mut self,
        reg: RegAddr,
        data: &mut [u8],
    ) -> Result<(), DS3231Error<I2C::Error>> {
        trace!("read reg={:#x} len={}", reg as u8, data.len());
        self.i2c
            .write_read(self.address, &[reg as u8], data)
            .await?;
        Ok(())
    }

    /// Reads a register and applies `f`, writing the result back.
    ///
    /// Returns the value written. If the read fails nothing is written.
    pub async fn modify_register<F>(
        &mut self,
        reg: RegAddr,
        f: F,
    ) -> Result<u8, DS3231Error<I2C::Error>>
    where
        F: FnOnce(u8) -> u8,
    {
        let mut data = [0];
        self.read_registers(reg, &mut data).await?;
        let value = f(data[0]);
        debug!("modify reg={:#x}: {:#x} -> {:#x}", reg as u8, data[0], value);
        self.write_registers(reg, &[value]).await?;
        Ok(value)
    }

    /// Reads a register and returns only the bits in `mask`.
    pub async fn get_flag(
        &mut self,
        reg: RegAddr,
        mask: u8,
    ) -> Result<u8, DS3231Error<I2C::Error>> {
        let mut data = [0];
        self.read_registers(reg, &mut data).await?;
        Ok(data[0] & mask)
    }

    /// Sets, clears or replaces bits in a register (read-modify-write).
    pub async fn set_flag(
        &mut self,
        reg: RegAddr,
        bits: u8,
        mode: FlagMode,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.modify_register(reg, |current| mode.apply(current, bits))
            .await?;
        Ok(())
    }

    /// Sets the time. The hour is written in 24 hour format.
    pub async fn set_time(&mut self, time: &CivilTime) -> Result<(), DS3231Error<I2C::Error>> {
        time.validate().map_err(DS3231Error::DateTime)?;
        let data = encode_time(time);
        self.write_registers(RegAddr::Time, &data).await
    }

    /// Reads the time.
    pub async fn time(&mut self) -> Result<CivilTime, DS3231Error<I2C::Error>> {
        let mut data = [0; 7];
        self.read_registers(RegAddr::Time, &mut data).await?;
        Ok(decode_time(&data))
    }

    /// Sets the time from a chrono date and time.
    pub async fn set_datetime(
        &mut self,
        datetime: &NaiveDateTime,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let time = CivilTime::from_datetime(datetime).map_err(DS3231Error::DateTime)?;
        self.set_time(&time).await
    }

    /// Reads the time as a chrono date and time.
    pub async fn datetime(&mut self) -> Result<NaiveDateTime, DS3231Error<I2C::Error>> {
        self.time()
            .await?
            .to_datetime()
            .map_err(DS3231Error::DateTime)
    }

    /// Programs one or both alarms. See [`crate::DS3231::set_alarm`].
    pub async fn set_alarm(
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
                self.write_registers(write.start(), write.data()).await
            }
            None => Ok(()),
        }
    }

    /// Whether the oscillator has stopped since the flag was last cleared.
    pub async fn oscillator_stop_flag(&mut self) -> Result<bool, DS3231Error<I2C::Error>> {
        Ok(self
            .get_flag(RegAddr::Status, STATUS_OSCILLATOR_STOPPED)
            .await?
            != 0)
    }

    /// Clears the oscillator stop flag.
    pub async fn clear_oscillator_stop_flag(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_flag(RegAddr::Status, STATUS_OSCILLATOR_STOPPED, FlagMode::Clear)
            .await
    }

    /// Which alarms have matched since their flags were last cleared.
    pub async fn alarm_flags(&mut self) -> Result<Alarm, DS3231Error<I2C::Error>> {
        let flags = self
            .get_flag(RegAddr::Status, STATUS_ALARM_1 | STATUS_ALARM_2)
            .await?;
        Ok(Alarm::from_bits(flags))
    }

    /// Clears the matched flag of the selected alarms.
    pub async fn clear_alarm_flags(&mut self, alarms: Alarm) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_flag(RegAddr::Status, alarms.bits(), FlagMode::Clear)
            .await
    }

    /// Enables interrupts for the selected alarms and switches INT/SQW to
    /// interrupt output.
    pub async fn enable_alarm_interrupts(
        &mut self,
        alarms: Alarm,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_flag(
            RegAddr::Control,
            CONTROL_ALARM_INTERRUPTS | alarms.bits(),
            FlagMode::Set,
        )
        .await
    }

    /// Disables interrupts for the selected alarms. INT/SQW stays in
    /// interrupt mode.
    pub async fn disable_alarm_interrupts(
        &mut self,
        alarms: Alarm,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_flag(RegAddr::Control, alarms.bits(), FlagMode::Clear)
            .await
    }

    /// Outputs the square wave on INT/SQW, which disables alarm interrupts.
    pub async fn enable_square_wave(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_flag(RegAddr::Control, CONTROL_ALARM_INTERRUPTS, FlagMode::Clear)
            .await
    }

    /// Returns INT/SQW to interrupt output.
    pub async fn disable_square_wave(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_flag(RegAddr::Control, CONTROL_ALARM_INTERRUPTS, FlagMode::Set)
            .await
    }

    /// Selects the square wave frequency. Does not enable the output.
    pub async fn set_square_wave_frequency(
        &mut self,
        frequency: SquareWaveFrequency,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.modify_register(RegAddr::Control, |control| {
            FlagMode::Replace.apply(control, (control & !CONTROL_RATE_SELECT) | frequency.bits())
        })
        .await?;
        Ok(())
    }

    /// Enables the 32kHz output.
    pub async fn enable_32khz_output(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_flag(RegAddr::Status, STATUS_32KHZ, FlagMode::Set)
            .await
    }

    /// Disables the 32kHz output.
    pub async fn disable_32khz_output(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_flag(RegAddr::Status, STATUS_32KHZ, FlagMode::Clear)
            .await
    }

    /// Raw temperature in units of 0.25 °C.
    pub async fn raw_temperature(&mut self) -> Result<i16, DS3231Error<I2C::Error>> {
        let mut data = [0; 2];
        self.read_registers(RegAddr::Temperature, &mut data).await?;
        Ok(temperature::decode_raw(data))
    }

    /// Temperature in whole degrees Celsius.
    pub async fn temperature(&mut self) -> Result<i8, DS3231Error<I2C::Error>> {
        Ok(temperature::to_celsius(self.raw_temperature().await?))
    }

    /// Temperature in degrees Celsius, 0.25 °C resolution.
    pub async fn temperature_f32(&mut self) -> Result<f32, DS3231Error<I2C::Error>> {
        Ok(temperature::to_celsius_f32(self.raw_temperature().await?))
    }

    /// Starts a temperature conversion. Poll [`DS3231::busy`] for completion.
    pub async fn convert_temperature(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_flag(RegAddr::Control, CONTROL_CONVERT_TEMPERATURE, FlagMode::Set)
            .await
    }

    /// Whether a temperature conversion is in progress.
    pub async fn busy(&mut self) -> Result<bool, DS3231Error<I2C::Error>> {
        Ok(self.get_flag(RegAddr::Status, STATUS_BUSY).await? != 0)
    }

    /// Applies output settings.
    pub async fn configure(&mut self, config: &Config) -> Result<(), DS3231Error<I2C::Error>> {
        debug!("configure: {:?}", config);
        self.modify_register(RegAddr::Control, |value| {
            let mut control = Control::from(value);
            control.set_square_wave_frequency(config.square_wave_frequency);
            control.set_interrupt_control(config.interrupt_control);
            control.into()
        })
        .await?;
        self.modify_register(RegAddr::Status, |value| {
            let mut status = Status::from(value);
            status.set_enable_32khz_output(config.enable_32khz_output);
            status.into()
        })
        .await?;
        Ok(())
    }
}

// Register access implementations
macro_rules! impl_register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        impl<I2C: I2c> DS3231<I2C> {
            $(
                paste! {
                    #[doc = concat!("Reads the ", stringify!($name), " register.")]
                    pub async fn $name(&mut self) -> Result<$typ, DS3231Error<I2C::Error>> {
                        let mut data = [0];
                        self.read_registers($regaddr, &mut data).await?;
                        Ok(<$typ>::from(data[0]))
                    }

                    #[doc = concat!("Writes the ", stringify!($name), " register.")]
                    pub async fn [<set_ $name>](&mut self, value: $typ) -> Result<(), DS3231Error<I2C::Error>> {
                        let raw: u8 = value.into();
                        self.write_registers($regaddr, &[raw]).await
                    }
                }
            )+
        }
    }
}

impl_register_access!(
    (control, RegAddr::Control, Control),
    (status, RegAddr::Status, Status),
    (aging_offset, RegAddr::AgingOffset, AgingOffset)
);
