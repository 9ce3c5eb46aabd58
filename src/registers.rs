//! Register map, bit constants and typed register views for the DS3231.
//!
//! The plain constants are what the driver operations mask and merge with.
//! The bitfield wrappers give a typed view of a whole register byte for
//! callers that want to inspect or build one directly.

use bitfield::bitfield;

/// Fixed I2C address of the DS3231.
pub const DEVICE_ADDRESS: u8 = 0x68;

/// Register addresses for the DS3231 RTC.
#[allow(unused)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegAddr {
    /// Start of the 7 byte time block (seconds .. year)
    Time = 0x00,
    /// Start of the 4 byte alarm 1 block
    Alarm1 = 0x07,
    /// Start of the 3 byte alarm 2 block
    Alarm2 = 0x0B,
    /// Control register
    Control = 0x0E,
    /// Control/Status register
    Status = 0x0F,
    /// Aging offset register
    AgingOffset = 0x10,
    /// Temperature MSB, followed by the LSB at 0x12
    Temperature = 0x11,
}

/// Oscillator stop flag (OSF).
pub const STATUS_OSCILLATOR_STOPPED: u8 = 0x80;
/// Enable 32kHz output (EN32kHz).
pub const STATUS_32KHZ: u8 = 0x08;
/// Temperature conversion in progress (BSY).
pub const STATUS_BUSY: u8 = 0x04;
/// Alarm 2 has matched (A2F).
pub const STATUS_ALARM_2: u8 = 0x02;
/// Alarm 1 has matched (A1F).
pub const STATUS_ALARM_1: u8 = 0x01;

/// Enable oscillator (EOSC, active low: set stops the oscillator on battery).
pub const CONTROL_OSCILLATOR: u8 = 0x80;
/// Battery-backed square wave enable (BBSQW).
pub const CONTROL_BATTERY_SQUARE_WAVE: u8 = 0x40;
/// Force a temperature conversion (CONV).
pub const CONTROL_CONVERT_TEMPERATURE: u8 = 0x20;
/// Square wave rate select field (RS2:RS1).
pub const CONTROL_RATE_SELECT: u8 = 0x18;
/// Interrupt control (INTCN). Set routes alarms to INT/SQW, clear outputs the square wave.
pub const CONTROL_ALARM_INTERRUPTS: u8 = 0x04;
/// Alarm 2 interrupt enable (A2IE).
pub const CONTROL_ALARM_2_INTERRUPT: u8 = 0x02;
/// Alarm 1 interrupt enable (A1IE).
pub const CONTROL_ALARM_1_INTERRUPT: u8 = 0x01;

/// DY/DT bit in the alarm day/date byte: set matches day of week.
pub const ALARM_WEEKDAY: u8 = 0x40;
/// Alarm mask bit: the field takes no part in the match.
pub const ALARM_NOT_SET: u8 = 0x80;

/// 12/24 hour select bit in the hours byte.
pub const HOUR_12_FLAG: u8 = 0x40;
/// Hour digits in 12 hour mode.
pub const HOUR_12_MASK: u8 = 0x1F;
/// PM bit in 12 hour mode.
pub const HOUR_PM_FLAG: u8 = 0x20;
/// Month digits, drops the century bit.
pub const MONTH_MASK: u8 = 0x1F;

/// Time representation format for the DS3231.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeRepresentation {
    /// 24-hour format (0-23)
    TwentyFourHour = 0,
    /// 12-hour format (1-12 + AM/PM)
    TwelveHour = 1,
}
impl From<u8> for TimeRepresentation {
    fn from(v: u8) -> Self {
        if v & 0x01 == 0 {
            TimeRepresentation::TwentyFourHour
        } else {
            TimeRepresentation::TwelveHour
        }
    }
}
impl From<TimeRepresentation> for u8 {
    fn from(v: TimeRepresentation) -> Self {
        v as u8
    }
}

/// What the shared INT/SQW pin is used for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptControl {
    /// Output the square wave
    SquareWave = 0,
    /// Output alarm interrupts
    Interrupt = 1,
}
impl From<u8> for InterruptControl {
    fn from(v: u8) -> Self {
        if v & 0x01 == 0 {
            InterruptControl::SquareWave
        } else {
            InterruptControl::Interrupt
        }
    }
}
impl From<InterruptControl> for u8 {
    fn from(v: InterruptControl) -> Self {
        v as u8
    }
}

/// Square wave output frequency.
///
/// The discriminants are the rate select bits as they sit in the control byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SquareWaveFrequency {
    /// 1 Hz
    Hz1 = 0x00,
    /// 1.024 kHz
    Hz1024 = 0x08,
    /// 4.096 kHz
    Hz4096 = 0x10,
    /// 8.192 kHz
    Hz8192 = 0x18,
}

impl SquareWaveFrequency {
    /// Control register bits for this frequency.
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Extracts the frequency from a full control register byte.
    pub fn from_control(control: u8) -> Self {
        match control & CONTROL_RATE_SELECT {
            0x00 => SquareWaveFrequency::Hz1,
            0x08 => SquareWaveFrequency::Hz1024,
            0x10 => SquareWaveFrequency::Hz4096,
            _ => SquareWaveFrequency::Hz8192,
        }
    }
}

// This macro generates the From<u8> and Into<u8> implementations for the
// register type
macro_rules! from_register_u8 {
    ($typ:ty) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                paste::item!([< $typ >](v))
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}

bitfield! {
    /// Hours byte of the time block.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Hours(u8);
    impl Debug;
    /// 12/24 hour select
    pub from into TimeRepresentation, time_representation, set_time_representation: 6, 6;
    /// PM flag in 12 hour mode, 20 hour digit in 24 hour mode
    pub pm_or_twenty_hours, set_pm_or_twenty_hours: 5;
}
from_register_u8!(Hours);

bitfield! {
    /// Control register.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Control(u8);
    impl Debug;
    /// EOSC, set stops the oscillator while on battery
    pub oscillator_disabled, set_oscillator_disabled: 7;
    /// BBSQW
    pub battery_backed_square_wave, set_battery_backed_square_wave: 6;
    /// CONV
    pub convert_temperature, set_convert_temperature: 5;
    /// RS2:RS1
    pub rate_select, set_rate_select: 4, 3;
    /// INTCN
    pub from into InterruptControl, interrupt_control, set_interrupt_control: 2, 2;
    /// A2IE
    pub alarm2_interrupt_enable, set_alarm2_interrupt_enable: 1;
    /// A1IE
    pub alarm1_interrupt_enable, set_alarm1_interrupt_enable: 0;
}
from_register_u8!(Control);

impl Control {
    /// Square wave frequency selected by the rate select bits.
    pub fn square_wave_frequency(&self) -> SquareWaveFrequency {
        SquareWaveFrequency::from_control(self.0)
    }

    /// Replaces the rate select bits, leaving everything else alone.
    pub fn set_square_wave_frequency(&mut self, frequency: SquareWaveFrequency) {
        self.0 = (self.0 & !CONTROL_RATE_SELECT) | frequency.bits();
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Control {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Control({=u8:#x}, {}, {})",
            self.0,
            self.square_wave_frequency(),
            self.interrupt_control()
        );
    }
}

bitfield! {
    /// Status register.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Status(u8);
    impl Debug;
    /// OSF
    pub oscillator_stop_flag, set_oscillator_stop_flag: 7;
    /// EN32kHz
    pub enable_32khz_output, set_enable_32khz_output: 3;
    /// BSY
    pub busy, set_busy: 2;
    /// A2F
    pub alarm2_flag, set_alarm2_flag: 1;
    /// A1F
    pub alarm1_flag, set_alarm1_flag: 0;
}
from_register_u8!(Status);

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Status({=u8:#x})", self.0);
    }
}

bitfield! {
    /// Aging offset register for oscillator adjustment.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct AgingOffset(u8);
    impl Debug;
    /// Aging offset value (-128 to +127)
    pub i8, aging_offset, set_aging_offset: 7, 0;
}
from_register_u8!(AgingOffset);

#[cfg(feature = "defmt")]
impl defmt::Format for AgingOffset {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "AgingOffset({})", self.aging_offset());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hours_view() {
        let hours = Hours::from(0x65);
        assert_eq!(hours.time_representation(), TimeRepresentation::TwelveHour);
        assert!(hours.pm_or_twenty_hours());

        let hours = Hours::from(0x12);
        assert_eq!(
            hours.time_representation(),
            TimeRepresentation::TwentyFourHour
        );
        assert!(!hours.pm_or_twenty_hours());
    }

    #[test]
    fn test_control_register_conversions() {
        let control = Control::from(0xFF);
        assert!(control.oscillator_disabled());
        assert!(control.battery_backed_square_wave());
        assert!(control.convert_temperature());
        assert_eq!(control.rate_select(), 0b11);
        assert_eq!(control.square_wave_frequency(), SquareWaveFrequency::Hz8192);
        assert_eq!(control.interrupt_control(), InterruptControl::Interrupt);
        assert!(control.alarm2_interrupt_enable());
        assert!(control.alarm1_interrupt_enable());
        assert_eq!(u8::from(control), 0xFF);

        // Power-on default: INTCN set, RS at 8.192 kHz
        let control = Control::from(0x1C);
        assert!(!control.oscillator_disabled());
        assert_eq!(control.square_wave_frequency(), SquareWaveFrequency::Hz8192);
        assert_eq!(control.interrupt_control(), InterruptControl::Interrupt);
        assert!(!control.alarm1_interrupt_enable());
    }

    #[test]
    fn test_control_set_square_wave_frequency() {
        let mut control = Control::from(0x1C);
        control.set_square_wave_frequency(SquareWaveFrequency::Hz1024);
        assert_eq!(u8::from(control), 0x0C);
        control.set_square_wave_frequency(SquareWaveFrequency::Hz1);
        assert_eq!(u8::from(control), 0x04);
    }

    #[test]
    fn test_status_register_conversions() {
        let status = Status::from(0x8F);
        assert!(status.oscillator_stop_flag());
        assert!(status.enable_32khz_output());
        assert!(status.busy());
        assert!(status.alarm2_flag());
        assert!(status.alarm1_flag());

        let status = Status::from(0x00);
        assert!(!status.oscillator_stop_flag());
        assert!(!status.enable_32khz_output());
        assert!(!status.busy());
        assert!(!status.alarm2_flag());
        assert!(!status.alarm1_flag());
    }

    #[test]
    fn test_bit_constants_match_views() {
        let mut status = Status::default();
        status.set_oscillator_stop_flag(true);
        assert_eq!(u8::from(status), STATUS_OSCILLATOR_STOPPED);

        let mut control = Control::default();
        control.set_interrupt_control(InterruptControl::Interrupt);
        assert_eq!(u8::from(control), CONTROL_ALARM_INTERRUPTS);
        control.set_convert_temperature(true);
        assert_eq!(
            u8::from(control),
            CONTROL_ALARM_INTERRUPTS | CONTROL_CONVERT_TEMPERATURE
        );
    }

    #[test]
    fn test_aging_offset_signed() {
        assert_eq!(AgingOffset::from(0xFF).aging_offset(), -1);
        assert_eq!(AgingOffset::from(0x7F).aging_offset(), 127);
        let mut offset = AgingOffset::default();
        offset.set_aging_offset(-128);
        assert_eq!(u8::from(offset), 0x80);
    }
}
