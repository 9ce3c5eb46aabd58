//! Temperature register decoding.
//!
//! The sensor result is a signed 10-bit value split over two registers: the
//! MSB (0x11) holds the signed integer part and the top two bits of the LSB
//! (0x12) hold the fraction in quarter degrees.

/// Degrees Celsius per LSB of the raw value.
pub const DEGREES_PER_LSB: f32 = 0.25;

/// Combines the MSB/LSB pair into the raw value in units of 0.25 °C.
pub fn decode_raw(data: [u8; 2]) -> i16 {
    (i16::from(data[0] as i8) << 2) | i16::from(data[1] >> 6)
}

/// Whole degrees Celsius, rounded towards negative infinity.
pub fn to_celsius(raw: i16) -> i8 {
    // a 10-bit value shifted down by 2 always fits
    (raw >> 2) as i8
}

/// Degrees Celsius with the quarter degree fraction.
pub fn to_celsius_f32(raw: i16) -> f32 {
    f32::from(raw) * DEGREES_PER_LSB
}
