//! Bit update modes for the read-modify-write register primitive.

/// How [`set_flag`](crate::DS3231::set_flag) merges bits into a register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlagMode {
    /// OR the bits in
    Set,
    /// AND the bits out
    Clear,
    /// Write the bits verbatim
    Replace,
}

impl FlagMode {
    /// Applies the mode to the current register value.
    pub fn apply(self, current: u8, bits: u8) -> u8 {
        match self {
            FlagMode::Set => current | bits,
            FlagMode::Clear => current & !bits,
            FlagMode::Replace => bits,
        }
    }
}
