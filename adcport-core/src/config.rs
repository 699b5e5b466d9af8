//! Caller-facing option types
//!
//! Settings arrive from the caller by name. Parsing a name yields an
//! `Option`: `None` means the caller asked for something outside the valid
//! set, and is reported as an error during validation. No reserved
//! sentinel value ever stands in for "invalid".

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use adcport_hal::{Attenuation, BitWidth, ChannelConfig};

use crate::error::AdcError;

/// Samples averaged per reading when the caller does not say
pub const DEFAULT_SAMPLES: i64 = 64;

/// Most samples a single reading may take
///
/// A reading holds the resource lock for every conversion, so the count is
/// bounded to keep that window short.
pub const MAX_SAMPLES: u32 = 1024;

/// Bit width used when the caller does not say
pub const DEFAULT_WIDTH: BitWidth = BitWidth::Default;

/// Attenuation used when the caller does not say
///
/// 12 dB covers the full input range.
pub const DEFAULT_ATTENUATION: Attenuation = Attenuation::Db12;

/// Parse a bit width name (`bit_default`, `bit_9` .. `bit_13`)
pub fn parse_width(name: &str) -> Option<BitWidth> {
    match name {
        // Older callers spell the default this way
        "bit_default" | "bit_defult" => Some(BitWidth::Default),
        "bit_9" => Some(BitWidth::Bits9),
        "bit_10" => Some(BitWidth::Bits10),
        "bit_11" => Some(BitWidth::Bits11),
        "bit_12" => Some(BitWidth::Bits12),
        "bit_13" => Some(BitWidth::Bits13),
        _ => None,
    }
}

/// Get the name of a bit width
pub fn width_name(width: BitWidth) -> &'static str {
    match width {
        BitWidth::Default => "bit_default",
        BitWidth::Bits9 => "bit_9",
        BitWidth::Bits10 => "bit_10",
        BitWidth::Bits11 => "bit_11",
        BitWidth::Bits12 => "bit_12",
        BitWidth::Bits13 => "bit_13",
    }
}

/// Parse an attenuation name (`db_0`, `db_2_5`, `db_6`, `db_12`)
pub fn parse_attenuation(name: &str) -> Option<Attenuation> {
    match name {
        "db_0" => Some(Attenuation::Db0),
        "db_2_5" => Some(Attenuation::Db2_5),
        "db_6" => Some(Attenuation::Db6),
        "db_12" => Some(Attenuation::Db12),
        _ => None,
    }
}

/// Get the name of an attenuation
pub fn attenuation_name(attenuation: Attenuation) -> &'static str {
    match attenuation {
        Attenuation::Db0 => "db_0",
        Attenuation::Db2_5 => "db_2_5",
        Attenuation::Db6 => "db_6",
        Attenuation::Db12 => "db_12",
    }
}

/// Requested channel programming, before validation
///
/// A `None` field holds a value the caller supplied that is not a
/// recognized setting. Defaults are applied before this point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelRequest {
    /// Conversion resolution
    pub width: Option<BitWidth>,
    /// Input attenuation
    pub attenuation: Option<Attenuation>,
}

impl Default for ChannelRequest {
    fn default() -> Self {
        Self {
            width: Some(DEFAULT_WIDTH),
            attenuation: Some(DEFAULT_ATTENUATION),
        }
    }
}

impl From<ChannelConfig> for ChannelRequest {
    fn from(config: ChannelConfig) -> Self {
        Self {
            width: Some(config.width),
            attenuation: Some(config.attenuation),
        }
    }
}

impl ChannelRequest {
    /// Build a request from setting names
    pub fn from_names(width: &str, attenuation: &str) -> Self {
        Self {
            width: parse_width(width),
            attenuation: parse_attenuation(attenuation),
        }
    }
}

/// Requested calibration, before validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibrationRequest {
    /// Attenuation the calibration curve is built for
    pub attenuation: Option<Attenuation>,
}

impl Default for CalibrationRequest {
    fn default() -> Self {
        Self {
            attenuation: Some(DEFAULT_ATTENUATION),
        }
    }
}

impl From<Attenuation> for CalibrationRequest {
    fn from(attenuation: Attenuation) -> Self {
        Self {
            attenuation: Some(attenuation),
        }
    }
}

/// Options for a sampled reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReadOptions {
    /// Number of raw conversions to average
    pub samples: i64,
    /// Report the averaged raw code
    pub raw: bool,
    /// Report the calibrated voltage of the average
    pub voltage: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            raw: false,
            voltage: false,
        }
    }
}

impl ReadOptions {
    /// Create options with a sample count and both outputs off
    pub const fn new(samples: i64) -> Self {
        Self {
            samples,
            raw: false,
            voltage: false,
        }
    }

    /// Request the raw average
    pub const fn with_raw(mut self) -> Self {
        self.raw = true;
        self
    }

    /// Request the calibrated voltage
    pub const fn with_voltage(mut self) -> Self {
        self.voltage = true;
        self
    }

    /// Get the validated sample count
    ///
    /// Counts outside `1..=MAX_SAMPLES` are rejected.
    pub fn sample_count(&self) -> Result<u32, AdcError> {
        match u32::try_from(self.samples) {
            Ok(n) if (1..=MAX_SAMPLES).contains(&n) => Ok(n),
            _ => {
                log::debug!("sample count {} out of range 1..={}", self.samples, MAX_SAMPLES);
                Err(AdcError::BadArgument)
            }
        }
    }
}

/// Result of a sampled reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reading {
    /// Averaged raw code, if requested
    pub raw: Option<u16>,
    /// Calibrated millivolts of the average, if requested and calibrated
    pub voltage_mv: Option<u32>,
}
