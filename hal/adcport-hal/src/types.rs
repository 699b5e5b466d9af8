//! Unit, channel and conversion setting types
//!
//! These are closed enumerations: a value of one of these types is always a
//! setting the hardware accepts. Parsing caller input into them is done in
//! `adcport-core`, which reports unrecognized values as errors instead of
//! forwarding a sentinel.

/// Physical ADC unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnitId {
    /// ADC1
    Unit1,
    /// ADC2 (shares the RF peripheral on most chips)
    Unit2,
}

impl UnitId {
    /// Get the 1-based unit number
    pub const fn number(self) -> u8 {
        match self {
            UnitId::Unit1 => 1,
            UnitId::Unit2 => 2,
        }
    }

    /// Create a unit from its 1-based number
    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(UnitId::Unit1),
            2 => Some(UnitId::Unit2),
            _ => None,
        }
    }
}

/// Analog input channel multiplexed into a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ChannelId {
    Channel0 = 0,
    Channel1 = 1,
    Channel2 = 2,
    Channel3 = 3,
    Channel4 = 4,
    Channel5 = 5,
    Channel6 = 6,
    Channel7 = 7,
    Channel8 = 8,
    Channel9 = 9,
}

impl ChannelId {
    /// Number of channels a unit can expose
    pub const COUNT: usize = 10;

    /// Get the channel index (0-9)
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Create a channel from its index
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(ChannelId::Channel0),
            1 => Some(ChannelId::Channel1),
            2 => Some(ChannelId::Channel2),
            3 => Some(ChannelId::Channel3),
            4 => Some(ChannelId::Channel4),
            5 => Some(ChannelId::Channel5),
            6 => Some(ChannelId::Channel6),
            7 => Some(ChannelId::Channel7),
            8 => Some(ChannelId::Channel8),
            9 => Some(ChannelId::Channel9),
            _ => None,
        }
    }
}

/// Conversion resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BitWidth {
    /// Highest resolution the chip supports
    #[default]
    Default,
    Bits9,
    Bits10,
    Bits11,
    Bits12,
    Bits13,
}

impl BitWidth {
    /// Get the resolution in bits, or `None` for the chip default
    pub const fn bits(self) -> Option<u8> {
        match self {
            BitWidth::Default => None,
            BitWidth::Bits9 => Some(9),
            BitWidth::Bits10 => Some(10),
            BitWidth::Bits11 => Some(11),
            BitWidth::Bits12 => Some(12),
            BitWidth::Bits13 => Some(13),
        }
    }
}

/// Input attenuation applied before conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Attenuation {
    /// 0 dB, narrowest input range
    Db0,
    /// 2.5 dB
    Db2_5,
    /// 6 dB
    Db6,
    /// 12 dB, full input range
    #[default]
    Db12,
}

/// Channel programming applied to an open unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelConfig {
    /// Conversion resolution
    pub width: BitWidth,
    /// Input attenuation
    pub attenuation: Attenuation,
}

impl ChannelConfig {
    /// Create a new channel configuration
    pub const fn new(width: BitWidth, attenuation: Attenuation) -> Self {
        Self { width, attenuation }
    }
}

/// Factory calibration scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CalibrationScheme {
    /// Curve fitting (higher precision, per channel)
    CurveFitting,
    /// Line fitting (per unit)
    LineFitting,
}

impl CalibrationScheme {
    /// Schemes in the order they should be attempted
    pub const PRIORITY: [CalibrationScheme; 2] =
        [CalibrationScheme::CurveFitting, CalibrationScheme::LineFitting];

    /// Human-readable scheme name
    pub const fn name(self) -> &'static str {
        match self {
            CalibrationScheme::CurveFitting => "Curve Fitting",
            CalibrationScheme::LineFitting => "Line Fitting",
        }
    }
}
