//! Pin to ADC unit/channel lookup
//!
//! Each chip family routes a different set of GPIOs to its ADC units:
//!
//! | Chip            | ADC1 pins        | ADC2 pins (with `adc2`)             |
//! |-----------------|------------------|-------------------------------------|
//! | ESP32           | 32-39            | 0, 2, 4, 12-15, 25-27               |
//! | ESP32-S2 / -S3  | 1-10             | 11-20                               |
//! | ESP32-C3        | 0-4              | 5                                   |
//!
//! The tables are immutable and selected once for the target. Pins that are
//! not in the active table resolve to `None`.

use adcport_hal::{ChannelId, UnitId};

use ChannelId::*;

/// Chip family whose pin routing is in effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipVariant {
    Esp32,
    Esp32S2,
    Esp32S3,
    Esp32C3,
}

impl ChipVariant {
    /// Variant selected by cargo features
    #[cfg(feature = "esp32c3")]
    pub const ACTIVE: ChipVariant = ChipVariant::Esp32C3;
    /// Variant selected by cargo features
    #[cfg(all(feature = "esp32s3", not(feature = "esp32c3")))]
    pub const ACTIVE: ChipVariant = ChipVariant::Esp32S3;
    /// Variant selected by cargo features
    #[cfg(all(
        feature = "esp32s2",
        not(any(feature = "esp32s3", feature = "esp32c3"))
    ))]
    pub const ACTIVE: ChipVariant = ChipVariant::Esp32S2;
    /// Variant selected by cargo features
    #[cfg(not(any(feature = "esp32s2", feature = "esp32s3", feature = "esp32c3")))]
    pub const ACTIVE: ChipVariant = ChipVariant::Esp32;

    /// Get the pin table for this chip
    pub fn table(self) -> &'static PinChannelTable {
        match self {
            ChipVariant::Esp32 => &ESP32_TABLE,
            // S2 and S3 share the same routing
            ChipVariant::Esp32S2 | ChipVariant::Esp32S3 => &ESP32S_TABLE,
            ChipVariant::Esp32C3 => &ESP32C3_TABLE,
        }
    }
}

/// One routed pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinEntry {
    /// GPIO number
    pub pin: u8,
    /// Channel the pin is multiplexed to
    pub channel: ChannelId,
}

const fn entry(pin: u8, channel: ChannelId) -> PinEntry {
    PinEntry { pin, channel }
}

/// Pin routing for one chip family
#[derive(Debug)]
pub struct PinChannelTable {
    /// Pins routed to ADC1
    pub unit1: &'static [PinEntry],
    /// Pins routed to ADC2
    pub unit2: &'static [PinEntry],
}

impl PinChannelTable {
    /// Get the pins routed to a unit
    pub const fn pins(&self, unit: UnitId) -> &'static [PinEntry] {
        match unit {
            UnitId::Unit1 => self.unit1,
            UnitId::Unit2 => self.unit2,
        }
    }
}

static ESP32_TABLE: PinChannelTable = PinChannelTable {
    unit1: &[
        entry(32, Channel4),
        entry(33, Channel5),
        entry(34, Channel6),
        entry(35, Channel7),
        entry(36, Channel0),
        entry(37, Channel1),
        entry(38, Channel2),
        entry(39, Channel3),
    ],
    unit2: &[
        entry(0, Channel1),
        entry(2, Channel2),
        entry(4, Channel0),
        entry(12, Channel5),
        entry(13, Channel4),
        entry(14, Channel6),
        entry(15, Channel3),
        entry(25, Channel8),
        entry(26, Channel9),
        entry(27, Channel7),
    ],
};

static ESP32S_TABLE: PinChannelTable = PinChannelTable {
    unit1: &[
        entry(1, Channel0),
        entry(2, Channel1),
        entry(3, Channel2),
        entry(4, Channel3),
        entry(5, Channel4),
        entry(6, Channel5),
        entry(7, Channel6),
        entry(8, Channel7),
        entry(9, Channel8),
        entry(10, Channel9),
    ],
    unit2: &[
        entry(11, Channel0),
        entry(12, Channel1),
        entry(13, Channel2),
        entry(14, Channel3),
        entry(15, Channel4),
        entry(16, Channel5),
        entry(17, Channel6),
        entry(18, Channel7),
        entry(19, Channel8),
        entry(20, Channel9),
    ],
};

static ESP32C3_TABLE: PinChannelTable = PinChannelTable {
    unit1: &[
        entry(0, Channel0),
        entry(1, Channel1),
        entry(2, Channel2),
        entry(3, Channel3),
        entry(4, Channel4),
    ],
    unit2: &[entry(5, Channel0)],
};

/// Stateless pin resolver for one chip and unit-2 capability
#[derive(Debug, Clone, Copy)]
pub struct PinMapper {
    variant: ChipVariant,
    unit2: bool,
}

impl Default for PinMapper {
    fn default() -> Self {
        Self::active()
    }
}

impl PinMapper {
    /// Create a mapper for a chip, with or without ADC2 pins
    pub const fn new(variant: ChipVariant, unit2: bool) -> Self {
        Self { variant, unit2 }
    }

    /// Mapper for the compiled target
    pub const fn active() -> Self {
        Self::new(ChipVariant::ACTIVE, cfg!(feature = "adc2"))
    }

    /// Highest unit number a caller may select
    pub const fn unit_count(&self) -> u8 {
        if self.unit2 {
            2
        } else {
            1
        }
    }

    /// Convert a caller's 1-based unit selector to a unit
    pub fn unit_from_selector(&self, selector: i64) -> Option<UnitId> {
        let number = u8::try_from(selector).ok()?;
        if number > self.unit_count() {
            return None;
        }
        UnitId::from_number(number)
    }

    /// Resolve a pin to its unit and channel
    pub fn resolve(&self, pin: i32) -> Option<(UnitId, ChannelId)> {
        let pin = u8::try_from(pin).ok()?;
        let table = self.variant.table();

        let lookup = |entries: &[PinEntry]| {
            entries
                .iter()
                .find(|e| e.pin == pin)
                .map(|e| e.channel)
        };

        if let Some(channel) = lookup(table.unit1) {
            return Some((UnitId::Unit1, channel));
        }
        if self.unit2 {
            if let Some(channel) = lookup(table.unit2) {
                return Some((UnitId::Unit2, channel));
            }
        }
        None
    }

    /// Resolve a pin to its unit
    pub fn resolve_unit(&self, pin: i32) -> Option<UnitId> {
        self.resolve(pin).map(|(unit, _)| unit)
    }

    /// Resolve a pin to its channel
    pub fn resolve_channel(&self, pin: i32) -> Option<ChannelId> {
        self.resolve(pin).map(|(_, channel)| channel)
    }

    /// Iterate the pins usable on a unit
    pub fn pins(&self, unit: UnitId) -> impl Iterator<Item = &'static PinEntry> {
        let entries = match unit {
            UnitId::Unit2 if !self.unit2 => &[][..],
            _ => self.variant.table().pins(unit),
        };
        entries.iter()
    }
}
