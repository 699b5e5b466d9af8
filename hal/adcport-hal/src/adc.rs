//! Oneshot ADC abstractions
//!
//! Provides traits for opening ADC units, programming and reading their
//! channels, and converting raw codes with factory calibration data.

use crate::error::HwError;
use crate::types::{Attenuation, CalibrationScheme, ChannelConfig, ChannelId, UnitId};

/// ADC peripheral that hands out unit handles
///
/// A unit can only be held by one owner at a time; opening a unit that is
/// already open is reported by the backend as an error.
pub trait AdcPeripheral {
    /// Handle type for one open unit
    type Unit: AdcUnit;

    /// Acquire a hardware unit
    fn open_unit(&mut self, unit: UnitId) -> Result<Self::Unit, HwError>;
}

/// One open oneshot ADC unit
///
/// The handle is not reentrant. Callers that share a unit between contexts
/// must serialize access themselves.
pub trait AdcUnit {
    /// Calibration handle type created by this unit
    type Calibration: Calibration;

    /// Get the unit this handle is bound to
    fn unit_id(&self) -> UnitId;

    /// Program resolution and attenuation for a channel
    fn config_channel(&mut self, channel: ChannelId, config: ChannelConfig) -> Result<(), HwError>;

    /// Take a single raw conversion from a channel
    ///
    /// Blocks for the hardware conversion time.
    fn read_raw(&mut self, channel: ChannelId) -> Result<u16, HwError>;

    /// Check if a calibration scheme is compiled in for this target
    fn supports_scheme(&self, scheme: CalibrationScheme) -> bool;

    /// Create a calibration handle using one scheme
    ///
    /// Returns an error when the scheme cannot initialise, for example when
    /// the chip was never factory calibrated.
    fn create_calibration(
        &mut self,
        scheme: CalibrationScheme,
        channel: ChannelId,
        attenuation: Attenuation,
    ) -> Result<Self::Calibration, HwError>;

    /// Release the hardware unit
    fn release(self) -> Result<(), HwError>;
}

/// Factory calibration handle
pub trait Calibration {
    /// Get the scheme this handle was created with
    fn scheme(&self) -> CalibrationScheme;

    /// Convert a raw conversion code to millivolts
    fn raw_to_millivolts(&self, raw: u16) -> Result<u32, HwError>;

    /// Release the calibration handle
    fn release(self) -> Result<(), HwError>;
}
