//! Entry point names
//!
//! The host registers native functions by `module:function/arity` name and
//! asks the driver to resolve each one when the module is loaded.

/// One native entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EntryPoint {
    /// Open a unit
    Init,
    /// Close a resource
    Close,
    /// Program width and attenuation for a pin
    ConfigChannel,
    /// Create a calibration for a pin
    ConfigCalibration,
    /// Release a pin's calibration
    ReleaseCalibration,
    /// Take an averaged reading
    TakeReading,
}

impl EntryPoint {
    /// Every entry point, in registration order
    pub const ALL: [EntryPoint; 6] = [
        EntryPoint::Init,
        EntryPoint::Close,
        EntryPoint::ConfigChannel,
        EntryPoint::ConfigCalibration,
        EntryPoint::ReleaseCalibration,
        EntryPoint::TakeReading,
    ];

    /// Get the registered name
    pub const fn name(self) -> &'static str {
        match self {
            EntryPoint::Init => "adc:nif_init/1",
            EntryPoint::Close => "adc:nif_close/1",
            EntryPoint::ConfigChannel => "adc:nif_config_channel_bitwidth_atten/3",
            EntryPoint::ConfigCalibration => "adc:nif_config_channel_calibration/3",
            EntryPoint::ReleaseCalibration => "adc:nif_release_calibration/2",
            EntryPoint::TakeReading => "adc:nif_take_reading/3",
        }
    }

    /// Get the number of arguments
    pub const fn arity(self) -> usize {
        match self {
            EntryPoint::Init | EntryPoint::Close => 1,
            EntryPoint::ReleaseCalibration => 2,
            EntryPoint::ConfigChannel | EntryPoint::ConfigCalibration | EntryPoint::TakeReading => 3,
        }
    }

    /// Resolve a registered name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|entry| entry.name() == name)
    }
}
