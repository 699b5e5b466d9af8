//! Driver error type
//!
//! Validation errors are detected from the caller's input before any
//! hardware access. Hardware errors carry the native code of the call that
//! failed. Allocation failure at the call boundary gets its own variant so
//! it is never confused with the hardware rejecting an operation.

use core::fmt;

use adcport_hal::HwError;

/// Errors returned by driver operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcError {
    /// Pin has no ADC channel, or belongs to a different unit
    InvalidPin,
    /// Bit width is not a recognized setting
    InvalidWidth,
    /// Attenuation is not a recognized setting
    InvalidDb,
    /// Unit selector out of range
    InvalidUnit,
    /// Resource is closed
    InvalidResource,
    /// Wrong argument shape or type, or a malformed handle
    BadArgument,
    /// Allocation failed at the call boundary
    OutOfMemory,
    /// Read failed without a more specific code
    ErrorRead,
    /// ADC2 lost arbitration for its shared peripheral
    Timeout,
    /// Underlying driver rejected the operation
    Hardware(HwError),
}

/// Error reason as reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reason {
    /// A named reason, such as `invalid_pin`
    Atom(&'static str),
    /// A wrapped native hardware code
    Hardware(i32),
}

impl AdcError {
    /// Get the reason reported to the caller
    pub fn reason(&self) -> Reason {
        match self {
            AdcError::InvalidPin => Reason::Atom("invalid_pin"),
            AdcError::InvalidWidth => Reason::Atom("invalid_width"),
            AdcError::InvalidDb => Reason::Atom("invalid_db"),
            AdcError::InvalidUnit => Reason::Atom("invalid_unit"),
            AdcError::InvalidResource => Reason::Atom("invalid_resource"),
            AdcError::BadArgument => Reason::Atom("bad_argument"),
            AdcError::OutOfMemory => Reason::Atom("out_of_memory"),
            AdcError::ErrorRead => Reason::Atom("error_read"),
            AdcError::Timeout => Reason::Atom("timeout"),
            AdcError::Hardware(e) => Reason::Hardware(e.code()),
        }
    }

    /// Check if the error was raised before touching hardware
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AdcError::InvalidPin
                | AdcError::InvalidWidth
                | AdcError::InvalidDb
                | AdcError::InvalidUnit
                | AdcError::InvalidResource
                | AdcError::BadArgument
        )
    }
}

impl From<HwError> for AdcError {
    fn from(error: HwError) -> Self {
        AdcError::Hardware(error)
    }
}

impl fmt::Display for AdcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdcError::Hardware(e) => write!(f, "hardware error: {}", e),
            other => match other.reason() {
                Reason::Atom(name) => f.write_str(name),
                Reason::Hardware(code) => write!(f, "hardware error {:#x}", code),
            },
        }
    }
}
