//! Native hardware error codes

use core::fmt;

/// Error code reported by the underlying peripheral API
///
/// The value is the vendor's signed error code, kept as-is so callers can
/// see exactly what the hardware layer rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HwError(pub i32);

impl HwError {
    /// Generic failure
    pub const FAIL: Self = Self(-1);
    /// Out of memory inside the vendor driver
    pub const NO_MEM: Self = Self(0x101);
    /// Invalid argument
    pub const INVALID_ARG: Self = Self(0x102);
    /// Invalid state (unit already in use, not initialised, ...)
    pub const INVALID_STATE: Self = Self(0x103);
    /// Requested resource not found
    pub const NOT_FOUND: Self = Self(0x105);
    /// Operation or scheme not supported (e.g. eFuse not burnt)
    pub const NOT_SUPPORTED: Self = Self(0x106);
    /// Operation timed out
    pub const TIMEOUT: Self = Self(0x107);

    /// Get the raw native code
    pub const fn code(self) -> i32 {
        self.0
    }
}

impl fmt::Display for HwError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::FAIL => "FAIL",
            Self::NO_MEM => "NO_MEM",
            Self::INVALID_ARG => "INVALID_ARG",
            Self::INVALID_STATE => "INVALID_STATE",
            Self::NOT_FOUND => "NOT_FOUND",
            Self::NOT_SUPPORTED => "NOT_SUPPORTED",
            Self::TIMEOUT => "TIMEOUT",
            _ => return write!(f, "hardware error {:#x}", self.0),
        };
        write!(f, "{} ({:#x})", name, self.0)
    }
}
