//! adcport Hardware Abstraction Layer
//!
//! This crate defines the traits a chip backend implements so the driver
//! logic in `adcport-core` can run against real silicon or a host-side
//! mock. It mirrors the shape of a oneshot ADC API: a peripheral hands out
//! unit handles, a unit programs and reads channels, and a unit can create
//! calibration handles that convert raw codes to millivolts.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  adcport-nif (host runtime call surface)│
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  adcport-core (driver logic)            │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  adcport-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ adcport-hal-  │       │  mock (host   │
//! │    esp-idf    │       │    tests)     │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`adc::AdcPeripheral`] - Opens hardware units
//! - [`adc::AdcUnit`] - One open oneshot unit
//! - [`adc::Calibration`] - Raw code to voltage conversion

#![no_std]
#![deny(unsafe_code)]

#[cfg(feature = "mock")]
extern crate std;

pub mod adc;
pub mod error;
pub mod types;

#[cfg(feature = "mock")]
pub mod mock;

// Re-export key items at crate root for convenience
pub use adc::{AdcPeripheral, AdcUnit, Calibration};
pub use error::HwError;
pub use types::{Attenuation, BitWidth, CalibrationScheme, ChannelConfig, ChannelId, UnitId};
