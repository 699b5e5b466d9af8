//! Board-agnostic ADC driver logic
//!
//! This crate contains everything between the caller-facing call surface
//! and the chip backend:
//!
//! - Pin to unit/channel lookup per chip family
//! - Ordered validation of channel settings
//! - Calibration scheme selection and per-channel ownership
//! - Multi-sample averaging with error mapping
//! - The per-unit [`Resource`] and its open/closed lifecycle
//!
//! Hardware is reached only through the traits in `adcport-hal`, so all of
//! it runs on the host against the mock backend.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod calibration;
pub mod channel;
pub mod config;
pub mod error;
pub mod pins;
pub mod resource;
pub mod sampling;

pub use adcport_hal as hal;

pub use calibration::{CalibrationSelector, CalibrationSet};
pub use channel::ChannelConfigurer;
pub use config::{CalibrationRequest, ChannelRequest, ReadOptions, Reading};
pub use error::{AdcError, Reason};
pub use pins::{ChipVariant, PinMapper};
pub use resource::{Resource, ResourceState};
