//! Native entry points for the adcport ADC driver
//!
//! This crate is the boundary between a managed runtime and the driver
//! logic in `adcport-core`. The host resolves entry points by name, passes
//! each call's arguments as borrowed [`Term`]s and renders the returned
//! [`Reply`] back into its own heap.
//!
//! ```text
//! adc:nif_init/1                          open(Unit | Options)
//! adc:nif_close/1                         close(Adc)
//! adc:nif_config_channel_bitwidth_atten/3 configure(Adc, Pin, Options)
//! adc:nif_config_channel_calibration/3    configure_calibration(Adc, Pin, Options)
//! adc:nif_release_calibration/2           release_calibration(Adc, Pin)
//! adc:nif_take_reading/3                  read(Adc, Pin, Options)
//! ```

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod driver;
pub mod entry;
pub mod handle;
pub mod options;
pub mod reply;
pub mod term;

pub use driver::{AdcDriver, ADC_RESOURCE_TYPE, TABLE_CAPACITY};
pub use entry::EntryPoint;
pub use handle::{AdcHandle, ResourceToken, ADC_MARKER};
pub use reply::Reply;
pub use term::Term;
