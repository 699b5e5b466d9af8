//! ESP-IDF backend for the adcport HAL
//!
//! Implements the `adcport-hal` traits on top of the ESP-IDF oneshot ADC
//! driver and its calibration schemes:
//!
//! | Chip      | Curve fitting | Line fitting | Unit 2 (`adc2`) |
//! |-----------|---------------|--------------|-----------------|
//! | ESP32     |               | yes          | shared with Wi-Fi |
//! | ESP32-S2  |               | yes          | shared with Wi-Fi |
//! | ESP32-S3  | yes           |              | shared with Wi-Fi |
//! | ESP32-C3  | yes           |              | shared with Wi-Fi |
//!
//! Exactly one chip feature must be enabled.

#![no_std]

#[cfg(not(any(
    feature = "esp32",
    feature = "esp32s2",
    feature = "esp32s3",
    feature = "esp32c3"
)))]
compile_error!("enable one chip feature: esp32, esp32s2, esp32s3 or esp32c3");

#[cfg(any(
    all(feature = "esp32", any(feature = "esp32s2", feature = "esp32s3", feature = "esp32c3")),
    all(feature = "esp32s2", any(feature = "esp32s3", feature = "esp32c3")),
    all(feature = "esp32s3", feature = "esp32c3"),
))]
compile_error!("only one chip feature may be enabled");

pub mod adc;

pub use adc::{EspAdc, EspCalibration, EspUnit};
