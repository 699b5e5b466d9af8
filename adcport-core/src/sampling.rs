//! Multi-sample averaging
//!
//! A reading takes `samples` raw conversions back to back and reports the
//! floor of their mean. The sum is kept in a `u64` so any `u32` sample count
//! of 16-bit codes fits, although callers are capped at
//! [`MAX_SAMPLES`](crate::config::MAX_SAMPLES). The first failing conversion
//! ends the reading.

use adcport_hal::{AdcUnit, Calibration, ChannelId, HwError, UnitId};

use crate::config::{ReadOptions, Reading};
use crate::error::AdcError;

/// Map a failed raw conversion to the error reported to the caller
pub fn read_error(unit: UnitId, error: HwError) -> AdcError {
    match (unit, error) {
        // ADC2 shares its arbiter with the radio
        (UnitId::Unit2, HwError::TIMEOUT) => AdcError::Timeout,
        (_, HwError::FAIL) => AdcError::ErrorRead,
        (_, other) => AdcError::Hardware(other),
    }
}

/// Average `samples` raw conversions from one channel
pub fn average_raw<U: AdcUnit>(
    unit: &mut U,
    channel: ChannelId,
    samples: u32,
) -> Result<u16, AdcError> {
    if samples == 0 {
        return Err(AdcError::BadArgument);
    }

    let mut sum: u64 = 0;
    for n in 0..samples {
        match unit.read_raw(channel) {
            Ok(raw) => sum += u64::from(raw),
            Err(e) => {
                log::warn!(
                    "raw read {} of {} on channel {} failed: {}",
                    n + 1,
                    samples,
                    channel.index(),
                    e
                );
                return Err(read_error(unit.unit_id(), e));
            }
        }
    }

    // Mean of u16 values never exceeds u16::MAX
    let average = (sum / u64::from(samples)) as u16;
    log::trace!(
        "channel {}: {} samples, average {}",
        channel.index(),
        samples,
        average
    );
    Ok(average)
}

/// Take a reading according to the caller's options
///
/// The voltage is the calibrated value of the averaged code, never an
/// average of per-sample voltages. It is only reported when requested and
/// the channel has a calibration.
pub fn take_reading<U: AdcUnit>(
    unit: &mut U,
    channel: ChannelId,
    calibration: Option<&U::Calibration>,
    options: &ReadOptions,
) -> Result<Reading, AdcError> {
    let samples = options.sample_count()?;
    let average = average_raw(unit, channel, samples)?;

    let voltage_mv = match (options.voltage, calibration) {
        (true, Some(cal)) => Some(cal.raw_to_millivolts(average).map_err(|e| {
            log::error!("calibrated conversion failed: {}", e);
            AdcError::Hardware(e)
        })?),
        (true, None) => {
            log::debug!("channel {} has no calibration, no voltage", channel.index());
            None
        }
        (false, _) => None,
    };

    Ok(Reading {
        raw: options.raw.then_some(average),
        voltage_mv,
    })
}
