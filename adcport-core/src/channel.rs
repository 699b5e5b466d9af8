//! Channel validation and programming
//!
//! Validation runs entirely on caller input and the pin table, before the
//! hardware is touched. The order of checks is fixed so the same bad
//! request always produces the same error:
//!
//! 1. pin resolves to a channel, else `InvalidPin`
//! 2. bit width is recognized, else `InvalidWidth`
//! 3. attenuation is recognized, else `InvalidDb`
//! 4. pin belongs to the bound unit, else `InvalidPin`

use adcport_hal::{AdcUnit, Attenuation, BitWidth, ChannelConfig, ChannelId, UnitId};

use crate::config::{attenuation_name, width_name, CalibrationRequest, ChannelRequest};
use crate::error::AdcError;
use crate::pins::PinMapper;

/// Validates pins and settings against one bound unit
#[derive(Debug, Clone, Copy)]
pub struct ChannelConfigurer {
    mapper: PinMapper,
    unit: UnitId,
}

impl ChannelConfigurer {
    /// Create a configurer for a unit
    pub const fn new(mapper: PinMapper, unit: UnitId) -> Self {
        Self { mapper, unit }
    }

    /// Get the bound unit
    pub const fn unit(&self) -> UnitId {
        self.unit
    }

    /// Step 1: the pin must have a channel on some unit
    fn channel_of(&self, pin: i32) -> Result<ChannelId, AdcError> {
        self.mapper.resolve_channel(pin).ok_or_else(|| {
            log::debug!("pin {} is not an ADC pin", pin);
            AdcError::InvalidPin
        })
    }

    /// Step 4: the pin must belong to the bound unit
    fn check_unit(&self, pin: i32) -> Result<(), AdcError> {
        match self.mapper.resolve_unit(pin) {
            Some(unit) if unit == self.unit => Ok(()),
            other => {
                log::debug!(
                    "pin {} is on unit {:?}, resource is bound to {:?}",
                    pin,
                    other,
                    self.unit
                );
                Err(AdcError::InvalidPin)
            }
        }
    }

    /// Step 2
    fn width_of(&self, pin: i32, request: &ChannelRequest) -> Result<BitWidth, AdcError> {
        request.width.ok_or_else(|| {
            log::debug!("pin {}: unrecognized bit width", pin);
            AdcError::InvalidWidth
        })
    }

    /// Step 3
    fn attenuation_of(
        &self,
        pin: i32,
        attenuation: Option<Attenuation>,
    ) -> Result<Attenuation, AdcError> {
        attenuation.ok_or_else(|| {
            log::debug!("pin {}: unrecognized attenuation", pin);
            AdcError::InvalidDb
        })
    }

    /// Resolve a pin on the bound unit
    pub fn resolve(&self, pin: i32) -> Result<ChannelId, AdcError> {
        let channel = self.channel_of(pin)?;
        self.check_unit(pin)?;
        Ok(channel)
    }

    /// Validate a channel programming request
    pub fn validate(
        &self,
        pin: i32,
        request: &ChannelRequest,
    ) -> Result<(ChannelId, ChannelConfig), AdcError> {
        let channel = self.channel_of(pin)?;
        let width = self.width_of(pin, request)?;
        let attenuation = self.attenuation_of(pin, request.attenuation)?;
        self.check_unit(pin)?;
        Ok((channel, ChannelConfig::new(width, attenuation)))
    }

    /// Validate a calibration request
    pub fn validate_calibration(
        &self,
        pin: i32,
        request: &CalibrationRequest,
    ) -> Result<(ChannelId, Attenuation), AdcError> {
        let channel = self.channel_of(pin)?;
        let attenuation = self.attenuation_of(pin, request.attenuation)?;
        self.check_unit(pin)?;
        Ok((channel, attenuation))
    }

    /// Validate a request and program the channel
    pub fn configure<U: AdcUnit>(
        &self,
        unit: &mut U,
        pin: i32,
        request: &ChannelRequest,
    ) -> Result<ChannelId, AdcError> {
        let (channel, config) = self.validate(pin, request)?;

        unit.config_channel(channel, config).map_err(|e| {
            log::error!(
                "failed to configure channel {} on unit {}: {}",
                channel.index(),
                self.unit.number(),
                e
            );
            AdcError::from(e)
        })?;

        log::debug!(
            "configured pin {} as unit {} channel {} ({}, {})",
            pin,
            self.unit.number(),
            channel.index(),
            width_name(config.width),
            attenuation_name(config.attenuation)
        );
        Ok(channel)
    }
}
