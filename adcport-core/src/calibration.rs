//! Factory calibration selection and ownership
//!
//! Schemes are tried in priority order (curve fitting, then line fitting),
//! skipping any the target does not compile in. A chip that was never
//! factory calibrated yields `None`, which is a normal outcome.
//!
//! Calibration handles are owned per channel by a [`CalibrationSet`], in the
//! same scope as the channel configuration, and are released explicitly or
//! when the set is cleared.

use adcport_hal::{AdcUnit, Attenuation, Calibration, CalibrationScheme, ChannelId};

use crate::error::AdcError;

/// Picks the best calibration scheme that initialises
#[derive(Debug, Clone, Copy)]
pub struct CalibrationSelector {
    priority: &'static [CalibrationScheme],
}

impl Default for CalibrationSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl CalibrationSelector {
    /// Create a selector using the standard scheme priority
    pub const fn new() -> Self {
        Self {
            priority: &CalibrationScheme::PRIORITY,
        }
    }

    /// Try each scheme in order and return the first handle created
    pub fn select<U: AdcUnit>(
        &self,
        unit: &mut U,
        channel: ChannelId,
        attenuation: Attenuation,
    ) -> Option<U::Calibration> {
        for &scheme in self.priority {
            if !unit.supports_scheme(scheme) {
                continue;
            }

            log::info!("calibration scheme version is {}", scheme.name());
            match unit.create_calibration(scheme, channel, attenuation) {
                Ok(handle) => {
                    log::info!(
                        "calibration success: unit {} channel {} ({})",
                        unit.unit_id().number(),
                        channel.index(),
                        scheme.name()
                    );
                    return Some(handle);
                }
                Err(e) => {
                    log::debug!("{} calibration unavailable: {}", scheme.name(), e);
                }
            }
        }

        log::warn!("eFuse not burnt, skip software calibration");
        None
    }
}

struct Slot<C> {
    attenuation: Attenuation,
    handle: C,
}

/// Calibration handles owned per channel
pub struct CalibrationSet<C: Calibration> {
    slots: [Option<Slot<C>>; ChannelId::COUNT],
}

impl<C: Calibration> Default for CalibrationSet<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Calibration> CalibrationSet<C> {
    /// Create an empty set
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
        }
    }

    /// Get the calibration for a channel
    pub fn get(&self, channel: ChannelId) -> Option<&C> {
        self.slots[channel.index() as usize]
            .as_ref()
            .map(|slot| &slot.handle)
    }

    /// Get the attenuation a channel was calibrated for
    pub fn attenuation(&self, channel: ChannelId) -> Option<Attenuation> {
        self.slots[channel.index() as usize]
            .as_ref()
            .map(|slot| slot.attenuation)
    }

    /// Number of calibrated channels
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Check if no channel is calibrated
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attach a calibration to a channel
    ///
    /// Any previous calibration on the channel is released first. A failed
    /// release of the old handle is logged and does not block the new one.
    pub fn install(&mut self, channel: ChannelId, attenuation: Attenuation, handle: C) {
        if let Err(e) = self.release(channel) {
            log::warn!(
                "releasing previous calibration on channel {} failed: {}",
                channel.index(),
                e
            );
        }
        self.slots[channel.index() as usize] = Some(Slot {
            attenuation,
            handle,
        });
    }

    /// Release the calibration on a channel
    ///
    /// Returns `Ok(false)` when the channel had none.
    pub fn release(&mut self, channel: ChannelId) -> Result<bool, AdcError> {
        match self.slots[channel.index() as usize].take() {
            Some(slot) => {
                slot.handle.release()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Release every calibration
    ///
    /// All handles are released even if some fail; the first failure is
    /// returned.
    pub fn clear(&mut self) -> Result<(), AdcError> {
        let mut result = Ok(());
        for slot in self.slots.iter_mut() {
            if let Some(slot) = slot.take() {
                if let Err(e) = slot.handle.release() {
                    log::warn!("failed to release calibration: {}", e);
                    if result.is_ok() {
                        result = Err(AdcError::from(e));
                    }
                }
            }
        }
        result
    }
}
