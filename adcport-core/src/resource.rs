//! Per-unit ADC resource
//!
//! A [`Resource`] owns one hardware unit and the calibrations created for
//! its channels. Every operation on it runs under the resource's own lock,
//! so concurrent callers sharing the resource never overlap on the unit.
//! Different resources hold different locks and do not block each other
//! beyond what the chosen [`RawMutex`] implies.
//!
//! ```text
//!   open ──► Open ──close──► Closed
//!             │                 │
//!   configure / calibrate /     └─ every operation: InvalidResource
//!   release_calibration / read
//! ```
//!
//! Dropping a resource releases whatever it still holds, so a caller that
//! forgets to close cannot leak the unit.

use core::cell::RefCell;

use adcport_hal::{
    AdcPeripheral, AdcUnit, Calibration, CalibrationScheme, ChannelId, HwError, UnitId,
};
use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embassy_sync::blocking_mutex::Mutex;

use crate::calibration::{CalibrationSelector, CalibrationSet};
use crate::channel::ChannelConfigurer;
use crate::config::{CalibrationRequest, ChannelRequest, ReadOptions, Reading};
use crate::error::AdcError;
use crate::pins::PinMapper;
use crate::sampling;

/// Lifecycle state of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResourceState {
    /// Unit held, operations allowed
    Open,
    /// Unit released, operations rejected
    Closed,
}

struct Inner<U: AdcUnit> {
    unit: Option<U>,
    calibrations: CalibrationSet<U::Calibration>,
}

impl<U: AdcUnit> Inner<U> {
    /// Release calibrations, then the unit
    fn shutdown(&mut self) -> Result<(), AdcError> {
        let calibrations = self.calibrations.clear();
        let unit = match self.unit.take() {
            Some(unit) => unit.release().map_err(AdcError::from),
            None => Ok(()),
        };
        calibrations.and(unit)
    }
}

/// One open ADC unit with its channel calibrations
pub struct Resource<U: AdcUnit, M: RawMutex = CriticalSectionRawMutex> {
    unit_id: UnitId,
    configurer: ChannelConfigurer,
    selector: CalibrationSelector,
    inner: Mutex<M, RefCell<Inner<U>>>,
}

impl<U: AdcUnit, M: RawMutex> Resource<U, M> {
    /// Acquire a unit from the peripheral
    pub fn open<P>(peripheral: &mut P, unit: UnitId, mapper: PinMapper) -> Result<Self, AdcError>
    where
        P: AdcPeripheral<Unit = U>,
    {
        if unit.number() > mapper.unit_count() {
            return Err(AdcError::InvalidUnit);
        }

        let handle = peripheral.open_unit(unit).map_err(|e| {
            log::error!("failed to open ADC unit {}: {}", unit.number(), e);
            AdcError::from(e)
        })?;

        log::info!("opened ADC unit {}", unit.number());
        Ok(Self {
            unit_id: unit,
            configurer: ChannelConfigurer::new(mapper, unit),
            selector: CalibrationSelector::new(),
            inner: Mutex::new(RefCell::new(Inner {
                unit: Some(handle),
                calibrations: CalibrationSet::new(),
            })),
        })
    }

    /// Get the unit this resource was opened for
    pub fn unit_id(&self) -> UnitId {
        self.unit_id
    }

    /// Get the current lifecycle state
    pub fn state(&self) -> ResourceState {
        self.inner.lock(|cell| {
            if cell.borrow().unit.is_some() {
                ResourceState::Open
            } else {
                ResourceState::Closed
            }
        })
    }

    /// Run `f` on the open unit, holding the lock
    fn with_unit<R>(
        &self,
        f: impl FnOnce(&mut U, &mut CalibrationSet<U::Calibration>) -> Result<R, AdcError>,
    ) -> Result<R, AdcError> {
        self.inner.lock(|cell| {
            let mut inner = cell.borrow_mut();
            let Inner { unit, calibrations } = &mut *inner;
            match unit.as_mut() {
                Some(unit) => f(unit, calibrations),
                None => Err(AdcError::InvalidResource),
            }
        })
    }

    /// Release the unit and every calibration
    ///
    /// The resource is closed afterwards even when a release step fails;
    /// the first failure is returned. Closing twice is `InvalidResource`.
    pub fn close(&self) -> Result<(), AdcError> {
        self.inner.lock(|cell| {
            let mut inner = cell.borrow_mut();
            if inner.unit.is_none() {
                return Err(AdcError::InvalidResource);
            }
            let result = inner.shutdown();
            match result {
                Ok(()) => log::info!("closed ADC unit {}", self.unit_id.number()),
                Err(e) => log::error!("closing ADC unit {} failed: {}", self.unit_id.number(), e),
            }
            result
        })
    }

    /// Program a pin's channel with width and attenuation
    pub fn configure(&self, pin: i32, request: &ChannelRequest) -> Result<ChannelId, AdcError> {
        self.with_unit(|unit, _| self.configurer.configure(unit, pin, request))
    }

    /// Create a calibration for a pin's channel
    ///
    /// Replaces any calibration the channel already had. Fails with the
    /// generic hardware code when no scheme can initialise.
    pub fn configure_calibration(
        &self,
        pin: i32,
        request: &CalibrationRequest,
    ) -> Result<CalibrationScheme, AdcError> {
        self.with_unit(|unit, calibrations| {
            let (channel, attenuation) = self.configurer.validate_calibration(pin, request)?;
            let handle = self
                .selector
                .select(unit, channel, attenuation)
                .ok_or(AdcError::Hardware(HwError::FAIL))?;
            let scheme = handle.scheme();
            calibrations.install(channel, attenuation, handle);
            Ok(scheme)
        })
    }

    /// Release the calibration on a pin's channel
    ///
    /// Returns `Ok(false)` when the channel had none.
    pub fn release_calibration(&self, pin: i32) -> Result<bool, AdcError> {
        self.with_unit(|_, calibrations| {
            let channel = self.configurer.resolve(pin)?;
            let released = calibrations.release(channel)?;
            if released {
                log::debug!("released calibration on pin {}", pin);
            }
            Ok(released)
        })
    }

    /// Take an averaged reading from a pin
    pub fn read(&self, pin: i32, options: &ReadOptions) -> Result<Reading, AdcError> {
        self.with_unit(|unit, calibrations| {
            let channel = self.configurer.resolve(pin)?;
            sampling::take_reading(unit, channel, calibrations.get(channel), options)
        })
    }
}

impl<U: AdcUnit, M: RawMutex> Drop for Resource<U, M> {
    fn drop(&mut self) {
        let inner = self.inner.get_mut().get_mut();
        if inner.unit.is_none() {
            return;
        }
        log::debug!("releasing ADC unit {} on drop", self.unit_id.number());
        if let Err(e) = inner.shutdown() {
            log::error!("releasing ADC unit {} on drop failed: {}", self.unit_id.number(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pins::ChipVariant;
    use adcport_hal::mock::{MockPeripheral, MockUnit, CURVE_MV_PER_CODE, LINE_MV_PER_CODE};
    use std::sync::Arc;
    use std::vec::Vec;

    type MockResource = Resource<MockUnit>;

    fn esp32() -> PinMapper {
        PinMapper::new(ChipVariant::Esp32, true)
    }

    #[test]
    fn test_end_to_end_raw_read() {
        let mut adc = MockPeripheral::new().with_reads((0..10).map(|i| Ok(2000 + i)));
        let probe = adc.probe();
        let resource = MockResource::open(&mut adc, UnitId::Unit1, esp32()).unwrap();

        resource
            .configure(36, &ChannelRequest::from_names("bit_default", "db_12"))
            .unwrap();
        let reading = resource.read(36, &ReadOptions::new(10).with_raw()).unwrap();

        // (2000 + ... + 2009) / 10 = 2004.5
        assert_eq!(reading.raw, Some(2004));
        assert_eq!(reading.voltage_mv, None);
        assert_eq!(probe.state().read_count, 10);
    }

    #[test]
    fn test_voltage_with_calibration() {
        let mut adc = MockPeripheral::new().with_idle_value(1000);
        let resource = MockResource::open(&mut adc, UnitId::Unit1, esp32()).unwrap();

        resource.configure(34, &ChannelRequest::default()).unwrap();
        let scheme = resource
            .configure_calibration(34, &CalibrationRequest::default())
            .unwrap();
        assert_eq!(scheme, CalibrationScheme::CurveFitting);

        let reading = resource
            .read(34, &ReadOptions::new(4).with_raw().with_voltage())
            .unwrap();
        assert_eq!(reading.raw, Some(1000));
        assert_eq!(reading.voltage_mv, Some(1000 * CURVE_MV_PER_CODE));

        // Other channels stay uncalibrated
        let reading = resource.read(35, &ReadOptions::new(4).with_voltage()).unwrap();
        assert_eq!(reading.voltage_mv, None);
    }

    #[test]
    fn test_line_fitting_fallback_end_to_end() {
        let mut adc = MockPeripheral::new()
            .with_idle_value(10)
            .with_schemes(&[CalibrationScheme::LineFitting]);
        let resource = MockResource::open(&mut adc, UnitId::Unit1, esp32()).unwrap();

        assert_eq!(
            resource.configure_calibration(36, &CalibrationRequest::default()),
            Ok(CalibrationScheme::LineFitting)
        );
        let reading = resource.read(36, &ReadOptions::new(1).with_voltage()).unwrap();
        assert_eq!(reading.voltage_mv, Some(10 * LINE_MV_PER_CODE));
    }

    #[test]
    fn test_uncalibrated_chip_reports_generic_failure() {
        let mut adc = MockPeripheral::new().with_schemes(&[]);
        let resource = MockResource::open(&mut adc, UnitId::Unit1, esp32()).unwrap();

        assert_eq!(
            resource.configure_calibration(36, &CalibrationRequest::default()),
            Err(AdcError::Hardware(HwError::FAIL))
        );
    }

    #[test]
    fn test_open_unit2_needs_adc2() {
        let mut adc = MockPeripheral::new();
        let mapper = PinMapper::new(ChipVariant::Esp32, false);
        assert!(matches!(
            MockResource::open(&mut adc, UnitId::Unit2, mapper),
            Err(AdcError::InvalidUnit)
        ));

        let resource = MockResource::open(&mut adc, UnitId::Unit2, esp32()).unwrap();
        assert_eq!(resource.unit_id(), UnitId::Unit2);
    }

    #[test]
    fn test_open_propagates_hardware_error() {
        let mut adc = MockPeripheral::new().with_open_error(HwError::NO_MEM);
        assert!(matches!(
            MockResource::open(&mut adc, UnitId::Unit1, esp32()),
            Err(AdcError::Hardware(HwError::NO_MEM))
        ));
    }

    #[test]
    fn test_unit_cannot_be_opened_twice() {
        let mut adc = MockPeripheral::new();
        let _first = MockResource::open(&mut adc, UnitId::Unit1, esp32()).unwrap();
        assert!(matches!(
            MockResource::open(&mut adc, UnitId::Unit1, esp32()),
            Err(AdcError::Hardware(HwError::INVALID_STATE))
        ));
    }

    #[test]
    fn test_closed_resource_rejects_everything() {
        let mut adc = MockPeripheral::new();
        let probe = adc.probe();
        let resource = MockResource::open(&mut adc, UnitId::Unit1, esp32()).unwrap();

        assert_eq!(resource.close(), Ok(()));
        assert_eq!(resource.state(), ResourceState::Closed);
        assert_eq!(probe.state().units_released, 1);

        // Invalid arguments still report the closed state first
        assert_eq!(resource.close(), Err(AdcError::InvalidResource));
        assert_eq!(
            resource.configure(1, &ChannelRequest::from_names("bad", "bad")),
            Err(AdcError::InvalidResource)
        );
        assert_eq!(
            resource.configure_calibration(36, &CalibrationRequest::default()),
            Err(AdcError::InvalidResource)
        );
        assert_eq!(resource.release_calibration(36), Err(AdcError::InvalidResource));
        assert_eq!(
            resource.read(36, &ReadOptions::new(0)),
            Err(AdcError::InvalidResource)
        );
        assert_eq!(probe.state().read_count, 0);
    }

    #[test]
    fn test_close_failure_still_closes() {
        let mut adc = MockPeripheral::new().with_release_error(HwError::INVALID_STATE);
        let resource = MockResource::open(&mut adc, UnitId::Unit1, esp32()).unwrap();

        assert_eq!(
            resource.close(),
            Err(AdcError::Hardware(HwError::INVALID_STATE))
        );
        assert_eq!(resource.state(), ResourceState::Closed);
        assert_eq!(resource.close(), Err(AdcError::InvalidResource));
    }

    #[test]
    fn test_close_releases_calibrations() {
        let mut adc = MockPeripheral::new();
        let probe = adc.probe();
        let resource = MockResource::open(&mut adc, UnitId::Unit1, esp32()).unwrap();

        resource
            .configure_calibration(36, &CalibrationRequest::default())
            .unwrap();
        resource
            .configure_calibration(39, &CalibrationRequest::default())
            .unwrap();
        assert_eq!(probe.state().live_calibrations(), 2);

        resource.close().unwrap();
        assert_eq!(probe.state().live_calibrations(), 0);
    }

    #[test]
    fn test_drop_releases_everything() {
        let mut adc = MockPeripheral::new();
        let probe = adc.probe();
        {
            let resource = MockResource::open(&mut adc, UnitId::Unit1, esp32()).unwrap();
            resource
                .configure_calibration(36, &CalibrationRequest::default())
                .unwrap();
        }

        let state = probe.state();
        assert_eq!(state.units_released, 1);
        assert!(state.open_units.is_empty());
        assert_eq!(state.live_calibrations(), 0);
    }

    #[test]
    fn test_drop_with_failing_release_still_frees_calibrations() {
        let mut adc = MockPeripheral::new().with_release_error(HwError::INVALID_STATE);
        let probe = adc.probe();
        let resource = MockResource::open(&mut adc, UnitId::Unit1, esp32()).unwrap();
        resource
            .configure_calibration(36, &CalibrationRequest::default())
            .unwrap();
        drop(resource);

        let state = probe.state();
        assert_eq!(state.live_calibrations(), 0);
        assert_eq!(state.units_released, 0);
    }

    #[test]
    fn test_drop_after_close_releases_once() {
        let mut adc = MockPeripheral::new();
        let probe = adc.probe();
        let resource = MockResource::open(&mut adc, UnitId::Unit1, esp32()).unwrap();
        resource.close().unwrap();
        drop(resource);
        assert_eq!(probe.state().units_released, 1);
    }

    #[test]
    fn test_calibration_cycles_do_not_leak() {
        let mut adc = MockPeripheral::new();
        let probe = adc.probe();
        let resource = MockResource::open(&mut adc, UnitId::Unit1, esp32()).unwrap();

        for i in 0..=100 {
            let attenuation = if i % 2 == 0 { "db_0" } else { "db_12" };
            let request = CalibrationRequest {
                attenuation: crate::config::parse_attenuation(attenuation),
            };
            resource.configure_calibration(36, &request).unwrap();
            if i % 3 == 0 {
                assert_eq!(resource.release_calibration(36), Ok(true));
            }
        }
        assert_eq!(probe.state().live_calibrations(), 1);
        assert_eq!(resource.release_calibration(36), Ok(true));
        assert_eq!(resource.release_calibration(36), Ok(false));
        assert_eq!(probe.state().live_calibrations(), 0);
    }

    #[test]
    fn test_release_calibration_validates_pin() {
        let mut adc = MockPeripheral::new();
        let resource = MockResource::open(&mut adc, UnitId::Unit1, esp32()).unwrap();

        assert_eq!(resource.release_calibration(5), Err(AdcError::InvalidPin));
        // Unit 2 pin on a unit 1 resource
        assert_eq!(resource.release_calibration(25), Err(AdcError::InvalidPin));
    }

    #[test]
    fn test_read_validates_pin_before_sampling() {
        let mut adc = MockPeripheral::new();
        let probe = adc.probe();
        let resource = MockResource::open(&mut adc, UnitId::Unit1, esp32()).unwrap();

        assert_eq!(
            resource.read(21, &ReadOptions::default()),
            Err(AdcError::InvalidPin)
        );
        assert_eq!(
            resource.read(36, &ReadOptions::new(-1)),
            Err(AdcError::BadArgument)
        );
        assert_eq!(probe.state().read_count, 0);
    }

    #[test]
    fn test_concurrent_reads_are_serialized() {
        let mut adc = MockPeripheral::new().with_idle_value(7);
        let probe = adc.probe();
        let resource = Arc::new(MockResource::open(&mut adc, UnitId::Unit1, esp32()).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let resource = Arc::clone(&resource);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        let reading = resource.read(36, &ReadOptions::new(8).with_raw()).unwrap();
                        assert_eq!(reading.raw, Some(7));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let state = probe.state();
        assert!(!state.overlapped);
        assert_eq!(state.read_count, 4 * 25 * 8);
    }

    #[test]
    fn test_close_waits_for_in_flight_reads() {
        let mut adc = MockPeripheral::new().with_idle_value(3);
        let probe = adc.probe();
        let resource = Arc::new(MockResource::open(&mut adc, UnitId::Unit1, esp32()).unwrap());

        let readers: Vec<_> = (0..3)
            .map(|_| {
                let resource = Arc::clone(&resource);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        match resource.read(36, &ReadOptions::new(16).with_raw()) {
                            Ok(reading) => assert_eq!(reading.raw, Some(3)),
                            Err(e) => assert_eq!(e, AdcError::InvalidResource),
                        }
                    }
                })
            })
            .collect();

        std::thread::yield_now();
        assert_eq!(resource.close(), Ok(()));
        for reader in readers {
            reader.join().unwrap();
        }

        let state = probe.state();
        assert!(!state.overlapped);
        assert_eq!(state.units_released, 1);
        // Every reading that started ran all of its conversions
        assert_eq!(state.read_count % 16, 0);
    }
}
