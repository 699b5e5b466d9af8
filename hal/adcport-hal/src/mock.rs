//! Scripted host-side ADC for tests
//!
//! The mock peripheral shares one [`MockState`] with every unit and
//! calibration handle it creates, so a test can script raw readings and
//! failures up front and inspect what the driver did afterwards.
//!
//! ```ignore
//! let adc = MockPeripheral::new().with_reads([Ok(100), Ok(200)]);
//! let probe = adc.probe();
//! // ... drive the code under test ...
//! assert_eq!(probe.state().read_count, 2);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::vec::Vec;

use crate::adc::{AdcPeripheral, AdcUnit, Calibration};
use crate::error::HwError;
use crate::types::{Attenuation, CalibrationScheme, ChannelConfig, ChannelId, UnitId};

/// Millivolts per raw code for curve-fitting mock calibrations
pub const CURVE_MV_PER_CODE: u32 = 2;

/// Millivolts per raw code for line-fitting mock calibrations
pub const LINE_MV_PER_CODE: u32 = 3;

/// Everything the mock hardware has been told and asked to do
#[derive(Debug, Default)]
pub struct MockState {
    /// Scripted results for upcoming reads, consumed front to back
    pub reads: VecDeque<Result<u16, HwError>>,
    /// Value returned once the script is exhausted
    pub idle_value: u16,
    /// Number of raw reads performed
    pub read_count: usize,
    /// Channel programming in call order
    pub configured: Vec<(UnitId, ChannelId, ChannelConfig)>,
    /// Error returned by every channel programming call
    pub config_error: Option<HwError>,
    /// Error returned when opening a unit
    pub open_error: Option<HwError>,
    /// Units currently held
    pub open_units: Vec<UnitId>,
    /// Total units opened
    pub units_opened: usize,
    /// Total units released
    pub units_released: usize,
    /// Error returned when releasing a unit
    pub release_error: Option<HwError>,
    /// Schemes compiled in for this mock target
    pub supported_schemes: Vec<CalibrationScheme>,
    /// Schemes that fail to initialise, with their error
    pub failing_schemes: Vec<(CalibrationScheme, HwError)>,
    /// Calibration attempts in call order
    pub scheme_attempts: Vec<CalibrationScheme>,
    /// Calibration handles created
    pub calibrations_created: usize,
    /// Calibration handles released
    pub calibrations_released: usize,
    /// Error returned by calibrated conversions
    pub conversion_error: Option<HwError>,
    /// A read is between its start and end
    pub in_flight: bool,
    /// A read overlapped another read or the unit's release
    pub overlapped: bool,
}

impl MockState {
    /// Calibration handles created but not yet released
    pub fn live_calibrations(&self) -> usize {
        self.calibrations_created - self.calibrations_released
    }
}

fn lock(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Read-only view of the shared mock state
#[derive(Debug, Clone)]
pub struct MockProbe {
    state: Arc<Mutex<MockState>>,
}

impl MockProbe {
    /// Lock and inspect the state
    pub fn state(&self) -> MutexGuard<'_, MockState> {
        lock(&self.state)
    }
}

/// Mock ADC peripheral
#[derive(Debug, Clone)]
pub struct MockPeripheral {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockPeripheral {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPeripheral {
    /// Create a mock with both calibration schemes compiled in
    pub fn new() -> Self {
        let state = MockState {
            supported_schemes: CalibrationScheme::PRIORITY.to_vec(),
            ..MockState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Get a probe for inspecting the state after handing the mock away
    pub fn probe(&self) -> MockProbe {
        MockProbe {
            state: Arc::clone(&self.state),
        }
    }

    /// Queue scripted read results
    pub fn with_reads<I>(self, reads: I) -> Self
    where
        I: IntoIterator<Item = Result<u16, HwError>>,
    {
        lock(&self.state).reads.extend(reads);
        self
    }

    /// Set the value returned after the script runs out
    pub fn with_idle_value(self, value: u16) -> Self {
        lock(&self.state).idle_value = value;
        self
    }

    /// Replace the set of compiled-in calibration schemes
    pub fn with_schemes(self, schemes: &[CalibrationScheme]) -> Self {
        lock(&self.state).supported_schemes = schemes.to_vec();
        self
    }

    /// Make one calibration scheme fail to initialise
    pub fn with_failing_scheme(self, scheme: CalibrationScheme, error: HwError) -> Self {
        lock(&self.state).failing_schemes.push((scheme, error));
        self
    }

    /// Make opening a unit fail
    pub fn with_open_error(self, error: HwError) -> Self {
        lock(&self.state).open_error = Some(error);
        self
    }

    /// Make releasing a unit fail
    pub fn with_release_error(self, error: HwError) -> Self {
        lock(&self.state).release_error = Some(error);
        self
    }

    /// Make channel programming fail
    pub fn with_config_error(self, error: HwError) -> Self {
        lock(&self.state).config_error = Some(error);
        self
    }

    /// Make calibrated conversions fail
    pub fn with_conversion_error(self, error: HwError) -> Self {
        lock(&self.state).conversion_error = Some(error);
        self
    }
}

impl AdcPeripheral for MockPeripheral {
    type Unit = MockUnit;

    fn open_unit(&mut self, unit: UnitId) -> Result<MockUnit, HwError> {
        let mut state = lock(&self.state);
        if let Some(error) = state.open_error {
            return Err(error);
        }
        if state.open_units.contains(&unit) {
            return Err(HwError::INVALID_STATE);
        }
        state.open_units.push(unit);
        state.units_opened += 1;
        Ok(MockUnit {
            unit,
            state: Arc::clone(&self.state),
        })
    }
}

/// Mock unit handle
#[derive(Debug)]
pub struct MockUnit {
    unit: UnitId,
    state: Arc<Mutex<MockState>>,
}

impl AdcUnit for MockUnit {
    type Calibration = MockCalibration;

    fn unit_id(&self) -> UnitId {
        self.unit
    }

    fn config_channel(&mut self, channel: ChannelId, config: ChannelConfig) -> Result<(), HwError> {
        let mut state = lock(&self.state);
        if let Some(error) = state.config_error {
            return Err(error);
        }
        state.configured.push((self.unit, channel, config));
        Ok(())
    }

    fn read_raw(&mut self, _channel: ChannelId) -> Result<u16, HwError> {
        {
            let mut state = lock(&self.state);
            if state.in_flight {
                state.overlapped = true;
            }
            state.in_flight = true;
        }

        // Widen the conversion window so unserialized callers would collide
        std::thread::yield_now();

        let mut state = lock(&self.state);
        state.in_flight = false;
        state.read_count += 1;
        let idle = state.idle_value;
        state.reads.pop_front().unwrap_or(Ok(idle))
    }

    fn supports_scheme(&self, scheme: CalibrationScheme) -> bool {
        lock(&self.state).supported_schemes.contains(&scheme)
    }

    fn create_calibration(
        &mut self,
        scheme: CalibrationScheme,
        _channel: ChannelId,
        _attenuation: Attenuation,
    ) -> Result<MockCalibration, HwError> {
        let mut state = lock(&self.state);
        state.scheme_attempts.push(scheme);
        if !state.supported_schemes.contains(&scheme) {
            return Err(HwError::NOT_SUPPORTED);
        }
        if let Some((_, error)) = state.failing_schemes.iter().find(|(s, _)| *s == scheme) {
            return Err(*error);
        }
        state.calibrations_created += 1;
        Ok(MockCalibration {
            scheme,
            state: Arc::clone(&self.state),
        })
    }

    fn release(self) -> Result<(), HwError> {
        let mut state = lock(&self.state);
        if state.in_flight {
            state.overlapped = true;
        }
        if let Some(error) = state.release_error {
            return Err(error);
        }
        state.open_units.retain(|u| *u != self.unit);
        state.units_released += 1;
        Ok(())
    }
}

/// Mock calibration handle
///
/// Converts linearly: [`CURVE_MV_PER_CODE`] or [`LINE_MV_PER_CODE`]
/// millivolts per raw code depending on the scheme.
#[derive(Debug)]
pub struct MockCalibration {
    scheme: CalibrationScheme,
    state: Arc<Mutex<MockState>>,
}

impl Calibration for MockCalibration {
    fn scheme(&self) -> CalibrationScheme {
        self.scheme
    }

    fn raw_to_millivolts(&self, raw: u16) -> Result<u32, HwError> {
        if let Some(error) = lock(&self.state).conversion_error {
            return Err(error);
        }
        let per_code = match self.scheme {
            CalibrationScheme::CurveFitting => CURVE_MV_PER_CODE,
            CalibrationScheme::LineFitting => LINE_MV_PER_CODE,
        };
        Ok(raw as u32 * per_code)
    }

    fn release(self) -> Result<(), HwError> {
        lock(&self.state).calibrations_released += 1;
        Ok(())
    }
}
