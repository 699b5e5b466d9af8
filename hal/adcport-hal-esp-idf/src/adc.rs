//! Oneshot ADC units and calibration handles
//!
//! Each wrapper owns exactly one ESP-IDF handle. Handles are only freed
//! through the trait `release` methods; the driver logic guarantees every
//! handle it creates is released exactly once.

use core::ptr;

use adcport_hal::{
    AdcPeripheral, AdcUnit, Attenuation, BitWidth, Calibration, CalibrationScheme, ChannelConfig,
    ChannelId, HwError, UnitId,
};
use esp_idf_sys::*;

fn check(code: esp_err_t) -> Result<(), HwError> {
    if code == ESP_OK as esp_err_t {
        Ok(())
    } else {
        Err(HwError(code))
    }
}

fn unit_id(unit: UnitId) -> adc_unit_t {
    match unit {
        UnitId::Unit1 => adc_unit_t_ADC_UNIT_1,
        UnitId::Unit2 => adc_unit_t_ADC_UNIT_2,
    }
}

fn channel_id(channel: ChannelId) -> adc_channel_t {
    channel.index() as adc_channel_t
}

fn bitwidth(width: BitWidth) -> adc_bitwidth_t {
    match width {
        BitWidth::Default => adc_bitwidth_t_ADC_BITWIDTH_DEFAULT,
        BitWidth::Bits9 => adc_bitwidth_t_ADC_BITWIDTH_9,
        BitWidth::Bits10 => adc_bitwidth_t_ADC_BITWIDTH_10,
        BitWidth::Bits11 => adc_bitwidth_t_ADC_BITWIDTH_11,
        BitWidth::Bits12 => adc_bitwidth_t_ADC_BITWIDTH_12,
        BitWidth::Bits13 => adc_bitwidth_t_ADC_BITWIDTH_13,
    }
}

fn atten(attenuation: Attenuation) -> adc_atten_t {
    match attenuation {
        Attenuation::Db0 => adc_atten_t_ADC_ATTEN_DB_0,
        Attenuation::Db2_5 => adc_atten_t_ADC_ATTEN_DB_2_5,
        Attenuation::Db6 => adc_atten_t_ADC_ATTEN_DB_6,
        Attenuation::Db12 => adc_atten_t_ADC_ATTEN_DB_12,
    }
}

/// The chip's ADC peripheral
#[derive(Debug, Default)]
pub struct EspAdc {
    _private: (),
}

impl EspAdc {
    /// Take the ADC peripheral
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl AdcPeripheral for EspAdc {
    type Unit = EspUnit;

    fn open_unit(&mut self, unit: UnitId) -> Result<EspUnit, HwError> {
        if unit == UnitId::Unit2 && !cfg!(feature = "adc2") {
            log::warn!("ADC unit 2 requested without adc2 support");
            return Err(HwError::NOT_SUPPORTED);
        }

        let config = adc_oneshot_unit_init_cfg_t {
            unit_id: unit_id(unit),
            ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
            ..Default::default()
        };
        let mut handle: adc_oneshot_unit_handle_t = ptr::null_mut();
        check(unsafe { adc_oneshot_new_unit(&config, &mut handle) })?;

        Ok(EspUnit { unit, handle })
    }
}

/// One open oneshot unit
#[derive(Debug)]
pub struct EspUnit {
    unit: UnitId,
    handle: adc_oneshot_unit_handle_t,
}

// SAFETY: the oneshot driver has no thread affinity; callers serialize
// access to a unit as required by `AdcUnit`.
unsafe impl Send for EspUnit {}

impl AdcUnit for EspUnit {
    type Calibration = EspCalibration;

    fn unit_id(&self) -> UnitId {
        self.unit
    }

    fn config_channel(&mut self, channel: ChannelId, config: ChannelConfig) -> Result<(), HwError> {
        let chan_config = adc_oneshot_chan_cfg_t {
            atten: atten(config.attenuation),
            bitwidth: bitwidth(config.width),
        };
        check(unsafe { adc_oneshot_config_channel(self.handle, channel_id(channel), &chan_config) })
    }

    fn read_raw(&mut self, channel: ChannelId) -> Result<u16, HwError> {
        let mut raw: i32 = 0;
        check(unsafe { adc_oneshot_read(self.handle, channel_id(channel), &mut raw) })?;
        u16::try_from(raw).map_err(|_| HwError::FAIL)
    }

    fn supports_scheme(&self, scheme: CalibrationScheme) -> bool {
        match scheme {
            CalibrationScheme::CurveFitting => cfg!(any(feature = "esp32s3", feature = "esp32c3")),
            CalibrationScheme::LineFitting => cfg!(any(feature = "esp32", feature = "esp32s2")),
        }
    }

    fn create_calibration(
        &mut self,
        scheme: CalibrationScheme,
        channel: ChannelId,
        attenuation: Attenuation,
    ) -> Result<EspCalibration, HwError> {
        let handle = match scheme {
            CalibrationScheme::CurveFitting => {
                curve_fitting::create(self.unit, channel, attenuation)?
            }
            CalibrationScheme::LineFitting => line_fitting::create(self.unit, attenuation)?,
        };
        Ok(EspCalibration { scheme, handle })
    }

    fn release(self) -> Result<(), HwError> {
        check(unsafe { adc_oneshot_del_unit(self.handle) })
    }
}

/// Factory calibration handle
#[derive(Debug)]
pub struct EspCalibration {
    scheme: CalibrationScheme,
    handle: adc_cali_handle_t,
}

// SAFETY: calibration handles are immutable lookup data after creation.
unsafe impl Send for EspCalibration {}

impl Calibration for EspCalibration {
    fn scheme(&self) -> CalibrationScheme {
        self.scheme
    }

    fn raw_to_millivolts(&self, raw: u16) -> Result<u32, HwError> {
        let mut mv: i32 = 0;
        check(unsafe { adc_cali_raw_to_voltage(self.handle, i32::from(raw), &mut mv) })?;
        u32::try_from(mv).map_err(|_| HwError::FAIL)
    }

    fn release(self) -> Result<(), HwError> {
        match self.scheme {
            CalibrationScheme::CurveFitting => curve_fitting::delete(self.handle),
            CalibrationScheme::LineFitting => line_fitting::delete(self.handle),
        }
    }
}

#[cfg(any(feature = "esp32s3", feature = "esp32c3"))]
mod curve_fitting {
    use super::*;

    pub fn create(
        unit: UnitId,
        channel: ChannelId,
        attenuation: Attenuation,
    ) -> Result<adc_cali_handle_t, HwError> {
        let config = adc_cali_curve_fitting_config_t {
            unit_id: unit_id(unit),
            chan: channel_id(channel),
            atten: atten(attenuation),
            bitwidth: adc_bitwidth_t_ADC_BITWIDTH_DEFAULT,
        };
        let mut handle: adc_cali_handle_t = ptr::null_mut();
        check(unsafe { adc_cali_create_scheme_curve_fitting(&config, &mut handle) })?;
        Ok(handle)
    }

    pub fn delete(handle: adc_cali_handle_t) -> Result<(), HwError> {
        check(unsafe { adc_cali_delete_scheme_curve_fitting(handle) })
    }
}

#[cfg(not(any(feature = "esp32s3", feature = "esp32c3")))]
mod curve_fitting {
    use super::*;

    pub fn create(
        _unit: UnitId,
        _channel: ChannelId,
        _attenuation: Attenuation,
    ) -> Result<adc_cali_handle_t, HwError> {
        Err(HwError::NOT_SUPPORTED)
    }

    pub fn delete(_handle: adc_cali_handle_t) -> Result<(), HwError> {
        Err(HwError::NOT_SUPPORTED)
    }
}

#[cfg(any(feature = "esp32", feature = "esp32s2"))]
mod line_fitting {
    use super::*;

    pub fn create(unit: UnitId, attenuation: Attenuation) -> Result<adc_cali_handle_t, HwError> {
        let config = adc_cali_line_fitting_config_t {
            unit_id: unit_id(unit),
            atten: atten(attenuation),
            bitwidth: adc_bitwidth_t_ADC_BITWIDTH_DEFAULT,
            ..Default::default()
        };
        let mut handle: adc_cali_handle_t = ptr::null_mut();
        check(unsafe { adc_cali_create_scheme_line_fitting(&config, &mut handle) })?;
        Ok(handle)
    }

    pub fn delete(handle: adc_cali_handle_t) -> Result<(), HwError> {
        check(unsafe { adc_cali_delete_scheme_line_fitting(handle) })
    }
}

#[cfg(not(any(feature = "esp32", feature = "esp32s2")))]
mod line_fitting {
    use super::*;

    pub fn create(_unit: UnitId, _attenuation: Attenuation) -> Result<adc_cali_handle_t, HwError> {
        Err(HwError::NOT_SUPPORTED)
    }

    pub fn delete(_handle: adc_cali_handle_t) -> Result<(), HwError> {
        Err(HwError::NOT_SUPPORTED)
    }
}
