//! Argument decoding
//!
//! Turns caller terms into the option structs `adcport-core` works with.
//! Shape problems (a non-list where options are expected, a non-atom
//! setting, a non-integer count) are `bad_argument`. A well-formed but
//! unrecognized setting name decodes to `None` so the core can report it
//! as `invalid_width` or `invalid_db` in its documented order.

use adcport_core::config::{parse_attenuation, parse_width, DEFAULT_ATTENUATION, DEFAULT_WIDTH};
use adcport_core::hal::UnitId;
use adcport_core::{AdcError, CalibrationRequest, ChannelRequest, PinMapper, ReadOptions};

use crate::term::{kv_get, Term};

/// Option key for the unit selector
pub const KEY_PERIPHERAL: &str = "peripheral";
/// Option key for the bit width
pub const KEY_BITWIDTH: &str = "bitwidth";
/// Option key for the attenuation
pub const KEY_ATTEN: &str = "atten";
/// Option key for the sample count
pub const KEY_SAMPLES: &str = "samples";
/// Option key for raw output
pub const KEY_RAW: &str = "raw";
/// Option key for voltage output
pub const KEY_VOLTAGE: &str = "voltage";

fn options<'a>(term: Term<'a>) -> Result<&'a [Term<'a>], AdcError> {
    term.as_list().ok_or_else(|| {
        log::debug!("options must be a list: {:?}", term);
        AdcError::BadArgument
    })
}

fn atom_option<'a>(opts: &'a [Term<'a>], key: &str) -> Result<Option<&'a str>, AdcError> {
    match kv_get(opts, key) {
        None => Ok(None),
        Some(Term::Atom(name)) => Ok(Some(name)),
        Some(other) => {
            log::debug!("{} must be an atom: {:?}", key, other);
            Err(AdcError::BadArgument)
        }
    }
}

fn bool_option(opts: &[Term<'_>], key: &str) -> Result<bool, AdcError> {
    match kv_get(opts, key) {
        None => Ok(false),
        Some(value) => value.as_bool().ok_or_else(|| {
            log::debug!("{} must be a boolean: {:?}", key, value);
            AdcError::BadArgument
        }),
    }
}

fn unit_selector(mapper: &PinMapper, selector: i64) -> Result<UnitId, AdcError> {
    mapper.unit_from_selector(selector).ok_or_else(|| {
        log::debug!(
            "unit {} out of range 1..={}",
            selector,
            mapper.unit_count()
        );
        AdcError::InvalidUnit
    })
}

/// Decode the unit argument of `open`
///
/// Accepts a bare integer or an option list with `peripheral`.
pub fn decode_unit(term: Term<'_>, mapper: &PinMapper) -> Result<UnitId, AdcError> {
    match term {
        Term::Int(selector) => unit_selector(mapper, selector),
        Term::List(opts) => match kv_get(opts, KEY_PERIPHERAL) {
            None => Ok(UnitId::Unit1),
            Some(Term::Int(selector)) => unit_selector(mapper, selector),
            Some(other) => {
                log::debug!("peripheral must be an integer: {:?}", other);
                Err(AdcError::BadArgument)
            }
        },
        other => {
            log::debug!("unit must be an integer or option list: {:?}", other);
            Err(AdcError::BadArgument)
        }
    }
}

/// Decode a pin argument
///
/// Integers outside the `i32` range are not ADC pins.
pub fn decode_pin(term: Term<'_>) -> Result<i32, AdcError> {
    match term {
        Term::Int(pin) => i32::try_from(pin).map_err(|_| AdcError::InvalidPin),
        other => {
            log::debug!("pin must be an integer: {:?}", other);
            Err(AdcError::BadArgument)
        }
    }
}

/// Decode `[{bitwidth, W}, {atten, A}]`
pub fn decode_channel(term: Term<'_>) -> Result<ChannelRequest, AdcError> {
    let opts = options(term)?;
    let width = match atom_option(opts, KEY_BITWIDTH)? {
        None => Some(DEFAULT_WIDTH),
        Some(name) => parse_width(name),
    };
    let attenuation = match atom_option(opts, KEY_ATTEN)? {
        None => Some(DEFAULT_ATTENUATION),
        Some(name) => parse_attenuation(name),
    };
    Ok(ChannelRequest { width, attenuation })
}

/// Decode `[{atten, A}]`
pub fn decode_calibration(term: Term<'_>) -> Result<CalibrationRequest, AdcError> {
    let opts = options(term)?;
    let attenuation = match atom_option(opts, KEY_ATTEN)? {
        None => Some(DEFAULT_ATTENUATION),
        Some(name) => parse_attenuation(name),
    };
    Ok(CalibrationRequest { attenuation })
}

/// Decode `[{samples, N}, raw, voltage]`
///
/// The sample count is passed through unchecked; the core rejects counts
/// that cannot be averaged.
pub fn decode_read(term: Term<'_>) -> Result<ReadOptions, AdcError> {
    let opts = options(term)?;
    let mut read = ReadOptions::default();
    match kv_get(opts, KEY_SAMPLES) {
        None => {}
        Some(Term::Int(samples)) => read.samples = samples,
        Some(other) => {
            log::debug!("samples must be an integer: {:?}", other);
            return Err(AdcError::BadArgument);
        }
    }
    read.raw = bool_option(opts, KEY_RAW)?;
    read.voltage = bool_option(opts, KEY_VOLTAGE)?;
    Ok(read)
}

#[cfg(test)]
mod tests {
    use super::*;
    use adcport_core::hal::{Attenuation, BitWidth};
    use adcport_core::ChipVariant;

    fn pair<'a>(key: &'a str, value: Term<'a>) -> [Term<'a>; 2] {
        [Term::Atom(key), value]
    }

    #[test]
    fn test_decode_unit() {
        let one_unit = PinMapper::new(ChipVariant::Esp32, false);
        let two_units = PinMapper::new(ChipVariant::Esp32, true);

        assert_eq!(decode_unit(Term::Int(1), &one_unit), Ok(UnitId::Unit1));
        assert_eq!(decode_unit(Term::Int(2), &one_unit), Err(AdcError::InvalidUnit));
        assert_eq!(decode_unit(Term::Int(2), &two_units), Ok(UnitId::Unit2));
        assert_eq!(decode_unit(Term::Int(0), &two_units), Err(AdcError::InvalidUnit));
        assert_eq!(decode_unit(Term::Int(3), &two_units), Err(AdcError::InvalidUnit));
        assert_eq!(decode_unit(Term::Atom("adc1"), &two_units), Err(AdcError::BadArgument));
    }

    #[test]
    fn test_decode_unit_from_options() {
        let mapper = PinMapper::new(ChipVariant::Esp32, true);
        assert_eq!(decode_unit(Term::List(&[]), &mapper), Ok(UnitId::Unit1));

        let selector = pair(KEY_PERIPHERAL, Term::Int(2));
        assert_eq!(
            decode_unit(Term::List(&[Term::Tuple(&selector)]), &mapper),
            Ok(UnitId::Unit2)
        );

        let bad = pair(KEY_PERIPHERAL, Term::Atom("two"));
        assert_eq!(
            decode_unit(Term::List(&[Term::Tuple(&bad)]), &mapper),
            Err(AdcError::BadArgument)
        );
    }

    #[test]
    fn test_decode_pin() {
        assert_eq!(decode_pin(Term::Int(36)), Ok(36));
        assert_eq!(decode_pin(Term::Int(-1)), Ok(-1));
        assert_eq!(decode_pin(Term::Int(1 << 40)), Err(AdcError::InvalidPin));
        assert_eq!(decode_pin(Term::Atom("gpio36")), Err(AdcError::BadArgument));
    }

    #[test]
    fn test_decode_channel_defaults() {
        let request = decode_channel(Term::List(&[])).unwrap();
        assert_eq!(request, ChannelRequest::default());
    }

    #[test]
    fn test_decode_channel_names() {
        let width = pair(KEY_BITWIDTH, Term::Atom("bit_defult"));
        let atten = pair(KEY_ATTEN, Term::Atom("db_2_5"));
        let list = [Term::Tuple(&width), Term::Tuple(&atten)];

        let request = decode_channel(Term::List(&list)).unwrap();
        assert_eq!(request.width, Some(BitWidth::Default));
        assert_eq!(request.attenuation, Some(Attenuation::Db2_5));
    }

    #[test]
    fn test_decode_channel_unknown_names_are_none() {
        let width = pair(KEY_BITWIDTH, Term::Atom("bit_16"));
        let atten = pair(KEY_ATTEN, Term::Atom("db_11"));
        let list = [Term::Tuple(&width), Term::Tuple(&atten)];

        let request = decode_channel(Term::List(&list)).unwrap();
        assert_eq!(request.width, None);
        assert_eq!(request.attenuation, None);
    }

    #[test]
    fn test_decode_channel_shape_errors() {
        assert_eq!(decode_channel(Term::Int(0)), Err(AdcError::BadArgument));

        let width = pair(KEY_BITWIDTH, Term::Int(12));
        assert_eq!(
            decode_channel(Term::List(&[Term::Tuple(&width)])),
            Err(AdcError::BadArgument)
        );
    }

    #[test]
    fn test_decode_calibration() {
        assert_eq!(
            decode_calibration(Term::List(&[])),
            Ok(CalibrationRequest::default())
        );
        let atten = pair(KEY_ATTEN, Term::Atom("db_0"));
        assert_eq!(
            decode_calibration(Term::List(&[Term::Tuple(&atten)])),
            Ok(Attenuation::Db0.into())
        );
        assert_eq!(decode_calibration(Term::Atom("db_0")), Err(AdcError::BadArgument));
    }

    #[test]
    fn test_decode_read() {
        assert_eq!(decode_read(Term::List(&[])), Ok(ReadOptions::default()));

        let samples = pair(KEY_SAMPLES, Term::Int(10));
        let voltage = pair(KEY_VOLTAGE, Term::Atom("false"));
        let list = [Term::Tuple(&samples), Term::Atom(KEY_RAW), Term::Tuple(&voltage)];
        assert_eq!(
            decode_read(Term::List(&list)),
            Ok(ReadOptions::new(10).with_raw())
        );
    }

    #[test]
    fn test_decode_read_shape_errors() {
        let samples = pair(KEY_SAMPLES, Term::Atom("many"));
        assert_eq!(
            decode_read(Term::List(&[Term::Tuple(&samples)])),
            Err(AdcError::BadArgument)
        );

        let raw = pair(KEY_RAW, Term::Int(1));
        assert_eq!(
            decode_read(Term::List(&[Term::Tuple(&raw)])),
            Err(AdcError::BadArgument)
        );
    }

    #[test]
    fn test_decode_read_keeps_bad_counts_for_core() {
        let samples = pair(KEY_SAMPLES, Term::Int(0));
        let read = decode_read(Term::List(&[Term::Tuple(&samples)])).unwrap();
        assert_eq!(read.samples, 0);
        assert_eq!(read.sample_count(), Err(AdcError::BadArgument));
    }
}
