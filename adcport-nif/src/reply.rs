//! Replies returned to the caller
//!
//! | Outcome            | Term                          |
//! |--------------------|-------------------------------|
//! | success            | `ok`                          |
//! | open               | `{'$adc', Resource, Ref}`     |
//! | read               | `{Raw \| undefined, Mv \| undefined}` |
//! | named error        | `{error, Reason}`             |
//! | hardware error     | `{error, Code}`               |

use adcport_core::{AdcError, Reading, Reason};

use crate::handle::AdcHandle;
use crate::term::{Term, UNDEFINED};

/// Atom for success
pub const OK: &str = "ok";
/// Atom tagging error tuples
pub const ERROR: &str = "error";

/// Result of one entry point call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply {
    /// Plain `ok`
    Ok,
    /// Newly opened resource
    Handle(AdcHandle),
    /// Sampled reading
    Reading(Reading),
    /// Failure with its reason
    Error(Reason),
}

impl From<AdcError> for Reply {
    fn from(error: AdcError) -> Self {
        Reply::Error(error.reason())
    }
}

impl Reply {
    /// Build a reply from an operation result
    pub fn from_result<T>(result: Result<T, AdcError>, ok: impl FnOnce(T) -> Reply) -> Self {
        match result {
            Ok(value) => ok(value),
            Err(e) => e.into(),
        }
    }

    /// Check if this is an error reply
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }

    /// Render as a runtime term, using `scratch` for tuple elements
    pub fn to_term<'s>(&self, scratch: &'s mut [Term<'static>; 3]) -> Term<'s> {
        match *self {
            Reply::Ok => Term::Atom(OK),
            Reply::Handle(handle) => {
                *scratch = handle.elements();
                Term::Tuple(&scratch[..])
            }
            Reply::Reading(reading) => {
                scratch[0] = reading
                    .raw
                    .map_or(Term::Atom(UNDEFINED), |raw| Term::Int(raw.into()));
                scratch[1] = reading
                    .voltage_mv
                    .map_or(Term::Atom(UNDEFINED), |mv| Term::Int(mv.into()));
                Term::Tuple(&scratch[..2])
            }
            Reply::Error(reason) => {
                scratch[0] = Term::Atom(ERROR);
                scratch[1] = match reason {
                    Reason::Atom(name) => Term::Atom(name),
                    Reason::Hardware(code) => Term::Int(code.into()),
                };
                Term::Tuple(&scratch[..2])
            }
        }
    }
}
