//! Caller-visible resource handles
//!
//! An open resource is handed to the caller as a 3-tuple:
//!
//! ```text
//! {'$adc', Resource, Ref}
//!    │        │       └─ unique reference minted at open
//!    │        └───────── native resource token (type, slot, generation)
//!    └────────────────── type marker
//! ```
//!
//! Every entry point decodes the handle before doing anything else. A
//! tuple of the wrong shape, a token of another resource type, a slot that
//! was reused, or a reference that does not match are all `bad_argument`.

use adcport_core::AdcError;

use crate::term::Term;

/// Type marker atom in the first tuple element
pub const ADC_MARKER: &str = "$adc";

/// Native resource token as seen by the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResourceToken {
    /// Resource type the token was created for
    pub resource_type: u32,
    /// Slot in the driver's resource table
    pub slot: u16,
    /// Generation of the slot when the token was created
    pub generation: u32,
}

/// Decoded `{'$adc', Resource, Ref}` handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdcHandle {
    pub token: ResourceToken,
    pub reference: u64,
}

impl AdcHandle {
    /// Decode a handle term
    pub fn from_term(term: Term<'_>) -> Result<Self, AdcError> {
        match term {
            Term::Tuple([Term::Atom(marker), Term::Resource(token), Term::Ref(reference)])
                if *marker == ADC_MARKER =>
            {
                Ok(Self {
                    token: *token,
                    reference: *reference,
                })
            }
            _ => {
                log::debug!("not an ADC handle: {:?}", term);
                Err(AdcError::BadArgument)
            }
        }
    }

    /// Get the tuple elements of this handle
    pub fn elements(&self) -> [Term<'static>; 3] {
        [
            Term::Atom(ADC_MARKER),
            Term::Resource(self.token),
            Term::Ref(self.reference),
        ]
    }
}
