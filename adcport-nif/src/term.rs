//! Borrowed view of runtime values
//!
//! The host runtime owns its terms and their memory. Entry points only need
//! to inspect a handful of shapes, so arguments are presented as a borrowed
//! tree of [`Term`]s that the host builds for the duration of one call.

use crate::handle::ResourceToken;

/// Atom for boolean true
pub const TRUE: &str = "true";
/// Atom for boolean false
pub const FALSE: &str = "false";
/// Atom for an absent value
pub const UNDEFINED: &str = "undefined";

/// One runtime value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Term<'a> {
    /// Integer
    Int(i64),
    /// Atom, by name
    Atom(&'a str),
    /// Unique reference
    Ref(u64),
    /// Opaque native resource
    Resource(ResourceToken),
    /// Tuple
    Tuple(&'a [Term<'a>]),
    /// Proper list
    List(&'a [Term<'a>]),
}

impl<'a> Term<'a> {
    /// Get the integer value
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Term::Int(n) => Some(n),
            _ => None,
        }
    }

    /// Get the atom name
    pub fn as_atom(&self) -> Option<&'a str> {
        match *self {
            Term::Atom(name) => Some(name),
            _ => None,
        }
    }

    /// Get a boolean from `true`/`false`
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Term::Atom(TRUE) => Some(true),
            Term::Atom(FALSE) => Some(false),
            _ => None,
        }
    }

    /// Get list elements
    pub fn as_list(&self) -> Option<&'a [Term<'a>]> {
        match *self {
            Term::List(items) => Some(items),
            _ => None,
        }
    }

    /// Check for the empty list
    pub fn is_nil(&self) -> bool {
        matches!(self, Term::List([]))
    }
}

/// Look up a key in a property list
///
/// `{Key, Value}` pairs and bare `Key` atoms (meaning `{Key, true}`) are
/// recognized; any other element is skipped. The first match wins.
pub fn kv_get<'a>(list: &'a [Term<'a>], key: &str) -> Option<Term<'a>> {
    list.iter().find_map(|item| match *item {
        Term::Tuple([Term::Atom(k), value]) if *k == key => Some(*value),
        Term::Atom(k) if k == key => Some(Term::Atom(TRUE)),
        _ => None,
    })
}
