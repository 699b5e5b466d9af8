//! Resource table and call dispatch
//!
//! [`AdcDriver`] owns the peripheral and a fixed-capacity table of open
//! resources. Each slot carries a generation that advances when the host
//! abandons the handle in it, so a handle kept past its lifetime can never
//! reach whatever resource later takes the slot.

use adcport_core::hal::AdcPeripheral;
use adcport_core::{AdcError, PinMapper, Reading, Resource, ResourceState};
use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use heapless::Vec;

use crate::entry::EntryPoint;
use crate::handle::{AdcHandle, ResourceToken};
use crate::options;
use crate::reply::Reply;
use crate::term::Term;

/// Resources that can be open at once
pub const TABLE_CAPACITY: usize = 4;

/// Resource type id stamped into every token this driver mints
pub const ADC_RESOURCE_TYPE: u32 = u32::from_be_bytes(*b"adc\0");

struct Occupant<R> {
    reference: u64,
    resource: R,
}

struct Slot<R> {
    generation: u32,
    occupant: Option<Occupant<R>>,
}

/// Entry point implementation over one ADC peripheral
///
/// `M` is the lock each open resource serializes its unit with.
pub struct AdcDriver<
    P: AdcPeripheral,
    const N: usize = TABLE_CAPACITY,
    M: RawMutex = CriticalSectionRawMutex,
> {
    peripheral: P,
    mapper: PinMapper,
    resource_type: u32,
    slots: Vec<Slot<Resource<P::Unit, M>>, N>,
    next_reference: u64,
}

impl<P: AdcPeripheral> AdcDriver<P> {
    /// Create a driver using the compiled pin table
    pub fn new(peripheral: P) -> Self {
        Self::with_mapper(peripheral, PinMapper::active())
    }
}

impl<P: AdcPeripheral, const N: usize, M: RawMutex> AdcDriver<P, N, M> {
    // Slot indices travel in a u16 token field
    const SLOT_INDEX_FITS: () = assert!(
        N <= u16::MAX as usize + 1,
        "table capacity exceeds u16 slots"
    );

    /// Create a driver with an explicit pin table
    pub fn with_mapper(peripheral: P, mapper: PinMapper) -> Self {
        let () = Self::SLOT_INDEX_FITS;
        Self {
            peripheral,
            mapper,
            resource_type: ADC_RESOURCE_TYPE,
            slots: Vec::new(),
            next_reference: 0,
        }
    }

    /// Number of handles the host still holds
    pub fn open_handles(&self) -> usize {
        self.slots.iter().filter(|s| s.occupant.is_some()).count()
    }

    fn free_slot(&mut self) -> Option<usize> {
        if let Some(index) = self.slots.iter().position(|s| s.occupant.is_none()) {
            return Some(index);
        }
        let index = self.slots.len();
        self.slots
            .push(Slot {
                generation: 0,
                occupant: None,
            })
            .ok()
            .map(|_| index)
    }

    fn resource(&self, handle: Term<'_>) -> Result<&Resource<P::Unit, M>, AdcError> {
        let handle = AdcHandle::from_term(handle)?;
        let token = handle.token;
        if token.resource_type != self.resource_type {
            log::debug!("foreign resource type {:#x}", token.resource_type);
            return Err(AdcError::BadArgument);
        }

        match self.slots.get(usize::from(token.slot)) {
            Some(Slot {
                generation,
                occupant: Some(occupant),
            }) if *generation == token.generation && occupant.reference == handle.reference => {
                // Closed resources reject every call before its arguments are decoded
                match occupant.resource.state() {
                    ResourceState::Open => Ok(&occupant.resource),
                    ResourceState::Closed => Err(AdcError::InvalidResource),
                }
            }
            _ => {
                log::debug!(
                    "stale or forged ADC handle (slot {}, generation {})",
                    token.slot,
                    token.generation
                );
                Err(AdcError::BadArgument)
            }
        }
    }

    /// Open a unit and hand out a handle
    pub fn open(&mut self, unit: Term<'_>) -> Result<AdcHandle, AdcError> {
        let unit = options::decode_unit(unit, &self.mapper)?;
        let resource: Resource<P::Unit, M> =
            Resource::open(&mut self.peripheral, unit, self.mapper)?;

        let Some(index) = self.free_slot() else {
            log::warn!("ADC resource table full ({} open)", N);
            if let Err(e) = resource.close() {
                log::error!("failed to release unit {}: {}", unit.number(), e);
            }
            return Err(AdcError::OutOfMemory);
        };

        self.next_reference = self.next_reference.wrapping_add(1);
        let reference = self.next_reference;
        let slot = &mut self.slots[index];
        slot.occupant = Some(Occupant {
            reference,
            resource,
        });

        Ok(AdcHandle {
            token: ResourceToken {
                resource_type: self.resource_type,
                slot: index as u16,
                generation: slot.generation,
            },
            reference,
        })
    }

    /// Close the resource behind a handle
    pub fn close(&self, handle: Term<'_>) -> Result<(), AdcError> {
        self.resource(handle)?.close()
    }

    /// Program width and attenuation for a pin
    pub fn configure(&self, handle: Term<'_>, pin: Term<'_>, opts: Term<'_>) -> Result<(), AdcError> {
        let resource = self.resource(handle)?;
        let pin = options::decode_pin(pin)?;
        let request = options::decode_channel(opts)?;
        resource.configure(pin, &request).map(|_| ())
    }

    /// Create a calibration for a pin
    pub fn configure_calibration(
        &self,
        handle: Term<'_>,
        pin: Term<'_>,
        opts: Term<'_>,
    ) -> Result<(), AdcError> {
        let resource = self.resource(handle)?;
        let pin = options::decode_pin(pin)?;
        let request = options::decode_calibration(opts)?;
        resource.configure_calibration(pin, &request).map(|_| ())
    }

    /// Release a pin's calibration
    pub fn release_calibration(&self, handle: Term<'_>, pin: Term<'_>) -> Result<(), AdcError> {
        let resource = self.resource(handle)?;
        let pin = options::decode_pin(pin)?;
        resource.release_calibration(pin).map(|_| ())
    }

    /// Take an averaged reading
    pub fn read(&self, handle: Term<'_>, pin: Term<'_>, opts: Term<'_>) -> Result<Reading, AdcError> {
        let resource = self.resource(handle)?;
        let pin = options::decode_pin(pin)?;
        let read = options::decode_read(opts)?;
        resource.read(pin, &read)
    }

    /// Drop the resource behind a handle the host no longer references
    ///
    /// The unit is released if it is still open; failures are only logged.
    /// Returns `false` for tokens that do not name a live slot.
    pub fn abandon(&mut self, token: ResourceToken) -> bool {
        if token.resource_type != self.resource_type {
            return false;
        }
        let Some(slot) = self.slots.get_mut(usize::from(token.slot)) else {
            return false;
        };
        if slot.generation != token.generation {
            return false;
        }
        match slot.occupant.take() {
            Some(occupant) => {
                slot.generation = slot.generation.wrapping_add(1);
                log::debug!("ADC handle in slot {} abandoned", token.slot);
                drop(occupant);
                true
            }
            None => false,
        }
    }

    /// Dispatch one entry point call
    pub fn call(&mut self, entry: EntryPoint, args: &[Term<'_>]) -> Reply {
        if args.len() != entry.arity() {
            log::debug!("{} called with {} arguments", entry.name(), args.len());
            return AdcError::BadArgument.into();
        }

        match entry {
            EntryPoint::Init => reply(entry, self.open(args[0]), Reply::Handle),
            EntryPoint::Close => reply(entry, self.close(args[0]), |_| Reply::Ok),
            EntryPoint::ConfigChannel => {
                reply(entry, self.configure(args[0], args[1], args[2]), |_| Reply::Ok)
            }
            EntryPoint::ConfigCalibration => reply(
                entry,
                self.configure_calibration(args[0], args[1], args[2]),
                |_| Reply::Ok,
            ),
            EntryPoint::ReleaseCalibration => {
                reply(entry, self.release_calibration(args[0], args[1]), |_| Reply::Ok)
            }
            EntryPoint::TakeReading => {
                reply(entry, self.read(args[0], args[1], args[2]), Reply::Reading)
            }
        }
    }

    /// Dispatch by registered name
    ///
    /// Returns `None` when the name is not one of this driver's entry points.
    pub fn call_by_name(&mut self, name: &str, args: &[Term<'_>]) -> Option<Reply> {
        EntryPoint::from_name(name).map(|entry| self.call(entry, args))
    }
}

/// Log a failed call at a level matching its cause, then build the reply
fn reply<T>(entry: EntryPoint, result: Result<T, AdcError>, ok: impl FnOnce(T) -> Reply) -> Reply {
    if let Err(e) = &result {
        if e.is_validation() {
            log::debug!("{} rejected: {}", entry.name(), e);
        } else {
            log::error!("{} failed: {}", entry.name(), e);
        }
    }
    Reply::from_result(result, ok)
}
