//! Fixed-size owner set
//!
//! Exactly three distinct, non-zero owners at all times. Owners are swapped
//! in place one at a time; the slot order is part of the observable state.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Number of owners, and therefore the number of required signatures
pub const OWNER_COUNT: usize = 3;

/// Errors related to owner set changes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OwnerError {
    #[error("Duplicate owner: {0}")]
    DuplicateOwner(Address),
    #[error("Not an owner: {0}")]
    NotAnOwner(Address),
    #[error("Owner cannot be the zero address")]
    ZeroAddress,
}

/// Ownership change record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerChange {
    pub old_owner: Address,
    pub new_owner: Address,
}

/// The ordered owner set with a reverse address -> slot index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "[Address; OWNER_COUNT]", into = "[Address; OWNER_COUNT]")]
pub struct OwnerRegistry {
    owners: [Address; OWNER_COUNT],
    slots: HashMap<Address, usize>,
}

impl OwnerRegistry {
    /// Create the registry, rejecting zero or repeated owners
    pub fn new(owners: [Address; OWNER_COUNT]) -> Result<Self, OwnerError> {
        let mut slots = HashMap::with_capacity(OWNER_COUNT);
        for (slot, owner) in owners.iter().enumerate() {
            if owner.is_zero() {
                return Err(OwnerError::ZeroAddress);
            }
            if slots.insert(*owner, slot).is_some() {
                return Err(OwnerError::DuplicateOwner(*owner));
            }
        }
        Ok(Self { owners, slots })
    }

    pub fn is_owner(&self, account: &Address) -> bool {
        self.slots.contains_key(account)
    }

    /// Owners in slot order
    pub fn owners(&self) -> [Address; OWNER_COUNT] {
        self.owners
    }

    /// Validate a replacement and return the slot `old_owner` occupies
    pub fn check_replace(&self, old_owner: &Address, new_owner: &Address) -> Result<usize, OwnerError> {
        let slot = *self
            .slots
            .get(old_owner)
            .ok_or(OwnerError::NotAnOwner(*old_owner))?;
        if new_owner.is_zero() {
            return Err(OwnerError::ZeroAddress);
        }
        if self.is_owner(new_owner) {
            return Err(OwnerError::DuplicateOwner(*new_owner));
        }
        Ok(slot)
    }

    /// Overwrite a slot already validated by [`check_replace`](Self::check_replace)
    pub(crate) fn swap_slot(&mut self, slot: usize, new_owner: Address) -> OwnerChange {
        let old_owner = std::mem::replace(&mut self.owners[slot], new_owner);
        self.slots.remove(&old_owner);
        self.slots.insert(new_owner, slot);

        log::info!("Owner changed in slot {}: {} -> {}", slot, old_owner, new_owner);

        OwnerChange {
            old_owner,
            new_owner,
        }
    }
}

impl TryFrom<[Address; OWNER_COUNT]> for OwnerRegistry {
    type Error = OwnerError;

    fn try_from(owners: [Address; OWNER_COUNT]) -> Result<Self, Self::Error> {
        Self::new(owners)
    }
}

impl From<OwnerRegistry> for [Address; OWNER_COUNT] {
    fn from(registry: OwnerRegistry) -> Self {
        registry.owners
    }
}
