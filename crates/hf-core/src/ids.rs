use core::fmt;
use core::num::NonZeroU32;
use std::collections::HashMap;

use crate::{HfError, HfResult};

/// Dense registry index. Stored as index+1 so `Option<Id>` stays 4 bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(NonZeroU32);

impl Id {
    /// Create an Id from a 0-based registration index.
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::new(index + 1).expect("index+1 is nonzero"))
    }

    /// Recover the 0-based index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }

    /// Index as `usize`, for slice access.
    pub fn slot(self) -> usize {
        self.index() as usize
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

pub type CompId = Id;
pub type AgentId = Id;
pub type LinkId = Id;

/// Maps user-facing string identifiers to dense ids in registration order.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    names: Vec<String>,
    lookup: HashMap<String, Id>,
}

impl NameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new name. Names must be unique and non-empty.
    pub fn insert(&mut self, name: impl Into<String>) -> HfResult<Id> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(HfError::InvalidArg {
                what: "identifier must not be empty",
            });
        }
        if self.lookup.contains_key(&name) {
            return Err(HfError::DuplicateName { name });
        }
        let id = Id::from_index(self.names.len() as u32);
        self.lookup.insert(name.clone(), id);
        self.names.push(name);
        Ok(id)
    }

    pub fn get(&self, name: &str) -> Option<Id> {
        self.lookup.get(name).copied()
    }

    pub fn require(&self, name: &str) -> HfResult<Id> {
        self.get(name).ok_or_else(|| HfError::UnknownName {
            name: name.to_string(),
        })
    }

    pub fn name(&self, id: Id) -> Option<&str> {
        self.names.get(id.slot()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (Id, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, n)| (Id::from_index(i as u32), n.as_str()))
    }
}
