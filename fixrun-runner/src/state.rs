// Copyright (c) The fixrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-fixture-instance state carried from setup to case bodies to teardown.

use smol_str::SmolStr;
use std::{any::Any, collections::BTreeMap, fmt};

/// String-keyed storage owned by exactly one fixture instance.
///
/// Created empty when the fixture instance starts, visible to every hook and
/// case body of that instance, and dropped when the instance finishes. No
/// other fixture instance can observe it.
#[derive(Default)]
pub struct FixtureState {
    values: BTreeMap<SmolStr, Box<dyn Any + Send>>,
}

impl FixtureState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value under the given key, replacing any previous value.
    pub fn insert<T: Any + Send>(&mut self, key: impl AsRef<str>, value: T) {
        self.values
            .insert(SmolStr::new(key.as_ref()), Box::new(value));
    }

    /// Returns a reference to the value stored under `key`, if present and of
    /// the requested type.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|v| v.downcast_ref())
    }

    /// Returns a mutable reference to the value stored under `key`, if
    /// present and of the requested type.
    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.values.get_mut(key).and_then(|v| v.downcast_mut())
    }

    /// Removes and returns the value stored under `key`, if present and of
    /// the requested type.
    pub fn remove<T: Any>(&mut self, key: &str) -> Option<T> {
        // Put the value back if it is of a different type than requested.
        let value = self.values.remove(key)?;
        match value.downcast::<T>() {
            Ok(value) => Some(*value),
            Err(value) => {
                self.values.insert(SmolStr::new(key), value);
                None
            }
        }
    }

    /// Returns true if a value is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// The number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for FixtureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureState")
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}
