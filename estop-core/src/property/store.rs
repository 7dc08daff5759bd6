//! Fixed property table owned by each channel

use estop_protocol::{PropertyId, MAX_VALUE_LEN};

use super::{PropertyValue, AGE_NEVER_MS};

/// Per-channel table of the last value received for each property
///
/// Entries are never removed; they only age.
#[derive(Debug, Clone)]
pub struct PropertyStore {
    values: [PropertyValue; PropertyId::COUNT],
}

impl Default for PropertyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyStore {
    pub fn new() -> Self {
        Self {
            values: core::array::from_fn(|_| PropertyValue::never()),
        }
    }

    pub fn get(&self, id: PropertyId) -> &PropertyValue {
        &self.values[id.index()]
    }

    /// Record a receipt
    ///
    /// Resets the age to zero. A value longer than the table can hold is
    /// stored as empty, which decodes as stop.
    pub fn refresh(&mut self, id: PropertyId, bytes: &[u8]) {
        let entry = &mut self.values[id.index()];
        entry.bytes.clear();
        if bytes.len() <= MAX_VALUE_LEN {
            // Cannot fail, length checked above
            let _ = entry.bytes.extend_from_slice(bytes);
        }
        entry.age_ms = 0;
    }

    /// Age every entry by `dt_ms`
    pub fn tick(&mut self, dt_ms: u32) {
        for value in self.values.iter_mut() {
            value.age_ms = value.age_ms.saturating_add(dt_ms).min(AGE_NEVER_MS);
        }
    }

    /// Forget every value
    pub fn clear(&mut self) {
        for value in self.values.iter_mut() {
            *value = PropertyValue::never();
        }
    }
}
