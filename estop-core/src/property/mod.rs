//! Property values as seen by one channel
//!
//! A value is the raw bytes last received for a property plus the time since
//! that receipt. Interpretation as a flag always fails toward "stop".

pub mod store;

pub use store::PropertyStore;

use estop_protocol::MAX_VALUE_LEN;
use heapless::Vec;

/// Age of a property that has never been received
///
/// Large enough to lose every freshness comparison, small enough that adding
/// a latency bias cannot wrap.
pub const AGE_NEVER_MS: u32 = u32::MAX / 2;

/// Flag encodings on the wire
pub const FLAG_TRUE: u8 = 0xFF;
pub const FLAG_FALSE: u8 = 0x00;

/// Raw bytes of one property
pub type ValueBytes = Vec<u8, MAX_VALUE_LEN>;

/// Last received value of one property on one channel
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PropertyValue {
    /// Raw bytes, empty if never received or malformed
    pub bytes: ValueBytes,
    /// Milliseconds since receipt
    pub age_ms: u32,
}

impl Default for PropertyValue {
    fn default() -> Self {
        Self::never()
    }
}

impl PropertyValue {
    /// A property that has never been received
    pub const fn never() -> Self {
        Self {
            bytes: Vec::new(),
            age_ms: AGE_NEVER_MS,
        }
    }

    /// Interpret the bytes as a safety flag
    pub fn flag(&self) -> bool {
        decode_flag(&self.bytes)
    }

    pub fn is_never_received(&self) -> bool {
        self.age_ms >= AGE_NEVER_MS
    }
}

/// Decode a safety flag
///
/// Missing data means "stop": an empty value decodes as `true`.
pub fn decode_flag(bytes: &[u8]) -> bool {
    bytes.first().map_or(true, |&b| b != 0)
}

/// Encode a safety flag
pub fn encode_flag(active: bool) -> [u8; 1] {
    if active {
        [FLAG_TRUE]
    } else {
        [FLAG_FALSE]
    }
}
