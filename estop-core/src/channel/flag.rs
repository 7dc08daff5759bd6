//! Interrupt-to-loop completion flag

use portable_atomic::{AtomicBool, Ordering};

/// Single-bit event set from interrupt context and consumed by the poll loop
///
/// Set with release ordering, read-and-cleared with acquire ordering, so data
/// written before `signal` is visible after a successful `take`.
#[derive(Debug, Default)]
pub struct CompletionFlag {
    set: AtomicBool,
}

impl CompletionFlag {
    pub const fn new() -> Self {
        Self {
            set: AtomicBool::new(false),
        }
    }

    /// Mark the operation complete (interrupt side)
    pub fn signal(&self) {
        self.set.store(true, Ordering::Release);
    }

    /// Consume the completion (loop side)
    pub fn take(&self) -> bool {
        self.set.swap(false, Ordering::Acquire)
    }

    pub fn is_set(&self) -> bool {
        self.set.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_clears() {
        let flag = CompletionFlag::new();
        assert!(!flag.take());

        flag.signal();
        flag.signal();
        assert!(flag.is_set());
        assert!(flag.take());
        assert!(!flag.take());
    }
}
