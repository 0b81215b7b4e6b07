//! Per-selector replay counters

use alloy_primitives::Selector;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Monotonic nonce per operation selector, starting at zero
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceStore {
    counters: HashMap<Selector, u64>,
}

impl NonceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current counter for `selector`
    pub fn current(&self, selector: &Selector) -> u64 {
        self.counters.get(selector).copied().unwrap_or(0)
    }

    /// Consume the current nonce, returning the value that was used
    ///
    /// Only the dispatcher advances nonces, and only after a call has been
    /// fully validated.
    pub(crate) fn advance(&mut self, selector: Selector) -> u64 {
        let counter = self.counters.entry(selector).or_insert(0);
        let used = *counter;
        *counter += 1;
        used
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero() {
        let store = NonceStore::new();
        assert_eq!(store.current(&Selector::from([1, 2, 3, 4])), 0);
    }

    #[test]
    fn test_advance_per_selector() {
        let mut store = NonceStore::new();
        let a = Selector::repeat_byte(0xaa);
        let b = Selector::repeat_byte(0xbb);

        assert_eq!(store.advance(a), 0);
        assert_eq!(store.advance(a), 1);
        assert_eq!(store.current(&a), 2);
        assert_eq!(store.current(&b), 0);

        assert_eq!(store.advance(b), 0);
        assert_eq!(store.current(&b), 1);
        assert_eq!(store.current(&a), 2);
    }
}
