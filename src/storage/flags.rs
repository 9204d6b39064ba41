//! Dictionary membership bitmask encoding
//!
//! Dictionary memberships are stored as a fixed-width bitmask (one bit per
//! registered dictionary) instead of a nested object per word. The registry
//! mapping names to bit positions is data loaded from the store at
//! initialization, so adding a dictionary is a schema seed change, not code.

use std::collections::HashMap;

/// Static name -> bit position registry, loaded once per store.
#[derive(Debug, Clone)]
pub struct DictRegistry {
    entries: Vec<(String, u8)>,
}

impl DictRegistry {
    pub fn new(entries: Vec<(String, u8)>) -> Self {
        Self { entries }
    }

    /// Registered dictionary names with their bit positions
    pub fn entries(&self) -> &[(String, u8)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert a membership map to a bitmask.
    ///
    /// Names absent from the registry are silently ignored; names absent
    /// from the input count as false. Total, never fails.
    pub fn encode(&self, memberships: &HashMap<String, bool>) -> u64 {
        let mut flags = 0u64;
        for (name, bit) in &self.entries {
            if memberships.get(name).copied().unwrap_or(false) {
                flags |= 1 << bit;
            }
        }
        flags
    }

    /// Expand a bitmask to a registry-complete membership map.
    pub fn decode(&self, flags: u64) -> HashMap<String, bool> {
        self.entries
            .iter()
            .map(|(name, bit)| (name.clone(), flags & (1 << bit) != 0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::DEFAULT_DICTIONARIES;

    fn registry() -> DictRegistry {
        DictRegistry::new(
            DEFAULT_DICTIONARIES
                .iter()
                .map(|(name, bit)| (name.to_string(), *bit))
                .collect(),
        )
    }

    #[test]
    fn test_encode_sets_registered_bits() {
        let registry = registry();
        let mut memberships = HashMap::new();
        memberships.insert("octordle".to_string(), true);
        memberships.insert("wordle".to_string(), true);
        memberships.insert("sowpods".to_string(), false);

        let flags = registry.encode(&memberships);
        assert_eq!(flags, (1 << 0) | (1 << 4));
    }

    #[test]
    fn test_encode_ignores_unknown_names() {
        let registry = registry();
        let mut memberships = HashMap::new();
        memberships.insert("klingon".to_string(), true);
        assert_eq!(registry.encode(&memberships), 0);
    }

    #[test]
    fn test_decode_round_trip_fills_defaults() {
        let registry = registry();
        let mut memberships = HashMap::new();
        memberships.insert("quordle".to_string(), true);

        let decoded = registry.decode(registry.encode(&memberships));
        assert_eq!(decoded.len(), registry.len());
        assert!(decoded["quordle"]);
        for name in ["octordle", "otcwl", "sowpods", "wordle", "wwf"] {
            assert!(!decoded[name], "{} should default to false", name);
        }
    }

    #[test]
    fn test_empty_input_encodes_to_zero() {
        let registry = registry();
        assert_eq!(registry.encode(&HashMap::new()), 0);
    }
}
