//! Mapping from wire key IDs to logical key codes.

use heapless::Vec;

/// Maximum number of keys a single controller exposes. The wire ID is a
/// 4-bit field, but platform key tables top out at four entries.
pub const MAX_KEYS: usize = 4;

/// Opaque platform-defined key symbol understood by the input sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCode(pub u16);

/// "Recents" key of the built-in default layout.
pub const KEY_RECENT: KeyCode = KeyCode(254);
/// "Back" key of the built-in default layout.
pub const KEY_BACK: KeyCode = KeyCode(158);

/// Key table indexed by the 1-based wire key ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    codes: Vec<KeyCode, MAX_KEYS>,
}

impl KeyMap {
    /// Builds a map from platform-supplied codes.
    ///
    /// Returns `None` when more than [`MAX_KEYS`] codes are given.
    pub fn new(codes: &[KeyCode]) -> Option<Self> {
        Vec::from_slice(codes).ok().map(|codes| Self { codes })
    }

    /// The two-key layout used when the platform supplies no codes.
    pub fn default_layout() -> Self {
        let mut codes = Vec::new();
        // Two entries always fit MAX_KEYS.
        let _ = codes.push(KEY_RECENT);
        let _ = codes.push(KEY_BACK);
        Self { codes }
    }

    pub fn key_count(&self) -> u8 {
        self.codes.len() as u8
    }

    /// Code registered for a 1-based wire ID.
    pub fn code_for(&self, id: u8) -> Option<KeyCode> {
        id.checked_sub(1)
            .and_then(|index| self.codes.get(index as usize).copied())
    }

    pub fn codes(&self) -> &[KeyCode] {
        &self.codes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_is_recent_and_back() {
        let map = KeyMap::default_layout();
        assert_eq!(map.key_count(), 2);
        assert_eq!(map.codes(), &[KEY_RECENT, KEY_BACK]);
    }

    #[test]
    fn code_lookup_is_one_based() {
        let map = KeyMap::new(&[KeyCode(10), KeyCode(20), KeyCode(30)]).unwrap();
        assert_eq!(map.code_for(1), Some(KeyCode(10)));
        assert_eq!(map.code_for(3), Some(KeyCode(30)));
        assert_eq!(map.code_for(0), None);
        assert_eq!(map.code_for(4), None);
    }

    #[test]
    fn rejects_oversized_tables() {
        let codes = [KeyCode(1); MAX_KEYS + 1];
        assert!(KeyMap::new(&codes).is_none());
    }
}
