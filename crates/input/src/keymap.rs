use fpview_common::Key;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maps raw platform key codes to logical keys.
///
/// Codes use the W3C `KeyboardEvent.code` names (`KeyW`, `ArrowUp`, ...),
/// which is also how winit names its physical key codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyMap {
    bindings: BTreeMap<String, Key>,
}

impl Default for KeyMap {
    /// Arrow keys and WASD.
    fn default() -> Self {
        let mut map = Self::empty();
        for (code, key) in [
            ("ArrowUp", Key::Forward),
            ("ArrowDown", Key::Backward),
            ("ArrowLeft", Key::Left),
            ("ArrowRight", Key::Right),
            ("KeyW", Key::Forward),
            ("KeyS", Key::Backward),
            ("KeyA", Key::Left),
            ("KeyD", Key::Right),
        ] {
            map.bind(code, key);
        }
        map
    }
}

impl KeyMap {
    pub fn empty() -> Self {
        Self {
            bindings: BTreeMap::new(),
        }
    }

    /// Bind `code` to `key`, replacing any previous binding for that code.
    pub fn bind(&mut self, code: impl Into<String>, key: Key) {
        self.bindings.insert(code.into(), key);
    }

    pub fn unbind(&mut self, code: &str) -> Option<Key> {
        self.bindings.remove(code)
    }

    /// Apply overrides on top of the current bindings.
    pub fn extend(&mut self, overrides: &KeyMap) {
        for (code, key) in &overrides.bindings {
            tracing::debug!(code = code.as_str(), ?key, "key binding override");
            self.bindings.insert(code.clone(), *key);
        }
    }

    pub fn lookup(&self, code: &str) -> Option<Key> {
        self.bindings.get(code).copied()
    }

    /// Every code bound to `key`, in sorted order.
    pub fn codes_for(&self, key: Key) -> Vec<&str> {
        self.bindings
            .iter()
            .filter(|(_, k)| **k == key)
            .map(|(c, _)| c.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_covers_arrows_and_wasd() {
        let map = KeyMap::default();
        assert_eq!(map.len(), 8);
        assert_eq!(map.codes_for(Key::Forward), vec!["ArrowUp", "KeyW"]);
        assert_eq!(map.lookup("KeyD"), Some(Key::Right));
        assert_eq!(map.lookup("Space"), None);
    }

    #[test]
    fn overrides_replace_and_add() {
        let mut map = KeyMap::default();
        let mut overrides = KeyMap::empty();
        overrides.bind("KeyW", Key::Backward);
        overrides.bind("KeyI", Key::Forward);
        map.extend(&overrides);
        assert_eq!(map.lookup("KeyW"), Some(Key::Backward));
        assert_eq!(map.lookup("KeyI"), Some(Key::Forward));
        assert_eq!(map.len(), 9);
    }

    #[test]
    fn unbind_removes_code() {
        let mut map = KeyMap::default();
        assert_eq!(map.unbind("ArrowUp"), Some(Key::Forward));
        assert_eq!(map.lookup("ArrowUp"), None);
        assert!(KeyMap::empty().is_empty());
    }
}
