use crate::models::engine::Lane;
use crate::models::settings::KeybindSettings;
use std::collections::HashMap;

/// Maps key names to lanes.
///
/// Names are matched case-insensitively, and a `Key` prefix on a single
/// letter or digit is ignored, so `"A"`, `"a"` and `"KeyA"` are the same key.
#[derive(Debug, Clone, Default)]
pub struct KeyBindings {
    lane_binds: HashMap<String, Lane>,
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::from_settings(&KeybindSettings::default())
    }

    pub fn from_settings(settings: &KeybindSettings) -> Self {
        let mut bindings = Self::default();
        let columns = [
            (Lane::Left, &settings.left),
            (Lane::Down, &settings.down),
            (Lane::Up, &settings.up),
            (Lane::Right, &settings.right),
        ];
        for (lane, keys) in columns {
            for key in keys {
                bindings.bind(key, lane);
            }
        }
        bindings
    }

    /// Binds `key` to `lane`, replacing any previous binding of that key.
    pub fn bind(&mut self, key: &str, lane: Lane) {
        let name = normalize_key(key);
        if name.is_empty() {
            log::warn!("INPUT: ignoring empty key name for {:?}", lane);
            return;
        }
        if let Some(previous) = self.lane_binds.insert(name, lane)
            && previous != lane
        {
            log::warn!("INPUT: key '{}' rebound from {:?} to {:?}", key, previous, lane);
        }
    }

    pub fn resolve(&self, key: &str) -> Option<Lane> {
        self.lane_binds.get(&normalize_key(key)).copied()
    }

    /// Normalized names of the keys bound to `lane`, sorted.
    pub fn keys_for(&self, lane: Lane) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .lane_binds
            .iter()
            .filter(|(_, l)| **l == lane)
            .map(|(k, _)| k.as_str())
            .collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.lane_binds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lane_binds.is_empty()
    }
}

/// Canonical form of a key name: `"A"`, `"a"` and `"KeyA"` all map to `"a"`.
pub(crate) fn normalize_key(key: &str) -> String {
    let lower = key.trim().to_ascii_lowercase();
    match lower.strip_prefix("key") {
        Some(rest) if rest.len() == 1 => rest.to_string(),
        _ => lower,
    }
}
