use std::cell::RefCell;
use std::collections::HashMap;

use tracing::{debug, warn};

use crate::format::Precision;

pub const COMPACT_MODE_KEY: &str = "countdown_todo_compact_mode";
pub const COMPACT_PRECISION_KEY: &str = "countdown_todo_compact_precision";

/// String key/value storage that survives restarts, such as the WebView's
/// `localStorage`.
pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> Option<String>;

    fn set_item(&self, key: &str, value: &str);
}

/// In-process storage, used by tests and hosts without persistence.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    map: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.map.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.map
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

/// Local UI preferences kept outside the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Preferences {
    pub compact_mode: bool,
    pub compact_precision: Precision,
}

impl Preferences {
    /// Read once at startup. Unknown values fall back to defaults.
    #[tracing::instrument(skip_all)]
    pub fn load(storage: &impl KeyValueStorage) -> Self {
        let compact_mode = storage
            .get_item(COMPACT_MODE_KEY)
            .is_some_and(|raw| raw == "1");

        let compact_precision = match storage.get_item(COMPACT_PRECISION_KEY) {
            None => Precision::default(),
            Some(raw) => Precision::parse(&raw).unwrap_or_else(|| {
                warn!(value = %raw, "unknown compact precision in storage; using default");
                Precision::default()
            }),
        };

        debug!(
            compact_mode,
            precision = compact_precision.as_str(),
            "loaded preferences"
        );

        Self {
            compact_mode,
            compact_precision,
        }
    }

    pub fn save_compact_mode(&self, storage: &impl KeyValueStorage) {
        storage.set_item(COMPACT_MODE_KEY, if self.compact_mode { "1" } else { "0" });
    }

    pub fn save_precision(&self, storage: &impl KeyValueStorage) {
        storage.set_item(COMPACT_PRECISION_KEY, self.compact_precision.as_str());
    }
}
