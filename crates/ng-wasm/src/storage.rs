//! Browser `localStorage` as a [`KeyValueStore`].

use ng_store::{KeyValueStore, Result, StoreError};
use wasm_bindgen::JsValue;
use web_sys::Storage;

pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    /// The window's `localStorage`, or `None` when the page has no access
    /// to it (disabled storage, sandboxed frames).
    pub fn open() -> Option<Self> {
        let window = web_sys::window()?;
        match window.local_storage() {
            Ok(Some(storage)) => Some(Self { storage }),
            Ok(None) => None,
            Err(e) => {
                log::warn!("localStorage blocked: {}", describe(&e));
                None
            }
        }
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage.get_item(key).map_err(backend)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.storage.set_item(key, value).map_err(backend)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.storage.remove_item(key).map_err(backend)
    }
}

fn backend(e: JsValue) -> StoreError {
    StoreError::Backend(describe(&e))
}

fn describe(e: &JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{e:?}"))
}
