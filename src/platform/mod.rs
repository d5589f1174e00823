//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time (`performance.now()` on web, a process-relative clock natively)
//! - Storage (LocalStorage on web, unavailable natively)

use crate::persistence::PersistError;

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Result<web_sys::Storage, PersistError> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
        .ok_or(PersistError::Unavailable)
}

/// Read a LocalStorage item
#[cfg(target_arch = "wasm32")]
pub fn storage_get(key: &str) -> Result<Option<String>, PersistError> {
    local_storage()?
        .get_item(key)
        .map_err(|_| PersistError::Unavailable)
}

/// Write a LocalStorage item
#[cfg(target_arch = "wasm32")]
pub fn storage_set(key: &str, value: &str) -> Result<(), PersistError> {
    local_storage()?
        .set_item(key, value)
        .map_err(|_| PersistError::Unavailable)
}

/// Milliseconds from the page's time origin
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn storage_get(_key: &str) -> Result<Option<String>, PersistError> {
    Err(PersistError::Unavailable)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn storage_set(_key: &str, _value: &str) -> Result<(), PersistError> {
    Err(PersistError::Unavailable)
}

/// Milliseconds since the first call in this process
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static ORIGIN: OnceLock<Instant> = OnceLock::new();
    ORIGIN.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
}
