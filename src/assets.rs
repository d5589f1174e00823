//! User-supplied assets
//!
//! A custom avatar image and two custom clips can be swapped in at any time,
//! including mid-run. Consumers read the slot on their next draw or cue, so a
//! swap never touches simulation state.

/// One replaceable asset plus whether it finished loading
#[derive(Debug)]
pub struct AssetSlot<T> {
    asset: Option<T>,
    ready: bool,
}

impl<T> Default for AssetSlot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> AssetSlot<T> {
    pub fn empty() -> Self {
        Self {
            asset: None,
            ready: false,
        }
    }

    /// Install a new asset (not yet ready); returns the one it replaced
    pub fn replace(&mut self, asset: T) -> Option<T> {
        self.ready = false;
        self.asset.replace(asset)
    }

    /// The pending asset finished loading
    pub fn mark_ready(&mut self) {
        self.ready = self.asset.is_some();
    }

    /// Loading failed; drop back to the built-in fallback
    pub fn mark_failed(&mut self) -> Option<T> {
        self.ready = false;
        self.asset.take()
    }

    /// The asset, only once it is usable
    pub fn ready(&self) -> Option<&T> {
        if self.ready { self.asset.as_ref() } else { None }
    }

    /// The asset regardless of readiness (for stopping playback)
    pub fn get(&self) -> Option<&T> {
        self.asset.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }
}

/// Object URL bookkeeping for one upload input (browser only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct ObjectUrl {
    url: Option<String>,
}

#[cfg(target_arch = "wasm32")]
impl ObjectUrl {
    /// Create a URL for `file`, revoking the previous one
    pub fn replace(&mut self, file: &web_sys::File) -> Option<String> {
        if let Some(old) = self.url.take() {
            let _ = web_sys::Url::revoke_object_url(&old);
        }
        match web_sys::Url::create_object_url_with_blob(file) {
            Ok(url) => {
                self.url = Some(url.clone());
                Some(url)
            }
            Err(_) => {
                log::warn!("Could not create an object URL for the upload");
                None
            }
        }
    }
}
