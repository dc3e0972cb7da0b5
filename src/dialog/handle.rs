//! Shared registry handle
//!
//! The application builds one registry and hands clones of this handle to
//! every consumer. Handlers always run with the lock released so they can
//! open or destroy dialogs themselves.

use super::{registry::DialogRegistry, types::*};
use anyhow::Result;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cloneable handle to a single shared [`DialogRegistry`]
#[derive(Debug, Clone, Default)]
pub struct RegistryHandle {
    inner: Arc<Mutex<DialogRegistry>>,
}

impl RegistryHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, form: Vec<FormItem>, config: DialogConfig) -> DialogKey {
        self.lock().create(form, config)
    }

    pub fn show(&self, key: DialogKey) {
        self.lock().show(key);
    }

    pub fn hide(&self, key: DialogKey) {
        self.lock().hide(key);
    }

    pub fn destroy(&self, key: DialogKey) {
        self.lock().destroy(key);
    }

    pub fn submit(&self, key: DialogKey, data: &[FormItem]) -> Result<Option<Completion>> {
        let Some(handler) = self.lock().handler(key) else {
            return Ok(None);
        };

        let completion = handler.on_submit(data)?;
        self.lock().apply(key, completion);
        Ok(Some(completion))
    }

    pub fn request_close(&self, key: DialogKey) -> Result<Option<Completion>> {
        let Some(handler) = self.lock().handler(key) else {
            return Ok(None);
        };

        let completion = handler.on_close()?;
        self.lock().apply(key, completion);
        Ok(Some(completion))
    }

    /// Visibility of a dialog, `None` if it is not registered
    pub fn is_visible(&self, key: DialogKey) -> Option<bool> {
        self.lock().get(key).map(DialogInstance::is_visible)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Run `f` against the registry while holding the lock
    ///
    /// Do not call back into this handle from `f`.
    pub fn with<R>(&self, f: impl FnOnce(&mut DialogRegistry) -> R) -> R {
        f(&mut self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, DialogRegistry> {
        // Every registry mutation is a single step; a poisoned lock still guards a consistent list.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
