//! Dialog registry
//!
//! Holds every live dialog in insertion order, which is also the order the
//! renderer stacks them in. Lookups scan linearly for the first matching key;
//! only a handful of dialogs are ever open at once.

use super::types::*;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, trace};

/// Ordered collection of dialog instances
#[derive(Debug, Default)]
pub struct DialogRegistry {
    /// Live dialogs (last = topmost)
    dialogs: Vec<DialogInstance>,

    /// Key handed to the next created dialog
    next_key: u64,
}

impl DialogRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new visible dialog and return its key
    pub fn create(&mut self, form: Vec<FormItem>, config: DialogConfig) -> DialogKey {
        let key = DialogKey(self.next_key);
        self.next_key += 1;

        debug!(%key, title = %config.title, fields = form.len(), "Creating dialog");
        self.dialogs.push(DialogInstance {
            key,
            visible: false,
            form,
            config,
        });
        self.show(key);

        key
    }

    /// Mark a dialog visible
    pub fn show(&mut self, key: DialogKey) {
        self.set_visible(key, true);
    }

    /// Mark a dialog hidden; it stays registered
    pub fn hide(&mut self, key: DialogKey) {
        self.set_visible(key, false);
    }

    /// Remove a dialog. Unknown keys are ignored.
    pub fn destroy(&mut self, key: DialogKey) {
        if let Some(index) = self.position(key) {
            self.dialogs.remove(index);
            debug!(%key, "Destroyed dialog");
        } else {
            trace!(%key, "Destroy for unknown dialog ignored");
        }
    }

    /// Hand submitted data to the dialog's handler and hide it on `Close`
    ///
    /// Returns `Ok(None)` when no dialog has this key.
    pub fn submit(&mut self, key: DialogKey, data: &[FormItem]) -> Result<Option<Completion>> {
        let Some(handler) = self.handler(key) else {
            trace!(%key, "Submit for unknown dialog ignored");
            return Ok(None);
        };

        let completion = handler.on_submit(data)?;
        self.apply(key, completion);
        Ok(Some(completion))
    }

    /// Ask the dialog's handler whether it may close and hide it on `Close`
    pub fn request_close(&mut self, key: DialogKey) -> Result<Option<Completion>> {
        let Some(handler) = self.handler(key) else {
            trace!(%key, "Close request for unknown dialog ignored");
            return Ok(None);
        };

        let completion = handler.on_close()?;
        self.apply(key, completion);
        Ok(Some(completion))
    }

    /// Get dialog by key
    pub fn get(&self, key: DialogKey) -> Option<&DialogInstance> {
        self.dialogs.iter().find(|dialog| dialog.key == key)
    }

    /// Get dialog by key (mutable form access for renderers filling in values)
    pub fn form_mut(&mut self, key: DialogKey) -> Option<&mut Vec<FormItem>> {
        self.dialogs
            .iter_mut()
            .find(|dialog| dialog.key == key)
            .map(|dialog| &mut dialog.form)
    }

    /// All dialogs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &DialogInstance> {
        self.dialogs.iter()
    }

    /// Dialogs that should be rendered, bottom first
    pub fn visible(&self) -> impl Iterator<Item = &DialogInstance> {
        self.dialogs.iter().filter(|dialog| dialog.visible)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> Vec<DialogKey> {
        self.dialogs.iter().map(|dialog| dialog.key).collect()
    }

    pub fn len(&self) -> usize {
        self.dialogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dialogs.is_empty()
    }

    pub(super) fn handler(&self, key: DialogKey) -> Option<Arc<dyn DialogHandler>> {
        self.get(key).map(|dialog| Arc::clone(&dialog.config.handler))
    }

    pub(super) fn apply(&mut self, key: DialogKey, completion: Completion) {
        if completion == Completion::Close {
            self.hide(key);
        }
    }

    fn position(&self, key: DialogKey) -> Option<usize> {
        self.dialogs.iter().position(|dialog| dialog.key == key)
    }

    fn set_visible(&mut self, key: DialogKey, visible: bool) {
        match self.dialogs.iter_mut().find(|dialog| dialog.key == key) {
            Some(dialog) => {
                dialog.visible = visible;
                trace!(%key, visible, "Dialog visibility changed");
            }
            None => trace!(%key, visible, "Visibility change for unknown dialog ignored"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::Mutex;

    /// Records submitted data and answers with a fixed completion
    struct Recorder {
        answer: Completion,
        seen: Arc<Mutex<Vec<Vec<FormItem>>>>,
    }

    impl DialogHandler for Recorder {
        fn on_submit(&self, data: &[FormItem]) -> Result<Completion> {
            self.seen.lock().unwrap().push(data.to_vec());
            Ok(self.answer)
        }

        fn on_close(&self) -> Result<Completion> {
            Ok(self.answer)
        }
    }

    struct Failing;

    impl DialogHandler for Failing {
        fn on_submit(&self, _data: &[FormItem]) -> Result<Completion> {
            Err(anyhow!("backend unavailable"))
        }

        fn on_close(&self) -> Result<Completion> {
            Err(anyhow!("refused"))
        }
    }

    fn config(answer: Completion) -> (DialogConfig, Arc<Mutex<Vec<Vec<FormItem>>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let handler = Recorder {
            answer,
            seen: Arc::clone(&seen),
        };
        (DialogConfig::new("Test", handler), seen)
    }

    #[test]
    fn test_create_assigns_increasing_keys_in_order() {
        let mut registry = DialogRegistry::new();
        let keys: Vec<_> = (0..5)
            .map(|_| registry.create(Vec::new(), config(Completion::Close).0))
            .collect();

        assert_eq!(registry.len(), 5);
        assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(registry.keys(), keys);
    }

    #[test]
    fn test_created_dialog_is_visible() {
        let mut registry = DialogRegistry::new();
        let key = registry.create(Vec::new(), config(Completion::Close).0);
        assert!(registry.get(key).unwrap().is_visible());
    }

    #[test]
    fn test_name_size_lifecycle() {
        let mut registry = DialogRegistry::new();
        let form = vec![FormItem::input("Name"), FormItem::number("Size")];
        let key = registry.create(form, config(Completion::Close).0);

        assert_eq!(key, DialogKey(0));
        assert!(registry.get(key).unwrap().is_visible());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(key).unwrap().form().len(), 2);

        registry.hide(DialogKey(0));
        assert!(!registry.get(key).unwrap().is_visible());
        assert_eq!(registry.len(), 1);

        registry.destroy(DialogKey(0));
        assert_eq!(registry.len(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_keys_are_never_reused() {
        let mut registry = DialogRegistry::new();
        let first = registry.create(Vec::new(), config(Completion::Close).0);
        let second = registry.create(Vec::new(), config(Completion::Close).0);
        registry.destroy(first);
        let third = registry.create(Vec::new(), config(Completion::Close).0);

        assert_eq!((first, second, third), (DialogKey(0), DialogKey(1), DialogKey(2)));
        assert_eq!(registry.keys(), vec![DialogKey(1), DialogKey(2)]);
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut registry = DialogRegistry::new();
        let a = registry.create(Vec::new(), config(Completion::Close).0);
        let b = registry.create(Vec::new(), config(Completion::Close).0);

        registry.destroy(a);
        assert_eq!(registry.len(), 1);
        assert!(registry.get(a).is_none());
        assert!(registry.get(b).is_some());

        registry.destroy(a);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let mut registry = DialogRegistry::new();
        let key = registry.create(Vec::new(), config(Completion::Close).0);
        let missing = DialogKey(42);

        registry.show(missing);
        registry.hide(missing);
        registry.destroy(missing);
        assert!(registry.submit(missing, &[]).unwrap().is_none());
        assert!(registry.request_close(missing).unwrap().is_none());

        assert_eq!(registry.len(), 1);
        assert!(registry.get(key).unwrap().is_visible());
    }

    #[test]
    fn test_visibility_toggle_keeps_order() {
        let mut registry = DialogRegistry::new();
        let a = registry.create(Vec::new(), config(Completion::Close).0);
        let b = registry.create(Vec::new(), config(Completion::Close).0);
        let c = registry.create(Vec::new(), config(Completion::Close).0);

        registry.hide(a);
        registry.show(a);
        registry.hide(b);

        assert_eq!(registry.keys(), vec![a, b, c]);
        let visible: Vec<_> = registry.visible().map(DialogInstance::key).collect();
        assert_eq!(visible, vec![a, c]);
    }

    #[test]
    fn test_submit_close_hides_dialog() {
        let mut registry = DialogRegistry::new();
        let (config, seen) = config(Completion::Close);
        let key = registry.create(vec![FormItem::input("Name")], config);

        let data = vec![FormItem::input("Name").with_value("reports")];
        let completion = registry.submit(key, &data).unwrap();

        assert_eq!(completion, Some(Completion::Close));
        assert_eq!(seen.lock().unwrap().as_slice(), &[data]);
        assert!(!registry.get(key).unwrap().is_visible());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_submit_keep_open_leaves_visibility() {
        let mut registry = DialogRegistry::new();
        let (config, seen) = config(Completion::KeepOpen);
        let key = registry.create(Vec::new(), config);

        assert_eq!(registry.submit(key, &[]).unwrap(), Some(Completion::KeepOpen));
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert!(registry.get(key).unwrap().is_visible());
    }

    #[test]
    fn test_request_close_follows_handler() {
        let mut registry = DialogRegistry::new();
        let closing = registry.create(Vec::new(), config(Completion::Close).0);
        let sticky = registry.create(Vec::new(), config(Completion::KeepOpen).0);

        registry.request_close(closing).unwrap();
        registry.request_close(sticky).unwrap();

        assert!(!registry.get(closing).unwrap().is_visible());
        assert!(registry.get(sticky).unwrap().is_visible());
    }

    #[test]
    fn test_handler_errors_propagate_without_hiding() {
        let mut registry = DialogRegistry::new();
        let key = registry.create(Vec::new(), DialogConfig::new("Broken", Failing));

        let err = registry.submit(key, &[]).unwrap_err();
        assert_eq!(err.to_string(), "backend unavailable");
        assert!(registry.request_close(key).is_err());
        assert!(registry.get(key).unwrap().is_visible());
    }

    #[test]
    fn test_form_is_owned_by_instance() {
        let mut registry = DialogRegistry::new();
        let form = vec![FormItem::input("Name")];
        let key = registry.create(form.clone(), config(Completion::Close).0);

        registry.form_mut(key).unwrap()[0].value = "edited".into();

        assert_eq!(form[0].value, serde_json::Value::Null);
        assert_eq!(registry.get(key).unwrap().form()[0].as_str(), Some("edited"));
    }
}
