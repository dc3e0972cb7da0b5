//! Core dialog types
//!
//! Field descriptors, dialog configuration and the handler contract that
//! decides whether a dialog closes after submit or close requests.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Unique identifier for dialog instances
///
/// Keys are handed out in increasing order by a registry and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DialogKey(pub u64);

impl From<u64> for DialogKey {
    fn from(key: u64) -> Self {
        Self(key)
    }
}

impl fmt::Display for DialogKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Input widget used to edit a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    Input,
    Number,
    Radio,
    Select,
    Upload,
    SelectButton,
}

impl FieldKind {
    /// Whether the field picks its value from a fixed option list
    pub fn has_options(&self) -> bool {
        matches!(self, Self::Radio | Self::Select | Self::SelectButton)
    }
}

/// One allowed value of a choice field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: Value,
}

impl FieldOption {
    pub fn new(label: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Field descriptor of a dialog form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormItem {
    pub label: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    #[serde(default)]
    pub value: Value,
}

impl FormItem {
    pub fn new(label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            label: label.into(),
            kind,
            options: None,
            value: Value::Null,
        }
    }

    pub fn input(label: impl Into<String>) -> Self {
        Self::new(label, FieldKind::Input)
    }

    pub fn number(label: impl Into<String>) -> Self {
        Self::new(label, FieldKind::Number)
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    /// A value counts as filled when it is not null and not a blank string
    pub fn is_filled(&self) -> bool {
        match &self.value {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            Value::Array(items) => !items.is_empty(),
            _ => true,
        }
    }

    /// String view of the value, if it holds one
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }
}

/// Find a field by label in submitted form data
pub fn field<'a>(data: &'a [FormItem], label: &str) -> Option<&'a FormItem> {
    data.iter().find(|item| item.label == label)
}

/// Width hint for the label column of a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelWidth {
    Pixels(u32),
    Css(String),
}

impl Default for LabelWidth {
    fn default() -> Self {
        Self::Pixels(100)
    }
}

impl fmt::Display for LabelWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pixels(px) => write!(f, "{}px", px),
            Self::Css(css) => f.write_str(css),
        }
    }
}

/// What a handler decided after a submit or close request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Hide the dialog
    Close,
    /// Leave the dialog as it is
    KeepOpen,
}

/// Collaborator logic behind a dialog
///
/// Errors returned here are not caught by the registry; they reach whoever
/// called `submit` or `request_close` and the dialog stays as it was.
pub trait DialogHandler: Send + Sync {
    /// Called with the submitted form data
    fn on_submit(&self, data: &[FormItem]) -> Result<Completion>;

    /// Called when the user asks to dismiss the dialog
    fn on_close(&self) -> Result<Completion> {
        Ok(Completion::Close)
    }
}

/// Dialog configuration, fixed at creation
#[derive(Clone)]
pub struct DialogConfig {
    /// Dialog title
    pub title: String,
    /// Label column width hint
    pub label_width: LabelWidth,
    /// Submit/close logic
    pub handler: Arc<dyn DialogHandler>,
}

impl DialogConfig {
    pub fn new(title: impl Into<String>, handler: impl DialogHandler + 'static) -> Self {
        Self {
            title: title.into(),
            label_width: LabelWidth::default(),
            handler: Arc::new(handler),
        }
    }

    /// Share one handler between the dialog and its owner
    pub fn from_arc(title: impl Into<String>, handler: Arc<dyn DialogHandler>) -> Self {
        Self {
            title: title.into(),
            label_width: LabelWidth::default(),
            handler,
        }
    }

    pub fn with_label_width(mut self, label_width: LabelWidth) -> Self {
        self.label_width = label_width;
        self
    }
}

impl fmt::Debug for DialogConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogConfig")
            .field("title", &self.title)
            .field("label_width", &self.label_width)
            .finish_non_exhaustive()
    }
}

/// One open or closing dialog
#[derive(Debug, Clone)]
pub struct DialogInstance {
    pub(super) key: DialogKey,
    pub(super) visible: bool,
    pub(super) form: Vec<FormItem>,
    pub(super) config: DialogConfig,
}

impl DialogInstance {
    pub fn key(&self) -> DialogKey {
        self.key
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn form(&self) -> &[FormItem] {
        &self.form
    }

    pub fn config(&self) -> &DialogConfig {
        &self.config
    }

    pub fn title(&self) -> &str {
        &self.config.title
    }
}
