//! Prebuilt forms for the create/edit flows
//!
//! Each builder returns the field list a command passes to the registry.
//! Labels double as lookup names when reading submitted data back.

use super::types::*;
use anyhow::Result;
use serde_json::Value;
use tracing::debug;

pub const NAME: &str = "Name";
pub const DESCRIPTION: &str = "Description";
pub const LABEL: &str = "Label";
pub const DATA_TYPE: &str = "Data type";
pub const IS_LIST: &str = "Is list";
pub const SEARCHABLE: &str = "Searchable";

fn yes_no() -> Vec<FieldOption> {
    vec![FieldOption::new("Yes", true), FieldOption::new("No", false)]
}

/// Name and description of a new folder
pub fn new_folder() -> Vec<FormItem> {
    vec![FormItem::input(NAME), FormItem::input(DESCRIPTION)]
}

/// Rename form prefilled with the current name
pub fn rename(current: &str) -> Vec<FormItem> {
    vec![FormItem::input(NAME).with_value(current)]
}

/// Definition of a new metadata tag
pub fn new_tag() -> Vec<FormItem> {
    vec![
        FormItem::input(LABEL),
        FormItem::new(DATA_TYPE, FieldKind::Select)
            .with_options(vec![
                FieldOption::new("String", "STRING"),
                FieldOption::new("Number", "NUMBER"),
                FieldOption::new("Date", "DATE"),
            ])
            .with_value("STRING"),
        FormItem::new(IS_LIST, FieldKind::Radio)
            .with_options(yes_no())
            .with_value(false),
        FormItem::new(SEARCHABLE, FieldKind::Radio)
            .with_options(yes_no())
            .with_value(true),
    ]
}

/// Dialog settings for the new-tag form, with room for its longer labels
pub fn new_tag_config() -> DialogConfig {
    DialogConfig::new("New tag", RequiredFields::new([LABEL])).with_label_width(LabelWidth::Pixels(120))
}

/// Closes on submit only when every listed field has a value
#[derive(Debug, Clone)]
pub struct RequiredFields {
    labels: Vec<String>,
}

impl RequiredFields {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Labels of required fields that are missing or empty in `data`
    pub fn missing<'a>(&'a self, data: &[FormItem]) -> Vec<&'a str> {
        self.labels
            .iter()
            .filter(|label| !field(data, label).is_some_and(FormItem::is_filled))
            .map(String::as_str)
            .collect()
    }
}

impl DialogHandler for RequiredFields {
    fn on_submit(&self, data: &[FormItem]) -> Result<Completion> {
        let missing = self.missing(data);
        if missing.is_empty() {
            Ok(Completion::Close)
        } else {
            debug!(?missing, "Form submitted with empty required fields");
            Ok(Completion::KeepOpen)
        }
    }
}

/// Read a text field, trimmed, or `None` if empty
pub fn text(data: &[FormItem], label: &str) -> Option<String> {
    field(data, label)
        .and_then(FormItem::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Read a boolean field, accepting JSON booleans and "true"/"false" strings
pub fn flag(data: &[FormItem], label: &str) -> Option<bool> {
    match &field(data, label)?.value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
