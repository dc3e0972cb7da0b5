//! Line-oriented dialog renderer
//!
//! Renders registered dialogs as a sequence of prompts, one per field, and
//! feeds the answers back through the registry. Typing `:q` at any prompt
//! asks the dialog to close; end of input does the same.

use anyhow::{anyhow, Result};
use serde_json::Value;
use std::collections::HashSet;
use std::io::{BufRead, Write};
use tracing::debug;

use crate::dialog::{Completion, DialogKey, FieldKind, FormItem, LabelWidth, RegistryHandle};

/// Answer that requests closing the dialog
pub const CANCEL: &str = ":q";

/// How an interactive dialog session ended
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The handler accepted this data and the dialog hid itself
    Submitted(Vec<FormItem>),
    /// The dialog was dismissed or is no longer visible
    Cancelled,
}

enum Answer {
    Value(Value),
    Cancel,
}

/// Terminal columns for a label width hint
pub fn label_columns(width: &LabelWidth) -> usize {
    match width {
        LabelWidth::Pixels(px) => (*px as usize / 8).max(4),
        LabelWidth::Css(_) => 12,
    }
}

/// Renders dialogs on a text stream
pub struct PromptRenderer<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptRenderer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Render every visible dialog in registry order
    ///
    /// Dialogs that become visible while others are rendered, such as ones
    /// opened by a handler, are picked up in the same pass. Each dialog is
    /// driven at most once.
    pub fn run_all(&mut self, registry: &RegistryHandle) -> Result<Vec<(DialogKey, Outcome)>> {
        let mut done = HashSet::new();
        let mut outcomes = Vec::new();

        loop {
            let next = registry.with(|r| {
                r.visible()
                    .map(|dialog| dialog.key())
                    .find(|key| !done.contains(key))
            });
            let Some(key) = next else {
                return Ok(outcomes);
            };

            done.insert(key);
            let outcome = self.run(registry, key)?;
            outcomes.push((key, outcome));
        }
    }

    /// Drive dialog `key` until it hides or input ends
    pub fn run(&mut self, registry: &RegistryHandle, key: DialogKey) -> Result<Outcome> {
        loop {
            let snapshot = registry.with(|r| {
                r.get(key)
                    .filter(|dialog| dialog.is_visible())
                    .map(|dialog| {
                        (
                            dialog.title().to_string(),
                            label_columns(&dialog.config().label_width),
                            dialog.form().to_vec(),
                        )
                    })
            });
            let Some((title, columns, mut data)) = snapshot else {
                debug!(%key, "Dialog not visible, leaving prompt");
                return Ok(Outcome::Cancelled);
            };

            writeln!(self.output, "== {} ==", title)?;

            let mut cancelled = false;
            for item in data.iter_mut() {
                match self.read_field(item, columns)? {
                    Some(Answer::Value(value)) => item.value = value,
                    Some(Answer::Cancel) => {
                        cancelled = true;
                        break;
                    }
                    None => {
                        registry.request_close(key)?;
                        return Ok(Outcome::Cancelled);
                    }
                }
            }

            if cancelled {
                if registry.request_close(key)? != Some(Completion::KeepOpen) {
                    return Ok(Outcome::Cancelled);
                }
                writeln!(self.output, "This dialog cannot be closed yet.")?;
                continue;
            }

            // Keep answers on the instance so a re-prompt shows them as defaults.
            registry.with(|r| {
                if let Some(form) = r.form_mut(key) {
                    *form = data.clone();
                }
            });

            match registry.submit(key, &data)? {
                Some(Completion::Close) => return Ok(Outcome::Submitted(data)),
                Some(Completion::KeepOpen) => {
                    // A handler may hide the dialog itself once its own work is done.
                    if registry.is_visible(key) == Some(false) {
                        debug!(%key, "Dialog hidden by its handler");
                        return Ok(Outcome::Submitted(data));
                    }
                    writeln!(self.output, "Some required fields are empty, please try again.")?;
                }
                None => return Ok(Outcome::Cancelled),
            }
        }
    }

    /// Prompt for one field until the answer parses; `None` at end of input
    fn read_field(&mut self, item: &FormItem, columns: usize) -> Result<Option<Answer>> {
        loop {
            write!(self.output, "{:>width$}", item.label, width = columns)?;
            if let Some(options) = &item.options {
                let labels: Vec<_> = options
                    .iter()
                    .enumerate()
                    .map(|(i, opt)| format!("{}) {}", i + 1, opt.label))
                    .collect();
                write!(self.output, " [{}]", labels.join(", "))?;
            }
            if item.is_filled() {
                write!(self.output, " ({})", display_value(item))?;
            }
            write!(self.output, ": ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let answer = line.trim();

            if answer == CANCEL {
                return Ok(Some(Answer::Cancel));
            }
            if answer.is_empty() {
                return Ok(Some(Answer::Value(item.value.clone())));
            }

            match parse_answer(item, answer) {
                Ok(value) => return Ok(Some(Answer::Value(value))),
                Err(e) => writeln!(self.output, "  {}", e)?,
            }
        }
    }
}

fn display_value(item: &FormItem) -> String {
    if let Some(option) = item
        .options
        .iter()
        .flatten()
        .find(|option| option.value == item.value)
    {
        return option.label.clone();
    }
    match &item.value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Convert typed text into a field value
pub fn parse_answer(item: &FormItem, answer: &str) -> Result<Value> {
    match item.kind {
        FieldKind::Number => {
            if let Ok(n) = answer.parse::<i64>() {
                return Ok(Value::from(n));
            }
            answer
                .parse::<f64>()
                .ok()
                .and_then(|f| serde_json::Number::from_f64(f).map(Value::Number))
                .ok_or_else(|| anyhow!("'{}' is not a number", answer))
        }
        kind if kind.has_options() => {
            let options = item.options.as_deref().unwrap_or_default();
            if let Ok(index) = answer.parse::<usize>() {
                if let Some(option) = index.checked_sub(1).and_then(|i| options.get(i)) {
                    return Ok(option.value.clone());
                }
            }
            options
                .iter()
                .find(|option| option.label.eq_ignore_ascii_case(answer))
                .map(|option| option.value.clone())
                .ok_or_else(|| anyhow!("'{}' is not one of the listed options", answer))
        }
        _ => Ok(Value::String(answer.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::{forms, DialogConfig, DialogHandler};
    use std::io::Cursor;
    use std::sync::Arc;

    struct StaysOpen;

    impl DialogHandler for StaysOpen {
        fn on_submit(&self, _data: &[FormItem]) -> Result<Completion> {
            Ok(Completion::Close)
        }

        fn on_close(&self) -> Result<Completion> {
            Ok(Completion::KeepOpen)
        }
    }

    fn run(registry: &RegistryHandle, key: DialogKey, input: &str) -> (Outcome, String) {
        let mut out = Vec::new();
        let outcome = PromptRenderer::new(Cursor::new(input.to_string()), &mut out)
            .run(registry, key)
            .unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    /// Hides its dialog from inside the handler, then reports it still open
    struct HidesItself {
        registry: RegistryHandle,
        key: std::sync::Mutex<Option<DialogKey>>,
    }

    impl DialogHandler for HidesItself {
        fn on_submit(&self, _data: &[FormItem]) -> Result<Completion> {
            if let Some(key) = *self.key.lock().unwrap() {
                self.registry.hide(key);
            }
            Ok(Completion::KeepOpen)
        }
    }

    fn folder_dialog(registry: &RegistryHandle) -> DialogKey {
        registry.create(
            forms::new_folder(),
            DialogConfig::new("New folder", forms::RequiredFields::new([forms::NAME])),
        )
    }

    #[test]
    fn test_submit_hides_dialog() {
        let registry = RegistryHandle::new();
        let key = folder_dialog(&registry);

        let (outcome, output) = run(&registry, key, "Invoices\nQ3 scans\n");

        let Outcome::Submitted(data) = outcome else {
            panic!("expected submission");
        };
        assert_eq!(forms::text(&data, forms::NAME).as_deref(), Some("Invoices"));
        assert_eq!(forms::text(&data, forms::DESCRIPTION).as_deref(), Some("Q3 scans"));
        assert!(output.contains("== New folder =="));
        assert_eq!(registry.is_visible(key), Some(false));
    }

    #[test]
    fn test_incomplete_form_is_prompted_again() {
        let registry = RegistryHandle::new();
        let key = folder_dialog(&registry);

        let (outcome, output) = run(&registry, key, "\n\nArchive\n\n");

        assert!(matches!(outcome, Outcome::Submitted(_)));
        assert!(output.contains("required fields are empty"));
        assert_eq!(output.matches("== New folder ==").count(), 2);
    }

    #[test]
    fn test_end_of_input_requests_close() {
        let registry = RegistryHandle::new();
        let key = folder_dialog(&registry);

        let (outcome, _) = run(&registry, key, "");

        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(registry.is_visible(key), Some(false));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_cancel_respects_handler() {
        let registry = RegistryHandle::new();
        let key = registry.create(vec![FormItem::input("Name")], DialogConfig::new("Sticky", StaysOpen));

        let (outcome, output) = run(&registry, key, ":q\nkept\n");

        assert!(matches!(outcome, Outcome::Submitted(_)));
        assert!(output.contains("cannot be closed yet"));
    }

    #[test]
    fn test_hidden_dialog_is_not_rendered() {
        let registry = RegistryHandle::new();
        let key = folder_dialog(&registry);
        registry.hide(key);

        let (outcome, output) = run(&registry, key, "ignored\n");
        assert_eq!(outcome, Outcome::Cancelled);
        assert!(output.is_empty());
    }

    #[test]
    fn test_handler_hiding_dialog_counts_as_submitted() {
        let registry = RegistryHandle::new();
        let handler = Arc::new(HidesItself {
            registry: registry.clone(),
            key: std::sync::Mutex::new(None),
        });
        let key = registry.create(
            vec![FormItem::input("Name")],
            DialogConfig::from_arc("Deferred", handler.clone()),
        );
        *handler.key.lock().unwrap() = Some(key);

        let (outcome, output) = run(&registry, key, "report\n");

        let Outcome::Submitted(data) = outcome else {
            panic!("expected submission, got {:?}", outcome);
        };
        assert_eq!(data[0].as_str(), Some("report"));
        assert!(!output.contains("please try again"));
        assert_eq!(registry.is_visible(key), Some(false));
    }

    #[test]
    fn test_run_all_renders_visible_dialogs_in_order() {
        let registry = RegistryHandle::new();
        let first = folder_dialog(&registry);
        let hidden = registry.create(vec![FormItem::input("Skipped")], DialogConfig::new("Hidden", StaysOpen));
        registry.hide(hidden);
        let second = registry.create(
            forms::rename("old.pdf"),
            DialogConfig::new("Rename", forms::RequiredFields::new([forms::NAME])),
        );

        let mut out = Vec::new();
        let outcomes = PromptRenderer::new(Cursor::new("Invoices\n\nnew.pdf\n".to_string()), &mut out)
            .run_all(&registry)
            .unwrap();
        let output = String::from_utf8(out).unwrap();

        let keys: Vec<_> = outcomes.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, vec![first, second]);
        assert!(outcomes.iter().all(|(_, outcome)| matches!(outcome, Outcome::Submitted(_))));
        let Outcome::Submitted(renamed) = &outcomes[1].1 else {
            unreachable!();
        };
        assert_eq!(forms::text(renamed, forms::NAME).as_deref(), Some("new.pdf"));

        let folder_at = output.find("== New folder ==").unwrap();
        let rename_at = output.find("== Rename ==").unwrap();
        assert!(folder_at < rename_at);
        assert!(!output.contains("Hidden"));
        assert_eq!(registry.is_visible(hidden), Some(false));
    }

    #[test]
    fn test_run_all_with_nothing_visible() {
        let registry = RegistryHandle::new();
        let key = folder_dialog(&registry);
        registry.hide(key);

        let mut out = Vec::new();
        let outcomes = PromptRenderer::new(Cursor::new(String::new()), &mut out)
            .run_all(&registry)
            .unwrap();
        assert!(outcomes.is_empty());
        assert!(out.is_empty());
    }

    #[test]
    fn test_parse_answer_by_kind() {
        let number = FormItem::number("Size");
        assert_eq!(parse_answer(&number, "42").unwrap(), Value::from(42));
        assert_eq!(parse_answer(&number, "1.5").unwrap(), Value::from(1.5));
        assert!(parse_answer(&number, "many").is_err());

        let tag = forms::new_tag();
        let data_type = &tag[1];
        assert_eq!(parse_answer(data_type, "2").unwrap(), Value::from("NUMBER"));
        assert_eq!(parse_answer(data_type, "date").unwrap(), Value::from("DATE"));
        assert!(parse_answer(data_type, "4").is_err());
        assert!(parse_answer(data_type, "0").is_err());

        let name = FormItem::input("Name");
        assert_eq!(parse_answer(&name, "report").unwrap(), Value::from("report"));
    }

    #[test]
    fn test_label_columns() {
        assert_eq!(label_columns(&LabelWidth::Pixels(100)), 12);
        assert_eq!(label_columns(&LabelWidth::Pixels(8)), 4);
        assert_eq!(label_columns(&LabelWidth::Css("auto".into())), 12);
    }
}
