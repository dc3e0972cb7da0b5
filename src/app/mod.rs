//! Application composition root
//!
//! Builds the backend client and the dialog registry once and hands them to
//! the command handlers.

use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use tracing::debug;

use crate::{
    api::ApiClient,
    config::Config,
    dialog::{DialogConfig, DialogHandler, FormItem, RegistryHandle},
    ui::{Outcome, PromptRenderer},
};

/// Main application structure
pub struct App {
    config: Config,
    api: ApiClient,
    dialogs: RegistryHandle,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Result<Self> {
        debug!("Creating new App instance");
        config.validate()?;

        let api = ApiClient::from_config(&config).context("Failed to create API client")?;

        Ok(Self {
            config,
            api,
            dialogs: RegistryHandle::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn dialogs(&self) -> &RegistryHandle {
        &self.dialogs
    }

    /// Open a form dialog on the terminal and return the accepted data
    pub fn prompt_form(
        &self,
        title: &str,
        form: Vec<FormItem>,
        handler: impl DialogHandler + 'static,
    ) -> Result<Option<Vec<FormItem>>> {
        self.prompt_dialog(form, DialogConfig::new(title, handler))
    }

    /// Register a dialog, render the visible dialogs on the terminal and
    /// return what this one accepted
    ///
    /// Terminal input blocks, so rendering runs off the async worker.
    pub fn prompt_dialog(&self, form: Vec<FormItem>, config: DialogConfig) -> Result<Option<Vec<FormItem>>> {
        tokio::task::block_in_place(|| {
            let stdin = io::stdin();
            self.render_dialog(stdin.lock(), io::stdout(), form, config)
        })
    }

    /// Render a new dialog, together with any other visible ones, on a text
    /// stream
    ///
    /// The dialog is destroyed before returning, whether it was submitted or
    /// dismissed.
    pub fn render_dialog<R: BufRead, W: Write>(
        &self,
        input: R,
        output: W,
        form: Vec<FormItem>,
        config: DialogConfig,
    ) -> Result<Option<Vec<FormItem>>> {
        let title = config.title.clone();
        let key = self.dialogs.create(form, config);

        let outcomes = PromptRenderer::new(input, output).run_all(&self.dialogs);
        self.dialogs.destroy(key);

        let outcome = outcomes?
            .into_iter()
            .find(|(rendered, _)| *rendered == key)
            .map(|(_, outcome)| outcome);

        match outcome {
            Some(Outcome::Submitted(data)) => Ok(Some(data)),
            _ => {
                debug!("Dialog '{}' dismissed", title);
                Ok(None)
            }
        }
    }
}
