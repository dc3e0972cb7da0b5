//! File and folder subcommands

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::tags::{parse_assignment, resolve_tag, scalar_value};
use crate::api::{Condition, SaveFileParams, SearchParams, TagFilter, TagItem};
use crate::app::App;
use crate::dialog::forms::{self, RequiredFields};
use crate::ui::table;

/// List the entries of a folder
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Folder id; lists the root folder when omitted
    pub folder: Option<String>,

    /// Page number, starting at 1
    #[arg(short, long, default_value_t = 1)]
    pub page: u32,

    /// Entries per page (defaults to the configured page size)
    #[arg(long)]
    pub page_size: Option<u32>,
}

impl ListCommand {
    pub async fn execute(&self, app: &App) -> Result<()> {
        let ps = self.page_size.unwrap_or(app.config().page_size);
        let listing = app
            .api()
            .get_folder(self.folder.as_deref(), self.page.max(1), ps)
            .await
            .context("Failed to list folder")?;
        print!("{}", table::folder_listing(&listing));
        Ok(())
    }
}

/// Print every folder as an indented tree
#[derive(Debug, Args)]
pub struct TreeCommand {}

impl TreeCommand {
    pub async fn execute(&self, app: &App) -> Result<()> {
        let root = app.api().get_all_folders().await.context("Failed to load folder tree")?;
        print!("{}", table::folder_tree(&root));
        Ok(())
    }
}

/// Create a folder
#[derive(Debug, Args)]
pub struct MkdirCommand {
    /// Parent folder id
    pub parent: String,

    /// Folder name; asked for interactively when omitted
    #[arg(short, long)]
    pub name: Option<String>,

    /// Folder description
    #[arg(long)]
    pub description: Option<String>,
}

impl MkdirCommand {
    pub async fn execute(&self, app: &App) -> Result<()> {
        let (name, description) = match &self.name {
            Some(name) => (name.clone(), self.description.clone()),
            None => {
                let Some(data) = app.prompt_form(
                    "New folder",
                    forms::new_folder(),
                    RequiredFields::new([forms::NAME]),
                )?
                else {
                    info!("Folder creation cancelled");
                    return Ok(());
                };
                let name = forms::text(&data, forms::NAME).ok_or_else(|| anyhow!("Folder name is required"))?;
                (name, forms::text(&data, forms::DESCRIPTION))
            }
        };

        app.api()
            .create_folder(&self.parent, &name, description.as_deref())
            .await
            .with_context(|| format!("Failed to create folder '{}'", name))?;
        println!("Created folder '{}'", name);
        Ok(())
    }
}

/// Upload a local file into a folder
#[derive(Debug, Args)]
pub struct UploadCommand {
    /// Local file to upload
    pub path: PathBuf,

    /// Target folder id
    pub folder: String,

    /// Description stored with the document
    #[arg(long)]
    pub description: Option<String>,

    /// Upload even if a file with the same name exists
    #[arg(short, long)]
    pub force: bool,
}

impl UploadCommand {
    pub async fn execute(&self, app: &App) -> Result<()> {
        let name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow!("Not a file: {}", self.path.display()))?;

        if !self.force && app.api().check_exist(name, &self.folder).await? {
            bail!("'{}' already exists in folder {} (use --force to upload anyway)", name, self.folder);
        }

        let uploaded = app
            .api()
            .put_file(&self.path, &self.folder)
            .await
            .with_context(|| format!("Failed to upload {}", self.path.display()))?;
        debug!("Uploaded content stored at {}", uploaded.url);

        let mut params = SaveFileParams::from_upload(uploaded, self.folder.clone());
        params.description = self.description.clone();
        app.api().save_file(&params).await.context("Failed to save document metadata")?;

        println!("Uploaded '{}'", params.name);
        Ok(())
    }
}

/// Download a document
#[derive(Debug, Args)]
pub struct DownloadCommand {
    /// Document id
    pub file_id: String,

    /// Output path (defaults to "download" in the current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl DownloadCommand {
    pub async fn execute(&self, app: &App) -> Result<()> {
        let url = app
            .api()
            .download_file(&self.file_id)
            .await
            .context("Failed to resolve download URL")?;
        if url.is_empty() {
            bail!("Backend returned no download URL for {}", self.file_id);
        }

        let output = self.output.clone().unwrap_or_else(|| PathBuf::from("download"));
        let bytes = app.api().fetch_bytes(&url).await?;
        tokio::fs::write(&output, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", output.display()))?;

        println!("Saved {} bytes to {}", bytes.len(), output.display());
        Ok(())
    }
}

/// Delete a file or folder
#[derive(Debug, Args)]
pub struct RemoveCommand {
    /// File or folder id
    pub file_id: String,
}

impl RemoveCommand {
    pub async fn execute(&self, app: &App) -> Result<()> {
        app.api().delete_file(&self.file_id).await.context("Failed to delete")?;
        println!("Deleted {}", self.file_id);
        Ok(())
    }
}

/// Rename a file or folder
#[derive(Debug, Args)]
pub struct RenameCommand {
    /// File or folder id
    pub file_id: String,

    /// New name; asked for interactively when omitted
    pub name: Option<String>,

    /// Current name, shown as the default in the rename dialog
    #[arg(long)]
    pub current: Option<String>,
}

impl RenameCommand {
    pub async fn execute(&self, app: &App) -> Result<()> {
        let name = match &self.name {
            Some(name) => name.clone(),
            None => {
                let current = self.current.as_deref().unwrap_or_default();
                let Some(data) = app.prompt_form("Rename", forms::rename(current), RequiredFields::new([forms::NAME]))?
                else {
                    info!("Rename cancelled");
                    return Ok(());
                };
                forms::text(&data, forms::NAME).ok_or_else(|| anyhow!("New name is required"))?
            }
        };

        if self.current.as_deref() == Some(name.as_str()) {
            warn!("Name unchanged, nothing to do");
            return Ok(());
        }

        app.api().rename_file(&self.file_id, &name).await.context("Failed to rename")?;
        println!("Renamed {} to '{}'", self.file_id, name);
        Ok(())
    }
}

/// Search document names and content
#[derive(Debug, Args)]
pub struct SearchCommand {
    /// Search keyword
    pub keyword: String,

    /// Only search inside these folders
    #[arg(long = "folder")]
    pub folders: Vec<String>,

    /// Match names only, not content
    #[arg(long)]
    pub names_only: bool,

    /// Page number, starting at 1
    #[arg(short, long, default_value_t = 1)]
    pub page: u32,

    /// Filter on a tag value, by tag id or label; repeatable
    #[arg(long = "tag", value_name = "TAG=VALUE")]
    pub tags: Vec<String>,

    /// Match files satisfying any tag filter instead of all of them
    #[arg(long)]
    pub any: bool,
}

impl SearchCommand {
    /// Build the request; `definitions` resolves tag labels and value types
    pub fn params(&self, page_size: u32, definitions: &[TagItem]) -> Result<SearchParams> {
        let mut params = SearchParams::keyword(self.keyword.clone(), page_size);
        if !self.folders.is_empty() {
            params.folder_ids = Some(self.folders.clone());
        }
        params.search_content = !self.names_only;
        params.page_no = self.page.max(1);

        let condition = if self.any { Condition::Or } else { Condition::And };
        for arg in &self.tags {
            let (key, raw) = parse_assignment(arg)?;
            let tag = resolve_tag(definitions, key)?;
            if !tag.is_can_search {
                bail!("Tag '{}' is not searchable", tag.label);
            }
            params.tag_filters.push(TagFilter {
                tag_id: tag.tag_id.clone(),
                param: scalar_value(tag.data_type, raw)?,
                condition,
            });
        }
        Ok(params)
    }

    pub async fn execute(&self, app: &App) -> Result<()> {
        let definitions = if self.tags.is_empty() {
            Vec::new()
        } else {
            app.api().get_all_tags().await.context("Failed to load tags")?
        };
        let params = self.params(app.config().page_size, &definitions)?;
        let result = app.api().search_file(&params).await.context("Search failed")?;
        print!("{}", table::search_results(&result));
        Ok(())
    }
}
