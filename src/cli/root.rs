use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use super::files::{
    DownloadCommand, ListCommand, MkdirCommand, RemoveCommand, RenameCommand, SearchCommand,
    TreeCommand, UploadCommand,
};
use super::tags::TagsCommand;
use crate::app::App;
use crate::config::Config;

/// docshelf - browse and manage documents on a docshelf server
#[derive(Parser)]
#[command(
    name = "docshelf",
    version,
    about = "Browse, upload, tag and search documents on a docshelf server",
    long_about = r#"docshelf talks to a document management backend over its REST API.

Examples:
  docshelf ls                          # List the root folder
  docshelf ls <folder-id> --page 2     # Second page of a folder
  docshelf mkdir <parent-id>           # Create a folder, asking for its name
  docshelf upload report.pdf <folder>  # Upload a document
  docshelf search invoice              # Search names and content
  docshelf search q3 --tag Dept=Sales  # Search filtered by a tag value
  docshelf tags set <folder> <file> Dept=Sales  # Tag a document"#
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    pub debug: bool,

    /// Backend base URL (overrides config and DOCSHELF_BASE_URL)
    #[arg(long = "base-url", global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List a folder
    Ls(ListCommand),
    /// Show the whole folder tree
    Tree(TreeCommand),
    /// Create a folder
    Mkdir(MkdirCommand),
    /// Upload a document
    Upload(UploadCommand),
    /// Download a document
    Download(DownloadCommand),
    /// Delete a file or folder
    Rm(RemoveCommand),
    /// Rename a file or folder
    Rename(RenameCommand),
    /// Search documents by name and content
    Search(SearchCommand),
    /// Manage metadata tags
    Tags(TagsCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        if self.debug {
            debug!("Debug logging enabled");
        }

        let mut config = Config::init().await?;
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }
        debug!("Configuration initialized");

        let app = App::new(config)?;
        info!("Using backend at {}", app.api().base_url());

        match self.command {
            Commands::Ls(cmd) => cmd.execute(&app).await,
            Commands::Tree(cmd) => cmd.execute(&app).await,
            Commands::Mkdir(cmd) => cmd.execute(&app).await,
            Commands::Upload(cmd) => cmd.execute(&app).await,
            Commands::Download(cmd) => cmd.execute(&app).await,
            Commands::Rm(cmd) => cmd.execute(&app).await,
            Commands::Rename(cmd) => cmd.execute(&app).await,
            Commands::Search(cmd) => cmd.execute(&app).await,
            Commands::Tags(cmd) => cmd.execute(&app).await,
        }
    }
}
