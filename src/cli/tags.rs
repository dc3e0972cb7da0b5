//! Tag configuration subcommands

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::api::{FileItem, TagDataType, TagItem, TagValue};
use crate::app::App;
use crate::dialog::forms;
use crate::dialog::FormItem;
use crate::ui::table;

/// Manage metadata tags
#[derive(Debug, Args)]
pub struct TagsCommand {
    #[command(subcommand)]
    pub command: TagsSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum TagsSubcommand {
    /// List all tag definitions
    List,
    /// Find tags by label
    Search {
        /// Label to search for
        name: String,
    },
    /// Define a new tag; asks for the details when no label is given
    Add {
        /// Tag label
        label: Option<String>,

        /// Value type
        #[arg(long, value_enum, default_value_t = DataTypeArg::String)]
        data_type: DataTypeArg,

        /// Tag holds a list of values
        #[arg(long)]
        list: bool,

        /// Exclude the tag from search filters
        #[arg(long)]
        not_searchable: bool,
    },
    /// Change an existing tag definition
    Edit {
        /// Tag id
        tag_id: String,

        /// New label
        #[arg(long)]
        label: Option<String>,

        /// Mark the tag active or inactive
        #[arg(long)]
        active: Option<bool>,

        /// Include or exclude the tag from search filters
        #[arg(long)]
        searchable: Option<bool>,
    },
    /// Delete a tag definition
    Rm {
        /// Tag id
        tag_id: String,
    },
    /// Set or clear tag values on a file
    Set {
        /// Folder holding the file
        folder: String,

        /// File id
        file_id: String,

        /// Values to set, as tag id or label, '=' and the value; list tags take comma-separated values
        #[arg(value_name = "TAG=VALUE")]
        values: Vec<String>,

        /// Remove a tag from the file
        #[arg(long, value_name = "TAG")]
        clear: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DataTypeArg {
    String,
    Number,
    Date,
}

impl From<DataTypeArg> for TagDataType {
    fn from(arg: DataTypeArg) -> Self {
        match arg {
            DataTypeArg::String => Self::String,
            DataTypeArg::Number => Self::Number,
            DataTypeArg::Date => Self::Date,
        }
    }
}

/// Build a tag definition from submitted new-tag form data
pub fn tag_from_form(data: &[FormItem]) -> Result<TagItem> {
    let label = forms::text(data, forms::LABEL).ok_or_else(|| anyhow!("Tag label is required"))?;
    let data_type = match forms::text(data, forms::DATA_TYPE).as_deref() {
        Some("NUMBER") => TagDataType::Number,
        Some("DATE") => TagDataType::Date,
        _ => TagDataType::String,
    };

    Ok(TagItem {
        tag_id: String::new(),
        label,
        data_type,
        is_list: forms::flag(data, forms::IS_LIST).unwrap_or(false),
        is_can_search: forms::flag(data, forms::SEARCHABLE).unwrap_or(true),
        index: 0,
        is_active: true,
    })
}

/// Split a `tag=value` argument at the first '='
pub fn parse_assignment(arg: &str) -> Result<(&str, &str)> {
    let (tag, value) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected TAG=VALUE, got '{}'", arg))?;
    let tag = tag.trim();
    if tag.is_empty() {
        bail!("Missing tag name in '{}'", arg);
    }
    Ok((tag, value.trim()))
}

/// Find a tag definition by id, then by label ignoring case
pub fn resolve_tag<'a>(tags: &'a [TagItem], key: &str) -> Result<&'a TagItem> {
    tags.iter()
        .find(|tag| tag.tag_id == key)
        .or_else(|| tags.iter().find(|tag| tag.label.eq_ignore_ascii_case(key)))
        .ok_or_else(|| anyhow!("Unknown tag '{}'", key))
}

/// Parse one value of the given data type
///
/// Dates are stored as epoch milliseconds and may be given either that way
/// or as YYYY-MM-DD (midnight UTC).
pub fn scalar_value(data_type: TagDataType, raw: &str) -> Result<Value> {
    match data_type {
        TagDataType::String => Ok(Value::String(raw.to_string())),
        TagDataType::Number => {
            if let Ok(n) = raw.parse::<i64>() {
                return Ok(Value::from(n));
            }
            raw.parse::<f64>()
                .ok()
                .and_then(|f| serde_json::Number::from_f64(f).map(Value::Number))
                .ok_or_else(|| anyhow!("'{}' is not a number", raw))
        }
        TagDataType::Date => {
            if let Ok(ms) = raw.parse::<i64>() {
                return Ok(Value::from(ms));
            }
            let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| anyhow!("'{}' is not a date (YYYY-MM-DD or epoch milliseconds)", raw))?;
            let midnight = date
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| anyhow!("'{}' is not a date", raw))?;
            Ok(Value::from(midnight.and_utc().timestamp_millis()))
        }
    }
}

/// Parse a value for `tag`, splitting list tags on commas
pub fn tag_value(tag: &TagItem, raw: &str) -> Result<Value> {
    if !tag.is_list {
        return scalar_value(tag.data_type, raw);
    }
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| scalar_value(tag.data_type, part))
        .collect::<Result<Vec<_>>>()
        .map(Value::Array)
}

/// Apply `TAG=VALUE` assignments and removals to a file's tag map, keyed by tag id
pub fn apply_tag_values(
    tags: &mut HashMap<String, TagValue>,
    definitions: &[TagItem],
    values: &[String],
    clear: &[String],
) -> Result<()> {
    for key in clear {
        let tag = resolve_tag(definitions, key)?;
        tags.remove(&tag.tag_id);
    }
    for arg in values {
        let (key, raw) = parse_assignment(arg)?;
        let tag = resolve_tag(definitions, key)?;
        if !tag.is_active {
            bail!("Tag '{}' is inactive", tag.label);
        }
        let value = tag_value(tag, raw)?;
        debug!(tag = %tag.label, %value, "Setting tag value");
        tags.insert(tag.tag_id.clone(), TagValue { tag: tag.clone(), value });
    }
    Ok(())
}

/// Locate a file by paging through its folder
async fn find_file(app: &App, folder: &str, file_id: &str) -> Result<FileItem> {
    let ps = app.config().page_size.max(1);
    let mut pn = 1;
    loop {
        let listing = app
            .api()
            .get_folder(Some(folder), pn, ps)
            .await
            .context("Failed to list folder")?;
        let exhausted = listing.files.is_empty() || listing.page.total <= u64::from(pn) * u64::from(ps);
        if let Some(file) = listing.files.into_iter().find(|file| file.file_id == file_id) {
            return Ok(file);
        }
        if exhausted {
            bail!("No file {} in folder {}", file_id, folder);
        }
        pn += 1;
    }
}

impl TagsCommand {
    pub async fn execute(&self, app: &App) -> Result<()> {
        match &self.command {
            TagsSubcommand::List => {
                let tags = app.api().get_all_tags().await.context("Failed to load tags")?;
                print!("{}", table::tag_list(&tags));
            }
            TagsSubcommand::Search { name } => {
                let found = app.api().search_tags(name).await.context("Tag search failed")?;
                let tags: Vec<_> = found.into_iter().map(|value| value.tag).collect();
                print!("{}", table::tag_list(&tags));
            }
            TagsSubcommand::Add {
                label,
                data_type,
                list,
                not_searchable,
            } => {
                let tag = match label {
                    Some(label) => TagItem {
                        tag_id: String::new(),
                        label: label.clone(),
                        data_type: (*data_type).into(),
                        is_list: *list,
                        is_can_search: !*not_searchable,
                        index: 0,
                        is_active: true,
                    },
                    None => {
                        let Some(data) = app.prompt_dialog(forms::new_tag(), forms::new_tag_config())? else {
                            info!("Tag creation cancelled");
                            return Ok(());
                        };
                        tag_from_form(&data)?
                    }
                };

                app.api().add_tag(&tag).await.context("Failed to add tag")?;
                println!("Added tag '{}'", tag.label);
            }
            TagsSubcommand::Edit {
                tag_id,
                label,
                active,
                searchable,
            } => {
                let tags = app.api().get_all_tags().await.context("Failed to load tags")?;
                let mut tag = tags
                    .into_iter()
                    .find(|tag| &tag.tag_id == tag_id)
                    .ok_or_else(|| anyhow!("No tag with id {}", tag_id))?;

                if let Some(label) = label {
                    tag.label = label.clone();
                }
                if let Some(active) = active {
                    tag.is_active = *active;
                }
                if let Some(searchable) = searchable {
                    tag.is_can_search = *searchable;
                }

                app.api().edit_tag(&tag).await.context("Failed to update tag")?;
                println!("Updated tag '{}'", tag.label);
            }
            TagsSubcommand::Rm { tag_id } => {
                app.api().delete_tag(tag_id).await.context("Failed to delete tag")?;
                println!("Deleted tag {}", tag_id);
            }
            TagsSubcommand::Set {
                folder,
                file_id,
                values,
                clear,
            } => {
                if values.is_empty() && clear.is_empty() {
                    bail!("Nothing to change; pass TAG=VALUE or --clear TAG");
                }

                let definitions = app.api().get_all_tags().await.context("Failed to load tags")?;
                let mut file = find_file(app, folder, file_id).await?;
                apply_tag_values(&mut file.tags, &definitions, values, clear)?;

                app.api()
                    .update_file(&file.file_id, &file.name, &file.tags)
                    .await
                    .context("Failed to update file tags")?;
                println!("Updated tags on '{}' ({} set)", file.name, file.tags.len());
            }
        }
        Ok(())
    }
}
