//! Plain-text listings for folders, search hits and tags

use crate::api::{FileItem, FolderListing, FolderNode, SearchResult, TagItem, TagValue};
use crate::utils::{format_size, format_timestamp};
use std::collections::HashMap;
use std::fmt::Write;

fn tag_summary(tags: &HashMap<String, TagValue>) -> String {
    let mut pairs: Vec<_> = tags
        .values()
        .map(|tag| {
            let value = match &tag.value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            };
            format!("{}={}", tag.tag.label, value)
        })
        .collect();
    pairs.sort();
    pairs.join(", ")
}

fn file_row(file: &FileItem) -> String {
    let (kind, size) = if file.is_folder() {
        ("DIR".to_string(), format!("{} items", file.file_size))
    } else {
        (
            file.document_type
                .map(|t| t.to_string())
                .unwrap_or_else(|| "FILE".to_string()),
            format_size(file.file_size),
        )
    };

    let mut row = format!(
        "{:<6} {:<36} {:>10}  {}  {}",
        kind,
        file.name,
        size,
        format_timestamp(file.update_time),
        file.file_id
    );
    if !file.tags.is_empty() {
        let _ = write!(row, "  [{}]", tag_summary(&file.tags));
    }
    row
}

/// Render one page of a folder
pub fn folder_listing(listing: &FolderListing) -> String {
    let mut out = String::new();
    let path = if listing.folder.folder_path.is_empty() {
        listing.folder.name.clone()
    } else {
        listing.folder.folder_path.join("/")
    };
    let _ = writeln!(out, "{} ({})", path, listing.folder.file_id);

    if listing.files.is_empty() {
        out.push_str("  (empty)\n");
    }
    for file in &listing.files {
        let _ = writeln!(out, "  {}", file_row(file));
    }

    let page = &listing.page;
    let _ = writeln!(out, "page {} ({} per page, {} total)", page.pn, page.ps, page.total);
    out
}

/// Render the folder tree, one indented line per folder
pub fn folder_tree(root: &FolderNode) -> String {
    let mut out = String::new();
    for (depth, node) in root.walk() {
        let _ = writeln!(out, "{}{}  ({})", "  ".repeat(depth), node.name, node.folder_id);
    }
    out
}

pub fn search_results(result: &SearchResult) -> String {
    let mut out = String::new();
    for hit in &result.items {
        let _ = writeln!(
            out,
            "{:<36} {:>10}  {}  {}",
            hit.name,
            format_size(hit.file_size),
            format_timestamp(hit.update_time),
            hit.file_id
        );
        let snippet = hit.content.trim();
        if !snippet.is_empty() {
            let short: String = snippet.chars().take(120).collect();
            let _ = writeln!(out, "    {}", short.replace('\n', " "));
        }
    }
    let _ = writeln!(out, "{} of {} hits (page {})", result.items.len(), result.total, result.page_no);
    out
}

pub fn tag_list(tags: &[TagItem]) -> String {
    let mut out = String::new();
    for tag in tags {
        let mut flags = Vec::new();
        if tag.is_list {
            flags.push("list");
        }
        if tag.is_can_search {
            flags.push("searchable");
        }
        if !tag.is_active {
            flags.push("inactive");
        }
        let _ = writeln!(
            out,
            "{:<24} {:<8} {:<24} {}",
            tag.label,
            format!("{:?}", tag.data_type).to_uppercase(),
            flags.join(","),
            tag.tag_id
        );
    }
    out
}
