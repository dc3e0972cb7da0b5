//! Wire types for files, folders and tags
//!
//! Field names follow the backend's camelCase JSON. Optional fields the
//! backend sometimes omits default to empty values.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileType {
    Document,
    Folder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentType {
    Word,
    Pdf,
    Excel,
    Ppt,
    Txt,
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Word => "WORD",
            Self::Pdf => "PDF",
            Self::Excel => "EXCEL",
            Self::Ppt => "PPT",
            Self::Txt => "TXT",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TagDataType {
    String,
    Number,
    Date,
}

/// Tag definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagItem {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag_id: String,
    pub label: String,
    pub data_type: TagDataType,
    #[serde(default)]
    pub is_list: bool,
    #[serde(default)]
    pub is_can_search: bool,
    #[serde(default)]
    pub index: i64,
    #[serde(default)]
    pub is_active: bool,
}

/// Tag attached to a file, with its value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagValue {
    #[serde(flatten)]
    pub tag: TagItem,
    #[serde(default)]
    pub value: Value,
}

/// A document or folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileItem {
    pub file_id: String,
    /// Parent folder
    #[serde(default)]
    pub folder_id: String,
    pub file_type: FileType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: HashMap<String, TagValue>,
    pub name: String,
    /// Bytes for documents, child count for folders
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub document_type: Option<DocumentType>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub create_time: i64,
    #[serde(default)]
    pub update_time: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub folder_path: Vec<String>,
}

impl FileItem {
    pub fn is_folder(&self) -> bool {
        self.file_type == FileType::Folder
    }
}

/// Raw folder detail as returned by the backend
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderDetail {
    pub file_id: String,
    #[serde(default)]
    pub folder_id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub create_time: i64,
    #[serde(default)]
    pub update_time: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub files: Vec<FileItem>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub folder_path: Vec<String>,
    #[serde(default)]
    pub pn: u32,
    #[serde(default)]
    pub ps: u32,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub pn: u32,
    pub ps: u32,
    pub total: u64,
}

/// One page of a folder's contents
#[derive(Debug, Clone, PartialEq)]
pub struct FolderListing {
    pub folder: FileItem,
    pub files: Vec<FileItem>,
    pub page: Page,
}

impl From<FolderDetail> for FolderListing {
    fn from(detail: FolderDetail) -> Self {
        let folder = FileItem {
            file_id: detail.file_id,
            folder_id: detail.folder_id,
            file_type: FileType::Folder,
            tags: HashMap::new(),
            name: detail.name,
            file_size: detail.files.len() as u64,
            document_type: None,
            description: detail.description,
            create_time: detail.create_time,
            update_time: detail.update_time,
            url: String::new(),
            folder_path: detail.folder_path,
        };

        Self {
            folder,
            files: detail.files,
            page: Page {
                pn: detail.pn,
                ps: detail.ps,
                total: detail.total,
            },
        }
    }
}

/// Node of the full folder tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderNode {
    pub folder_id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sub_files: Vec<FolderNode>,
}

impl FolderNode {
    /// Depth-first walk yielding each node with its depth
    pub fn walk(&self) -> Vec<(usize, &FolderNode)> {
        let mut out = Vec::new();
        let mut stack = vec![(0usize, self)];
        while let Some((depth, node)) = stack.pop() {
            out.push((depth, node));
            for child in node.sub_files.iter().rev() {
                stack.push((depth + 1, child));
            }
        }
        out
    }
}

/// Result of uploading file content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub url: String,
    pub name: String,
    pub document_type: String,
    pub size: u64,
}

/// Metadata record for an uploaded document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveFileParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    pub folder_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub file_size: u64,
    pub url: String,
    pub document_type: String,
}

impl SaveFileParams {
    pub fn from_upload(upload: UploadedFile, folder_id: impl Into<String>) -> Self {
        Self {
            file_id: None,
            folder_id: folder_id.into(),
            name: upload.name,
            description: None,
            file_size: upload.size,
            url: upload.url,
            document_type: upload.document_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Condition {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagFilter {
    pub tag_id: String,
    pub param: Value,
    pub condition: Condition,
}

/// Full-text and tag search request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub folder_ids: Option<Vec<String>>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub keyword: String,
    pub sort_by: String,
    pub search_content: bool,
    pub search_name: bool,
    pub tag_filters: Vec<TagFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<Vec<DocumentType>>,
    pub page_no: u32,
    pub page_size: u32,
}

impl SearchParams {
    /// Name and content search for `keyword` across all folders
    pub fn keyword(keyword: impl Into<String>, page_size: u32) -> Self {
        Self {
            folder_ids: None,
            start_time: None,
            end_time: None,
            keyword: keyword.into(),
            sort_by: "updateTime".to_string(),
            search_content: true,
            search_name: true,
            tag_filters: Vec::new(),
            document_type: None,
            page_no: 1,
            page_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default)]
    pub create_time: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub document_type: Option<String>,
    pub file_id: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub folder_id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: HashMap<String, TagValue>,
    #[serde(default)]
    pub update_time: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<SearchHit>,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub page_no: u32,
    #[serde(default)]
    pub total: u64,
}

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
