//! File and folder endpoints

use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use super::{
    client::ApiClient,
    errors::{ApiError, ApiResult},
    types::*,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FolderQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    folder_id: Option<&'a str>,
    pn: u32,
    ps: u32,
}

impl ApiClient {
    /// One page of a folder's children; `None` lists the root folder
    pub async fn get_folder(&self, folder_id: Option<&str>, pn: u32, ps: u32) -> ApiResult<FolderListing> {
        let query = FolderQuery { folder_id, pn, ps };
        let detail: FolderDetail = self.get("api/v1/file/folder/detail", &query).await?;
        debug!("Folder {} has {} entries on page {}", detail.file_id, detail.files.len(), pn);
        Ok(detail.into())
    }

    /// Resolve the download URL of a document
    pub async fn download_file(&self, file_id: &str) -> ApiResult<String> {
        self.get("/api/v1/file/download", &[("fileId", file_id)]).await
    }

    pub async fn create_folder(&self, folder_id: &str, name: &str, description: Option<&str>) -> ApiResult<Value> {
        info!("Creating folder '{}' in {}", name, folder_id);
        let body = json!({
            "folderId": folder_id,
            "name": name,
            "description": description,
            "fileType": FileType::Folder,
        });
        self.post("/api/v1/file/create", &body).await
    }

    /// Upload file content into a folder
    pub async fn put_file(&self, path: &Path, folder_id: &str) -> ApiResult<UploadedFile> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ApiError::Config(format!("not a file path: {}", path.display())))?
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        info!("Uploading {} ({} bytes) to {}", file_name, bytes.len(), folder_id);

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("folderId", folder_id.to_string());
        self.put_multipart("/api/v1/file/upload", form).await
    }

    /// Whether a file with this name already exists in the folder
    pub async fn check_exist(&self, name: &str, folder_id: &str) -> ApiResult<bool> {
        self.get("/api/v1/file/check/exist", &[("folderId", folder_id), ("fileName", name)])
            .await
    }

    /// Record an uploaded document in a folder
    pub async fn save_file(&self, params: &SaveFileParams) -> ApiResult<Value> {
        let mut body = serde_json::to_value(params)?;
        body["fileType"] = json!(FileType::Document);
        self.post("/api/v1/file/create", &body).await
    }

    pub async fn get_all_folders(&self) -> ApiResult<FolderNode> {
        self.fetch("/api/v1/file/getAllFolder").await
    }

    pub async fn search_file(&self, params: &SearchParams) -> ApiResult<SearchResult> {
        debug!("Searching for '{}'", params.keyword);
        self.post("/api/v1/file/search", params).await
    }

    pub async fn delete_file(&self, file_id: &str) -> ApiResult<Value> {
        info!("Deleting {}", file_id);
        self.get("/api/v1/file/delete", &[("fileId", file_id)]).await
    }

    /// Rename a file or folder
    ///
    /// The backend reads rename parameters from the query string.
    pub async fn rename_file(&self, file_id: &str, name: &str) -> ApiResult<Value> {
        info!("Renaming {} to '{}'", file_id, name);
        self.request::<Value, _, ()>(
            reqwest::Method::POST,
            "/api/v1/file/update",
            Some(&[("fileId", file_id), ("name", name)]),
            None,
        )
        .await
    }

    /// Replace name and tag values of a file
    pub async fn update_file(&self, file_id: &str, name: &str, tags: &HashMap<String, TagValue>) -> ApiResult<Value> {
        let body = json!({
            "fileId": file_id,
            "name": name,
            "tags": tags,
        });
        self.post("/api/v1/file/update", &body).await
    }
}
