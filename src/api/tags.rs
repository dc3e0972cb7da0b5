//! Tag configuration endpoints

use serde_json::{json, Value};
use tracing::info;

use super::{client::ApiClient, errors::ApiResult, types::*};

impl ApiClient {
    /// Tags whose label matches `name`
    pub async fn search_tags(&self, name: &str) -> ApiResult<Vec<TagValue>> {
        self.get("/api/v1/tag/search", &[("name", name)]).await
    }

    pub async fn get_all_tags(&self) -> ApiResult<Vec<TagItem>> {
        self.fetch("/api/v1/tag/config/all").await
    }

    /// Create a tag; `tag.tag_id` must be empty
    pub async fn add_tag(&self, tag: &TagItem) -> ApiResult<Value> {
        info!("Adding tag '{}'", tag.label);
        self.post("/api/v1/tag/config/saveOrUpdate", tag).await
    }

    pub async fn edit_tag(&self, tag: &TagItem) -> ApiResult<Value> {
        info!("Updating tag {}", tag.tag_id);
        self.post("/api/v1/tag/config/saveOrUpdate", tag).await
    }

    pub async fn delete_tag(&self, tag_id: &str) -> ApiResult<Value> {
        info!("Deleting tag {}", tag_id);
        self.post("/api/v1/tag/config/delete", &json!({ "tagId": tag_id }))
            .await
    }
}
