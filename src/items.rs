//! The decrypted vault document (spec §3): `VaultDocument { version, items }`
//! and the closed `VaultItemType` enum.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VaultItemType {
    Password,
    Note,
    Secret,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultItem {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub item_type: VaultItemType,
    pub title: String,
    /// Empty for `file`-typed items.
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub created_at: u64,
    pub modified_at: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultDocument {
    pub version: u32,
    #[serde(default)]
    pub items: Vec<VaultItem>,
}

impl Default for VaultDocument {
    fn default() -> Self {
        Self {
            version: 1,
            items: Vec::new(),
        }
    }
}

impl VaultItem {
    /// Case-insensitive substring match over the searchable text fields
    /// (spec §4.7 `search`).
    pub fn matches(&self, query_lower: &str) -> bool {
        if self.title.to_lowercase().contains(query_lower) {
            return true;
        }
        if self.content.to_lowercase().contains(query_lower) {
            return true;
        }
        if let Some(url) = &self.url
            && url.to_lowercase().contains(query_lower)
        {
            return true;
        }
        if let Some(username) = &self.username
            && username.to_lowercase().contains(query_lower)
        {
            return true;
        }
        if let Some(file_name) = &self.file_name
            && file_name.to_lowercase().contains(query_lower)
        {
            return true;
        }
        false
    }
}
