//! Image upload models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::upload;

/// Where the bytes of an upload live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// S3-compatible object storage
    Cloud,
    /// Process-local image cache
    Memory,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cloud => "cloud",
            Self::Memory => "memory",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cloud" => Some(Self::Cloud),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Actions accepted by the upload endpoint. Every one requires the admin credential.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum UploadAction {
    Upload(UploadImageInput),
    List,
    Delete {
        id: Option<String>,
    },
}

impl UploadAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Upload(_) => "upload",
            Self::List => "list",
            Self::Delete { .. } => "delete",
        }
    }
}

/// Image upload payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadImageInput {
    /// Base64 content, optionally as a `data:` URI
    pub file: Option<String>,
    /// Original filename, used for the extension
    pub filename: Option<String>,
    pub mime: Option<String>,
}

/// Returned after a successful upload.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub url: String,
    pub filename: String,
    pub path: String,
    pub storage_type: StorageType,
}

/// Upload record as listed to the admin.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadRecordResponse {
    pub id: Uuid,
    pub original_name: String,
    pub filename: String,
    pub path: String,
    pub url: String,
    pub mime: String,
    pub size: i64,
    pub upload_time: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub storage_type: String,
}

impl From<upload::Model> for UploadRecordResponse {
    fn from(m: upload::Model) -> Self {
        Self {
            id: m.id,
            original_name: m.original_name,
            filename: m.filename,
            path: m.path,
            url: m.url,
            mime: m.mime,
            size: m.size,
            upload_time: m.upload_time,
            last_accessed: m.last_accessed,
            storage_type: m.storage_type,
        }
    }
}

/// JSON view of a cached image for clients that cannot take raw bytes.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImageDataResponse {
    /// Base64 encoded bytes
    pub content: String,
    pub mime: String,
    /// Ready-to-embed `<img>` tag
    pub html: String,
}
