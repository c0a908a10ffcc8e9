//! Domain models and wire types for the blog server.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod article;
pub mod message;
pub mod upload;

// Re-export commonly used types
pub use article::{ArticleAction, ArticleInput, ArticlePatch, ArticleResponse};
pub use message::{
    MessageAction, MessageAdminAction, MessageResponse, ModerationAction, ModerationStatus,
    PublicMessageResponse,
};
pub use upload::{StorageType, UploadAction, UploadRecordResponse, UploadResponse};

/// Uniform response envelope: `{ok, data?, msg?, error?, detail?}`.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl<T> Envelope<T> {
    /// Successful envelope carrying data.
    pub fn data(data: T) -> Self {
        Envelope {
            ok: true,
            data: Some(data),
            msg: None,
            error: None,
            detail: None,
        }
    }

    /// Attach a human-readable message.
    pub fn with_msg(mut self, msg: impl Into<String>) -> Self {
        self.msg = Some(msg.into());
        self
    }
}

impl Envelope<()> {
    /// Successful envelope with only a message.
    pub fn msg(msg: impl Into<String>) -> Self {
        Envelope {
            ok: true,
            data: None,
            msg: Some(msg.into()),
            error: None,
            detail: None,
        }
    }

    /// Failure envelope.
    pub fn failure(error: impl Into<String>, detail: Option<String>) -> Self {
        Envelope {
            ok: false,
            data: None,
            msg: None,
            error: Some(error.into()),
            detail,
        }
    }
}

/// Id returned by create operations.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedId {
    pub id: String,
}

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_SIZE: i64 = 10;
const MAX_SIZE: i64 = 100;
/// Highest page whose offset still fits a signed 64-bit bind parameter.
const MAX_PAGE: i64 = i64::MAX / MAX_SIZE;

/// Page and size as sent by the client. Values are clamped, never rejected.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl PageParams {
    pub fn new(page: i64, size: i64) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
        }
    }

    /// Page number, clamped to 1..=MAX_PAGE.
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE) as u64
    }

    /// Page size, clamped to 1..=100.
    pub fn size(&self) -> u64 {
        self.size.unwrap_or(DEFAULT_SIZE).clamp(1, MAX_SIZE) as u64
    }

    /// Calculate the offset for database queries.
    pub fn offset(&self) -> u64 {
        (self.page() - 1).saturating_mul(self.size())
    }
}

/// Pagination metadata for responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub size: u64,
    pub pages: u64,
}

impl Pagination {
    /// Create pagination metadata from clamped params and the total row count.
    pub fn new(params: &PageParams, total: u64) -> Self {
        let size = params.size();
        Pagination {
            total,
            page: params.page(),
            size,
            pages: total.div_ceil(size),
        }
    }
}

/// A page of rows with its pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub list: Vec<T>,
    pub pagination: Pagination,
}
