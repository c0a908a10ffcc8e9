//! Database queries for uploaded image records.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, QuerySelect, Set};
use uuid::Uuid;

use crate::entity::upload::{self, ActiveModel, Entity as Upload};
use crate::error::{AppError, AppResult};
use crate::models::StorageType;

use super::DbPool;

/// Maximum number of records returned by the upload list.
pub const UPLOAD_LIST_LIMIT: u64 = 100;

/// Fields of a freshly stored upload.
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub original_name: String,
    pub filename: String,
    pub path: String,
    pub url: String,
    pub mime: String,
    pub size: i64,
    pub storage_type: StorageType,
}

impl DbPool {
    /// Record an upload.
    pub async fn insert_upload(&self, new: NewUpload) -> AppResult<upload::Model> {
        let now = Utc::now();
        let model = ActiveModel {
            id: Set(Uuid::now_v7()),
            original_name: Set(new.original_name),
            filename: Set(new.filename),
            path: Set(new.path),
            url: Set(new.url),
            mime: Set(new.mime),
            size: Set(new.size),
            upload_time: Set(now),
            last_accessed: Set(now),
            storage_type: Set(new.storage_type.as_str().to_string()),
        };

        model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert upload: {}", e)))
    }

    /// Newest uploads first, capped at [`UPLOAD_LIST_LIMIT`].
    pub async fn list_uploads(&self) -> AppResult<Vec<upload::Model>> {
        Upload::find()
            .order_by_desc(upload::Column::UploadTime)
            .limit(UPLOAD_LIST_LIMIT)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list uploads: {}", e)))
    }

    /// Get an upload record by ID.
    pub async fn get_upload(&self, id: Uuid) -> AppResult<Option<upload::Model>> {
        Upload::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get upload: {}", e)))
    }

    /// Delete an upload record. Returns false when nothing was deleted.
    pub async fn delete_upload(&self, id: Uuid) -> AppResult<bool> {
        let result = Upload::delete_by_id(id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete upload: {}", e)))?;

        Ok(result.rows_affected > 0)
    }
}
