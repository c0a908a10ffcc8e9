//! Image upload service.
//!
//! Uploads go to object storage when it is configured and reachable. When
//! it is not, the bytes are kept in the process-local [`ImageCache`] and the
//! client receives a `data:` URL instead. Either way a record is persisted
//! with the storage type that was used.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{info, warn};
use uuid::Uuid;

use super::image_cache::{ImageCache, cache_key};
use super::storage::{ObjectStore, content_type_for_extension};
use crate::db::DbPool;
use crate::db::uploads::NewUpload;
use crate::error::{AppError, AppResult};
use crate::models::upload::{StorageType, UploadImageInput, UploadResponse};

// ============================================================================
// Constants
// ============================================================================

/// Extensions accepted for upload, compared lower-cased.
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "svg"];

/// Directory prefix for stored images.
const IMAGE_DIR: &str = "images";

// ============================================================================
// Types
// ============================================================================

/// A decoded, validated image ready to be stored.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub original_name: String,
    /// `<uuid>.<ext>`
    pub filename: String,
    /// `images/<filename>`
    pub path: String,
    pub mime: String,
    pub data: Vec<u8>,
}

/// Where an image ended up.
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub url: String,
    pub storage_type: StorageType,
}

/// Upload pipeline shared by the upload and file endpoints.
#[derive(Clone)]
pub struct ImageUploader {
    store: Option<Arc<dyn ObjectStore>>,
    cache: ImageCache,
    max_size: usize,
}

// ============================================================================
// Validation
// ============================================================================

/// Lower-cased text after the last `.`, if any.
pub fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

pub fn is_allowed_extension(ext: &str) -> bool {
    ALLOWED_EXTENSIONS.contains(&ext)
}

/// Strip an optional `data:<mime>;base64,` prefix.
fn strip_data_uri(file: &str) -> &str {
    let file = file.trim();
    if file.starts_with("data:") {
        if let Some((_, payload)) = file.split_once(";base64,") {
            return payload;
        }
    }
    file
}

/// Validate and decode an upload payload.
///
/// Nothing here touches a storage backend, so a rejected extension or
/// payload never reaches object storage or the cache.
pub fn prepare_image(input: UploadImageInput, max_size: usize) -> AppResult<PreparedImage> {
    let (Some(file), Some(original_name)) = (
        input.file.filter(|f| !f.is_empty()),
        input.filename.filter(|f| !f.is_empty()),
    ) else {
        return Err(AppError::InvalidInput(
            "文件内容和文件名不能为空".to_string(),
        ));
    };

    let ext = file_extension(&original_name)
        .filter(|ext| is_allowed_extension(ext))
        .ok_or_else(|| AppError::InvalidInput("只允许上传图片文件".to_string()))?;

    let payload = strip_data_uri(&file);

    // Reject oversized payloads before decoding them.
    if payload.len() / 4 * 3 > max_size.saturating_add(3) {
        return Err(AppError::InvalidInput("文件过大".to_string()));
    }

    let data = STANDARD
        .decode(payload)
        .map_err(|_| AppError::InvalidInput("文件内容不是合法的Base64".to_string()))?;

    if data.len() > max_size {
        return Err(AppError::InvalidInput("文件过大".to_string()));
    }

    let mime = input
        .mime
        .filter(|m| m.starts_with("image/"))
        .unwrap_or_else(|| content_type_for_extension(&ext).to_string());

    let filename = format!("{}.{}", Uuid::new_v4(), ext);
    let path = format!("{}/{}", IMAGE_DIR, filename);

    Ok(PreparedImage {
        original_name,
        filename,
        path,
        mime,
        data,
    })
}

/// `data:` URL for an image held in memory.
pub fn data_url(mime: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(data))
}

// ============================================================================
// Service
// ============================================================================

impl ImageUploader {
    pub fn new(store: Option<Arc<dyn ObjectStore>>, cache: ImageCache, max_size: usize) -> Self {
        Self {
            store,
            cache,
            max_size,
        }
    }

    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    /// Store an image in object storage, falling back to the cache.
    pub async fn store_image(&self, image: &PreparedImage) -> StoredImage {
        if let Some(store) = &self.store {
            match store.put(&image.path, image.data.clone(), &image.mime).await {
                Ok(url) => {
                    return StoredImage {
                        url,
                        storage_type: StorageType::Cloud,
                    };
                }
                Err(e) => {
                    warn!(
                        "Object storage upload failed for {}, using image cache: {}",
                        image.path, e
                    );
                }
            }
        }

        self.cache
            .insert(cache_key(&image.path), image.data.clone(), image.mime.clone())
            .await;

        StoredImage {
            url: data_url(&image.mime, &image.data),
            storage_type: StorageType::Memory,
        }
    }

    /// Validate, store and record an upload.
    pub async fn upload(&self, pool: &DbPool, input: UploadImageInput) -> AppResult<UploadResponse> {
        let image = prepare_image(input, self.max_size)?;
        let stored = self.store_image(&image).await;

        let record = pool
            .insert_upload(NewUpload {
                original_name: image.original_name,
                filename: image.filename,
                path: image.path,
                url: stored.url,
                mime: image.mime,
                size: image.data.len() as i64,
                storage_type: stored.storage_type,
            })
            .await?;

        info!(
            "Stored upload {} ({} bytes, {})",
            record.filename, record.size, record.storage_type
        );

        Ok(UploadResponse {
            url: record.url,
            filename: record.filename,
            path: record.path,
            storage_type: stored.storage_type,
        })
    }

    /// Delete an upload's bytes and record. Returns false when no record exists.
    ///
    /// A failed object deletion is logged and does not keep the record.
    pub async fn delete(&self, pool: &DbPool, id: Uuid) -> AppResult<bool> {
        let Some(record) = pool.get_upload(id).await? else {
            return Ok(false);
        };

        if StorageType::parse(&record.storage_type) == Some(StorageType::Cloud) {
            match &self.store {
                Some(store) => {
                    if let Err(e) = store.delete(&record.path).await {
                        warn!("Failed to delete {} from object storage: {}", record.path, e);
                    }
                }
                None => warn!(
                    "Upload {} is in object storage but storage is not configured",
                    record.path
                ),
            }
        }

        self.cache.remove(&cache_key(&record.path)).await;

        pool.delete_upload(id).await
    }

    /// Fetch an object for the file proxy route.
    pub async fn fetch(&self, key: &str) -> AppResult<(Vec<u8>, Option<String>)> {
        match &self.store {
            Some(store) => store.get(key).await,
            None => Err(AppError::NotFound("文件不存在".to_string())),
        }
    }
}
