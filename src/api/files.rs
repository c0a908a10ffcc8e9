//! File serving API handlers.
//!
//! Proxies object storage reads when the bucket has no public URL.

use actix_web::{HttpResponse, web};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::services::ImageUploader;
use crate::services::storage::content_type_for_extension;

/// Serve an uploaded image from object storage.
pub async fn serve_file(
    uploader: web::Data<ImageUploader>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let key = path.into_inner();

    // Only uploaded images are reachable through the proxy
    if !key.starts_with("images/") || key.contains("..") {
        return Err(AppError::NotFound("文件不存在".to_string()));
    }

    debug!("Serving file from object storage: {}", key);

    let (data, content_type) = uploader.fetch(&key).await?;

    let content_type = content_type.unwrap_or_else(|| {
        let ext = key.rsplit('.').next().unwrap_or("");
        content_type_for_extension(ext).to_string()
    });

    Ok(HttpResponse::Ok().content_type(content_type).body(data))
}

/// Configure file routes.
pub fn configure_file_routes(cfg: &mut web::ServiceConfig) {
    // Serve files from object storage: /files/{key:.*}
    cfg.service(web::resource("/files/{key:.*}").route(web::get().to(serve_file)));
}
