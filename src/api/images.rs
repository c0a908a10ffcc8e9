//! Serving images held in the fallback image cache.

use actix_web::http::header::{ACCEPT, CACHE_CONTROL};
use actix_web::{HttpRequest, HttpResponse, get, web};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use tracing::debug;
use utoipa::IntoParams;

use crate::error::{AppError, AppResult};
use crate::models::Envelope;
use crate::models::upload::ImageDataResponse;
use crate::services::ImageCache;

/// Browsers may keep cached images for a year; keys are unique per upload.
const IMAGE_CACHE_CONTROL: &str = "public, max-age=31536000";

#[derive(Debug, Deserialize, IntoParams)]
pub struct ImageQuery {
    /// Cache key, e.g. `/uploads/images/<uuid>.png`
    pub key: Option<String>,
}

fn wants_json(req: &HttpRequest) -> bool {
    req.headers()
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"))
}

/// Serve a cached image.
///
/// Returns raw bytes, or a JSON envelope with the base64 content when the
/// client asks for `application/json`.
#[utoipa::path(
    get,
    path = "/get-image",
    tag = "Uploads",
    params(ImageQuery),
    responses(
        (status = 200, description = "Image bytes, or an envelope when Accept is application/json")
    )
)]
#[get("/get-image")]
pub async fn get_image(
    req: HttpRequest,
    query: web::Query<ImageQuery>,
    cache: web::Data<ImageCache>,
) -> AppResult<HttpResponse> {
    let key = query
        .into_inner()
        .key
        .filter(|k| !k.is_empty())
        .ok_or_else(|| AppError::InvalidInput("缺少图片标识符".to_string()))?;

    let image = cache
        .get(&key)
        .await
        .ok_or_else(|| AppError::NotFound("图片不存在或已过期".to_string()))?;
    debug!("Serving cached image {} ({} bytes)", key, image.data.len());

    if wants_json(&req) {
        let content = STANDARD.encode(&image.data);
        let html = format!("<img src=\"data:{};base64,{}\" />", image.mime, content);
        return Ok(HttpResponse::Ok().json(Envelope::data(ImageDataResponse {
            content,
            mime: image.mime,
            html,
        })));
    }

    Ok(HttpResponse::Ok()
        .content_type(image.mime)
        .insert_header((CACHE_CONTROL, IMAGE_CACHE_CONTROL))
        .body(image.data))
}

/// Configure image routes.
pub fn configure_image_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_image);
}
