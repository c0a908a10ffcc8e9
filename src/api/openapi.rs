//! OpenAPI documentation configuration.

use actix_web::{HttpResponse, get, web};
use utoipa::OpenApi;

use crate::config::ADMIN_KEY_HEADER;
use crate::{api, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Folio Server",
        version = "0.1.0",
        description = "Backend for a personal blog and portfolio: articles, a moderated guestbook and image uploads"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Content endpoints
        api::articles::article_endpoint,
        api::messages::message_endpoint,
        api::message_admin::message_admin_endpoint,
        // Upload endpoints
        api::uploads::upload_endpoint,
        api::images::get_image,
    ),
    components(
        schemas(
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Common
            models::CreatedId,
            models::Pagination,
            // Articles
            models::ArticleInput,
            models::ArticlePatch,
            models::ArticleResponse,
            // Messages
            models::MessageResponse,
            models::PublicMessageResponse,
            // Uploads
            models::StorageType,
            models::UploadResponse,
            models::UploadRecordResponse,
            models::upload::ImageDataResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Articles", description = "Article publishing and reading"),
        (name = "Messages", description = "Guestbook submission and moderation"),
        (name = "Uploads", description = "Image uploads and serving")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add admin key security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "admin_key",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new(ADMIN_KEY_HEADER),
                    ),
                ),
            );
        }
    }
}

/// Serve the OpenAPI document as JSON.
#[get("/api-docs/openapi.json")]
pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Configure documentation routes.
pub fn configure_openapi_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(openapi_json);
}
