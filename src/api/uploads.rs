//! Image upload API handler. Every action requires the admin credential.

use actix_web::{HttpRequest, HttpResponse, post, web};
use tracing::info;

use super::dispatch::{ActionBody, EndpointAction, parse_action, require_id};
use crate::auth::AdminKey;
use crate::db::DbPool;
use crate::error::{AppError, AppResult, OperationContext};
use crate::models::upload::UploadImageInput;
use crate::models::{Envelope, UploadAction, UploadRecordResponse};
use crate::services::ImageUploader;

impl EndpointAction for UploadAction {
    const ACTIONS: &'static [(&'static str, bool)] = &[("upload", true), ("list", true), ("delete", true)];

    fn name(&self) -> &'static str {
        UploadAction::name(self)
    }
}

/// Upload endpoint.
///
/// Actions: `upload`, `list`, `delete`.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "Uploads",
    responses(
        (status = 200, description = "Envelope with the action result; failures carry ok=false")
    ),
    security(("admin_key" = []))
)]
#[post("/upload")]
pub async fn upload_endpoint(
    req: HttpRequest,
    body: ActionBody,
    pool: web::Data<DbPool>,
    admin: web::Data<AdminKey>,
    uploader: web::Data<ImageUploader>,
) -> AppResult<HttpResponse> {
    let action: UploadAction = parse_action(&req, &body.0, &admin)?;
    info!(target: "api", "upload action: {}", action.name());

    match action {
        UploadAction::Upload(input) => upload_image(&pool, &uploader, input).await,
        UploadAction::List => list_uploads(&pool).await,
        UploadAction::Delete { id } => delete_upload(&pool, &uploader, id).await,
    }
}

async fn upload_image(
    pool: &DbPool,
    uploader: &ImageUploader,
    input: UploadImageInput,
) -> AppResult<HttpResponse> {
    let uploaded = uploader.upload(pool, input).await.context("上传文件失败")?;

    Ok(HttpResponse::Ok().json(Envelope::data(uploaded).with_msg("上传成功")))
}

async fn list_uploads(pool: &DbPool) -> AppResult<HttpResponse> {
    let records = pool.list_uploads().await.context("获取文件列表失败")?;

    let list: Vec<UploadRecordResponse> = records.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(Envelope::data(list)))
}

async fn delete_upload(
    pool: &DbPool,
    uploader: &ImageUploader,
    id: Option<String>,
) -> AppResult<HttpResponse> {
    let id = require_id(id, "文件ID不能为空", "文件不存在")?;

    if !uploader.delete(pool, id).await.context("删除文件失败")? {
        return Err(AppError::NotFound("文件不存在".to_string()));
    }
    info!("Upload {} deleted", id);

    Ok(HttpResponse::Ok().json(Envelope::msg("文件删除成功")))
}

/// Configure upload routes.
pub fn configure_upload_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(upload_endpoint);
}
