//! Guestbook moderation API handler. Every action requires the admin credential.

use actix_web::{HttpRequest, HttpResponse, post, web};
use tracing::info;
use uuid::Uuid;

use super::dispatch::{ActionBody, EndpointAction, parse_action, require_id};
use super::messages::message_filter;
use crate::auth::AdminKey;
use crate::db::DbPool;
use crate::db::messages::Transition;
use crate::error::{AppError, AppResult, OperationContext};
use crate::models::message::{ListMessagesQuery, MessageAdminAction, ModerationAction};
use crate::models::{Envelope, MessageResponse, Page, Pagination};

const ID_REQUIRED: &str = "留言ID不能为空";
const NOT_FOUND: &str = "留言不存在";

impl EndpointAction for MessageAdminAction {
    const ACTIONS: &'static [(&'static str, bool)] = &[
        ("list", true),
        ("detail", true),
        ("approve", true),
        ("reject", true),
        ("reply", true),
        ("delete", true),
    ];

    fn name(&self) -> &'static str {
        MessageAdminAction::name(self)
    }
}

/// Message administration endpoint.
///
/// Actions: `list`, `detail`, `approve`, `reject`, `reply`, `delete`.
#[utoipa::path(
    post,
    path = "/message-admin",
    tag = "Messages",
    responses(
        (status = 200, description = "Envelope with the action result; failures carry ok=false")
    ),
    security(("admin_key" = []))
)]
#[post("/message-admin")]
pub async fn message_admin_endpoint(
    req: HttpRequest,
    body: ActionBody,
    pool: web::Data<DbPool>,
    admin: web::Data<AdminKey>,
) -> AppResult<HttpResponse> {
    let action: MessageAdminAction = parse_action(&req, &body.0, &admin)?;
    info!(target: "api", "message-admin action: {}", action.name());

    match action {
        MessageAdminAction::List(query) => list_messages(&pool, query).await,
        MessageAdminAction::Detail { id } => message_detail(&pool, id).await,
        MessageAdminAction::Approve { id } => {
            let id = require_id(id, ID_REQUIRED, NOT_FOUND)?;
            moderate(&pool, id, ModerationAction::Approve, None).await
        }
        MessageAdminAction::Reject { id } => {
            let id = require_id(id, ID_REQUIRED, NOT_FOUND)?;
            moderate(&pool, id, ModerationAction::Reject, None).await
        }
        MessageAdminAction::Reply { id, reply_content } => {
            let id = require_id(id, ID_REQUIRED, NOT_FOUND)?;
            let reply = reply_content
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .ok_or_else(|| AppError::InvalidInput("回复内容不能为空".to_string()))?;
            moderate(&pool, id, ModerationAction::Reply, Some(reply)).await
        }
        MessageAdminAction::Delete { id } => delete_message(&pool, id).await,
    }
}

async fn list_messages(pool: &DbPool, query: ListMessagesQuery) -> AppResult<HttpResponse> {
    let filter = message_filter(&query)?;
    let params = query.page_params();

    let (rows, total) = pool
        .list_messages(&filter, &params)
        .await
        .context("获取留言列表失败")?;

    let page = Page {
        list: rows
            .into_iter()
            .map(MessageResponse::from)
            .collect::<Vec<_>>(),
        pagination: Pagination::new(&params, total),
    };

    Ok(HttpResponse::Ok().json(Envelope::data(page)))
}

async fn message_detail(pool: &DbPool, id: Option<String>) -> AppResult<HttpResponse> {
    let id = require_id(id, ID_REQUIRED, NOT_FOUND)?;

    let message = pool
        .get_message(id)
        .await
        .context("获取留言详情失败")?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

    Ok(HttpResponse::Ok().json(Envelope::data(MessageResponse::from(message))))
}

async fn moderate(
    pool: &DbPool,
    id: Uuid,
    action: ModerationAction,
    reply: Option<String>,
) -> AppResult<HttpResponse> {
    let (failure, success) = match action {
        ModerationAction::Approve => ("审核留言失败", "审核通过成功"),
        ModerationAction::Reject => ("拒绝留言失败", "拒绝留言成功"),
        ModerationAction::Reply => ("回复留言失败", "回复留言成功"),
    };

    match pool
        .moderate_message(id, action, reply)
        .await
        .context(failure)?
    {
        Transition::Applied(message) => {
            info!("Message {} moderated: {:?}", id, action);
            Ok(HttpResponse::Ok()
                .json(Envelope::data(MessageResponse::from(message)).with_msg(success)))
        }
        Transition::Refused => Err(AppError::Conflict("留言已被处理".to_string())),
        Transition::NotFound => Err(AppError::NotFound(NOT_FOUND.to_string())),
    }
}

async fn delete_message(pool: &DbPool, id: Option<String>) -> AppResult<HttpResponse> {
    let id = require_id(id, ID_REQUIRED, NOT_FOUND)?;

    if !pool.delete_message(id).await.context("删除留言失败")? {
        return Err(AppError::NotFound(NOT_FOUND.to_string()));
    }
    info!("Message {} deleted", id);

    Ok(HttpResponse::Ok().json(Envelope::msg("删除留言成功")))
}

/// Configure message administration routes.
pub fn configure_message_admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(message_admin_endpoint);
}
