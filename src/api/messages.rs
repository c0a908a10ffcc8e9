//! Public guestbook API handler.

use actix_web::{HttpRequest, HttpResponse, post, web};
use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::dispatch::{ActionBody, EndpointAction, client_ip, parse_action};
use crate::auth::AdminKey;
use crate::db::DbPool;
use crate::error::{AppError, AppResult, OperationContext};
use crate::models::message::{
    ListMessagesQuery, MessageAction, MessageFilter, ModerationStatus, NewMessage,
    NewMessageInput,
};
use crate::models::{CreatedId, Envelope, Page, Pagination, PublicMessageResponse};

impl EndpointAction for MessageAction {
    const ACTIONS: &'static [(&'static str, bool)] = &[("test", false), ("add", false), ("list", false)];

    fn name(&self) -> &'static str {
        MessageAction::name(self)
    }
}

#[derive(Serialize)]
struct ConnectivityCheck {
    time: String,
}

/// Public message endpoint.
///
/// Actions: `test`, `add`, `list`.
#[utoipa::path(
    post,
    path = "/message",
    tag = "Messages",
    responses(
        (status = 200, description = "Envelope with the action result; failures carry ok=false")
    )
)]
#[post("/message")]
pub async fn message_endpoint(
    req: HttpRequest,
    body: ActionBody,
    pool: web::Data<DbPool>,
    admin: web::Data<AdminKey>,
) -> AppResult<HttpResponse> {
    let action: MessageAction = parse_action(&req, &body.0, &admin)?;
    info!(target: "api", "message action: {}", action.name());

    match action {
        MessageAction::Test => Ok(HttpResponse::Ok().json(
            Envelope::data(ConnectivityCheck {
                time: Utc::now().to_rfc3339(),
            })
            .with_msg("API连接成功"),
        )),
        MessageAction::Add(input) => add_message(&pool, input, client_ip(&req)).await,
        MessageAction::List(query) => list_messages(&pool, query).await,
    }
}

async fn add_message(pool: &DbPool, input: NewMessageInput, ip: String) -> AppResult<HttpResponse> {
    let content = non_empty(input.content)
        .ok_or_else(|| AppError::InvalidInput("留言内容不能为空".to_string()))?;
    let nickname = non_empty(input.nickname)
        .ok_or_else(|| AppError::InvalidInput("昵称不能为空".to_string()))?;

    // A malformed article reference is dropped rather than rejected.
    let article_id = input
        .article_id
        .and_then(|id| Uuid::parse_str(id.trim()).ok());

    let message = pool
        .insert_message(NewMessage {
            content,
            nickname,
            email: input.email.unwrap_or_default(),
            website: input.website.unwrap_or_default(),
            article_id,
            ip,
        })
        .await
        .context("留言提交失败，请稍后重试")?;
    info!("Message {} submitted, awaiting moderation", message.id);

    Ok(HttpResponse::Ok().json(
        Envelope::data(CreatedId {
            id: message.id.to_string(),
        })
        .with_msg("留言提交成功，等待审核！"),
    ))
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
            .map(PublicMessageResponse::from)
            .collect::<Vec<_>>(),
        pagination: Pagination::new(&params, total),
    };

    Ok(HttpResponse::Ok().json(Envelope::data(page)))
}

/// Validate list filters. An unknown status code is rejected.
pub(crate) fn message_filter(query: &ListMessagesQuery) -> AppResult<MessageFilter> {
    let status = match query.status {
        Some(code) => Some(
            ModerationStatus::from_code(code)
                .ok_or_else(|| AppError::InvalidInput("状态参数错误".to_string()))?,
        ),
        None => None,
    };

    let article_id = match non_empty(query.article_id.clone()) {
        Some(id) => Some(
            Uuid::parse_str(&id)
                .map_err(|_| AppError::InvalidInput("文章ID格式错误".to_string()))?,
        ),
        None => None,
    };

    Ok(MessageFilter { status, article_id })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Configure public message routes.
pub fn configure_message_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(message_endpoint);
}
