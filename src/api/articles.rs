//! Article API handler.

use actix_web::{HttpRequest, HttpResponse, post, web};
use tracing::info;

use super::dispatch::{ActionBody, EndpointAction, parse_action, require_id};
use crate::auth::AdminKey;
use crate::db::DbPool;
use crate::error::{AppError, AppResult, OperationContext};
use crate::models::article::{ArticleAction, ArticleInput, ArticlePatch, ListArticlesQuery};
use crate::models::{ArticleResponse, CreatedId, Envelope, Page, Pagination};

const ID_REQUIRED: &str = "文章ID不能为空";
const NOT_FOUND: &str = "文章不存在";

impl EndpointAction for ArticleAction {
    const ACTIONS: &'static [(&'static str, bool)] = &[
        ("list", false),
        ("get", false),
        ("add", true),
        ("update", true),
        ("delete", true),
    ];

    fn name(&self) -> &'static str {
        ArticleAction::name(self)
    }
}

/// Article endpoint.
///
/// Actions: `list`, `get` (public); `add`, `update`, `delete` (admin).
#[utoipa::path(
    post,
    path = "/article",
    tag = "Articles",
    responses(
        (status = 200, description = "Envelope with the action result; failures carry ok=false")
    )
)]
#[post("/article")]
pub async fn article_endpoint(
    req: HttpRequest,
    body: ActionBody,
    pool: web::Data<DbPool>,
    admin: web::Data<AdminKey>,
) -> AppResult<HttpResponse> {
    let action: ArticleAction = parse_action(&req, &body.0, &admin)?;
    info!(target: "api", "article action: {}", action.name());

    match action {
        ArticleAction::List(query) => list_articles(&pool, query).await,
        ArticleAction::Get { id } => get_article(&pool, id).await,
        ArticleAction::Add { article } => add_article(&pool, article).await,
        ArticleAction::Update { id, article } => update_article(&pool, id, article).await,
        ArticleAction::Delete { id } => delete_article(&pool, id).await,
    }
}

async fn list_articles(pool: &DbPool, query: ListArticlesQuery) -> AppResult<HttpResponse> {
    let (rows, total) = pool
        .list_articles(&query)
        .await
        .context("获取文章列表失败")?;

    let page = Page {
        list: rows
            .into_iter()
            .map(|(article, tags)| ArticleResponse::summary(article, tags))
            .collect(),
        pagination: Pagination::new(&query.page_params(), total),
    };

    Ok(HttpResponse::Ok().json(Envelope::data(page)))
}

async fn get_article(pool: &DbPool, id: Option<String>) -> AppResult<HttpResponse> {
    let id = require_id(id, ID_REQUIRED, NOT_FOUND)?;

    let (article, tags) = pool
        .view_article(id)
        .await
        .context("获取文章失败")?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

    Ok(HttpResponse::Ok().json(Envelope::data(ArticleResponse::from_model(article, tags))))
}

async fn add_article(pool: &DbPool, input: Option<ArticleInput>) -> AppResult<HttpResponse> {
    let new = input
        .and_then(ArticleInput::validate)
        .ok_or_else(|| AppError::InvalidInput("标题和内容不能为空".to_string()))?;

    let (article, _) = pool.insert_article(new).await.context("发布文章失败")?;
    info!("Article {} published", article.id);

    Ok(HttpResponse::Ok().json(
        Envelope::data(CreatedId {
            id: article.id.to_string(),
        })
        .with_msg("文章发布成功"),
    ))
}

async fn update_article(
    pool: &DbPool,
    id: Option<String>,
    patch: Option<ArticlePatch>,
) -> AppResult<HttpResponse> {
    let id = require_id(id, ID_REQUIRED, NOT_FOUND)?;
    let patch = patch
        .filter(ArticlePatch::has_body_change)
        .ok_or_else(|| AppError::InvalidInput("更新内容不能为空".to_string()))?;

    let (article, tags) = pool
        .update_article(id, patch)
        .await
        .context("更新文章失败")?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;
    info!("Article {} updated", article.id);

    Ok(HttpResponse::Ok()
        .json(Envelope::data(ArticleResponse::from_model(article, tags)).with_msg("文章更新成功")))
}

async fn delete_article(pool: &DbPool, id: Option<String>) -> AppResult<HttpResponse> {
    let id = require_id(id, ID_REQUIRED, NOT_FOUND)?;

    if !pool.delete_article(id).await.context("删除文章失败")? {
        return Err(AppError::NotFound(NOT_FOUND.to_string()));
    }
    info!("Article {} deleted", id);

    Ok(HttpResponse::Ok().json(Envelope::msg("文章删除成功")))
}

/// Configure article routes.
pub fn configure_article_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(article_endpoint);
}
