//! Article models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::PageParams;
use crate::entity::article;

/// Number of characters kept in list excerpts.
pub const EXCERPT_CHARS: usize = 200;

/// Actions accepted by the article endpoint.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ArticleAction {
    List(ListArticlesQuery),
    Get {
        id: Option<String>,
    },
    Add {
        article: Option<ArticleInput>,
    },
    Update {
        id: Option<String>,
        article: Option<ArticlePatch>,
    },
    Delete {
        id: Option<String>,
    },
}

impl ArticleAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::List(_) => "list",
            Self::Get { .. } => "get",
            Self::Add { .. } => "add",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }
}

/// Filters and paging for the article list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListArticlesQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub category: Option<String>,
    pub tag: Option<String>,
}

impl ListArticlesQuery {
    pub fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page,
            size: self.size,
        }
    }
}

/// Article payload for `add`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ArticleInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Validated article ready to insert.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
}

impl ArticleInput {
    /// Title and content are required; tags are trimmed and de-duplicated.
    pub fn validate(self) -> Option<NewArticle> {
        let title = self.title.filter(|t| !t.is_empty())?;
        let content = self.content.filter(|c| !c.is_empty())?;
        Some(NewArticle {
            title,
            content,
            category: self.category.filter(|c| !c.is_empty()),
            tags: normalize_tags(self.tags),
        })
    }
}

/// Partial article payload for `update`. `createdAt` and `views` are not accepted.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl ArticlePatch {
    /// An update must touch the title or the content.
    pub fn has_body_change(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.is_empty())
            || self.content.as_deref().is_some_and(|c| !c.is_empty())
    }
}

/// Trim, drop empties and de-duplicate while keeping order.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

/// Shorten content for list views.
pub fn excerpt(content: &str) -> String {
    match content.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

/// Article as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ArticleResponse {
    pub fn from_model(m: article::Model, tags: Vec<String>) -> Self {
        Self {
            id: m.id,
            title: m.title,
            content: m.content,
            category: m.category,
            tags,
            views: m.views,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }

    /// List variant with the content cut down to an excerpt.
    pub fn summary(m: article::Model, tags: Vec<String>) -> Self {
        let mut response = Self::from_model(m, tags);
        response.content = excerpt(&response.content);
        response
    }
}
