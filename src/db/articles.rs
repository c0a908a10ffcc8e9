//! Database queries for articles and their tags.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::{Expr, ExprTrait, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entity::article::{self, ActiveModel, Entity as Article};
use crate::entity::article_tag::{self, Entity as ArticleTag};
use crate::error::{AppError, AppResult};
use crate::models::article::{ArticlePatch, ListArticlesQuery, NewArticle};

use super::DbPool;

/// An article row together with its ordered tags.
pub type ArticleWithTags = (article::Model, Vec<String>);

impl DbPool {
    /// Insert a new article and its tags.
    pub async fn insert_article(&self, new: NewArticle) -> AppResult<ArticleWithTags> {
        let now = Utc::now();
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let model = ActiveModel {
            id: Set(Uuid::now_v7()),
            title: Set(new.title),
            content: Set(new.content),
            category: Set(new.category),
            views: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let article = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert article: {}", e)))?;

        insert_tags(&txn, article.id, &new.tags).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit article: {}", e)))?;

        Ok((article, new.tags))
    }

    /// List articles, newest first, with optional category and tag filters.
    pub async fn list_articles(
        &self,
        query: &ListArticlesQuery,
    ) -> AppResult<(Vec<ArticleWithTags>, u64)> {
        let mut select = Article::find();

        if let Some(category) = query.category.as_deref().filter(|c| !c.is_empty()) {
            select = select.filter(article::Column::Category.eq(category));
        }

        if let Some(tag) = query.tag.as_deref().filter(|t| !t.is_empty()) {
            select = select.filter(
                article::Column::Id.in_subquery(
                    Query::select()
                        .column(article_tag::Column::ArticleId)
                        .from(ArticleTag)
                        .and_where(article_tag::Column::Tag.eq(tag))
                        .to_owned(),
                ),
            );
        }

        // Count total before pagination
        let total = select
            .clone()
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count articles: {}", e)))?;

        let params = query.page_params();
        let articles = select
            .order_by_desc(article::Column::CreatedAt)
            .order_by_desc(article::Column::Id)
            .offset(params.offset())
            .limit(params.size())
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list articles: {}", e)))?;

        let ids: Vec<Uuid> = articles.iter().map(|a| a.id).collect();
        let mut tags = tags_for(self.connection(), &ids).await?;

        let rows = articles
            .into_iter()
            .map(|a| {
                let article_tags = tags.remove(&a.id).unwrap_or_default();
                (a, article_tags)
            })
            .collect();

        Ok((rows, total))
    }

    /// Increment the view counter and return the article with the new count.
    ///
    /// The increment is a single `views = views + 1` update so concurrent
    /// readers never lose a view.
    pub async fn view_article(&self, id: Uuid) -> AppResult<Option<ArticleWithTags>> {
        let result = Article::update_many()
            .col_expr(
                article::Column::Views,
                Expr::col(article::Column::Views).add(1),
            )
            .filter(article::Column::Id.eq(id))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to increment views: {}", e)))?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.get_article(id).await
    }

    /// Get an article by ID without touching its view counter.
    pub async fn get_article(&self, id: Uuid) -> AppResult<Option<ArticleWithTags>> {
        let article = Article::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get article: {}", e)))?;

        match article {
            Some(article) => {
                let mut tags = tags_for(self.connection(), &[article.id]).await?;
                let article_tags = tags.remove(&article.id).unwrap_or_default();
                Ok(Some((article, article_tags)))
            }
            None => Ok(None),
        }
    }

    /// Apply a partial update. Returns `None` when the article does not exist.
    ///
    /// Empty title or content values are ignored, an empty category clears
    /// it, and tags are replaced wholesale when present.
    pub async fn update_article(
        &self,
        id: Uuid,
        patch: ArticlePatch,
    ) -> AppResult<Option<ArticleWithTags>> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let Some(existing) = Article::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to get article: {}", e)))?
        else {
            return Ok(None);
        };

        let mut active: ActiveModel = existing.into();
        if let Some(title) = patch.title.filter(|t| !t.is_empty()) {
            active.title = Set(title);
        }
        if let Some(content) = patch.content.filter(|c| !c.is_empty()) {
            active.content = Set(content);
        }
        if let Some(category) = patch.category {
            active.category = Set(Some(category).filter(|c| !c.is_empty()));
        }
        active.updated_at = Set(Utc::now());

        let article = active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to update article: {}", e)))?;

        if let Some(tags) = patch.tags {
            let tags = crate::models::article::normalize_tags(tags);
            ArticleTag::delete_many()
                .filter(article_tag::Column::ArticleId.eq(id))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(format!("Failed to clear tags: {}", e)))?;
            insert_tags(&txn, id, &tags).await?;
        }

        let mut tags = tags_for(&txn, &[id]).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit article: {}", e)))?;

        Ok(Some((article, tags.remove(&id).unwrap_or_default())))
    }

    /// Delete an article and its tags. Returns false when nothing was deleted.
    pub async fn delete_article(&self, id: Uuid) -> AppResult<bool> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        ArticleTag::delete_many()
            .filter(article_tag::Column::ArticleId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete tags: {}", e)))?;

        let result = Article::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete article: {}", e)))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit delete: {}", e)))?;

        Ok(result.rows_affected > 0)
    }
}

async fn insert_tags<C: ConnectionTrait>(conn: &C, article_id: Uuid, tags: &[String]) -> AppResult<()> {
    if tags.is_empty() {
        return Ok(());
    }

    let models = tags
        .iter()
        .enumerate()
        .map(|(position, tag)| article_tag::ActiveModel {
            article_id: Set(article_id),
            tag: Set(tag.clone()),
            position: Set(position as i32),
        });

    ArticleTag::insert_many(models)
        .exec(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert tags: {}", e)))?;

    Ok(())
}

async fn tags_for<C: ConnectionTrait>(
    conn: &C,
    ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Vec<String>>> {
    let mut map: HashMap<Uuid, Vec<String>> = HashMap::new();
    if ids.is_empty() {
        return Ok(map);
    }

    let rows = ArticleTag::find()
        .filter(article_tag::Column::ArticleId.is_in(ids.iter().copied()))
        .order_by_asc(article_tag::Column::Position)
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to load tags: {}", e)))?;

    for row in rows {
        map.entry(row.article_id).or_default().push(row.tag);
    }

    Ok(map)
}
