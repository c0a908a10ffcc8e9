//! Database queries for guestbook messages.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::entity::message::{self, ActiveModel, Entity as Message};
use crate::error::{AppError, AppResult};
use crate::models::PageParams;
use crate::models::message::{MessageFilter, ModerationAction, ModerationStatus, NewMessage};

use super::DbPool;

/// Result of a moderation attempt.
#[derive(Debug)]
pub enum Transition {
    Applied(message::Model),
    /// The current status does not allow the action.
    Refused,
    NotFound,
}

impl DbPool {
    /// Insert a visitor message. Status always starts as pending.
    pub async fn insert_message(&self, new: NewMessage) -> AppResult<message::Model> {
        let model = ActiveModel {
            id: Set(Uuid::now_v7()),
            content: Set(new.content),
            nickname: Set(new.nickname),
            email: Set(new.email),
            website: Set(new.website),
            article_id: Set(new.article_id),
            ip: Set(new.ip),
            status: Set(ModerationStatus::Pending.code()),
            reply_content: Set(None),
            reply_time: Set(None),
            approved_at: Set(None),
            rejected_at: Set(None),
            created_at: Set(Utc::now()),
        };

        model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert message: {}", e)))
    }

    /// List messages, newest first.
    pub async fn list_messages(
        &self,
        filter: &MessageFilter,
        params: &PageParams,
    ) -> AppResult<(Vec<message::Model>, u64)> {
        let mut select = Message::find();

        if let Some(status) = filter.status {
            select = select.filter(message::Column::Status.eq(status.code()));
        }

        if let Some(article_id) = filter.article_id {
            select = select.filter(message::Column::ArticleId.eq(article_id));
        }

        let total = select
            .clone()
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count messages: {}", e)))?;

        let messages = select
            .order_by_desc(message::Column::CreatedAt)
            .order_by_desc(message::Column::Id)
            .offset(params.offset())
            .limit(params.size())
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list messages: {}", e)))?;

        Ok((messages, total))
    }

    /// Get a message by ID.
    pub async fn get_message(&self, id: Uuid) -> AppResult<Option<message::Model>> {
        Message::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get message: {}", e)))
    }

    /// Apply a moderation action.
    ///
    /// The update is guarded on the status that was read, so when two
    /// moderators race on the same message only the first one wins and the
    /// other gets `Refused`.
    pub async fn moderate_message(
        &self,
        id: Uuid,
        action: ModerationAction,
        reply_content: Option<String>,
    ) -> AppResult<Transition> {
        let Some(existing) = self.get_message(id).await? else {
            return Ok(Transition::NotFound);
        };

        self.apply_transition(&existing, action, reply_content).await
    }

    /// Write the transition from the `observed` row.
    ///
    /// The update only matches while the row still has the observed status;
    /// when another writer got there first nothing changes and the result is
    /// `Refused`.
    async fn apply_transition(
        &self,
        observed: &message::Model,
        action: ModerationAction,
        reply_content: Option<String>,
    ) -> AppResult<Transition> {
        let current = ModerationStatus::from_code(observed.status).unwrap_or(ModerationStatus::Pending);
        let Some(next) = current.apply(action) else {
            return Ok(Transition::Refused);
        };

        let now = Utc::now();
        let mut update = Message::update_many()
            .col_expr(message::Column::Status, Expr::value(next.code()))
            .filter(message::Column::Id.eq(observed.id))
            .filter(message::Column::Status.eq(observed.status));

        update = match action {
            ModerationAction::Approve => {
                update.col_expr(message::Column::ApprovedAt, Expr::value(now))
            }
            ModerationAction::Reject => {
                update.col_expr(message::Column::RejectedAt, Expr::value(now))
            }
            ModerationAction::Reply => update
                .col_expr(message::Column::ReplyContent, Expr::value(reply_content))
                .col_expr(message::Column::ReplyTime, Expr::value(now))
                .col_expr(message::Column::ApprovedAt, Expr::value(now)),
        };

        let result = update
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update message status: {}", e)))?;

        if result.rows_affected == 0 {
            return Ok(Transition::Refused);
        }

        match self.get_message(observed.id).await? {
            Some(updated) => Ok(Transition::Applied(updated)),
            None => Ok(Transition::NotFound),
        }
    }

    /// Delete a message. Returns false when nothing was deleted.
    pub async fn delete_message(&self, id: Uuid) -> AppResult<bool> {
        let result = Message::delete_by_id(id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete message: {}", e)))?;

        Ok(result.rows_affected > 0)
    }
}
