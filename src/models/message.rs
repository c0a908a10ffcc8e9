//! Guestbook message models and the moderation state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::PageParams;
use crate::entity::message;

/// Moderation status of a message, stored as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum ModerationStatus {
    Pending,
    Approved,
    Rejected,
}

/// Admin moderation actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationAction {
    Approve,
    Reject,
    /// Attaching a reply always publishes the message.
    Reply,
}

impl ModerationStatus {
    pub fn code(&self) -> i32 {
        match self {
            Self::Pending => 0,
            Self::Approved => 1,
            Self::Rejected => 2,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Pending),
            1 => Some(Self::Approved),
            2 => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Next status after applying `action`, or `None` when the transition is refused.
    ///
    /// Approved and rejected are terminal for approve/reject; repeating the
    /// same decision is a no-op. Reply moves any status to approved.
    pub fn apply(self, action: ModerationAction) -> Option<Self> {
        match (self, action) {
            (_, ModerationAction::Reply) => Some(Self::Approved),
            (Self::Pending | Self::Approved, ModerationAction::Approve) => Some(Self::Approved),
            (Self::Pending | Self::Rejected, ModerationAction::Reject) => Some(Self::Rejected),
            (Self::Rejected, ModerationAction::Approve) => None,
            (Self::Approved, ModerationAction::Reject) => None,
        }
    }
}

impl From<ModerationStatus> for i32 {
    fn from(status: ModerationStatus) -> Self {
        status.code()
    }
}

impl TryFrom<i32> for ModerationStatus {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("invalid moderation status {}", code))
    }
}

/// Actions accepted by the public message endpoint.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum MessageAction {
    Test,
    Add(NewMessageInput),
    List(ListMessagesQuery),
}

impl MessageAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Add(_) => "add",
            Self::List(_) => "list",
        }
    }
}

/// Actions accepted by the message admin endpoint. Every one requires the admin credential.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum MessageAdminAction {
    List(ListMessagesQuery),
    Detail {
        id: Option<String>,
    },
    Approve {
        id: Option<String>,
    },
    Reject {
        id: Option<String>,
    },
    Reply {
        id: Option<String>,
        #[serde(rename = "replyContent")]
        reply_content: Option<String>,
    },
    Delete {
        id: Option<String>,
    },
}

impl MessageAdminAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::List(_) => "list",
            Self::Detail { .. } => "detail",
            Self::Approve { .. } => "approve",
            Self::Reject { .. } => "reject",
            Self::Reply { .. } => "reply",
            Self::Delete { .. } => "delete",
        }
    }
}

/// Public guestbook submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessageInput {
    pub content: Option<String>,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub article_id: Option<String>,
}

/// Validated submission plus request metadata.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub content: String,
    pub nickname: String,
    pub email: String,
    pub website: String,
    pub article_id: Option<Uuid>,
    pub ip: String,
}

/// Filters and paging for message lists.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMessagesQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub status: Option<i32>,
    pub article_id: Option<String>,
}

impl ListMessagesQuery {
    pub fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page,
            size: self.size,
        }
    }
}

/// Validated message filter.
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    pub status: Option<ModerationStatus>,
    pub article_id: Option<Uuid>,
}

/// Full message as seen by the admin.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: Uuid,
    pub content: String,
    pub nickname: String,
    pub email: String,
    pub website: String,
    pub article_id: Option<Uuid>,
    pub ip: String,
    #[schema(value_type = i32)]
    pub status: ModerationStatus,
    pub reply_content: Option<String>,
    pub reply_time: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<message::Model> for MessageResponse {
    fn from(m: message::Model) -> Self {
        Self {
            id: m.id,
            content: m.content,
            nickname: m.nickname,
            email: m.email,
            website: m.website,
            article_id: m.article_id,
            ip: m.ip,
            // Rows are only written through ModerationStatus codes.
            status: ModerationStatus::from_code(m.status).unwrap_or(ModerationStatus::Pending),
            reply_content: m.reply_content,
            reply_time: m.reply_time,
            approved_at: m.approved_at,
            rejected_at: m.rejected_at,
            created_at: m.created_at,
        }
    }
}

/// Message as shown on the public guestbook; omits the visitor's email and IP.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicMessageResponse {
    pub id: Uuid,
    pub content: String,
    pub nickname: String,
    pub website: String,
    pub article_id: Option<Uuid>,
    #[schema(value_type = i32)]
    pub status: ModerationStatus,
    pub reply_content: Option<String>,
    pub reply_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<message::Model> for PublicMessageResponse {
    fn from(m: message::Model) -> Self {
        let full = MessageResponse::from(m);
        Self {
            id: full.id,
            content: full.content,
            nickname: full.nickname,
            website: full.website,
            article_id: full.article_id,
            status: full.status,
            reply_content: full.reply_content,
            reply_time: full.reply_time,
            created_at: full.created_at,
        }
    }
}
