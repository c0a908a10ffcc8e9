//! SeaORM entity definitions (PostgreSQL in production, SQLite for development and tests).

pub mod article;
pub mod article_tag;
pub mod message;
pub mod upload;
