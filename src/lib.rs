//! Folio server library.
//!
//! Core of the blog backend: articles, a moderated guestbook, image uploads
//! with an in-memory fallback, and the HTTP layer that exposes them.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
