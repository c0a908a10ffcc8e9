//! API endpoint modules.

pub mod articles;
pub mod dispatch;
pub mod files;
pub mod health;
pub mod images;
pub mod message_admin;
pub mod messages;
pub mod openapi;
pub mod uploads;

use actix_web::web;

pub use articles::configure_article_routes;
pub use dispatch::BodyLimit;
pub use files::configure_file_routes;
pub use health::configure_health_routes;
pub use images::configure_image_routes;
pub use message_admin::configure_message_admin_routes;
pub use messages::configure_message_routes;
pub use openapi::{ApiDoc, configure_openapi_routes};
pub use uploads::configure_upload_routes;

/// Register every API route.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_health_routes)
        .configure(configure_openapi_routes)
        .configure(configure_article_routes)
        .configure(configure_message_routes)
        .configure(configure_message_admin_routes)
        .configure(configure_upload_routes)
        .configure(configure_image_routes)
        .configure(configure_file_routes);
}
