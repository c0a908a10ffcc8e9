//! HTTP middleware.

mod preflight;
mod request_logger;

use actix_cors::Cors;

use crate::config::ADMIN_KEY_HEADER;

pub use preflight::Preflight;
pub use request_logger::RequestLogger;

/// CORS policy for the public site: any origin, wildcard response header.
pub fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            "Authorization",
            "Accept",
            "Content-Type",
            ADMIN_KEY_HEADER,
        ])
        .max_age(86400)
}
