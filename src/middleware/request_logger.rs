//! Access log middleware.
//!
//! Emits one line per request under the `api` target once the response is
//! ready. Handler failures travel as HTTP 200 envelopes, so the handlers log
//! those themselves; this layer only records transport-level outcomes.

use std::future::{Ready, ready};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::{Method, StatusCode};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, error, info, warn};

use crate::config::ADMIN_KEY_HEADER;

/// Request logger middleware factory.
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerMiddleware { service }))
    }
}

pub struct RequestLoggerMiddleware<S> {
    service: S,
}

/// What gets logged about a request, captured before the handler runs.
struct AccessEntry {
    method: Method,
    path: String,
    client: String,
    /// Whether an admin credential header was sent. The value is never logged.
    admin: bool,
    started: Instant,
}

impl AccessEntry {
    fn capture(req: &ServiceRequest) -> Self {
        // Same precedence as the handlers: X-Real-IP, then the peer.
        let client = req
            .headers()
            .get("X-Real-IP")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()))
            .unwrap_or_else(|| "-".to_string());

        Self {
            method: req.method().clone(),
            path: req.path().to_string(),
            client,
            admin: req.headers().contains_key(ADMIN_KEY_HEADER),
            started: Instant::now(),
        }
    }

    fn finish(self, status: StatusCode) {
        let duration_ms = self.started.elapsed().as_millis() as u64;
        let method = self.method.as_str();
        let status = status.as_u16();

        if self.method == Method::OPTIONS {
            debug!(target: "api", method, path = %self.path, status, "preflight");
        } else if status >= 500 {
            error!(
                target: "api",
                method, path = %self.path, client = %self.client, status, duration_ms,
                "request failed"
            );
        } else if status >= 400 {
            warn!(
                target: "api",
                method, path = %self.path, client = %self.client, status, duration_ms,
                "request rejected"
            );
        } else {
            info!(
                target: "api",
                method, path = %self.path, client = %self.client,
                admin_header = self.admin, status, duration_ms,
                "request"
            );
        }
    }
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let entry = AccessEntry::capture(&req);
        let fut = self.service.call(req);

        Box::pin(async move {
            match fut.await {
                Ok(res) => {
                    entry.finish(res.status());
                    Ok(res)
                }
                Err(e) => {
                    entry.finish(e.as_response_error().status_code());
                    Err(e)
                }
            }
        })
    }
}
