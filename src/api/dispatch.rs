//! Action dispatch shared by the POST endpoints.
//!
//! Every endpoint takes a JSON object `{action, ...fields}`. The body is
//! decoded into the endpoint's action enum, and admin-only actions are
//! checked against the admin credential before anything else happens.

use actix_web::dev::Payload;
use actix_web::web::{Bytes, BytesMut};
use actix_web::{FromRequest, HttpRequest};
use futures_util::StreamExt;
use futures_util::future::LocalBoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::AdminKey;
use crate::config::{ADMIN_KEY_HEADER, defaults, payload_limit};
use crate::error::{AppError, AppResult};

/// Fallback when no client address is known.
pub const UNKNOWN_IP: &str = "未知IP";

/// Maximum size of an action body, registered as app data.
#[derive(Debug, Clone, Copy)]
pub struct BodyLimit(pub usize);

impl Default for BodyLimit {
    fn default() -> Self {
        BodyLimit(payload_limit(defaults::DEV_MAX_UPLOAD_SIZE))
    }
}

/// Raw action body, read up to the [`BodyLimit`].
///
/// An oversized body is reported through the envelope like any other
/// failure rather than as a transport error.
pub struct ActionBody(pub Bytes);

impl FromRequest for ActionBody {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let BodyLimit(limit) = req.app_data::<BodyLimit>().copied().unwrap_or_default();
        let mut payload = payload.take();

        Box::pin(async move {
            let mut body = BytesMut::new();
            while let Some(chunk) = payload.next().await {
                let chunk = chunk.map_err(|_| AppError::MalformedBody)?;
                if body.len() + chunk.len() > limit {
                    return Err(AppError::PayloadTooLarge);
                }
                body.extend_from_slice(&chunk);
            }
            Ok(ActionBody(body.freeze()))
        })
    }
}

/// An action enum accepted by one endpoint.
pub trait EndpointAction: DeserializeOwned {
    /// Accepted action names, each paired with whether it needs the admin credential.
    const ACTIONS: &'static [(&'static str, bool)];

    /// Action name for logging.
    fn name(&self) -> &'static str;
}

/// Decode and authorize an action.
///
/// The credential is checked from the action name alone, before any other
/// field is decoded, so an unauthorized caller never sees field errors.
pub fn parse_action<A: EndpointAction>(
    req: &HttpRequest,
    body: &[u8],
    admin: &AdminKey,
) -> AppResult<A> {
    let value: Value = serde_json::from_slice(body).map_err(|_| AppError::MalformedBody)?;
    let Value::Object(fields) = &value else {
        return Err(AppError::MalformedBody);
    };

    let name = match fields.get("action") {
        None | Some(Value::Null) => return Err(AppError::MissingAction),
        Some(Value::String(name)) if name.is_empty() => return Err(AppError::MissingAction),
        Some(Value::String(name)) => name.as_str(),
        Some(_) => return Err(AppError::UnknownAction),
    };

    let requires_admin = A::ACTIONS
        .iter()
        .find(|(action, _)| *action == name)
        .map(|(_, admin_only)| *admin_only)
        .ok_or(AppError::UnknownAction)?;

    if requires_admin {
        let authorized = fields
            .get("password")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| header_value(req, ADMIN_KEY_HEADER))
            .is_some_and(|provided| admin.verify(&provided));
        if !authorized {
            tracing::warn!(target: "api", "Rejected admin action '{}': bad credential", name);
            return Err(AppError::BadCredential);
        }
    }

    Ok(serde_json::from_value(value)?)
}

fn header_value(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Client address: `X-Real-IP`, then the peer address.
pub fn client_ip(req: &HttpRequest) -> String {
    header_value(req, "X-Real-IP")
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| UNKNOWN_IP.to_string())
}

/// Parse a required record ID.
///
/// A missing or empty ID yields `missing`; an ID that is not a UUID cannot
/// name any record and yields `not_found`.
pub fn require_id(
    id: Option<String>,
    missing: &'static str,
    not_found: &'static str,
) -> AppResult<Uuid> {
    let id = id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::InvalidInput(missing.to_string()))?;
    Uuid::parse_str(&id).map_err(|_| AppError::NotFound(not_found.to_string()))
}
