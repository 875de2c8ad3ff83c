//! Cookie-based session identity.
//!
//! The core never sees this: it only needs a stable opaque key per caller.
//! A caller without the cookie gets a freshly minted UUIDv7 id; handlers set
//! the cookie on the way out when `is_new` is true.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, header::COOKIE};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "destress_session";

#[derive(Debug, Clone)]
pub struct SessionId {
    pub id: String,
    /// True when the id was minted for this request and the cookie still
    /// needs to be sent to the client
    pub is_new: bool,
}

impl SessionId {
    /// `Set-Cookie` value for a freshly minted id.
    pub fn set_cookie(&self) -> HeaderValue {
        HeaderValue::from_str(&format!(
            "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
            self.id
        ))
        .expect("session id is always a valid header value")
    }
}

impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Infallible> {
        Ok(match session_id_from_headers(&parts.headers) {
            Some(id) => SessionId { id, is_new: false },
            None => SessionId {
                id: Uuid::now_v7().to_string(),
                is_new: true,
            },
        })
    }
}

fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
        })
}
