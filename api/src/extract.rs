//! Custom extractors that convert axum rejections to structured `AppError`
//! responses.
//!
//! `AppJson<T>` is a drop-in replacement for `axum::Json<T>` in handler
//! signatures: deserialization failures produce a JSON `ApiError` body
//! instead of axum's plain-text default.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};

use crate::error::AppError;

pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(map_json_rejection(rejection)),
        }
    }
}

fn map_json_rejection(rejection: JsonRejection) -> AppError {
    let body_text = rejection.body_text();
    AppError::Validation {
        message: format!("Invalid request body: {body_text}"),
        field: Some(field_hint(&body_text).unwrap_or_else(|| "body".to_string())),
        received: None,
    }
}

/// Pull a field name out of serde's "missing field `x`" / "unknown field `x`"
/// messages so clients get a concrete pointer.
fn field_hint(msg: &str) -> Option<String> {
    for pattern in ["missing field `", "unknown field `"] {
        if let Some(start) = msg.find(pattern) {
            let rest = &msg[start + pattern.len()..];
            if let Some(end) = rest.find('`') {
                return Some(rest[..end].to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_field_names_from_serde_messages() {
        assert_eq!(
            field_hint("missing field `message` at line 1 column 2"),
            Some("message".to_string())
        );
        assert_eq!(
            field_hint("unknown field `msg`, expected `message`"),
            Some("msg".to_string())
        );
    }

    #[test]
    fn returns_none_for_generic_errors() {
        assert_eq!(field_hint("invalid type: integer, expected a string"), None);
    }
}
