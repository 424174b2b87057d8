//! Custom Axum extractors

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use super::error::ApiError;

/// JSON body that ignores `Content-Type` and treats an empty body or a
/// JSON `null` as `T::default()`.
///
/// Parse failures are reported as `ApiError::BadRequest` so they share the
/// `{"error": ...}` shape with validation errors.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest {
                message: e.body_text(),
            })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }

        let value: Option<T> =
            serde_json::from_slice(&bytes).map_err(|e| ApiError::BadRequest {
                message: format!("invalid JSON body: {}", e),
            })?;

        Ok(Self(value.unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;

    use crate::models::MacroPayload;

    async fn extract(body: &'static str) -> Result<MacroPayload, ApiError> {
        let req = axum::http::Request::builder()
            .method("POST")
            .uri("/macros")
            .body(Body::from(body))
            .unwrap();
        JsonBody::<MacroPayload>::from_request(req, &())
            .await
            .map(|JsonBody(p)| p)
    }

    #[tokio::test]
    async fn parses_without_content_type() {
        let payload = extract(r#"{"item": "Widget"}"#).await.unwrap();
        assert_eq!(payload.item.as_deref(), Some("Widget"));
    }

    #[tokio::test]
    async fn empty_and_null_bodies_are_default() {
        assert!(extract("").await.unwrap().item.is_none());
        assert!(extract("  \n").await.unwrap().item.is_none());
        assert!(extract("null").await.unwrap().item.is_none());
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let err = extract("{not json").await.err().unwrap();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn wrong_field_type_is_400() {
        let err = extract(r#"{"item": 5}"#).await.err().unwrap();
        assert!(matches!(err, ApiError::BadRequest { .. }));
    }
}
