use axum::{
    Form, Json,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::dto::ErrorResponse;

/// Note content taken from a JSON or url-encoded body.
///
/// A missing or non-string `content` field, or a body of any other media
/// type, yields an empty string rather than a rejection.
#[derive(Debug)]
pub struct NoteContent(pub String);

impl<S> FromRequest<S> for NoteContent
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match body_kind(&req) {
            BodyKind::Json => {
                let Json(value) = Json::<serde_json::Value>::from_request(req, state)
                    .await
                    .map_err(|e| reject(e.status(), &e.body_text()))?;

                let content = value
                    .get("content")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or_default()
                    .to_owned();
                Ok(Self(content))
            }
            BodyKind::Form => {
                let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                    .await
                    .map_err(|e| reject(e.status(), &e.body_text()))?;
                Ok(Self(single_content(pairs)))
            }
            BodyKind::Other => {
                // still drained so the body limit applies
                Bytes::from_request(req, state)
                    .await
                    .map_err(|e| reject(e.status(), &e.body_text()))?;
                Ok(Self(String::new()))
            }
        }
    }
}

/// `content` when the form carries it exactly once; a repeated field is a
/// list, not a string.
fn single_content(pairs: Vec<(String, String)>) -> String {
    let mut values = pairs
        .into_iter()
        .filter(|(key, _)| key == "content")
        .map(|(_, value)| value);

    match (values.next(), values.next()) {
        (Some(value), None) => value,
        _ => String::new(),
    }
}

enum BodyKind {
    Json,
    Form,
    Other,
}

fn body_kind(req: &Request) -> BodyKind {
    let mime = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .unwrap_or_default();

    if mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
    {
        BodyKind::Json
    } else if mime == "application/x-www-form-urlencoded" {
        BodyKind::Form
    } else {
        BodyKind::Other
    }
}

fn reject(status: StatusCode, detail: &str) -> Response {
    tracing::warn!("rejected note body ({status}): {detail}");
    let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
        "Request body too large"
    } else {
        "Invalid request body"
    };
    (status, Json(ErrorResponse::new(message))).into_response()
}
