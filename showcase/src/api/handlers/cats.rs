//! HTTP handlers for the cats endpoints.

use axum::{
    extract::{FromRequest, Request, State},
    http::header::CONTENT_TYPE,
};
use bytes::Bytes;
use mime::Mime;
use tracing::debug;

use crate::AppState;
use crate::api::models::cats::HelloRequest;
use crate::errors::Error;

/// Body of `POST /cats/meow`.
///
/// The greeting is optional: no body, a non-JSON body, or JSON without `helloMessage` all get
/// the same answer. Only a body sent as JSON that fails to parse is rejected, with a 400.
#[derive(Debug)]
pub struct HelloBody(pub Option<HelloRequest>);

impl FromRequest<AppState> for HelloBody {
    type Rejection = Error;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<Mime>().ok())
            .is_some_and(|content_type| content_type.essence_str() == mime::APPLICATION_JSON.essence_str());

        let body = Bytes::from_request(req, state).await.map_err(|e| Error::BadRequest {
            message: e.body_text(),
        })?;

        if !is_json || body.is_empty() {
            return Ok(HelloBody(None));
        }

        let value: serde_json::Value = serde_json::from_slice(&body).map_err(|e| Error::BadRequest {
            message: format!("Failed to parse the request body as JSON: {e}"),
        })?;

        Ok(HelloBody(serde_json::from_value(value).ok()))
    }
}

#[utoipa::path(
    post,
    path = "/cats/meow",
    tag = "Cats",
    summary = "Cat hello message",
    request_body = HelloRequest,
    responses(
        (status = 200, description = "The cat says hello back", body = String, content_type = "text/plain", example = json!("Meow!")),
        (status = 400, description = "Body declared as JSON does not parse"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn meow(State(state): State<AppState>, HelloBody(body): HelloBody) -> &'static str {
    let hello_message = body.map(|b| b.hello_message);
    debug!(hello_message = ?hello_message, "Cats were greeted");
    state.cats.meow()
}

#[utoipa::path(
    get,
    path = "/cats/bye-meow",
    tag = "Cats",
    summary = "Cat bye message",
    responses(
        (status = 200, description = "The cat says goodbye", body = String, content_type = "text/plain", example = json!("Meow!")),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn bye_meow(State(state): State<AppState>) -> &'static str {
    state.cats.meow()
}

#[cfg(test)]
mod tests {
    use crate::test_utils::create_test_app;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_meow() {
        let app = create_test_app();

        let response = app.post("/cats/meow").json(&json!({ "helloMessage": "Hello, cats!" })).await;

        response.assert_status(StatusCode::OK);
        response.assert_text("Meow!");
    }

    #[tokio::test]
    async fn test_meow_ignores_message_content() {
        let app = create_test_app();

        let first = app.post("/cats/meow").json(&json!({ "helloMessage": "Hello, cats!" })).await;
        let second = app.post("/cats/meow").json(&json!({ "helloMessage": "Go away" })).await;

        assert_eq!(first.text(), second.text());
    }

    #[tokio::test]
    async fn test_meow_without_greeting() {
        let app = create_test_app();

        let empty_object = app.post("/cats/meow").json(&json!({})).await;
        let other_fields = app.post("/cats/meow").json(&json!({ "goodbye": "now" })).await;
        let no_body = app.post("/cats/meow").await;
        let plain_text = app
            .post("/cats/meow")
            .content_type("text/plain")
            .bytes("hello cats".into())
            .await;

        for response in [empty_object, other_fields, no_body, plain_text] {
            response.assert_status(StatusCode::OK);
            response.assert_text("Meow!");
        }
    }

    #[tokio::test]
    async fn test_meow_rejects_malformed_json() {
        let app = create_test_app();

        let response = app
            .post("/cats/meow")
            .content_type("application/json")
            .bytes("{not json".into())
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_bye_meow() {
        let app = create_test_app();

        let response = app.get("/cats/bye-meow").await;

        response.assert_status(StatusCode::OK);
        response.assert_text("Meow!");
    }

    #[tokio::test]
    async fn test_bye_meow_wrong_method() {
        let app = create_test_app();

        let response = app.post("/cats/bye-meow").await;

        response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    }
}
