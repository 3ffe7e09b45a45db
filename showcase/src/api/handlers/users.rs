//! HTTP handlers for the users endpoints.
//!
//! `POST /users/cheese` is the one handler that can reject input: the image upload filter runs in
//! the [`ImageUpload`] extractor, before the handler body.

use std::convert::Infallible;

use axum::{
    Form, Json,
    extract::{FromRequest, Multipart, Request, State},
    http::header::CONTENT_TYPE,
};
use mime::Mime;
use tracing::debug;

use crate::AppState;
use crate::api::models::users::{CheeseResponse, ImageUploadForm, WhatRequest, WhyChoice};
use crate::uploads::ImageUpload;

/// Body of `POST /users/what`, read according to its content type.
///
/// JSON, URL-encoded and multipart bodies are understood. The answer does not depend on the body,
/// so anything missing or unreadable becomes `None` instead of a rejection.
#[derive(Debug)]
pub struct WhatBody(pub Option<WhatRequest>);

async fn what_from_multipart(req: Request, state: &AppState) -> Result<WhatRequest, String> {
    let mut multipart = Multipart::from_request(req, state).await.map_err(|e| e.body_text())?;
    let mut body = WhatRequest::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| e.body_text())? {
        if field.name() == Some("what") {
            body.what = Some(field.text().await.map_err(|e| e.body_text())?);
        }
    }

    Ok(body)
}

impl FromRequest<AppState> for WhatBody {
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<Mime>().ok());

        let Some(content_type) = content_type else {
            return Ok(WhatBody(None));
        };

        let parsed = match content_type.essence_str() {
            "application/json" => Json::<WhatRequest>::from_request(req, state)
                .await
                .map(|Json(body)| body)
                .map_err(|e| e.body_text()),
            "application/x-www-form-urlencoded" => Form::<WhatRequest>::from_request(req, state)
                .await
                .map(|Form(body)| body)
                .map_err(|e| e.body_text()),
            "multipart/form-data" => what_from_multipart(req, state).await,
            other => Err(format!("unsupported content type {other}")),
        };

        match parsed {
            Ok(body) => Ok(WhatBody(Some(body))),
            Err(reason) => {
                debug!(%reason, "Ignoring unreadable body");
                Ok(WhatBody(None))
            }
        }
    }
}

#[utoipa::path(
    post,
    path = "/users/what",
    tag = "Users",
    operation_id = "VERY_BORING_MESSAGE",
    summary = "Get a typical message",
    description = "Returns typical message, nothing interesting",
    params(
        ("id" = Option<i64>, Query, description = "The id of the user"),
        ("page" = Option<i64>, Query, description = "The page number"),
    ),
    request_body(
        description = "What do you want?",
        content(
            (WhatRequest = "application/json"),
            (WhatRequest = "multipart/form-data"),
            (WhatRequest = "application/x-www-form-urlencoded"),
        )
    ),
    responses(
        (status = 200, description = "Get typical answer.", body = String, content_type = "text/plain"),
    ),
    security(("access-token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn what(State(state): State<AppState>, WhatBody(body): WhatBody) -> &'static str {
    let what = body.and_then(|b| b.what);
    debug!(what = ?what, "User asked for something");
    state.users.typical_answer()
}

#[utoipa::path(
    get,
    path = "/users/why",
    tag = "Users",
    operation_id = "VERY_BORING_MESSAGE_BYE",
    summary = "Why are you bothering me?",
    params(
        (
            "choice" = Option<WhyChoice>,
            Query,
            description = "Just enum param. Sent as the `choice` query parameter; it is optional and does not change the answer."
        ),
    ),
    responses(
        (status = 200, description = "A very massive object", body = String, content_type = "text/plain", example = json!("Just a typical answer.")),
        (status = 202, description = "Its OK, just another typical answer.", body = Vec<String>),
        (status = 403, description = "A very massive object", body = Vec<serde_json::Value>),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn why(State(state): State<AppState>) -> &'static str {
    state.users.typical_answer()
}

#[utoipa::path(
    post,
    path = "/users/cheese",
    tag = "Users",
    summary = "Get a typical photo",
    description = "Upload an image in the `image` field. Accepted types are JPEG, PNG, GIF and WEBP, up to 10 MiB.",
    request_body(
        content = ImageUploadForm,
        content_type = "multipart/form-data",
        description = "Image upload"
    ),
    responses(
        (status = 200, description = "The uploaded file's MIME type and the typical answer", body = CheeseResponse),
        (status = 400, description = "Malformed multipart body"),
        (status = 413, description = "File too large"),
        (status = 415, description = "Unsupported file type"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn upload_image(State(state): State<AppState>, ImageUpload(image): ImageUpload) -> Json<CheeseResponse> {
    let file_type = match image {
        Some(image) => {
            debug!(mime = %image.mime_type, size = image.size(), file_name = ?image.file_name, "Received image");
            image.mime_type
        }
        None => CheeseResponse::NO_FILE.to_string(),
    };

    Json(CheeseResponse {
        file_type,
        result: state.users.typical_answer().to_string(),
    })
}
