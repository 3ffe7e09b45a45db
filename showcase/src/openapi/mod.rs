//! OpenAPI documentation for the cats and users endpoints.
//!
//! [`ApiDoc`] is generated once at startup and served twice: as raw JSON at
//! `{docs.path}/openapi.json` and as an interactive [Scalar](https://scalar.com/) page at
//! `{docs.path}` (see [`docs_router`]).
//!
//! The security schemes are declared for documentation only; no endpoint enforces them.

mod security;

use axum::{Json, Router, routing::get};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::api;
use crate::config::DocsConfig;
use security::SecurityAddon;

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        api::handlers::cats::meow,
        api::handlers::cats::bye_meow,
        api::handlers::users::what,
        api::handlers::users::why,
        api::handlers::users::upload_image,
    ),
    components(
        schemas(
            api::models::cats::HelloRequest,
            api::models::users::WhatRequest,
            api::models::users::WhyChoice,
            api::models::users::ImageUploadForm,
            api::models::users::CheeseResponse,
        )
    ),
    tags(
        (name = "Cats", description = "Operations related to cat management"),
        (name = "Users", description = "Operations related to user management"),
    ),
    info(
        title = "Swagger Documentation API",
        version = "0.1",
        description = "API for Swagger documentation with examples and detailed description.",
        terms_of_service = "https://example.com/terms",
        contact(name = "Author contact", url = "https://t.me/E_Sora", email = "sora.eugener@gmail.com"),
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
)]
pub struct ApiDoc;

const SCALAR_HTML: &str = r#"<!doctype html>
<html>
<head>
    <title>$title</title>
    <meta charset="utf-8"/>
    <meta name="viewport" content="width=device-width, initial-scale=1"/>
</head>
<body>
<script id="api-reference" type="application/json">
    $spec
</script>
<script src="https://cdn.jsdelivr.net/npm/@scalar/api-reference"></script>
</body>
</html>"#;

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Routes serving the documentation page and the raw OpenAPI document.
pub fn docs_router(docs: &DocsConfig) -> Router {
    let openapi = ApiDoc::openapi();
    let html = SCALAR_HTML.replace("$title", &escape_html(&docs.title));
    let json = openapi.clone();

    Router::new()
        .route(&docs.openapi_json_path(), get(move || std::future::ready(Json(json.clone()))))
        .merge(Scalar::with_url(docs.path.clone(), openapi).custom_html(html))
}
