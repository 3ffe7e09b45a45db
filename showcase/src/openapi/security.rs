//! Security schemes advertised in the OpenAPI document.

use utoipa::Modify;
use utoipa::openapi::security::{
    ApiKey, ApiKeyValue, Flow, Http, HttpAuthScheme, HttpBuilder, OAuth2, Password, Scopes, SecurityScheme,
};

/// Token endpoint advertised by the password flow.
const OAUTH2_TOKEN_URL: &str = "http://localhost:5000/auth/token";

pub(super) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);

        components.add_security_scheme(
            "access-token",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("Bearer")
                    .description(Some(
                        "Access token sent in the `Authorization` header:\n\n\
                        ```\nAuthorization: Bearer YOUR_TOKEN\n```",
                    ))
                    .build(),
            ),
        );
        components.add_security_scheme("basic-auth", SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)));
        components.add_security_scheme(
            "oauth2",
            SecurityScheme::OAuth2(OAuth2::new([Flow::Password(Password::new(
                OAUTH2_TOKEN_URL,
                Scopes::new(),
            ))])),
        );
        components.add_security_scheme(
            "api_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-api-key"))),
        );
        components.add_security_scheme(
            "customAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
