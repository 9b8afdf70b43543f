use axum::{Json, response::Html};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, Http, HttpAuthScheme, SecurityScheme},
};

use crate::{
    error::ErrorBody,
    middleware::{API_KEY_HEADER, RequireBasicAuth},
    types::chat::{ChatRequest, ChatResponse, WelcomeMessage},
};

pub const DOCS_TITLE: &str = "AkkiAI Chat";
pub const OPENAPI_PATH: &str = "/openapi.json";

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(API_KEY_HEADER))),
            );
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "AkkiAI Chat",
        description = "Relays a signed message to the language model. `/chat` requires the `api-key` header and an HMAC-SHA256 `hash` of `message`; the other routes use basic auth.",
        version = "0.1.0"
    ),
    paths(super::chat::api_chat, super::root::api_root),
    components(schemas(ChatRequest, ChatResponse, WelcomeMessage, ErrorBody)),
    modifiers(&SecurityAddon),
    tags(
        (name = "chat", description = "Signed chat relay"),
        (name = "meta", description = "Service information")
    )
)]
pub struct ApiDoc;

/// Swagger UI page reading the document served at [`OPENAPI_PATH`]
pub async fn api_docs(_auth: RequireBasicAuth) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<link type="text/css" rel="stylesheet" href="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui.css">
<title>{DOCS_TITLE}</title>
</head>
<body>
<div id="swagger-ui"></div>
<script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
<script>
const ui = SwaggerUIBundle({{
    url: '{OPENAPI_PATH}',
    dom_id: '#swagger-ui',
    layout: 'BaseLayout',
    deepLinking: true,
    showExtensions: true,
    showCommonExtensions: true,
    presets: [
        SwaggerUIBundle.presets.apis,
        SwaggerUIBundle.SwaggerUIStandalonePreset
    ],
}})
</script>
</body>
</html>
"#
    ))
}

pub async fn api_openapi(_auth: RequireBasicAuth) -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_routes_and_schemes() {
        let doc: serde_json::Value =
            serde_json::from_str(&ApiDoc::openapi().to_pretty_json().unwrap()).unwrap();
        assert_eq!(doc["info"]["title"], DOCS_TITLE);
        assert!(doc["paths"]["/chat"]["post"].is_object());
        assert!(doc["paths"]["/"]["get"].is_object());
        let schemes = &doc["components"]["securitySchemes"];
        assert_eq!(schemes["api_key"]["name"], API_KEY_HEADER);
        assert_eq!(schemes["basic_auth"]["scheme"], "basic");
    }
}
