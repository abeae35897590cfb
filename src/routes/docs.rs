// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Interactive API documentation (Swagger UI) and its OpenAPI document.

use axum::{
    http::header,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::AppState;

const SWAGGER_UI_VERSION: &str = "5.11.0";

/// Lets the page load Swagger UI from unpkg; overrides the JSON default.
const DOCS_CSP: &str = "default-src 'none'; script-src 'unsafe-inline' https://unpkg.com; \
     style-src https://unpkg.com; img-src data: https:; connect-src 'self'; \
     frame-ancestors 'none'";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/docs", get(docs_page))
        .route("/swagger.json", get(openapi_document))
}

async fn docs_page() -> impl IntoResponse {
    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <meta name="description" content="Coach Trail relay API documentation" />
  <title>Coach Trail API Documentation</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@{v}/swagger-ui.css" />
</head>
<body>
<div id="swagger-ui"></div>
<script src="https://unpkg.com/swagger-ui-dist@{v}/swagger-ui-bundle.js" crossorigin></script>
<script src="https://unpkg.com/swagger-ui-dist@{v}/swagger-ui-standalone-preset.js" crossorigin></script>
<script>
  window.onload = () => {{
    window.ui = SwaggerUIBundle({{
      url: '/swagger.json',
      dom_id: '#swagger-ui',
      deepLinking: true,
      presets: [SwaggerUIBundle.presets.apis, SwaggerUIStandalonePreset],
      layout: "StandaloneLayout"
    }});
  }};
</script>
</body>
</html>"#,
        v = SWAGGER_UI_VERSION
    );

    ([(header::CONTENT_SECURITY_POLICY, DOCS_CSP)], Html(html))
}

async fn openapi_document() -> Json<Value> {
    Json(openapi())
}

fn error_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "error": { "type": "string" },
            "details": { "type": "string" },
            "message": { "type": "string" }
        },
        "required": ["error"]
    })
}

fn operation(summary: &str, request: Value, response: Value) -> Value {
    json!({
        "post": {
            "summary": summary,
            "requestBody": {
                "required": true,
                "content": { "application/json": { "schema": request } }
            },
            "responses": {
                "200": {
                    "description": "Success",
                    "content": { "application/json": { "schema": response } }
                },
                "400": {
                    "description": "Missing required parameters",
                    "content": { "application/json": { "schema": error_schema() } }
                },
                "405": { "description": "Method not allowed" },
                "500": {
                    "description": "Internal server error",
                    "content": { "application/json": { "schema": error_schema() } }
                }
            }
        }
    })
}

fn string_props(names: &[&str]) -> Value {
    let props: serde_json::Map<String, Value> = names
        .iter()
        .map(|n| (n.to_string(), json!({ "type": "string" })))
        .collect();
    Value::Object(props)
}

/// OpenAPI 3 description of the relay endpoints.
pub fn openapi() -> Value {
    let token_fields = ["code", "clientId", "clientSecret", "redirectUri", "codeVerifier"];

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Coach Trail relay API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Relays Polar AccessLink OAuth, registration and exercise sync."
        },
        "paths": {
            "/token": operation(
                "Exchange an authorization code for an access token",
                json!({ "type": "object", "properties": string_props(&token_fields), "required": token_fields }),
                json!({
                    "type": "object",
                    "properties": {
                        "accessToken": { "type": "string" },
                        "expiresIn": { "type": "integer" },
                        "tokenType": { "type": "string" }
                    }
                }),
            ),
            "/register": operation(
                "Register the token owner with AccessLink (409 counts as success)",
                json!({
                    "type": "object",
                    "properties": string_props(&["accessToken", "memberId"]),
                    "required": ["accessToken"]
                }),
                json!({
                    "type": "object",
                    "properties": {
                        "userId": { "type": "string" },
                        "alreadyRegistered": { "type": "boolean" }
                    }
                }),
            ),
            "/activities": operation(
                "Pull new exercises through one exercise transaction",
                json!({
                    "type": "object",
                    "properties": string_props(&["accessToken", "userId"]),
                    "required": ["accessToken", "userId"]
                }),
                json!({
                    "type": "object",
                    "properties": {
                        "activities": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "id": { "type": "string" },
                                    "date": { "type": "string" },
                                    "sport": { "type": "string" },
                                    "distanceMeters": { "type": "number" },
                                    "ascentMeters": { "type": "number" },
                                    "duration": { "type": "string" }
                                },
                                "required": ["id", "date", "sport"]
                            }
                        }
                    }
                }),
            ),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_relay_paths() {
        let doc = openapi();
        for path in ["/token", "/register", "/activities"] {
            assert!(doc["paths"][path]["post"].is_object(), "{path} missing");
        }
        assert_eq!(
            doc["paths"]["/activities"]["post"]["requestBody"]["content"]["application/json"]
                ["schema"]["required"],
            json!(["accessToken", "userId"])
        );
    }
}
