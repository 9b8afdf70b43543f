use axum::Json;

use crate::{middleware::RequireBasicAuth, types::chat::WelcomeMessage};

pub const WELCOME: &str = "Welcome to the AkkiAI Chat";

/// Axum handler for `GET /`
///
/// # Arguments
/// * `_auth` - Basic auth guard, answers 401 with a challenge on failure
///
/// # Returns
/// * `WelcomeMessage` - Fixed welcome text
#[utoipa::path(
    get,
    path = "/",
    tag = "meta",
    security(("basic_auth" = [])),
    responses(
        (status = 200, description = "Welcome text", body = WelcomeMessage),
        (status = 401, description = "Missing or wrong credentials")
    )
)]
pub async fn api_root(_auth: RequireBasicAuth) -> Json<WelcomeMessage> {
    Json(WelcomeMessage {
        message: WELCOME.to_string(),
    })
}
