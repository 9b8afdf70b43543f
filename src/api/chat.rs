use axum::{Extension, Json, extract::State};
use tracing::info;

use crate::{
    error::AkkiError,
    middleware::{RequestId, VerifiedChat},
    state::AppState,
    types::chat::{ChatRequest, ChatResponse},
};

/// Axum handler for `POST /chat`
/// Forwards a verified message to the model and relays its reply
///
/// The API key has already been checked by the route layer and the body by
/// [`VerifiedChat`], so reaching this point means the request passed the gate.
///
/// # Arguments
/// * `state` - Application state holding the model client and shutdown token
/// * `id` - Request id set by the request monitor
/// * `p` - Chat body whose signature matched its message
///
/// # Returns
/// * `ChatResponse` - First text segment of the model reply
/// * `AkkiError` - Upstream failure, or cancellation when the server shuts down
#[utoipa::path(
    post,
    path = "/chat",
    tag = "chat",
    request_body = ChatRequest,
    security(("api_key" = [])),
    responses(
        (status = 200, description = "Model reply", body = ChatResponse),
        (status = 400, description = "Missing or empty field", body = crate::error::ErrorBody),
        (status = 401, description = "Hash does not match", body = crate::error::ErrorBody),
        (status = 403, description = "Invalid API key", body = crate::error::ErrorBody),
        (status = 500, description = "Upstream or internal failure", body = crate::error::ErrorBody)
    )
)]
pub async fn api_chat(
    State(state): State<AppState>,
    Extension(id): Extension<RequestId>,
    VerifiedChat(p): VerifiedChat,
) -> Result<Json<ChatResponse>, AkkiError> {
    info!(
        %id,
        model = %state.llm.model(),
        chars = p.message.chars().count(),
        "[CHAT] request verified"
    );
    let shutdown = state.shutdown.child_token();
    let response = tokio::select! {
        result = state.llm.complete(&p.message) => result?,
        _ = shutdown.cancelled() => {
            info!(%id, "[CANCELLED] server shutting down");
            return Err(AkkiError::RequestCancelled);
        }
    };
    Ok(Json(ChatResponse { response }))
}
