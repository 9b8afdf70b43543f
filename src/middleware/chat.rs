use axum::{
    Json,
    extract::{FromRequest, Request},
};
use tracing::warn;

use crate::{error::AkkiError, state::AppState, types::chat::ChatRequest};

/// Chat body whose `hash` has been checked against its `message`
///
/// Rejects with bad input when the body is not JSON or a field is empty, and
/// with an integrity mismatch when the signature is wrong.
pub struct VerifiedChat(pub ChatRequest);


impl FromRequest<AppState> for VerifiedChat {
    type Rejection = AkkiError;

    /// Reads the JSON body and verifies its signature
    ///
    /// # Arguments
    /// * `req` - Incoming request, consumed for its body
    /// * `state` - Application state holding the auth gate
    ///
    /// # Returns
    /// * `VerifiedChat` - The body, once its `hash` matches
    /// * `AkkiError::BadInput` - Unreadable body, missing or empty field
    /// * `AkkiError::IntegrityMismatch` - Signature does not match
    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<ChatRequest>::from_request(req, &()).await.map_err(|e| {
            warn!("[CHAT] unreadable body: {}", e.body_text());
            AkkiError::BadInput {
                msg: "request body is not a valid chat request",
            }
        })?;
        state.gate.verify(&body.message, &body.hash)?;
        Ok(Self(body))
    }
}
