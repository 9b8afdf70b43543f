//! Request guards and per-request bookkeeping
//!
//! - Authentication: basic auth for the human facing routes, API key for `/chat`
//! - Integrity: the `/chat` body is only handed over once its signature checks out
//! - Monitoring: request ids and access logging
mod auth;
mod chat;
mod request;

pub use auth::{API_KEY_HEADER, RequireApiKey, RequireBasicAuth};
pub use chat::VerifiedChat;
pub use request::{RequestId, request_monitor};
