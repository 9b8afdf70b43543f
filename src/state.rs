use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
    config::AkkiConfig, error::AkkiError, gate::AuthGate, services::anthropic::AnthropicClient,
};

/// Shared application state handed to every handler and extractor
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AkkiConfig>,
    pub gate: AuthGate,
    pub llm: AnthropicClient,
    /// Cancelled when the server shuts down
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: AkkiConfig) -> Result<Self, AkkiError> {
        let gate = AuthGate::new(&config);
        let llm = AnthropicClient::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            gate,
            llm,
            shutdown: CancellationToken::new(),
        })
    }
}
