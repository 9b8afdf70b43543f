use std::sync::LazyLock;

use colored::Colorize;

use crate::{config::AkkiConfig, utils::{Ellipse, enabled}};

pub mod api;
pub mod config;
pub mod error;
pub mod gate;
pub mod middleware;
pub mod router;
pub mod services;
pub mod state;
pub mod types;
pub mod utils;

pub const VERSION_INFO: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

pub static BANNER: LazyLock<String> = LazyLock::new(|| {
    format!(
        "{}\n{}",
        VERSION_INFO.green().bold(),
        "Signed relay to the AkkiAI chat model".bright_black()
    )
});

/// Startup summary; secrets are ellipsed
pub fn config_summary(config: &AkkiConfig) -> String {
    let origins = if config.cors_origins.is_empty() {
        "none".red().to_string()
    } else {
        config.cors_origins.join(", ").blue().to_string()
    };
    format!(
        "Listening: {}\nModel: {} (max_tokens {})\nEndpoint: {}\nProvider key: {}\nAPI key: {}\nProxy: {}\nCORS origins: {}\nFile log: {}",
        format!("http://{}", config.address()).green().underline(),
        config.model.green(),
        config.max_tokens,
        config.anthropic_endpoint.as_str().blue(),
        match config.anthropic_api_key.as_deref() {
            Some(key) => key.ellipse().green(),
            None => "missing".red(),
        },
        config.api_key.ellipse().green(),
        config.proxy.as_deref().unwrap_or("none").blue(),
        origins,
        enabled(config.log_dir.is_some()),
    )
}
