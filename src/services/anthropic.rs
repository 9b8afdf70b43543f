use std::time::Instant;

use snafu::ResultExt;
use tracing::{debug, error, info};
use url::Url;
use wreq::{Client, ClientBuilder, Proxy, header::CONTENT_TYPE};

use crate::{
    config::{ANTHROPIC_VERSION, AkkiConfig},
    error::{AkkiError, WreqSnafu},
    types::anthropic::{CreateMessageParams, CreateMessageResponse, ErrorResponse, Message, Role},
};

/// Extension on upstream responses turning non-2xx status into an error
pub trait CheckAnthropicErr
where
    Self: Sized,
{
    fn check_anthropic(self) -> impl Future<Output = Result<Self, AkkiError>> + Send;
}

impl CheckAnthropicErr for wreq::Response {
    async fn check_anthropic(self) -> Result<Self, AkkiError> {
        let status = self.status();
        if status.is_success() {
            return Ok(self);
        }
        let text = self.text().await.context(WreqSnafu {
            msg: "Failed to read Anthropic error body",
        })?;
        let body = match serde_json::from_str::<ErrorResponse>(&text) {
            Ok(err) => format!("{}: {}", err.error.kind, err.error.message),
            Err(_) => text,
        };
        Err(AkkiError::UpstreamHttp { code: status, body })
    }
}

/// Client for the Messages API, shared by every request
#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    url: Url,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    pub fn new(config: &AkkiConfig) -> Result<Self, AkkiError> {
        let client = ClientBuilder::new()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout());
        let client = if let Some(proxy) = config.proxy.as_deref() {
            let proxy = Proxy::all(proxy).context(WreqSnafu {
                msg: "Invalid proxy",
            })?;
            client.proxy(proxy)
        } else {
            client
        };
        let client = client.build().context(WreqSnafu {
            msg: "Failed to build Anthropic client",
        })?;
        Ok(Self {
            client,
            url: config.messages_url()?,
            api_key: config.anthropic_api_key.to_owned(),
            model: config.model.to_owned(),
            max_tokens: config.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends `message` as a single user turn and returns the first text
    /// segment of the reply
    pub async fn complete(&self, message: &str) -> Result<String, AkkiError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(AkkiError::MissingProviderKey);
        };
        let params = CreateMessageParams {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: Role::User,
                content: message.to_owned(),
            }],
        };
        debug!(model = %self.model, chars = message.chars().count(), "[UPSTREAM] sending");
        let stopwatch = Instant::now();
        let res = self
            .client
            .post(self.url.as_str())
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header(CONTENT_TYPE, "application/json")
            .json(&params)
            .send()
            .await
            .context(WreqSnafu {
                msg: "Failed to send request to Anthropic API",
            })?
            .check_anthropic()
            .await
            .inspect_err(|e| error!("[UPSTREAM] {}", e))?;
        let res: CreateMessageResponse = res.json().await.context(WreqSnafu {
            msg: "Failed to parse Anthropic response",
        })?;
        let usage = res.usage.unwrap_or_default();
        info!(
            id = %res.id,
            model = %res.model,
            stop_reason = res.stop_reason.as_deref().unwrap_or("-"),
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            elapsed_secs = %stopwatch.elapsed().as_secs_f32(),
            "[UPSTREAM] reply received"
        );
        res.first_text()
            .map(str::to_owned)
            .ok_or(AkkiError::EmptyCompletion)
    }
}
