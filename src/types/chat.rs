use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /chat`
///
/// Both fields default to empty so that an absent field is reported as bad
/// input by the gate rather than as a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct ChatRequest {
    /// Text forwarded verbatim to the model
    #[serde(default, alias = "MESSAGE")]
    pub message: String,
    /// Lowercase hex HMAC-SHA256 of `message`
    #[serde(default, alias = "HASH")]
    pub hash: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct WelcomeMessage {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_upper_case_field_names() {
        let req: ChatRequest =
            serde_json::from_str(r#"{"MESSAGE": "Hello", "HASH": "abc"}"#).unwrap();
        assert_eq!(req.message, "Hello");
        assert_eq!(req.hash, "abc");
    }

    #[test]
    fn missing_fields_become_empty() {
        let req: ChatRequest = serde_json::from_str(r#"{"message": "Hello"}"#).unwrap();
        assert_eq!(req.message, "Hello");
        assert!(req.hash.is_empty());
    }
}
