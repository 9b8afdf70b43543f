use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE};
use serde::Serialize;
use snafu::{Location, Snafu};
use strum::IntoStaticStr;
use tracing::{error, warn};
use utoipa::ToSchema;

/// Detail returned to callers for every internal or upstream failure
pub const GENERIC_DETAIL: &str = "An error occurred";

#[derive(Debug, IntoStaticStr, Snafu)]
#[snafu(visibility(pub(crate)))]
#[strum(serialize_all = "snake_case")]
pub enum AkkiError {
    #[snafu(display("Bad input: {}", msg))]
    BadInput { msg: &'static str },
    #[snafu(display("Hash does not match"))]
    IntegrityMismatch,
    #[snafu(display("Invalid basic auth credentials"))]
    AuthChallenge,
    #[snafu(display("Invalid API key"))]
    Forbidden,
    #[snafu(display("Anthropic API key is not configured"))]
    MissingProviderKey,
    #[snafu(display("Wreq error: {}, source: {}", msg, source))]
    Wreq {
        msg: &'static str,
        source: wreq::Error,
    },
    #[snafu(display("Upstream returned {}: {}", code, body))]
    UpstreamHttp { code: StatusCode, body: String },
    #[snafu(display("Upstream reply contained no text segment"))]
    EmptyCompletion,
    #[snafu(display("Secret key cannot be used as an HMAC-SHA256 key"))]
    HmacKey,
    #[snafu(display("Request cancelled"))]
    RequestCancelled,
    #[snafu(display("Invalid configuration: {}", msg))]
    InvalidConfig { msg: String },
    #[snafu(display("Config error: {}", source))]
    #[snafu(context(false))]
    Figment {
        #[snafu(source(from(figment::Error, Box::new)))]
        source: Box<figment::Error>,
    },
    #[snafu(display("IO error: {}, at {}", source, loc))]
    #[snafu(context(false))]
    Io {
        #[snafu(implicit)]
        loc: Location,
        source: std::io::Error,
    },
}

/// JSON body of every error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub detail: String,
}

impl AkkiError {
    /// HTTP status this error is reported with
    pub fn status(&self) -> StatusCode {
        match self {
            AkkiError::BadInput { .. } => StatusCode::BAD_REQUEST,
            AkkiError::IntegrityMismatch | AkkiError::AuthChallenge => StatusCode::UNAUTHORIZED,
            AkkiError::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text placed in the `detail` field; upstream failures are collapsed
    fn detail(&self) -> String {
        match self {
            AkkiError::BadInput { .. } => "Invalid input data".to_string(),
            AkkiError::IntegrityMismatch => "Unauthorized: Hash does not match".to_string(),
            AkkiError::AuthChallenge => "Unauthorized".to_string(),
            AkkiError::Forbidden => "Unauthorized: Invalid API Key".to_string(),
            _ => GENERIC_DETAIL.to_string(),
        }
    }
}

impl IntoResponse for AkkiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind: &'static str = (&self).into();
        if status.is_server_error() {
            error!(kind, "{}", self);
        } else {
            warn!(kind, status = status.as_u16(), "{}", self);
        }
        let challenge = matches!(self, AkkiError::AuthChallenge);
        let mut res = (
            status,
            Json(ErrorBody {
                detail: self.detail(),
            }),
        )
            .into_response();
        if challenge {
            res.headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Basic"));
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            AkkiError::BadInput { msg: "x" }.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AkkiError::IntegrityMismatch.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AkkiError::AuthChallenge.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AkkiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AkkiError::MissingProviderKey.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AkkiError::EmptyCompletion.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(AkkiError::HmacKey.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AkkiError::HmacKey.detail(), GENERIC_DETAIL);
    }

    #[test]
    fn only_challenge_carries_www_authenticate() {
        let res = AkkiError::AuthChallenge.into_response();
        assert_eq!(res.headers()[WWW_AUTHENTICATE], "Basic");

        let res = AkkiError::IntegrityMismatch.into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(res.headers().get(WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn upstream_detail_is_not_exposed() {
        let err = AkkiError::UpstreamHttp {
            code: StatusCode::BAD_GATEWAY,
            body: "overloaded_error: secret provider detail".to_string(),
        };
        assert_eq!(err.detail(), GENERIC_DETAIL);
    }
}
