use axum::{
    Router,
    http::HeaderValue,
    middleware::{from_extractor_with_state, from_fn},
    routing::{get, post},
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, warn};

use crate::{
    api::{OPENAPI_PATH, api_chat, api_docs, api_openapi, api_root},
    middleware::{RequireApiKey, request_monitor},
    state::AppState,
};

/// RouterBuilder for the application
pub struct RouterBuilder {
    state: AppState,
    inner: Router<AppState>,
}

impl RouterBuilder {
    pub fn new(state: AppState) -> Self {
        RouterBuilder {
            state,
            inner: Router::new(),
        }
    }

    /// Chat route, request monitor, CORS and HTTP tracing
    pub fn with_default_setup(self) -> Self {
        self.route_chat()
            .route_public()
            .with_request_monitor()
            .with_cors()
            .with_tower_trace()
    }

    /// `/chat` behind the API key, checked before the body is read
    fn route_chat(mut self) -> Self {
        let router = Router::new()
            .route("/chat", post(api_chat))
            .route_layer(from_extractor_with_state::<RequireApiKey, AppState>(
                self.state.to_owned(),
            ));
        self.inner = self.inner.merge(router);
        self
    }

    /// Basic auth routes; the guard is an extractor on each handler
    fn route_public(mut self) -> Self {
        let router = Router::new()
            .route("/", get(api_root))
            .route("/docs", get(api_docs))
            .route(OPENAPI_PATH, get(api_openapi));
        self.inner = self.inner.merge(router);
        self
    }

    fn with_request_monitor(mut self) -> Self {
        self.inner = self.inner.layer(from_fn(request_monitor));
        self
    }

    /// Listed origins only, any method and header, credentials allowed
    ///
    /// Methods and headers are mirrored from the preflight request because
    /// wildcards cannot be combined with credentials.
    fn with_cors(mut self) -> Self {
        let origins = self
            .state
            .config
            .cors_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!("Ignoring invalid CORS origin {}: {}", o, e);
                    None
                }
            })
            .collect::<Vec<_>>();
        let cors = CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true);
        self.inner = self.inner.layer(cors);
        self
    }

    fn with_tower_trace(mut self) -> Self {
        let layer = TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
            .on_response(DefaultOnResponse::new().level(Level::DEBUG));
        self.inner = self.inner.layer(layer);
        self
    }

    pub fn build(self) -> Router {
        self.inner.with_state(self.state)
    }
}
