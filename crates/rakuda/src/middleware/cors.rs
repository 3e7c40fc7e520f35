//! Cross-Origin Resource Sharing.
//!
//! [`Cors`] answers preflight (`OPTIONS`) requests itself and decorates every other response with
//! the `Access-Control-Allow-*` headers allowed by its [`CorsConfig`].

use crate::body::{ReqBody, ResponseBody};
use crate::handler::{BoxedHandler, RequestHandler};
use crate::middleware::Middleware;
use async_trait::async_trait;
use http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, ORIGIN, VARY,
};
use http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;

const ANY_ORIGIN: &str = "*";

/// Configuration of the [`Cors`] middleware.
///
/// Empty lists and a zero `max_age` fall back to the defaults, so a partially filled config
/// (for instance one deserialized from a file) is always usable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins allowed to access the resource, `"*"` allows any origin.
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub allow_credentials: bool,
    /// Seconds a preflight result may be cached.
    pub max_age: u32,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![ANY_ORIGIN.to_owned()],
            allowed_methods: ["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"].map(String::from).to_vec(),
            allowed_headers: ["Accept", "Content-Type", "Authorization"].map(String::from).to_vec(),
            allow_credentials: false,
            max_age: 3600,
        }
    }
}

impl CorsConfig {
    fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.allowed_origins.is_empty() {
            self.allowed_origins = defaults.allowed_origins;
        }
        if self.allowed_methods.is_empty() {
            self.allowed_methods = defaults.allowed_methods;
        }
        if self.allowed_headers.is_empty() {
            self.allowed_headers = defaults.allowed_headers;
        }
        if self.max_age == 0 {
            self.max_age = defaults.max_age;
        }
        self
    }
}

/// CORS middleware, see the [module docs](self).
#[derive(Debug, Clone)]
pub struct Cors {
    policy: Arc<CorsPolicy>,
}

#[derive(Debug)]
struct CorsPolicy {
    allowed_origins: Vec<String>,
    allow_credentials: bool,
    allow_methods: Option<HeaderValue>,
    allow_headers: Option<HeaderValue>,
    max_age: HeaderValue,
}

impl Cors {
    pub fn new(config: CorsConfig) -> Self {
        let config = config.with_defaults();
        let policy = CorsPolicy {
            allow_methods: HeaderValue::try_from(config.allowed_methods.join(", ")).ok(),
            allow_headers: HeaderValue::try_from(config.allowed_headers.join(", ")).ok(),
            max_age: HeaderValue::from(config.max_age),
            allowed_origins: config.allowed_origins,
            allow_credentials: config.allow_credentials,
        };
        Self { policy: Arc::new(policy) }
    }
}

impl Default for Cors {
    fn default() -> Self {
        Self::new(CorsConfig::default())
    }
}

impl Middleware for Cors {
    fn wrap(&self, handler: BoxedHandler) -> BoxedHandler {
        Box::new(CorsHandler { policy: Arc::clone(&self.policy), handler })
    }
}

struct CorsHandler {
    policy: Arc<CorsPolicy>,
    handler: BoxedHandler,
}

impl CorsPolicy {
    fn allows_any_origin(&self) -> bool {
        matches!(self.allowed_origins.as_slice(), [only] if only == ANY_ORIGIN)
    }

    fn apply_origin(&self, origin: Option<&HeaderValue>, headers: &mut HeaderMap) {
        let Some(origin) = origin else { return };
        let Ok(origin_str) = origin.to_str() else { return };

        if !self.allowed_origins.iter().any(|allowed| allowed == ANY_ORIGIN || allowed == origin_str) {
            return;
        }

        if self.allows_any_origin() {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(ANY_ORIGIN));
        } else {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
            headers.insert(VARY, HeaderValue::from_static("Origin"));
        }

        if self.allow_credentials {
            headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
        }
    }

    fn apply_preflight(&self, headers: &mut HeaderMap) {
        if let Some(methods) = &self.allow_methods {
            headers.insert(ACCESS_CONTROL_ALLOW_METHODS, methods.clone());
        }
        if let Some(allowed) = &self.allow_headers {
            headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, allowed.clone());
        }
        headers.insert(ACCESS_CONTROL_MAX_AGE, self.max_age.clone());
    }
}

#[async_trait]
impl RequestHandler for CorsHandler {
    async fn invoke(&self, req: Request<ReqBody>) -> Response<ResponseBody> {
        let origin = req.headers().get(ORIGIN).cloned();

        if req.method() == Method::OPTIONS {
            let mut response = Response::new(ResponseBody::empty());
            *response.status_mut() = StatusCode::NO_CONTENT;
            self.policy.apply_origin(origin.as_ref(), response.headers_mut());
            self.policy.apply_preflight(response.headers_mut());
            return response;
        }

        let mut response = self.handler.invoke(req).await;
        self.policy.apply_origin(origin.as_ref(), response.headers_mut());
        response
    }
}

#[cfg(test)]
mod tests {
    use super::{Cors, CorsConfig};
    use crate::handler::{RequestHandler, handler_fn};
    use crate::middleware::Middleware;
    use bytes::Bytes;
    use http::{Method, Request, StatusCode};
    use http_body_util::BodyExt;

    fn request(method: Method, origin: Option<&str>) -> Request<Bytes> {
        let mut builder = Request::builder().method(method).uri("/resource");
        if let Some(origin) = origin {
            builder = builder.header("Origin", origin);
        }
        builder.body(Bytes::new()).unwrap()
    }

    #[tokio::test]
    async fn test_default_allows_any_origin() {
        let handler = Cors::default().wrap(Box::new(handler_fn(|_req| async { "ok" })));

        let response = handler.invoke(request(Method::GET, Some("https://example.com"))).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert!(response.headers().get("vary").is_none());
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.as_ref(), b"ok");
    }

    #[tokio::test]
    async fn test_preflight_is_answered_without_calling_handler() {
        let handler = Cors::default().wrap(Box::new(handler_fn(|_req| async {
            if true {
                panic!("preflight must not reach the handler");
            }
        })));

        let response = handler.invoke(request(Method::OPTIONS, Some("https://example.com"))).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()["access-control-allow-methods"], "GET, POST, PUT, DELETE, PATCH, OPTIONS");
        assert_eq!(response.headers()["access-control-allow-headers"], "Accept, Content-Type, Authorization");
        assert_eq!(response.headers()["access-control-max-age"], "3600");
    }

    #[tokio::test]
    async fn test_specific_origins() {
        let config = CorsConfig {
            allowed_origins: vec!["https://a.example".into(), "https://b.example".into()],
            allow_credentials: true,
            ..CorsConfig::default()
        };
        let handler = Cors::new(config).wrap(Box::new(handler_fn(|_req| async { "ok" })));

        let allowed = handler.invoke(request(Method::GET, Some("https://b.example"))).await;
        assert_eq!(allowed.headers()["access-control-allow-origin"], "https://b.example");
        assert_eq!(allowed.headers()["vary"], "Origin");
        assert_eq!(allowed.headers()["access-control-allow-credentials"], "true");

        let denied = handler.invoke(request(Method::GET, Some("https://evil.example"))).await;
        assert!(denied.headers().get("access-control-allow-origin").is_none());

        let no_origin = handler.invoke(request(Method::GET, None)).await;
        assert!(no_origin.headers().get("access-control-allow-origin").is_none());
    }

    #[test]
    fn test_config_deserialize_fills_defaults() {
        let config: CorsConfig = serde_json::from_str(r#"{"allowed_origins": ["https://a.example"]}"#).unwrap();

        assert_eq!(config.allowed_origins, vec!["https://a.example".to_owned()]);
        assert_eq!(config.max_age, 3600);
        assert_eq!(config.allowed_methods, CorsConfig::default().allowed_methods);
    }

    #[test]
    fn test_empty_lists_fall_back_to_defaults() {
        let config =
            CorsConfig { allowed_origins: vec![], allowed_methods: vec![], allowed_headers: vec![], allow_credentials: false, max_age: 0 }
                .with_defaults();

        assert_eq!(config, CorsConfig::default());
    }
}
