//! Conversion of handler return values into HTTP responses.
//!
//! The [`Responder`] trait lets closures adapted by [`handler_fn`](crate::handler_fn) and
//! [`middleware_fn`](crate::middleware::middleware_fn) return plain values (strings, status/body
//! tuples, pre-built responses) instead of assembling a [`Response`] by hand.
//!
//! Serializing structured payloads is left to the caller; the only JSON this crate writes is the
//! fixed `{"error": ...}` body used by the built-in fallback and recovery middleware.

use crate::body::ResponseBody;
use bytes::Bytes;
use http::{HeaderValue, Response, StatusCode};

/// A trait for types that can be converted into HTTP responses.
pub trait Responder {
    fn response_to(self) -> Response<ResponseBody>;
}

impl<T: Responder, E: Responder> Responder for Result<T, E> {
    fn response_to(self) -> Response<ResponseBody> {
        match self {
            Ok(t) => t.response_to(),
            Err(e) => e.response_to(),
        }
    }
}

/// `None` becomes an empty `200 OK`.
impl<T: Responder> Responder for Option<T> {
    fn response_to(self) -> Response<ResponseBody> {
        match self {
            Some(t) => t.response_to(),
            None => Response::new(ResponseBody::empty()),
        }
    }
}

impl<B> Responder for Response<B>
where
    B: Into<ResponseBody>,
{
    fn response_to(self) -> Response<ResponseBody> {
        self.map(Into::into)
    }
}

impl<T: Responder> Responder for (StatusCode, T) {
    fn response_to(self) -> Response<ResponseBody> {
        let (status, responder) = self;
        let mut response = responder.response_to();
        *response.status_mut() = status;
        response
    }
}

impl Responder for StatusCode {
    fn response_to(self) -> Response<ResponseBody> {
        let mut response = Response::new(ResponseBody::empty());
        *response.status_mut() = self;
        response
    }
}

impl Responder for () {
    fn response_to(self) -> Response<ResponseBody> {
        Response::new(ResponseBody::empty())
    }
}

impl Responder for &'static str {
    fn response_to(self) -> Response<ResponseBody> {
        plain_text(ResponseBody::from(self))
    }
}

impl Responder for String {
    fn response_to(self) -> Response<ResponseBody> {
        plain_text(ResponseBody::from(self))
    }
}

impl Responder for Bytes {
    fn response_to(self) -> Response<ResponseBody> {
        let mut response = Response::new(ResponseBody::from(self));
        response.headers_mut().insert(http::header::CONTENT_TYPE, HeaderValue::from_static(OCTET_STREAM));
        response
    }
}

fn plain_text(body: ResponseBody) -> Response<ResponseBody> {
    let mut response = Response::new(body);
    response.headers_mut().insert(http::header::CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN_UTF_8));
    response
}

/// Builds `{"error": message}` followed by a newline, with a JSON content type and the given status.
pub(crate) fn json_error(status: StatusCode, message: &str) -> Response<ResponseBody> {
    let mut body = serde_json::json!({ "error": message }).to_string().into_bytes();
    body.push(b'\n');

    let mut response = Response::new(ResponseBody::from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(http::header::CONTENT_TYPE, HeaderValue::from_static(JSON_UTF_8));
    response
}

pub(crate) const JSON_UTF_8: &str = "application/json; charset=utf-8";
const TEXT_PLAIN_UTF_8: &str = "text/plain; charset=utf-8";
const OCTET_STREAM: &str = "application/octet-stream";
