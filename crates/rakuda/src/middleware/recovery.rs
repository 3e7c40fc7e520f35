use crate::body::{ReqBody, ResponseBody};
use crate::handler::{BoxedHandler, RequestHandler};
use crate::middleware::Middleware;
use crate::responder::json_error;
use async_trait::async_trait;
use futures::FutureExt;
use http::{Request, Response, StatusCode};
use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::AssertUnwindSafe;
use tracing::error;

/// Turns a panicking handler into a `500 Internal Server Error` with a JSON error body.
///
/// The panic payload is logged at error level together with the request method, path and a
/// backtrace captured in the recovering frame.
#[derive(Debug, Default, Copy, Clone)]
pub struct Recovery;

struct RecoveryHandler {
    handler: BoxedHandler,
}

impl Middleware for Recovery {
    fn wrap(&self, handler: BoxedHandler) -> BoxedHandler {
        Box::new(RecoveryHandler { handler })
    }
}

#[async_trait]
impl RequestHandler for RecoveryHandler {
    async fn invoke(&self, req: Request<ReqBody>) -> Response<ResponseBody> {
        let method = req.method().clone();
        let path = req.uri().path().to_owned();

        match AssertUnwindSafe(self.handler.invoke(req)).catch_unwind().await {
            Ok(response) => response,
            Err(payload) => {
                error!(
                    %method,
                    %path,
                    panic = panic_message(payload.as_ref()),
                    backtrace = %Backtrace::force_capture(),
                    "panic recovered"
                );
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
