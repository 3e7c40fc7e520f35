use crate::body::{ReqBody, ResponseBody};
use crate::handler::RequestHandler;
use crate::responder::json_error;
use async_trait::async_trait;
use http::{Request, Response, StatusCode};

/// The fallback used when none is configured: `404` with `{"error":"not found"}`.
#[derive(Debug, Default, Copy, Clone)]
pub struct NotFound;

#[async_trait]
impl RequestHandler for NotFound {
    async fn invoke(&self, _req: Request<ReqBody>) -> Response<ResponseBody> {
        json_error(StatusCode::NOT_FOUND, "not found")
    }
}
