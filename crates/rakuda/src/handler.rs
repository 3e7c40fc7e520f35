use crate::body::{ReqBody, ResponseBody};
use crate::responder::Responder;
use async_trait::async_trait;
use http::{Request, Response};
use std::sync::Arc;

/// Anything that can answer a request.
///
/// Handlers are opaque to the router: it stores them, wraps them with middleware and calls them,
/// but never looks inside.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn invoke(&self, req: Request<ReqBody>) -> Response<ResponseBody>;
}

pub type BoxedHandler = Box<dyn RequestHandler>;

#[async_trait]
impl<H: RequestHandler + ?Sized> RequestHandler for Box<H> {
    async fn invoke(&self, req: Request<ReqBody>) -> Response<ResponseBody> {
        (**self).invoke(req).await
    }
}

#[async_trait]
impl<H: RequestHandler + ?Sized> RequestHandler for Arc<H> {
    async fn invoke(&self, req: Request<ReqBody>) -> Response<ResponseBody> {
        (**self).invoke(req).await
    }
}

/// a holder which turns an async closure into a [`RequestHandler`]
pub struct FnHandler<F> {
    f: F,
}

/// Adapts `Fn(Request<ReqBody>) -> impl Future<Output = impl Responder>` into a handler.
///
/// ```
/// use rakuda::handler_fn;
///
/// let hello = handler_fn(|_req| async { "hello world" });
/// # let _ = hello;
/// ```
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Request<ReqBody>) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: Responder,
{
    FnHandler { f }
}

impl<F> std::fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut> RequestHandler for FnHandler<F>
where
    F: Fn(Request<ReqBody>) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: Responder,
{
    async fn invoke(&self, req: Request<ReqBody>) -> Response<ResponseBody> {
        (self.f)(req).await.response_to()
    }
}
