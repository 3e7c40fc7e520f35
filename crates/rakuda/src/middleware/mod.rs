//! Middleware: transformations from one handler into another.
//!
//! A [`Middleware`] receives the handler it guards and returns a new handler, usually one that
//! does some work before and/or after delegating to the original. Middlewares registered on a
//! scope apply to every handler in that scope and in its nested scopes; see
//! [`RouterBuilder`](crate::RouterBuilder) for how chains are composed.

mod access_log;
mod cors;
mod recovery;

pub use access_log::AccessLog;
pub use cors::{Cors, CorsConfig};
pub use recovery::Recovery;

use crate::body::{ReqBody, ResponseBody};
use crate::handler::{BoxedHandler, RequestHandler};
use crate::responder::Responder;
use async_trait::async_trait;
use http::{Request, Response};
use std::sync::Arc;

/// A middleware wraps a handler into another handler.
pub trait Middleware: Send + Sync {
    fn wrap(&self, handler: BoxedHandler) -> BoxedHandler;
}

impl<M: Middleware + ?Sized> Middleware for Arc<M> {
    fn wrap(&self, handler: BoxedHandler) -> BoxedHandler {
        (**self).wrap(handler)
    }
}

/// An ordered list of middlewares, root scope first.
///
/// Extending a chain never touches the original, so sibling scopes each derive their own chain
/// from the same parent.
#[derive(Clone, Default)]
pub(crate) struct MiddlewareChain {
    inner: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// returns a new chain: this chain followed by `middlewares`
    pub(crate) fn extend(&self, middlewares: impl IntoIterator<Item = Arc<dyn Middleware>>) -> Self {
        let mut inner = self.inner.clone();
        inner.extend(middlewares);
        Self { inner }
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.len()
    }

    /// Wraps `handler` so that the first middleware of the chain is the outermost one: it sees the
    /// request first and the response last.
    pub(crate) fn apply(&self, handler: BoxedHandler) -> BoxedHandler {
        self.inner.iter().rev().fold(handler, |handler, middleware| middleware.wrap(handler))
    }
}

/// A [`Middleware`] built from a `handler -> handler` closure, see [`wrap_fn`].
#[derive(Copy, Clone)]
pub struct WrapFn<F> {
    f: F,
}

/// Turns a `Fn(BoxedHandler) -> BoxedHandler` closure into a [`Middleware`].
pub fn wrap_fn<F>(f: F) -> WrapFn<F>
where
    F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync,
{
    WrapFn { f }
}

impl<F> std::fmt::Debug for WrapFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WrapFn").finish_non_exhaustive()
    }
}

impl<F> Middleware for WrapFn<F>
where
    F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync,
{
    fn wrap(&self, handler: BoxedHandler) -> BoxedHandler {
        (self.f)(handler)
    }
}

/// The rest of the chain, as seen from inside a [`middleware_fn`] closure.
#[derive(Clone)]
pub struct Next {
    handler: Arc<dyn RequestHandler>,
}

impl std::fmt::Debug for Next {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}

impl Next {
    /// Passes the request on to the wrapped handler.
    pub async fn run(self, req: Request<ReqBody>) -> Response<ResponseBody> {
        self.handler.invoke(req).await
    }
}

/// A [`Middleware`] built from an async closure, see [`middleware_fn`].
pub struct FnMiddleware<F> {
    f: Arc<F>,
}

/// Turns an async `Fn(Request, Next) -> impl Responder` closure into a [`Middleware`].
///
/// ```
/// use rakuda::middleware::{middleware_fn, Next};
/// use http::HeaderValue;
///
/// let powered_by = middleware_fn(|req, next: Next| async move {
///     let mut response = next.run(req).await;
///     response.headers_mut().insert("x-powered-by", HeaderValue::from_static("rakuda"));
///     response
/// });
/// # let _ = powered_by;
/// ```
pub fn middleware_fn<F, Fut>(f: F) -> FnMiddleware<F>
where
    F: Fn(Request<ReqBody>, Next) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: Responder,
{
    FnMiddleware { f: Arc::new(f) }
}

impl<F> std::fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnMiddleware").finish_non_exhaustive()
    }
}

impl<F, Fut> Middleware for FnMiddleware<F>
where
    F: Fn(Request<ReqBody>, Next) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: Responder,
{
    fn wrap(&self, handler: BoxedHandler) -> BoxedHandler {
        Box::new(FnMiddlewareHandler { f: Arc::clone(&self.f), next: Next { handler: Arc::from(handler) } })
    }
}

struct FnMiddlewareHandler<F> {
    f: Arc<F>,
    next: Next,
}

#[async_trait]
impl<F, Fut> RequestHandler for FnMiddlewareHandler<F>
where
    F: Fn(Request<ReqBody>, Next) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: Responder,
{
    async fn invoke(&self, req: Request<ReqBody>) -> Response<ResponseBody> {
        (self.f)(req, self.next.clone()).await.response_to()
    }
}
