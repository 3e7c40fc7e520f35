//! Rakuda compiles a tree of scoped handlers and middlewares into an immutable HTTP router.
//!
//! Declare routes on a [`RouterBuilder`], nest them with [`Scope::scope`] and guard them with
//! [`middleware`]s. Nothing is resolved until [`RouterBuilder::build`]: only then are full paths
//! computed, middleware chains composed and duplicate routes detected. The resulting [`Router`]
//! is a [`RequestHandler`] that can be shared freely between tasks.

mod body;
mod handler;
mod request;
mod responder;

pub mod middleware;
pub mod router;

pub use body::{BoxError, ReqBody, ResponseBody};
pub use handler::{BoxedHandler, FnHandler, RequestHandler, handler_fn};
pub use request::{PathParams, RequestExt};
pub use responder::Responder;
pub use router::{BuildError, RouteKey, Router, RouterBuilder, Scope, print_routes};
