use crate::handler::{BoxedHandler, RequestHandler};
use crate::middleware::Middleware;
use crate::router::compile::{self, ROOT, join_path, resolve_pattern};
use crate::router::conflict::{ConflictPolicy, WarnOnConflict};
use crate::router::fallback::NotFound;
use crate::router::{BuildError, Router};
use http::Method;
use std::sync::Arc;
use tracing::debug;

/// A vertex of the configuration tree.
pub(crate) struct Node {
    pub(crate) segment: String,
    pub(crate) actions: Vec<Action>,
    pub(crate) children: Vec<Node>,
}

/// A registration recorded in a node, in declaration order.
pub(crate) enum Action {
    Wrap(Arc<dyn Middleware>),
    Handle(HandlerAction),
}

pub(crate) struct HandlerAction {
    pub(crate) method: Method,
    pub(crate) pattern: String,
    pub(crate) handler: BoxedHandler,
}

impl Node {
    fn new(segment: String) -> Self {
        Self { segment, actions: Vec::new(), children: Vec::new() }
    }

    /// reports the node's own handlers first, then descends into children in order
    fn walk(&self, prefix: &str, visit: &mut dyn FnMut(&Method, &str)) {
        for action in &self.actions {
            if let Action::Handle(handler) = action {
                visit(&handler.method, &resolve_pattern(prefix, &handler.pattern));
            }
        }

        for child in &self.children {
            child.walk(&join_path(prefix, &child.segment), visit);
        }
    }
}

macro_rules! method_routes {
    ($($name:ident => $method:ident),* $(,)?) => {
        $(
            #[doc = concat!("Registers a `", stringify!($method), "` handler, see [`route`](Self::route).")]
            pub fn $name<H: RequestHandler + 'static>(&mut self, pattern: impl Into<String>, handler: H) -> &mut Self {
                self.route(Method::$method, pattern, handler)
            }
        )*
    };
}

/// A handle on one scope of the configuration tree.
///
/// A `Scope` borrows its node mutably, so it can only be used inside the `configure` closure it
/// was handed to. Registrations are recorded as they come and never fail; they are interpreted
/// when the [`RouterBuilder`] is built.
pub struct Scope<'b> {
    node: &'b mut Node,
    prefix: String,
}

impl std::fmt::Debug for Scope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope").field("prefix", &self.prefix).finish_non_exhaustive()
    }
}

impl Scope<'_> {
    /// The full path of this scope.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Registers `handler` for `method` at `pattern`, relative to this scope.
    ///
    /// Duplicates are not checked here, see [`ConflictPolicy`].
    pub fn route<H>(&mut self, method: Method, pattern: impl Into<String>, handler: H) -> &mut Self
    where
        H: RequestHandler + 'static,
    {
        self.node.actions.push(Action::Handle(HandlerAction { method, pattern: pattern.into(), handler: Box::new(handler) }));
        self
    }

    method_routes! {
        get => GET,
        post => POST,
        put => PUT,
        delete => DELETE,
        patch => PATCH,
        head => HEAD,
        options => OPTIONS,
        trace => TRACE,
        connect => CONNECT,
    }

    /// Adds a middleware to this scope.
    ///
    /// It applies to every handler of the scope and of its nested scopes, no matter whether those
    /// handlers are registered before or after this call.
    pub fn wrap<M: Middleware + 'static>(&mut self, middleware: M) -> &mut Self {
        self.node.actions.push(Action::Wrap(Arc::new(middleware)));
        self
    }

    /// Creates a nested scope under `segment` and configures it right away.
    pub fn scope<F>(&mut self, segment: impl Into<String>, configure: F) -> &mut Self
    where
        F: FnOnce(&mut Scope<'_>),
    {
        let mut child = Node::new(segment.into());
        let prefix = join_path(&self.prefix, &child.segment);
        configure(&mut Scope { node: &mut child, prefix });
        self.node.children.push(child);
        self
    }

    /// Creates a nested scope without a path segment, to bound middlewares to some of the routes.
    pub fn group<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(&mut Scope<'_>),
    {
        self.scope("", configure)
    }

    /// Visits every registered `(method, full pattern)` pair in depth-first order.
    pub fn walk<F: FnMut(&Method, &str)>(&self, mut visit: F) {
        self.node.walk(&self.prefix, &mut visit);
    }
}

/// Collects handlers and middlewares into a tree of scopes and compiles it into a [`Router`].
///
/// ```
/// use rakuda::{Router, handler_fn};
/// use rakuda::middleware::Recovery;
///
/// let mut builder = Router::builder();
/// builder.wrap(Recovery);
/// builder.get("/", handler_fn(|_req| async { "home" }));
/// builder.scope("/api", |api| {
///     api.get("/users/{id}", handler_fn(|_req| async { "user" }));
/// });
///
/// let router = builder.build().unwrap();
/// assert_eq!(router.len(), 2);
/// ```
pub struct RouterBuilder {
    root: Node,
    conflict_policy: Box<dyn ConflictPolicy>,
    fallback: Option<BoxedHandler>,
}

impl RouterBuilder {
    pub(crate) fn new() -> Self {
        Self { root: Node::new(String::new()), conflict_policy: Box::new(WarnOnConflict::new()), fallback: None }
    }

    /// Replaces the conflict policy, [`WarnOnConflict`] by default.
    pub fn on_conflict<P: ConflictPolicy + 'static>(&mut self, policy: P) -> &mut Self {
        self.conflict_policy = Box::new(policy);
        self
    }

    /// Sets the handler invoked when no route matches, [`NotFound`] by default.
    pub fn fallback<H: RequestHandler + 'static>(&mut self, handler: H) -> &mut Self {
        self.fallback = Some(Box::new(handler));
        self
    }

    /// The root scope.
    pub fn root(&mut self) -> Scope<'_> {
        Scope { node: &mut self.root, prefix: ROOT.to_owned() }
    }

    /// See [`Scope::route`].
    pub fn route<H>(&mut self, method: Method, pattern: impl Into<String>, handler: H) -> &mut Self
    where
        H: RequestHandler + 'static,
    {
        self.root().route(method, pattern, handler);
        self
    }

    method_routes! {
        get => GET,
        post => POST,
        put => PUT,
        delete => DELETE,
        patch => PATCH,
        head => HEAD,
        options => OPTIONS,
        trace => TRACE,
        connect => CONNECT,
    }

    /// See [`Scope::wrap`].
    pub fn wrap<M: Middleware + 'static>(&mut self, middleware: M) -> &mut Self {
        self.root().wrap(middleware);
        self
    }

    /// See [`Scope::scope`].
    pub fn scope<F>(&mut self, segment: impl Into<String>, configure: F) -> &mut Self
    where
        F: FnOnce(&mut Scope<'_>),
    {
        self.root().scope(segment, configure);
        self
    }

    /// See [`Scope::group`].
    pub fn group<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(&mut Scope<'_>),
    {
        self.root().group(configure);
        self
    }

    /// Visits every registered `(method, full pattern)` pair in depth-first order.
    pub fn walk<F: FnMut(&Method, &str)>(&self, mut visit: F) {
        self.root.walk(ROOT, &mut visit);
    }

    /// Compiles the tree into an immutable [`Router`].
    ///
    /// This consumes the builder: once built, the routes can no longer be changed.
    ///
    /// # Errors
    ///
    /// Returns the first [`BuildError`] met in traversal order, see [`ConflictPolicy`].
    pub fn build(self) -> Result<Router, BuildError> {
        let Self { root, conflict_policy, fallback } = self;

        let table = compile::compile(root, conflict_policy.as_ref())?;
        debug!(routes = table.len(), custom_fallback = fallback.is_some(), "router built");

        Ok(Router::new(table, fallback.unwrap_or_else(|| Box::new(NotFound))))
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RouterBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterBuilder").finish_non_exhaustive()
    }
}
