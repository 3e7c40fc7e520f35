//! Compiles the configuration tree into route tables.
//!
//! The tree is walked once, depth first, parents before children. Each node sees the path prefix
//! and middleware chain of its parent by value, so what one branch adds is never visible to its
//! siblings.

use crate::handler::BoxedHandler;
use crate::middleware::{Middleware, MiddlewareChain};
use crate::router::builder::{Action, HandlerAction, Node};
use crate::router::conflict::ConflictPolicy;
use crate::router::{BuildError, RouteKey};
use http::Method;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

pub(crate) const ROOT: &str = "/";

type InnerRouter<T> = matchit::Router<T>;

/// Compiled routes: one path matcher per method, plus the set of keys already taken.
pub(crate) struct RouteTable {
    routes: HashMap<Method, InnerRouter<BoxedHandler>>,
    keys: HashSet<RouteKey>,
}

impl RouteTable {
    fn new() -> Self {
        Self { routes: HashMap::new(), keys: HashSet::new() }
    }

    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    fn contains(&self, key: &RouteKey) -> bool {
        self.keys.contains(key)
    }

    fn insert(&mut self, key: RouteKey, handler: BoxedHandler) -> Result<(), BuildError> {
        self.routes
            .entry(key.method().clone())
            .or_insert_with(InnerRouter::new)
            .insert(key.pattern(), handler)
            .map_err(|source| BuildError::InvalidPattern { route: key.clone(), source })?;
        self.keys.insert(key);
        Ok(())
    }

    pub(crate) fn into_routes(self) -> HashMap<Method, InnerRouter<BoxedHandler>> {
        self.routes
    }
}

pub(crate) fn compile(root: Node, policy: &dyn ConflictPolicy) -> Result<RouteTable, BuildError> {
    let mut table = RouteTable::new();
    visit(root, ROOT, &MiddlewareChain::new(), policy, &mut table)?;
    Ok(table)
}

fn visit(
    node: Node,
    prefix: &str,
    inherited: &MiddlewareChain,
    policy: &dyn ConflictPolicy,
    table: &mut RouteTable,
) -> Result<(), BuildError> {
    let (middlewares, handlers) = partition(node.actions);
    let chain = inherited.extend(middlewares);

    for HandlerAction { method, pattern, handler } in handlers {
        let key = RouteKey::new(method, resolve_pattern(prefix, &pattern));

        if table.contains(&key) {
            policy.on_conflict(&key).map_err(|source| BuildError::Conflict { route: key.clone(), source })?;
            debug!(route = %key, "duplicate route dropped");
            continue;
        }

        debug!(route = %key, middlewares = chain.len(), "route compiled");
        table.insert(key, chain.apply(handler))?;
    }

    for child in node.children {
        let child_prefix = join_path(prefix, &child.segment);
        visit(child, &child_prefix, &chain, policy, table)?;
    }

    Ok(())
}

/// splits actions by kind, keeping the declared order within each kind
fn partition(actions: Vec<Action>) -> (Vec<Arc<dyn Middleware>>, Vec<HandlerAction>) {
    let mut middlewares = Vec::new();
    let mut handlers = Vec::new();
    for action in actions {
        match action {
            Action::Wrap(middleware) => middlewares.push(middleware),
            Action::Handle(handler) => handlers.push(handler),
        }
    }
    (middlewares, handlers)
}

/// Joins two paths and cleans the result: empty and `.` segments are dropped, `..` removes the
/// previous segment, the result always starts with `/` and never ends with one (except the root).
pub(crate) fn join_path(prefix: &str, segment: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in prefix.split('/').chain(segment.split('/')) {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            part => parts.push(part),
        }
    }

    if parts.is_empty() {
        return ROOT.to_owned();
    }

    let mut path = String::with_capacity(prefix.len() + segment.len() + 1);
    for part in parts {
        path.push('/');
        path.push_str(part);
    }
    path
}

/// Resolves a handler's local pattern against the prefix of its scope.
///
/// A local pattern of exactly `/` stands for the root of the scope and only ever matches it: `/`
/// at the top level, `/api/` inside `/api`.
pub(crate) fn resolve_pattern(prefix: &str, pattern: &str) -> String {
    let mut path = join_path(prefix, pattern);
    if pattern == ROOT && path != ROOT {
        path.push('/');
    }
    path
}

#[cfg(test)]
mod tests {
    use super::{join_path, resolve_pattern};

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("/", ""), "/");
        assert_eq!(join_path("/", "/api"), "/api");
        assert_eq!(join_path("/api", "v1"), "/api/v1");
        assert_eq!(join_path("/api/", "/v1/"), "/api/v1");
        assert_eq!(join_path("/api", ""), "/api");
        assert_eq!(join_path("/api", "//users//{id}"), "/api/users/{id}");
        assert_eq!(join_path("/api/v1", "../v2/./items"), "/api/v2/items");
        assert_eq!(join_path("/", "../.."), "/");
    }

    #[test]
    fn test_resolve_root_pattern() {
        assert_eq!(resolve_pattern("/", "/"), "/");
        assert_eq!(resolve_pattern("/api", "/"), "/api/");
        assert_eq!(resolve_pattern("/api", ""), "/api");
        assert_eq!(resolve_pattern("/api/v1", "/items"), "/api/v1/items");
        assert_eq!(resolve_pattern("/", "/files/{*rest}"), "/files/{*rest}");
    }
}
