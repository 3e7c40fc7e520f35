use crate::body::BoxError;
use crate::router::RouteKey;
use thiserror::Error;

/// Errors returned by [`RouterBuilder::build`](crate::RouterBuilder::build).
///
/// Building stops at the first error met in traversal order, no partially built router is ever
/// returned.
#[derive(Error, Debug)]
pub enum BuildError {
    /// Two registrations resolved to the same route key and the conflict policy refused it.
    #[error("conflicting route `{route}`: {source}")]
    Conflict { route: RouteKey, source: BoxError },

    /// The pattern was rejected by the path matcher, e.g. it overlaps an existing pattern with a
    /// different parameter name.
    #[error("invalid route pattern `{route}`: {source}")]
    InvalidPattern { route: RouteKey, source: matchit::InsertError },
}

impl BuildError {
    /// The route key the error was raised for.
    pub fn route(&self) -> &RouteKey {
        match self {
            BuildError::Conflict { route, .. } | BuildError::InvalidPattern { route, .. } => route,
        }
    }
}
