//! What to do when two registrations resolve to the same route key.
//!
//! Conflicts are only detected while building, so the order in which routes were declared never
//! matters. The builder asks its [`ConflictPolicy`] each time a duplicate shows up: `Ok(())` keeps
//! the first registration and drops the duplicate, an `Err` aborts the whole build.

use crate::body::BoxError;
use crate::router::RouteKey;
use thiserror::Error;
use tracing::{Dispatch, warn};

pub type ConflictResult = Result<(), BoxError>;

#[cfg_attr(test, mockall::automock)]
pub trait ConflictPolicy {
    fn on_conflict(&self, route: &RouteKey) -> ConflictResult;
}

impl<F> ConflictPolicy for F
where
    F: Fn(&RouteKey) -> ConflictResult,
{
    fn on_conflict(&self, route: &RouteKey) -> ConflictResult {
        self(route)
    }
}

/// The default policy: log a warning and keep the first registration.
///
/// The warning goes to the current default subscriber unless a dedicated [`Dispatch`] is given
/// with [`WarnOnConflict::with_dispatch`].
#[derive(Debug, Default, Clone)]
pub struct WarnOnConflict {
    dispatch: Option<Dispatch>,
}

impl WarnOnConflict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dispatch(dispatch: Dispatch) -> Self {
        Self { dispatch: Some(dispatch) }
    }
}

impl ConflictPolicy for WarnOnConflict {
    fn on_conflict(&self, route: &RouteKey) -> ConflictResult {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, || warn_conflict(route)),
            None => warn_conflict(route),
        }
        Ok(())
    }
}

fn warn_conflict(route: &RouteKey) {
    warn!(%route, "route conflict, keeping the first registration");
}

/// Strict policy: every conflict fails the build with [`DuplicateRoute`].
#[derive(Debug, Default, Copy, Clone)]
pub struct FailOnConflict;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("route `{0}` is already registered")]
pub struct DuplicateRoute(pub RouteKey);

impl ConflictPolicy for FailOnConflict {
    fn on_conflict(&self, route: &RouteKey) -> ConflictResult {
        Err(Box::new(DuplicateRoute(route.clone())))
    }
}
