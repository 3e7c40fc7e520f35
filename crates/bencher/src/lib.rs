/// A set of routes to register, and the request paths to look up once they are compiled.
#[derive(Debug, Copy, Clone)]
pub struct RouteSet {
    name: &'static str,
    group: RouteGroup,
    routes: &'static [(&'static str, &'static str)],
    lookups: &'static [(&'static str, &'static str)],
}

impl RouteSet {
    pub const fn new(
        name: &'static str,
        group: RouteGroup,
        routes: &'static [(&'static str, &'static str)],
        lookups: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self { name, group, routes, lookups }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> RouteGroup {
        self.group
    }

    /// `(method, pattern)` pairs, as registered on the builder
    pub fn routes(&self) -> &'static [(&'static str, &'static str)] {
        self.routes
    }

    /// `(method, path)` pairs, as seen by the router at dispatch
    pub fn lookups(&self) -> &'static [(&'static str, &'static str)] {
        self.lookups
    }
}

#[derive(Clone, Copy, Debug)]
pub enum RouteGroup {
    Small,
    Large,
}

pub static STATIC_ROUTES: RouteSet = RouteSet::new(
    "static",
    RouteGroup::Small,
    &[("GET", "/"), ("GET", "/health"), ("GET", "/about"), ("POST", "/login"), ("POST", "/logout")],
    &[("GET", "/"), ("GET", "/health"), ("POST", "/logout"), ("GET", "/missing")],
);

pub static API_ROUTES: RouteSet = RouteSet::new(
    "api",
    RouteGroup::Large,
    &[
        ("GET", "/api/v1/users"),
        ("POST", "/api/v1/users"),
        ("GET", "/api/v1/users/{id}"),
        ("PUT", "/api/v1/users/{id}"),
        ("DELETE", "/api/v1/users/{id}"),
        ("GET", "/api/v1/users/{id}/posts"),
        ("GET", "/api/v1/users/{id}/posts/{post}"),
        ("GET", "/api/v1/posts"),
        ("GET", "/api/v1/posts/{post}/comments"),
        ("POST", "/api/v1/posts/{post}/comments"),
        ("GET", "/api/v2/users/{id}"),
        ("GET", "/static/{*path}"),
    ],
    &[
        ("GET", "/api/v1/users"),
        ("GET", "/api/v1/users/42"),
        ("DELETE", "/api/v1/users/42"),
        ("GET", "/api/v1/users/42/posts/7"),
        ("POST", "/api/v1/posts/7/comments"),
        ("GET", "/static/css/site.css"),
        ("PATCH", "/api/v1/users/42"),
    ],
);
