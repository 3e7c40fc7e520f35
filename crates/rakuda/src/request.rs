//! Path parameters extracted by the router.
//!
//! When a request is dispatched to a matched route, the router stores the parameters captured by
//! the matching pass in the request extensions as a [`PathParams`]. Handlers read them back
//! through [`RequestExt`].

use http::Request;
use matchit::Params;
use std::borrow::Cow;

/// Represents path parameters extracted from the URL path of an HTTP request.
///
/// Path parameters are named segments in the route pattern. For example, in the pattern
/// `/users/{id}`, `id` is a path parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    params: Vec<(String, String)>,
}

impl PathParams {
    /// Creates an empty PathParams instance with no parameters
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if there are no path parameters
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the number of path parameters
    #[inline]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Gets the value of a path parameter by its name
    pub fn get(&self, key: impl AsRef<str>) -> Option<&str> {
        let key = key.as_ref();
        self.params.iter().find(|(name, _)| name == key).map(|(_, value)| value.as_str())
    }

    /// Iterates over `(name, value)` pairs in pattern order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

/// Values are percent-decoded; a value that does not decode to valid UTF-8 is kept as matched.
impl<'k, 'v> From<&Params<'k, 'v>> for PathParams {
    fn from(params: &Params<'k, 'v>) -> Self {
        Self { params: params.iter().map(|(name, value)| (name.to_owned(), decode(value))).collect() }
    }
}

fn decode(value: &str) -> String {
    urlencoding::decode(value).map_or_else(|_| value.to_owned(), Cow::into_owned)
}

/// Accessors for the path parameters the router attached to a request.
pub trait RequestExt {
    /// Returns the parameters captured for the matched route, if the request went through a router.
    fn path_params(&self) -> Option<&PathParams>;

    /// Shorthand for `path_params().and_then(|params| params.get(name))`.
    fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params().and_then(|params| params.get(name))
    }
}

impl<B> RequestExt for Request<B> {
    fn path_params(&self) -> Option<&PathParams> {
        self.extensions().get::<PathParams>()
    }
}

#[cfg(test)]
mod tests {
    use super::{PathParams, RequestExt};
    use http::Request;

    #[test]
    fn test_params_from_matchit() {
        let mut router = matchit::Router::new();
        router.insert("/users/{id}/posts/{post}", ()).unwrap();

        let matched = router.at("/users/42/posts/7").unwrap();
        let params = PathParams::from(&matched.params);

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("id"), Some("42"));
        assert_eq!(params.get("post"), Some("7"));
        assert_eq!(params.get("missing"), None);
        assert_eq!(params.iter().collect::<Vec<_>>(), vec![("id", "42"), ("post", "7")]);
    }

    #[test]
    fn test_params_are_percent_decoded() {
        let mut router = matchit::Router::new();
        router.insert("/users/{name}/files/{*path}", ()).unwrap();

        let matched = router.at("/users/john%20doe/files/a%2Fb/c%C3%A9").unwrap();
        let params = PathParams::from(&matched.params);

        assert_eq!(params.get("name"), Some("john doe"));
        assert_eq!(params.get("path"), Some("a/b/cé"));
    }

    #[test]
    fn test_undecodable_param_kept_as_is() {
        let mut router = matchit::Router::new();
        router.insert("/raw/{value}", ()).unwrap();

        let matched = router.at("/raw/%FF").unwrap();
        assert_eq!(PathParams::from(&matched.params).get("value"), Some("%FF"));
    }

    #[test]
    fn test_request_without_params() {
        let req = Request::builder().uri("/").body(()).unwrap();
        assert!(req.path_params().is_none());
        assert_eq!(req.path_param("id"), None);
    }
}
