//! # Route Templates
//!
//! Path segments and the route template built from them. A route template
//! is the ordered list of segments a grouping node chain contributed on
//! the way from the root to a handler leaf. Rendering is an exporter
//! convenience; the segment list itself is the canonical representation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One segment of a route.
///
/// Grouping nodes contribute segments; `Parameter` segments bind a path
/// parameter by name and render as `{name}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PathSegment {
    /// A fixed literal segment, e.g. `v1` or `users`.
    Literal(String),
    /// A parameterized segment bound to the named path parameter.
    Parameter(String),
}

impl PathSegment {
    /// Literal segment from anything string-like.
    pub fn literal(s: impl Into<String>) -> Self {
        Self::Literal(s.into())
    }

    /// Parameter segment bound to `name`.
    pub fn parameter(name: impl Into<String>) -> Self {
        Self::Parameter(name.into())
    }

    /// The text used when rendering this segment into a path string.
    pub fn render(&self) -> String {
        match self {
            Self::Literal(s) => s.clone(),
            Self::Parameter(name) => format!("{{{name}}}"),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// An ordered route template: the root-to-leaf segment list for one
/// endpoint.
///
/// Two handlers under the same group legitimately share a template
/// (multiple methods per route); method disambiguation belongs to the
/// exporters, not this layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteTemplate(pub Vec<PathSegment>);

impl RouteTemplate {
    /// Empty template (a handler mounted directly at the service root).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// The ordered segments.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Whether this template has no segments.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Names of all `Parameter` segments, in order.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|seg| match seg {
            PathSegment::Parameter(name) => Some(name.as_str()),
            PathSegment::Literal(_) => None,
        })
    }

    /// Render the template as a path string, segments joined by `/` with
    /// a leading slash. The root template renders as `/`.
    pub fn render(&self) -> String {
        if self.0.is_empty() {
            return "/".to_string();
        }
        let mut out = String::new();
        for seg in &self.0 {
            out.push('/');
            out.push_str(&seg.render());
        }
        out
    }
}

impl From<Vec<PathSegment>> for RouteTemplate {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_literal_chain() {
        let route = RouteTemplate(vec![
            PathSegment::literal("v1"),
            PathSegment::literal("users"),
        ]);
        assert_eq!(route.render(), "/v1/users");
    }

    #[test]
    fn test_render_parameter_segment() {
        let route = RouteTemplate(vec![
            PathSegment::literal("users"),
            PathSegment::parameter("user_id"),
        ]);
        assert_eq!(route.render(), "/users/{user_id}");
    }

    #[test]
    fn test_root_template() {
        let route = RouteTemplate::root();
        assert!(route.is_root());
        assert_eq!(route.render(), "/");
    }

    #[test]
    fn test_parameter_names_in_order() {
        let route = RouteTemplate(vec![
            PathSegment::parameter("a"),
            PathSegment::literal("x"),
            PathSegment::parameter("b"),
        ]);
        let names: Vec<&str> = route.parameter_names().collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_serde_roundtrip() {
        let route = RouteTemplate(vec![
            PathSegment::literal("v1"),
            PathSegment::parameter("id"),
        ]);
        let json = serde_json::to_string(&route).unwrap();
        let parsed: RouteTemplate = serde_json::from_str(&json).unwrap();
        assert_eq!(route, parsed);
    }
}
