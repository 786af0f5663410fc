//! Route Classification
//!
//! Buckets request paths into coarse route classes, each carrying its own
//! request ceiling and window length.

// == Route Class ==
/// One rate-limit bucket: a set of path prefixes sharing a quota.
///
/// Classes are matched in table order, first match wins. The final class in
/// a table must be a catch-all (an empty prefix matches every path) so that
/// classification always succeeds.
#[derive(Debug, Clone)]
pub struct RouteClass {
    /// Short tag appended to the counter key, e.g. "auth"
    pub tag: String,
    /// Path prefixes belonging to this class
    pub prefixes: Vec<String>,
    /// Maximum requests per window
    pub limit: u64,
    /// Window length in seconds
    pub window_seconds: u64,
}

impl RouteClass {
    pub fn new(tag: &str, prefixes: &[&str], limit: u64, window_seconds: u64) -> Self {
        Self {
            tag: tag.to_string(),
            prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
            limit,
            window_seconds,
        }
    }

    /// Returns true if the path belongs to this class.
    pub fn matches(&self, path: &str) -> bool {
        self.prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }
}

// == Default Table ==
/// Default class table: authentication routes get the strictest ceiling,
/// administrative routes a medium one, documentation a lenient one, and
/// everything else the general default.
pub fn default_route_classes() -> Vec<RouteClass> {
    vec![
        RouteClass::new("auth", &["/api/v1/auth"], 10, 60),
        RouteClass::new("admin", &["/api/v1/admin"], 50, 60),
        RouteClass::new("docs", &["/docs", "/openapi.json"], 200, 60),
        RouteClass::new("default", &[""], 100, 60),
    ]
}

// == Classify ==
/// Finds the class for a path. First match in table order wins.
///
/// Falls back to the last entry if nothing matches, so a malformed table
/// without a catch-all still classifies rather than panics.
pub fn classify<'a>(classes: &'a [RouteClass], path: &str) -> &'a RouteClass {
    classes
        .iter()
        .find(|c| c.matches(path))
        .unwrap_or_else(|| classes.last().expect("route class table is empty"))
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_routes_classified_strictest() {
        let classes = default_route_classes();
        let class = classify(&classes, "/api/v1/auth/me");
        assert_eq!(class.tag, "auth");
        assert_eq!(class.limit, 10);
    }

    #[test]
    fn test_admin_routes() {
        let classes = default_route_classes();
        let class = classify(&classes, "/api/v1/admin/users");
        assert_eq!(class.tag, "admin");
        assert_eq!(class.limit, 50);
    }

    #[test]
    fn test_docs_routes() {
        let classes = default_route_classes();
        assert_eq!(classify(&classes, "/docs").tag, "docs");
        assert_eq!(classify(&classes, "/openapi.json").tag, "docs");
    }

    #[test]
    fn test_everything_else_is_default() {
        let classes = default_route_classes();
        assert_eq!(classify(&classes, "/api/v1/leads").tag, "default");
        assert_eq!(classify(&classes, "/").tag, "default");
    }

    #[test]
    fn test_first_match_wins() {
        let classes = vec![
            RouteClass::new("narrow", &["/api/v1/auth"], 5, 30),
            RouteClass::new("wide", &["/api"], 100, 60),
            RouteClass::new("default", &[""], 100, 60),
        ];
        assert_eq!(classify(&classes, "/api/v1/auth/login").tag, "narrow");
        assert_eq!(classify(&classes, "/api/v1/leads").tag, "wide");
    }
}
