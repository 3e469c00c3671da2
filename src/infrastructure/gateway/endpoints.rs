//! Endpoint tables: which calls are public, protected, or best-effort reads

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::domain::traits::Method;

/// Shape a degraded read resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degradation {
    EmptyList,
    EmptyPage,
    False,
}

struct Rule {
    methods: &'static [Method],
    pattern: Regex,
}

impl Rule {
    fn new(methods: &'static [Method], pattern: &str) -> Self {
        Self {
            methods,
            pattern: Regex::new(pattern).unwrap(),
        }
    }

    fn matches(&self, method: Method, path: &str) -> bool {
        self.methods.contains(&method) && self.pattern.is_match(path)
    }
}

const ANY: &[Method] = &[Method::Get, Method::Post, Method::Put, Method::Delete];
const GET: &[Method] = &[Method::Get];
const POST: &[Method] = &[Method::Post];
const WRITE: &[Method] = &[Method::Post, Method::Put, Method::Delete];
const EDIT: &[Method] = &[Method::Put, Method::Delete];
const TOGGLE: &[Method] = &[Method::Post, Method::Delete];
const READ_EDIT: &[Method] = &[Method::Get, Method::Put];

static PUBLIC: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new(POST, r"^/users/login/?$"),
        Rule::new(GET, r"^/reviews/restaurant/\d+(/page)?/?$"),
    ]
});

static PROTECTED: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new(ANY, r"^/restaurants/\d+/favorite(/check)?/?$"),
        Rule::new(POST, r"^/restaurants/?$"),
        Rule::new(EDIT, r"^/restaurants/\d+/?$"),
        Rule::new(WRITE, r"^/reviews/\d+/?$"),
        Rule::new(TOGGLE, r"^/reviews/\d+/like/?$"),
        Rule::new(READ_EDIT, r"^/users/me/?$"),
        Rule::new(GET, r"^/users/\d+/(favorites|reviews)/?$"),
    ]
});

static DEGRADED_PAGE: Lazy<Rule> =
    Lazy::new(|| Rule::new(GET, r"^/reviews/restaurant/\d+(/page)?/?$"));

static DEGRADED_LIST: Lazy<Rule> =
    Lazy::new(|| Rule::new(GET, r"^/restaurants/(popular|latest)/?$"));

/// Calls that never carry a credential
pub fn is_public(method: Method, path: &str) -> bool {
    let path = strip_query(path);
    PUBLIC.iter().any(|rule| rule.matches(method, path))
}

/// Calls the server only accepts from a logged-in user
pub fn is_protected(method: Method, path: &str) -> bool {
    let path = strip_query(path);
    PROTECTED.iter().any(|rule| rule.matches(method, path))
}

/// Best-effort reads: any failure resolves to the returned empty shape
pub fn degraded_read(method: Method, path: &str) -> Option<Degradation> {
    let path = strip_query(path);
    if DEGRADED_PAGE.matches(method, path) {
        Some(Degradation::EmptyPage)
    } else if DEGRADED_LIST.matches(method, path) {
        Some(Degradation::EmptyList)
    } else {
        None
    }
}

fn strip_query(path: &str) -> &str {
    path.split('?').next().unwrap_or(path)
}
