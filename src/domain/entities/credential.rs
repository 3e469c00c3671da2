use std::fmt;

pub const BEARER_PREFIX: &str = "Bearer ";

/// Opaque bearer token, always held with the `Bearer ` prefix
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw token, adding the `Bearer ` prefix unless already present.
    /// Returns `None` for empty input.
    pub fn from_raw(raw: &str) -> Option<Self> {
        let raw = raw.trim().trim_matches('"').trim();
        // A bare `Bearer` is a prefix with an empty token
        let token = match raw.strip_prefix(BEARER_PREFIX.trim_end()) {
            Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
            _ => raw,
        };
        if token.is_empty() {
            return None;
        }
        Some(Self(format!("{}{}", BEARER_PREFIX, token)))
    }

    /// Value for the `Authorization` header
    pub fn header_value(&self) -> &str {
        &self.0
    }

    /// Token without the prefix
    pub fn token(&self) -> &str {
        &self.0[BEARER_PREFIX.len()..]
    }
}

// Never print the token itself
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: String = self.token().chars().take(8).collect();
        write!(f, "Credential({}...)", preview)
    }
}
