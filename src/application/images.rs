//! Image reference resolution and load-failure fallback

use std::collections::HashSet;

use crate::infrastructure::config::ImageConfig;

/// Which placeholder applies when nothing resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageContext {
    Restaurant,
    Review,
}

/// Turns stored image references into fetchable URLs
#[derive(Debug, Clone)]
pub struct ImageResolver {
    base_url: String,
    default_restaurant_image: String,
    default_review_image: String,
}

impl ImageResolver {
    pub fn new(
        base_url: impl Into<String>,
        default_restaurant_image: impl Into<String>,
        default_review_image: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_restaurant_image: default_restaurant_image.into(),
            default_review_image: default_review_image.into(),
        }
    }

    pub fn from_config(config: &ImageConfig) -> Self {
        Self::new(
            &config.base_url,
            &config.default_restaurant_image,
            &config.default_review_image,
        )
    }

    pub fn placeholder(&self, context: ImageContext) -> &str {
        match context {
            ImageContext::Restaurant => &self.default_restaurant_image,
            ImageContext::Review => &self.default_review_image,
        }
    }

    /// Canonical URL for a raw reference:
    /// `blob:` passes through, absolute and `gs://` URLs keep only their
    /// filename, paths lose their leading slashes, and anything empty
    /// becomes the placeholder.
    pub fn resolve(&self, raw: Option<&str>, context: ImageContext) -> String {
        let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
            return self.placeholder(context).to_string();
        };

        if raw.starts_with("blob:") {
            return raw.to_string();
        }

        let file = if is_remote(raw) {
            file_name(raw)
        } else {
            Some(raw.trim_start_matches('/'))
        };

        match file.filter(|f| !f.is_empty()) {
            Some(file) => format!("{}/api/images/{}", self.base_url, file),
            None => self.placeholder(context).to_string(),
        }
    }

    /// Ordered candidates tried after a load failure
    fn candidates(&self, original: &str, context: ImageContext) -> Vec<String> {
        let mut candidates = vec![original.to_string()];
        if let Some(file) = file_name(original).filter(|f| !f.is_empty()) {
            candidates.push(format!("{}/api/files/image/{}", self.base_url, file));
            candidates.push(format!("{}/uploads/{}", self.base_url, file));
        }
        candidates.push(self.placeholder(context).to_string());
        candidates
    }
}

fn is_remote(raw: &str) -> bool {
    raw.starts_with("http://") || raw.starts_with("https://") || raw.starts_with("gs://")
}

/// Last path segment, without query or fragment
fn file_name(raw: &str) -> Option<&str> {
    let raw = raw.split(['?', '#']).next().unwrap_or(raw);
    raw.rsplit('/').next()
}

/// Fallback state for one displayed image. Never yields the same URL twice.
#[derive(Debug, Clone)]
pub struct ImageLoadState {
    context: ImageContext,
    original: String,
    current: String,
    tried: HashSet<String>,
}

impl ImageLoadState {
    pub fn new(resolver: &ImageResolver, raw: Option<&str>, context: ImageContext) -> Self {
        let current = resolver.resolve(raw, context);
        let mut tried = HashSet::new();
        tried.insert(current.clone());
        Self {
            context,
            original: raw.unwrap_or_default().to_string(),
            current,
            tried,
        }
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    /// Next URL after the current one failed to load, or `None` once every
    /// candidate has been tried
    pub fn on_error(&mut self, resolver: &ImageResolver) -> Option<&str> {
        // Without a reference the placeholder is already showing
        if self.original.trim().is_empty() {
            return None;
        }

        let next = resolver
            .candidates(&self.original, self.context)
            .into_iter()
            .find(|candidate| !candidate.is_empty() && !self.tried.contains(candidate))?;

        tracing::debug!("Image {} failed, trying {}", self.current, next);
        self.tried.insert(next.clone());
        self.current = next;
        Some(&self.current)
    }

    pub fn attempts(&self) -> usize {
        self.tried.len()
    }
}
