use serde::{Deserialize, Serialize};

use super::ImageUpload;

/// Restaurant tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
}

/// Restaurant as returned by the listing and detail endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Client-maintained, flipped optimistically by the favorite toggle
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub created_by_username: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Listing filters sent as query parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestaurantFilters {
    pub keyword: Option<String>,
    pub category: Option<String>,
    pub min_rating: Option<f64>,
    pub sort: Option<String>,
}

impl RestaurantFilters {
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(keyword) = self.keyword.as_deref().filter(|k| !k.is_empty()) {
            params.push(("keyword".to_string(), keyword.to_string()));
        }
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            params.push(("category".to_string(), category.to_string()));
        }
        if let Some(min_rating) = self.min_rating.filter(|r| *r > 0.0) {
            params.push(("minRating".to_string(), min_rating.to_string()));
        }
        if let Some(sort) = self.sort.as_deref().filter(|s| !s.is_empty()) {
            params.push(("sort".to_string(), sort.to_string()));
        }
        params
    }
}

/// Fields sent as the `restaurant` JSON part on create/update
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantFields {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Create/update request for a restaurant
#[derive(Debug, Clone, Default)]
pub struct RestaurantDraft {
    pub fields: RestaurantFields,
    pub image: Option<ImageUpload>,
    /// Only honoured on update
    pub remove_image: bool,
}

impl RestaurantDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            fields: RestaurantFields {
                name: name.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.fields.address = Some(address.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.fields.category = Some(category.into());
        self
    }

    pub fn with_image(mut self, image: ImageUpload) -> Self {
        self.image = Some(image);
        self
    }
}

/// Entry of the favorites set. Only the id is guaranteed; locally added
/// entries carry nothing else until the next fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Favorite {
    pub fn from_id(id: i64) -> Self {
        Self {
            id,
            name: None,
            image_url: None,
        }
    }
}
