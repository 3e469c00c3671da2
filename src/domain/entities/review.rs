use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{ImageUpload, Role};

/// Review of a restaurant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    #[serde(default)]
    pub content: String,
    pub rating: u8,
    #[serde(rename = "created_At", default, with = "timestamp")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(rename = "updated_At", default, with = "timestamp")]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub user_role: Option<Role>,
    #[serde(default)]
    pub restaurant_id: Option<i64>,
    #[serde(default)]
    pub restaurant_name: Option<String>,
    #[serde(default)]
    pub like_count: u32,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub is_edited: bool,
}

/// Fields sent as the `review` JSON part
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewFields {
    pub content: String,
    pub rating: u8,
}

/// Create/update request for a review
#[derive(Debug, Clone)]
pub struct ReviewDraft {
    pub fields: ReviewFields,
    pub image: Option<ImageUpload>,
}

impl ReviewDraft {
    pub fn new(content: impl Into<String>, rating: u8) -> Self {
        Self {
            fields: ReviewFields {
                content: content.into(),
                rating: rating.clamp(1, 5),
            },
            image: None,
        }
    }

    pub fn with_image(mut self, image: ImageUpload) -> Self {
        self.image = Some(image);
        self
    }
}

/// Like state captured before an optimistic toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeState {
    pub is_liked: bool,
    pub like_count: u32,
}

impl Review {
    pub fn like_state(&self) -> LikeState {
        LikeState {
            is_liked: self.is_liked,
            like_count: self.like_count,
        }
    }

    pub fn restore_like(&mut self, state: LikeState) {
        self.is_liked = state.is_liked;
        self.like_count = state.like_count;
    }

    /// Flip the like flag and adjust the counter, never below zero
    pub fn flip_like(&mut self) {
        self.is_liked = !self.is_liked;
        self.like_count = if self.is_liked {
            self.like_count.saturating_add(1)
        } else {
            self.like_count.saturating_sub(1)
        };
    }
}

/// `yyyy-MM-dd HH:mm:ss` timestamps, as the backend formats them
mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            Some(s) if !s.is_empty() => NaiveDateTime::parse_from_str(&s, FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}
