//! Pagination envelope and page-number conversion
//!
//! Callers speak 1-based page numbers; the backend speaks 0-based indexes.
//! `PageQuery::to_params` and `Page::external_page` are the only places the
//! two meet.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Page request in caller terms (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub size: u32,
}

impl PageQuery {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page: page.max(1),
            size: if size == 0 { DEFAULT_PAGE_SIZE } else { size },
        }
    }

    pub fn first(size: u32) -> Self {
        Self::new(1, size)
    }

    /// 0-based index sent to the backend
    pub fn internal_index(&self) -> u32 {
        self.page.saturating_sub(1)
    }

    pub fn to_params(&self) -> Vec<(String, String)> {
        vec![
            ("page".to_string(), self.internal_index().to_string()),
            ("size".to_string(), self.size.to_string()),
        ]
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

/// Paginated envelope `{content, totalElements, currentPage|number, size}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: u64,
    /// 0-based, as sent by the backend
    #[serde(default, alias = "number")]
    pub current_page: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub star_distribution: BTreeMap<u8, u32>,
}

impl<T> Page<T> {
    /// Empty page with zero total, used for degraded reads
    pub fn empty(size: u32) -> Self {
        Self {
            content: Vec::new(),
            total_elements: 0,
            current_page: 0,
            size,
            star_distribution: (1..=5).map(|star| (star, 0)).collect(),
        }
    }

    /// 1-based page number for callers
    pub fn external_page(&self) -> u32 {
        self.current_page + 1
    }
}
