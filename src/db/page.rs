use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_LENGTH: u32 = 10;

/// A 1-based page of `length` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub length: u32,
}

impl Page {
    /// Page number and length are clamped to at least 1.
    pub fn new(number: u32, length: u32) -> Self {
        Self {
            number: number.max(1),
            length: length.max(1),
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.number - 1) * i64::from(self.length)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.length)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_LENGTH)
    }
}

/// `?page=&length=` query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub length: Option<u32>,
}

impl From<PageParams> for Page {
    fn from(params: PageParams) -> Self {
        Self::new(
            params.page.unwrap_or(1),
            params.length.unwrap_or(DEFAULT_PAGE_LENGTH),
        )
    }
}

/// One page of rows plus the unpaginated match count.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
}
