use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

pub(crate) fn default_page() -> u32 {
    1
}

pub(crate) fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// Page selection shared by the list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PaginationParams {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PaginationParams {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.page < 1 {
            return Err("page must be >= 1".to_string());
        }
        if self.page_size < 1 || self.page_size > MAX_PAGE_SIZE {
            return Err(format!("page_size must be between 1 and {}", MAX_PAGE_SIZE));
        }
        Ok(())
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_items: i64,
    pub total_pages: u32,
}

impl PaginationMeta {
    pub fn new(pagination: PaginationParams, total_items: i64) -> Self {
        let page_size = i64::from(pagination.page_size.max(1));
        let total_pages = (total_items.max(0) + page_size - 1) / page_size;
        Self {
            page: pagination.page,
            page_size: pagination.page_size,
            total_items,
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, pagination: PaginationParams, total_items: i64) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(pagination, total_items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_of_first_page_is_zero() {
        let params = PaginationParams::new(1, 20);
        assert_eq!(params.offset(), 0);
        assert_eq!(params.limit(), 20);
        assert_eq!(PaginationParams::new(3, 20).offset(), 40);
    }

    #[test]
    fn test_page_bounds() {
        assert!(PaginationParams::new(0, 20).validate().is_err());
        assert!(PaginationParams::new(1, 0).validate().is_err());
        assert!(PaginationParams::new(1, 101).validate().is_err());
        assert!(PaginationParams::new(2, 100).validate().is_ok());
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let meta = PaginationMeta::new(PaginationParams::new(1, 20), 41);
        assert_eq!(meta.total_pages, 3);

        let empty = PaginationMeta::new(PaginationParams::new(1, 20), 0);
        assert_eq!(empty.total_pages, 0);
    }
}
