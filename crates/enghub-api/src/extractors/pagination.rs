//! Pagination query parameter extractor.

use serde::{Deserialize, Serialize};

use enghub_core::error::AppError;
use enghub_core::result::AppResult;
use enghub_core::types::{PageRequest, SortDirection, SortField};
use enghub_core::types::pagination::DEFAULT_PAGE_SIZE;
use enghub_service::EngineerSearch;

/// Largest page size accepted over HTTP.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Query parameters for paginated endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationParams {
    /// Page index (0-based, default: 0).
    #[serde(default)]
    pub page_index: i64,
    /// Items per page (default: 20, max: 100).
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    /// Sort field (optional).
    pub sort_by: Option<String>,
    /// Sort direction: "asc" or "desc".
    pub sort_dir: Option<String>,
    /// Free-text name search (optional).
    pub search: Option<String>,
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE as i64
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: default_page_size(),
            sort_by: None,
            sort_dir: None,
            search: None,
        }
    }
}

impl PaginationParams {
    /// Converts to a `PageRequest`. Sizes above the cap are lowered;
    /// negative values are clamped by `PageRequest` itself.
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page_index, self.page_size.min(MAX_PAGE_SIZE))
    }

    /// The requested ordering, if any.
    pub fn sort(&self) -> AppResult<Option<SortField>> {
        let Some(field) = self.sort_by.as_deref().filter(|f| !f.is_empty()) else {
            return Ok(None);
        };
        let direction = match self.sort_dir.as_deref().map(str::to_ascii_lowercase) {
            None => SortDirection::Asc,
            Some(dir) if dir == "asc" => SortDirection::Asc,
            Some(dir) if dir == "desc" => SortDirection::Desc,
            Some(other) => {
                return Err(AppError::invalid_argument(format!(
                    "Invalid sort direction '{other}'. Expected 'asc' or 'desc'"
                )));
            }
        };
        Ok(Some(SortField::new(field, direction)))
    }

    /// Search and ordering for the engineer list.
    pub fn engineer_search(&self) -> AppResult<EngineerSearch> {
        Ok(EngineerSearch {
            search: self.search.clone(),
            sort: self.sort()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_is_capped_and_clamped() {
        let params = PaginationParams {
            page_size: 500,
            ..PaginationParams::default()
        };
        assert_eq!(params.page_request().page_size, 100);

        let params = PaginationParams {
            page_index: -3,
            page_size: 0,
            ..PaginationParams::default()
        };
        let page = params.page_request();
        assert_eq!(page.page_index, 0);
        assert_eq!(page.page_size, 1);
    }

    #[test]
    fn test_sort_direction_parsing() {
        let params = PaginationParams {
            sort_by: Some("name".to_string()),
            sort_dir: Some("DESC".to_string()),
            ..PaginationParams::default()
        };
        assert_eq!(params.sort().expect("sort"), Some(SortField::desc("name")));

        let params = PaginationParams {
            sort_by: Some("name".to_string()),
            sort_dir: Some("sideways".to_string()),
            ..PaginationParams::default()
        };
        assert!(params.sort().is_err());
        assert_eq!(PaginationParams::default().sort().expect("none"), None);
    }
}
