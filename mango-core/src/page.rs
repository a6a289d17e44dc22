//! Pagination parameters and page results.
//!
//! Page numbers are 1-indexed. [`PaginationParams::parse`] accepts raw strings, as they
//! typically arrive from query parameters, and clamps anything invalid to page 1 of size 1.

use serde::{Deserialize, Serialize};

/// A single page of results.
///
/// # Example
///
/// ```ignore
/// use mango::page::Page;
///
/// let page: Page<String> = Page::builder(vec!["item1".to_string()])
///     .with_page(2)
///     .with_per_page(10)
///     .build();
///
/// assert_eq!(page.previous_page, Some(1));
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// The items contained in this page.
    pub items: Vec<T>,
    /// The page number (1-indexed).
    pub page: u64,
    /// Requested number of items per page.
    pub per_page: u64,
    /// The previous page number (if this is not the first page).
    pub previous_page: Option<u64>,
}

impl<T> Page<T> {
    /// Creates a new builder for constructing a page.
    pub fn builder(items: Vec<T>) -> PageBuilder<T> {
        PageBuilder::new(items)
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            per_page: 1,
            previous_page: None,
        }
    }
}

/// Builder for constructing [`Page`] instances.
pub struct PageBuilder<T> {
    items: Vec<T>,
    page: u64,
    per_page: u64,
}

impl<T> PageBuilder<T> {
    /// Creates a new builder with the given items.
    pub fn new(items: Vec<T>) -> Self {
        Self { items, page: 1, per_page: 1 }
    }

    /// Sets the page number.
    pub fn with_page(mut self, page: u64) -> Self {
        self.page = page;
        self
    }

    /// Sets the number of items per page.
    pub fn with_per_page(mut self, per_page: u64) -> Self {
        self.per_page = per_page;
        self
    }

    /// Builds the final [`Page`], deriving the previous page number.
    pub fn build(self) -> Page<T> {
        Page {
            items: self.items,
            page: self.page,
            per_page: self.per_page,
            previous_page: if self.page > 1 { Some(self.page - 1) } else { None },
        }
    }
}

/// Parameters selecting one page of a result set.
///
/// # Example
///
/// ```ignore
/// use mango::page::PaginationParams;
///
/// let params = PaginationParams::parse("3", "20");
/// assert_eq!(params.offset(), 40);
///
/// let params = PaginationParams::parse("a", "-10");
/// assert_eq!((params.page, params.per_page, params.offset()), (1, 1, 0));
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    /// The page number (1-indexed).
    pub page: u64,
    /// Number of items per page.
    pub per_page: u64,
}

impl PaginationParams {
    /// Creates pagination parameters, clamping zero values to 1.
    pub fn new(page: u64, per_page: u64) -> Self {
        Self { page: page.max(1), per_page: per_page.max(1) }
    }

    /// Parses raw page and page-size strings.
    ///
    /// A page that is not an integer or is below 1 becomes 1. A size that is not an
    /// integer or is not positive becomes 1.
    pub fn parse(page: &str, per_page: &str) -> Self {
        Self {
            page: parse_positive(page),
            per_page: parse_positive(per_page),
        }
    }

    /// Number of items to skip to reach this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// Maximum number of items on this page, as drivers expect it.
    pub fn limit(&self) -> i64 {
        i64::try_from(self.per_page).unwrap_or(i64::MAX)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self { page: 1, per_page: 10 }
    }
}

fn parse_positive(raw: &str) -> u64 {
    match raw.trim().parse::<i64>() {
        Ok(value) if value >= 1 => value as u64,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_clamps_invalid_values_to_one() {
        let params = PaginationParams::parse("a", "-10");

        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 1);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn parse_clamps_zero_and_negative_pages() {
        assert_eq!(PaginationParams::parse("0", "5").page, 1);
        assert_eq!(PaginationParams::parse("-3", "5").page, 1);
        assert_eq!(PaginationParams::parse("2", "0").per_page, 1);
        assert_eq!(PaginationParams::parse("", "").offset(), 0);
    }

    #[test]
    fn parse_computes_offset_from_valid_values() {
        let params = PaginationParams::parse("3", "20");

        assert_eq!(params, PaginationParams::new(3, 20));
        assert_eq!(params.offset(), 40);
        assert_eq!(params.limit(), 20);
    }

    #[test]
    fn new_clamps_zero_values() {
        assert_eq!(PaginationParams::new(0, 0), PaginationParams::new(1, 1));
    }

    #[test]
    fn builder_derives_previous_page() {
        let first = Page::builder(vec![1, 2]).with_page(1).with_per_page(2).build();
        let third = Page::builder(vec![5]).with_page(3).with_per_page(2).build();

        assert_eq!(first.previous_page, None);
        assert_eq!(third.previous_page, Some(2));
        assert_eq!(third.items, vec![5]);
    }

    #[test]
    fn page_serializes_for_api_responses() {
        let page = Page::builder(vec!["a"]).with_page(2).with_per_page(1).build();

        let json = serde_json::to_value(&page).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "items": ["a"], "page": 2, "per_page": 1, "previous_page": 1 })
        );
    }
}
