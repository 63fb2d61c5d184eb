//! Pagination utilities for service layer
//!
//! [`Pagination`] normalizes caller input; [`Page`] carries one page of
//! results plus the metadata clients use to walk the collection. A page
//! serializes as a flat object whose item and total keys are configurable
//! through [`PageLabels`]:
//!
//! ```json
//! { "products": [...], "totalProducts": 5, "limit": 2, "page": 1,
//!   "totalPages": 3, "pagingCounter": 1, "hasPrevPage": false,
//!   "hasNextPage": true, "prevPage": null, "nextPage": 2 }
//! ```

use serde::ser::{Serialize, SerializeMap, Serializer};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 25;
pub const MAX_LIMIT: u32 = 100;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub limit: u32,
}

impl Pagination {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self { page: page.unwrap_or(DEFAULT_PAGE), limit: limit.unwrap_or(DEFAULT_LIMIT) }
    }

    /// Clamp to sane bounds and return `(page, limit)` as `u64`; page stays 1-based.
    pub fn normalize(self) -> (u64, u64) {
        let page = if self.page == 0 { 1 } else { self.page };
        let limit = self.limit.clamp(1, MAX_LIMIT);
        (page as u64, limit as u64)
    }

    /// Number of items to skip for the normalized page.
    pub fn offset(self) -> u64 {
        let (page, limit) = self.normalize();
        (page - 1) * limit
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: DEFAULT_PAGE, limit: DEFAULT_LIMIT } }
}

/// Output keys for the items array and the total count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageLabels {
    pub docs: &'static str,
    pub total_docs: &'static str,
}

impl PageLabels {
    pub const fn new(docs: &'static str, total_docs: &'static str) -> Self { Self { docs, total_docs } }
}

impl Default for PageLabels {
    fn default() -> Self { Self::new("docs", "totalDocs") }
}

/// One page of results.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub labels: PageLabels,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, pagination: Pagination) -> Self {
        let (page, limit) = pagination.normalize();
        Self { items, total, page, limit, labels: PageLabels::default() }
    }

    pub fn with_labels(mut self, labels: PageLabels) -> Self {
        self.labels = labels;
        self
    }

    /// Never zero: an empty collection still has one (empty) page.
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.limit).max(1)
    }

    /// 1-based position of the first item on this page.
    pub fn paging_counter(&self) -> u64 { (self.page - 1) * self.limit + 1 }

    pub fn has_prev_page(&self) -> bool { self.page > 1 }

    pub fn has_next_page(&self) -> bool { self.page < self.total_pages() }

    pub fn prev_page(&self) -> Option<u64> { self.has_prev_page().then(|| self.page - 1) }

    pub fn next_page(&self) -> Option<u64> { self.has_next_page().then(|| self.page + 1) }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            labels: self.labels,
        }
    }
}

impl<T: Serialize> Serialize for Page<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(10))?;
        map.serialize_entry(self.labels.docs, &self.items)?;
        map.serialize_entry(self.labels.total_docs, &self.total)?;
        map.serialize_entry("limit", &self.limit)?;
        map.serialize_entry("page", &self.page)?;
        map.serialize_entry("totalPages", &self.total_pages())?;
        map.serialize_entry("pagingCounter", &self.paging_counter())?;
        map.serialize_entry("hasPrevPage", &self.has_prev_page())?;
        map.serialize_entry("hasNextPage", &self.has_next_page())?;
        map.serialize_entry("prevPage", &self.prev_page())?;
        map.serialize_entry("nextPage", &self.next_page())?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_clamps_zero_to_defaults() {
        let (page, limit) = Pagination { page: 0, limit: 0 }.normalize();
        assert_eq!(page, 1);
        assert_eq!(limit, 1);
    }

    #[test]
    fn normalize_clamps_upper_bound() {
        let p = Pagination { page: 5, limit: 1000 };
        assert_eq!(p.normalize(), (5, 100));
        assert_eq!(p.offset(), 400);
    }

    #[test]
    fn default_values_are_sane() {
        let d = Pagination::default();
        assert_eq!(d.page, 1);
        assert_eq!(d.limit, 25);
        assert_eq!(Pagination::new(None, Some(2)), Pagination { page: 1, limit: 2 });
    }

    #[test]
    fn page_metadata_for_middle_page() {
        let page = Page::new(vec![3, 4], 5, Pagination { page: 2, limit: 2 });
        assert_eq!(page.total_pages(), 3);
        assert_eq!(page.paging_counter(), 3);
        assert_eq!(page.prev_page(), Some(1));
        assert_eq!(page.next_page(), Some(3));
    }

    #[test]
    fn empty_collection_has_single_page() {
        let page: Page<u8> = Page::new(vec![], 0, Pagination::default());
        assert_eq!(page.total_pages(), 1);
        assert!(!page.has_next_page());
        assert!(!page.has_prev_page());
    }

    #[test]
    fn serializes_with_custom_labels() {
        let page = Page::new(vec!["a", "b"], 5, Pagination { page: 1, limit: 2 })
            .with_labels(PageLabels::new("products", "totalProducts"));
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["products"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["totalProducts"], 5);
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["hasNextPage"], true);
        assert_eq!(json["prevPage"], serde_json::Value::Null);
        assert!(json.get("docs").is_none());
    }
}
