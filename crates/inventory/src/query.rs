//! Filter criteria for inventory lookups.

use serde::{Deserialize, Serialize};

use crate::sku::{Dimensions, ProductCategory, Sku};

/// Largest page a single lookup may request.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Pagination parameters (1-based page number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: 1,
            size: 20,
        }
    }
}

impl Page {
    /// First page of the given size (capped at [`MAX_PAGE_SIZE`]).
    pub fn first(size: u32) -> Self {
        Self {
            number: 1,
            size: size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> usize {
        self.number.saturating_sub(1) as usize * self.size as usize
    }
}

/// How the name criterion is matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum NameFilter {
    /// Case-insensitive partial match (free-text search).
    Contains(String),
    /// Exact display-name match (variant pool lookup).
    Exact(String),
}

impl NameFilter {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameFilter::Contains(text) => name.to_lowercase().contains(&text.to_lowercase()),
            NameFilter::Exact(exact) => name == exact,
        }
    }
}

/// Criteria for one inventory lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryQuery {
    pub name: Option<NameFilter>,
    pub thickness: Option<u32>,
    pub width: Option<u32>,
    pub length: Option<u32>,
    pub category: ProductCategory,
    pub min_available: Option<u64>,
    pub page: Page,
}

impl InventoryQuery {
    /// Free-text search within one category. A blank text lists everything.
    pub fn text_search(category: ProductCategory, text: &str, page: Page) -> Self {
        let text = text.trim();
        Self {
            name: (!text.is_empty()).then(|| NameFilter::Contains(text.to_string())),
            thickness: None,
            width: None,
            length: None,
            category,
            min_available: None,
            page,
        }
    }

    /// Every dimensioned SKU sharing exactly this display name.
    pub fn variant_pool(name: &str, page: Page) -> Self {
        Self {
            name: Some(NameFilter::Exact(name.to_string())),
            thickness: None,
            width: None,
            length: None,
            category: ProductCategory::Dimensioned,
            min_available: None,
            page,
        }
    }

    pub fn with_min_available(mut self, amount: u64) -> Self {
        self.min_available = Some(amount);
        self
    }

    pub fn with_thickness(mut self, thickness: u32) -> Self {
        self.thickness = Some(thickness);
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Does `sku` satisfy every specified criterion (paging aside)?
    pub fn matches(&self, sku: &Sku) -> bool {
        if sku.category() != self.category {
            return false;
        }
        if let Some(filter) = &self.name {
            if !filter.matches(sku.name()) {
                return false;
            }
        }
        let dims = sku.dimensions();
        let dim_ok = |wanted: Option<u32>, pick: fn(&Dimensions) -> u32| match wanted {
            None => true,
            Some(v) => dims.as_ref().is_some_and(|d| pick(d) == v),
        };
        if !dim_ok(self.thickness, |d| d.thickness)
            || !dim_ok(self.width, |d| d.width)
            || !dim_ok(self.length, |d| d.length)
        {
            return false;
        }
        self.min_available.is_none_or(|min| sku.available() >= min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumberyard_core::SkuId;

    fn board(t: u32, w: u32, l: u32, qty: u64) -> Sku {
        Sku::dimensioned(
            SkuId::new(),
            "Pine Board",
            Dimensions::new(t, w, l).unwrap(),
            vec!["pcs".into()],
            qty,
        )
        .unwrap()
    }

    #[test]
    fn contains_is_case_insensitive() {
        let q = InventoryQuery::text_search(ProductCategory::Dimensioned, "pine", Page::default());
        assert!(q.matches(&board(20, 100, 2000, 1)));
    }

    #[test]
    fn exact_name_does_not_match_prefix() {
        let q = InventoryQuery::variant_pool("Pine", Page::default());
        assert!(!q.matches(&board(20, 100, 2000, 1)));
    }

    #[test]
    fn blank_text_search_has_no_name_filter() {
        let q = InventoryQuery::text_search(ProductCategory::Simple, "   ", Page::default());
        assert!(q.name.is_none());
    }

    #[test]
    fn category_mismatch_never_matches() {
        let q = InventoryQuery::text_search(ProductCategory::Simple, "", Page::default());
        assert!(!q.matches(&board(20, 100, 2000, 1)));
    }

    #[test]
    fn dimension_and_quantity_criteria_apply_together() {
        let q = InventoryQuery::variant_pool("Pine Board", Page::default())
            .with_thickness(20)
            .with_min_available(10);
        assert!(q.matches(&board(20, 150, 2000, 10)));
        assert!(!q.matches(&board(20, 150, 2000, 9)));
        assert!(!q.matches(&board(25, 150, 2000, 10)));
    }

    #[test]
    fn page_size_is_capped() {
        assert_eq!(Page::first(50_000).size, MAX_PAGE_SIZE);
        assert_eq!(Page { number: 3, size: 10 }.offset(), 20);
    }
}
