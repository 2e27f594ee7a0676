//! Listing filters, sort options and the price range selector.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Sort options for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortOption {
    /// Backend default order.
    #[default]
    Featured,
    /// Sort by price, low to high.
    PriceLowToHigh,
    /// Sort by price, high to low.
    PriceHighToLow,
}

impl SortOption {
    pub const ALL: [SortOption; 3] = [
        SortOption::Featured,
        SortOption::PriceLowToHigh,
        SortOption::PriceHighToLow,
    ];

    /// Query-string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::Featured => "featured",
            SortOption::PriceLowToHigh => "low",
            SortOption::PriceHighToLow => "high",
        }
    }

    /// Unknown values fall back to `Featured`.
    pub fn parse(s: &str) -> Self {
        match s {
            "low" | "price_asc" => SortOption::PriceLowToHigh,
            "high" | "price_desc" => SortOption::PriceHighToLow,
            _ => SortOption::Featured,
        }
    }

    /// Backend `ordering` parameter.
    pub fn ordering(&self) -> Option<&'static str> {
        match self {
            SortOption::Featured => None,
            SortOption::PriceLowToHigh => Some("price"),
            SortOption::PriceHighToLow => Some("-price"),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortOption::Featured => "Featured",
            SortOption::PriceLowToHigh => "Price: Low to High",
            SortOption::PriceHighToLow => "Price: High to Low",
        }
    }
}

/// Lower bound of the price selector, in rupees.
pub const MIN_PRICE: i64 = 0;
/// Upper bound of the price selector, in rupees.
pub const MAX_PRICE: i64 = 100_000;
/// Values offered by the min/max selectors.
pub const PRICE_STEPS: [i64; 9] = [0, 5000, 10000, 15000, 20000, 30000, 50000, 75000, 100000];

/// A min/max price window in whole rupees. `min < max` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    min: i64,
    max: i64,
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            min: MIN_PRICE,
            max: MAX_PRICE,
        }
    }
}

impl PriceRange {
    /// Build a range, clamping to the selector bounds; inverted input yields `None`.
    pub fn new(min: i64, max: i64) -> Option<Self> {
        let min = min.clamp(MIN_PRICE, MAX_PRICE);
        let max = max.clamp(MIN_PRICE, MAX_PRICE);
        (min < max).then_some(Self { min, max })
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    /// Accept a new minimum only while it stays below the maximum.
    pub fn set_min(&mut self, value: i64) -> bool {
        let ok = value < self.max && value >= MIN_PRICE;
        if ok {
            self.min = value;
        }
        ok
    }

    /// Accept a new maximum only while it stays above the minimum.
    pub fn set_max(&mut self, value: i64) -> bool {
        let ok = value > self.min && value <= MAX_PRICE;
        if ok {
            self.max = value;
        }
        ok
    }

    /// Whether the range still spans the whole selector.
    pub fn is_unbounded(&self) -> bool {
        self.min == MIN_PRICE && self.max == MAX_PRICE
    }

    /// Choices for the minimum selector: steps below the current max, plus
    /// the current min when it is off-step.
    pub fn min_options(&self) -> Vec<i64> {
        let mut options: Vec<i64> = PRICE_STEPS.iter().copied().filter(|s| *s < self.max).collect();
        if !PRICE_STEPS.contains(&self.min) {
            options.push(self.min);
        }
        options.sort_unstable();
        options
    }

    /// Choices for the maximum selector.
    pub fn max_options(&self) -> Vec<i64> {
        let mut options: Vec<i64> = PRICE_STEPS.iter().copied().filter(|s| *s > self.min).collect();
        if !PRICE_STEPS.contains(&self.max) {
            options.push(self.max);
        }
        options.sort_unstable();
        options.dedup();
        options
    }

    /// Selector label; the top step reads as open-ended.
    pub fn label(value: i64) -> String {
        if value == MAX_PRICE {
            format!("Rs. {}+", value)
        } else {
            format!("Rs. {}", value)
        }
    }
}

/// Product listing filters as carried in the page query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFilters {
    /// Category slug; `None` means all.
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub price: PriceRange,
    pub sort: SortOption,
    pub search: Option<String>,
    /// 1-indexed.
    pub page: u32,
}

impl ProductFilters {
    pub fn new() -> Self {
        Self {
            page: 1,
            ..Default::default()
        }
    }

    /// Parse filters from a raw query string (without the leading `?`).
    pub fn from_query(query: &str) -> Self {
        let mut filters = Self::new();
        let mut min = MIN_PRICE;
        let mut max = MAX_PRICE;

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let value = value.trim();
            match key.as_ref() {
                "category" => filters.category = non_empty_slug(value),
                "sub_category" => filters.sub_category = non_empty_slug(value),
                "min_price" => min = value.parse().unwrap_or(MIN_PRICE),
                "max_price" => max = value.parse().unwrap_or(MAX_PRICE),
                "sort" => filters.sort = SortOption::parse(value),
                "q" | "search" => {
                    filters.search = Some(value.to_string()).filter(|s| !s.is_empty())
                }
                "page" => filters.page = value.parse().ok().filter(|p| *p >= 1).unwrap_or(1),
                _ => {}
            }
        }

        filters.price = PriceRange::new(min, max).unwrap_or_default();
        filters
    }

    /// Render back to a query string, omitting defaults.
    pub fn to_query(&self) -> String {
        let mut ser = form_urlencoded::Serializer::new(String::new());
        if let Some(c) = &self.category {
            ser.append_pair("category", c);
        }
        if let Some(s) = &self.sub_category {
            ser.append_pair("sub_category", s);
        }
        if self.price.min() != MIN_PRICE {
            ser.append_pair("min_price", &self.price.min().to_string());
        }
        if self.price.max() != MAX_PRICE {
            ser.append_pair("max_price", &self.price.max().to_string());
        }
        if self.sort != SortOption::Featured {
            ser.append_pair("sort", self.sort.as_str());
        }
        if let Some(q) = &self.search {
            ser.append_pair("q", q);
        }
        if self.page > 1 {
            ser.append_pair("page", &self.page.to_string());
        }
        ser.finish()
    }

    /// Copy with a different page.
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    /// Copy with a different category; subcategory and page reset.
    pub fn with_category(&self, category: Option<&str>) -> Self {
        Self {
            category: category.and_then(non_empty_slug),
            sub_category: None,
            page: 1,
            ..self.clone()
        }
    }

    pub fn with_sort(&self, sort: SortOption) -> Self {
        Self {
            sort,
            page: 1,
            ..self.clone()
        }
    }

    /// Active category slug, `"all"` when unset.
    pub fn active_category(&self) -> &str {
        self.category.as_deref().unwrap_or("all")
    }
}

fn non_empty_slug(value: &str) -> Option<String> {
    match value {
        "" | "all" => None,
        v => Some(v.to_string()),
    }
}
