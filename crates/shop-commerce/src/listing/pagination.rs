//! Backend list envelope and page navigation.

use serde::{Deserialize, Serialize};

/// The list envelope every backend collection endpoint returns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Paginated<T> {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> Default for Paginated<T> {
    fn default() -> Self {
        Self {
            count: 0,
            next: None,
            previous: None,
            results: Vec::new(),
        }
    }
}

impl<T> Paginated<T> {
    pub fn total_pages(&self, page_size: u32) -> u32 {
        if self.count == 0 || page_size == 0 {
            return 1;
        }
        let pages = self.count.div_ceil(u64::from(page_size));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// An entry in the page navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Page(u32),
    Ellipsis,
}

/// Current position within a paged listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Current page (1-indexed).
    pub page: u32,
    pub total_pages: u32,
}

impl Pagination {
    /// Pages beyond this count are collapsed with ellipses.
    pub const MAX_INLINE: u32 = 7;

    pub fn new(page: u32, total_pages: u32) -> Self {
        let total_pages = total_pages.max(1);
        Self {
            page: page.clamp(1, total_pages),
            total_pages,
        }
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Page links for the navigation bar.
    ///
    /// Up to seven pages are listed in full. Otherwise the first five or last
    /// five pages are shown near either end, and the current page with its
    /// neighbours in the middle, with ellipses bridging the gaps.
    pub fn visible_pages(&self) -> Vec<PageLink> {
        let total = self.total_pages;
        let current = self.page;

        if total <= Self::MAX_INLINE {
            return (1..=total).map(PageLink::Page).collect();
        }

        if current <= 4 {
            let mut links: Vec<PageLink> = (1..=5).map(PageLink::Page).collect();
            links.push(PageLink::Ellipsis);
            links.push(PageLink::Page(total));
            return links;
        }

        if current >= total - 3 {
            let mut links = vec![PageLink::Page(1), PageLink::Ellipsis];
            links.extend((total - 4..=total).map(PageLink::Page));
            return links;
        }

        vec![
            PageLink::Page(1),
            PageLink::Ellipsis,
            PageLink::Page(current - 1),
            PageLink::Page(current),
            PageLink::Page(current + 1),
            PageLink::Ellipsis,
            PageLink::Page(total),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PageLink::{Ellipsis, Page};

    #[test]
    fn test_short_listing_shows_all() {
        let p = Pagination::new(3, 7);
        assert_eq!(p.visible_pages(), (1..=7).map(Page).collect::<Vec<_>>());
    }

    #[test]
    fn test_near_start() {
        let p = Pagination::new(4, 12);
        assert_eq!(
            p.visible_pages(),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Ellipsis, Page(12)]
        );
    }

    #[test]
    fn test_near_end() {
        let p = Pagination::new(9, 12);
        assert_eq!(
            p.visible_pages(),
            vec![Page(1), Ellipsis, Page(8), Page(9), Page(10), Page(11), Page(12)]
        );
    }

    #[test]
    fn test_middle() {
        let p = Pagination::new(6, 12);
        assert_eq!(
            p.visible_pages(),
            vec![Page(1), Ellipsis, Page(5), Page(6), Page(7), Ellipsis, Page(12)]
        );
    }

    #[test]
    fn test_page_is_clamped() {
        let p = Pagination::new(40, 3);
        assert_eq!(p.page, 3);
        assert!(!p.has_next());
        assert!(p.has_prev());
        assert_eq!(Pagination::new(0, 0).page, 1);
    }

    #[test]
    fn test_total_pages() {
        let mut list: Paginated<u8> = Paginated::default();
        assert_eq!(list.total_pages(12), 1);
        list.count = 25;
        assert_eq!(list.total_pages(12), 3);
    }

    #[test]
    fn test_envelope_deserialize() {
        let list: Paginated<u8> =
            serde_json::from_str(r#"{"count": 2, "next": null, "previous": null, "results": [1, 2]}"#)
                .unwrap();
        assert_eq!(list.results, vec![1, 2]);
    }
}
