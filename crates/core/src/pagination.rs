//! Paginated list responses.

use serde::{Deserialize, Serialize};

/// A page of results as returned by the backend list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
}

/// A rendered pagination link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLink {
    /// Page number; 0 for a gap.
    pub number: u32,
    pub is_current: bool,
    pub is_gap: bool,
}

impl<T> Default for Paginated<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Paginated<T> {
    /// An empty first page.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            data: Vec::new(),
            current_page: 1,
            last_page: 1,
            per_page: 0,
            total: 0,
        }
    }

    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }

    #[must_use]
    pub const fn prev_page(&self) -> u32 {
        self.current_page.saturating_sub(1)
    }

    #[must_use]
    pub const fn next_page(&self) -> u32 {
        self.current_page.saturating_add(1)
    }

    /// 1-based index of the first item on this page (0 when empty).
    #[must_use]
    pub fn first_item(&self) -> u64 {
        if self.data.is_empty() {
            return 0;
        }
        u64::from(self.current_page.saturating_sub(1)) * u64::from(self.per_page) + 1
    }

    /// 1-based index of the last item on this page (0 when empty).
    #[must_use]
    pub fn last_item(&self) -> u64 {
        if self.data.is_empty() {
            return 0;
        }
        self.first_item() + self.data.len() as u64 - 1
    }

    /// Page links to render: the first and last page, plus `radius` pages on
    /// either side of the current one. `None` marks an elided gap.
    #[must_use]
    pub fn page_window(&self, radius: u32) -> Vec<Option<u32>> {
        let last = self.last_page.max(1);
        let current = self.current_page.clamp(1, last);
        let start = current.saturating_sub(radius).max(1);
        let end = current.saturating_add(radius).min(last);

        let mut pages = Vec::new();
        if start > 1 {
            pages.push(Some(1));
            if start > 2 {
                pages.push(None);
            }
        }
        pages.extend((start..=end).map(Some));
        if end < last {
            if end + 1 < last {
                pages.push(None);
            }
            pages.push(Some(last));
        }
        pages
    }

    /// [`Self::page_window`] flattened for templates.
    #[must_use]
    pub fn page_links(&self, radius: u32) -> Vec<PageLink> {
        self.page_window(radius)
            .into_iter()
            .map(|page| match page {
                Some(number) => PageLink {
                    number,
                    is_current: number == self.current_page,
                    is_gap: false,
                },
                None => PageLink {
                    number: 0,
                    is_current: false,
                    is_gap: true,
                },
            })
            .collect()
    }

    /// Transform the items while keeping page metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            current_page: self.current_page,
            last_page: self.last_page,
            per_page: self.per_page,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(current: u32, last: u32, items: usize) -> Paginated<u8> {
        Paginated {
            data: vec![0; items],
            current_page: current,
            last_page: last,
            per_page: 20,
            total: u64::from(last) * 20,
        }
    }

    #[test]
    fn test_window_in_the_middle() {
        assert_eq!(
            page(10, 20, 20).page_window(2),
            vec![
                Some(1),
                None,
                Some(8),
                Some(9),
                Some(10),
                Some(11),
                Some(12),
                None,
                Some(20)
            ]
        );
    }

    #[test]
    fn test_window_near_edges_has_no_gaps() {
        assert_eq!(
            page(2, 4, 20).page_window(2),
            vec![Some(1), Some(2), Some(3), Some(4)]
        );
        assert_eq!(page(1, 1, 0).page_window(2), vec![Some(1)]);
    }

    #[test]
    fn test_page_links_mark_current_and_gaps() {
        let links = page(5, 9, 20).page_links(1);
        let current: Vec<u32> = links
            .iter()
            .filter(|l| l.is_current)
            .map(|l| l.number)
            .collect();
        assert_eq!(current, vec![5]);
        assert_eq!(links.iter().filter(|l| l.is_gap).count(), 2);
    }

    #[test]
    fn test_item_range() {
        let p = page(3, 5, 20);
        assert_eq!(p.first_item(), 41);
        assert_eq!(p.last_item(), 60);
        assert!(p.has_prev() && p.has_next());
        assert_eq!(Paginated::<u8>::empty().first_item(), 0);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let mapped = page(2, 3, 2).map(|_| "x");
        assert_eq!(mapped.current_page, 2);
        assert_eq!(mapped.data, vec!["x", "x"]);
    }
}
