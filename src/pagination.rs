// 📄 Pager - fixed-size page slices over an ordered collection

use serde::{Deserialize, Serialize};

pub const DEFAULT_ITEMS_PER_PAGE: usize = 25;

/// Number of pages needed for `total_items`; zero items means zero pages
pub fn total_pages(total_items: usize, items_per_page: usize) -> usize {
    total_items.div_ceil(items_per_page.max(1))
}

/// One page of results plus the metadata the table footer shows
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub items_per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> PageSlice<T> {
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    /// 1-based index of the first item shown, 0 when the page is empty
    pub fn start_index(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.current_page - 1) * self.items_per_page + 1
        }
    }

    /// 1-based index of the last item shown, 0 when the page is empty
    pub fn end_index(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            self.start_index() + self.items.len() - 1
        }
    }

    /// "Showing 26-40 of 40"
    pub fn summary(&self) -> String {
        format!(
            "Showing {}-{} of {} (page {}/{})",
            self.start_index(),
            self.end_index(),
            self.total_items,
            self.current_page,
            self.total_pages.max(1)
        )
    }
}

/// Slice `[(page-1)*per_page, page*per_page)` out of `items`.
///
/// A page past the end yields an empty slice. Page 0 is read as page 1 and a
/// page size of 0 as 1.
pub fn paginate<T: Clone>(items: &[T], page: usize, items_per_page: usize) -> PageSlice<T> {
    let per_page = items_per_page.max(1);
    let page = page.max(1);
    let start = (page - 1).saturating_mul(per_page).min(items.len());
    let end = start.saturating_add(per_page).min(items.len());

    PageSlice {
        items: items[start..end].to_vec(),
        current_page: page,
        items_per_page: per_page,
        total_items: items.len(),
        total_pages: total_pages(items.len(), per_page),
    }
}

// ============================================================================
// PAGINATION STATE
// ============================================================================

/// The pager position a user navigates.
///
/// `current_page` is kept in `1..=max(1, total_pages)` by `clamp_to`,
/// which the directory view calls whenever the visible count changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    pub current_page: usize,
    pub items_per_page: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        PaginationState::new(DEFAULT_ITEMS_PER_PAGE)
    }
}

impl PaginationState {
    pub fn new(items_per_page: usize) -> Self {
        PaginationState {
            current_page: 1,
            items_per_page: items_per_page.max(1),
        }
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    pub fn set_items_per_page(&mut self, items_per_page: usize) {
        self.items_per_page = items_per_page.max(1);
        self.current_page = 1;
    }

    pub fn go_to(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    pub fn next(&mut self, total_items: usize) {
        if self.current_page < total_pages(total_items, self.items_per_page) {
            self.current_page += 1;
        }
    }

    pub fn previous(&mut self) {
        if self.current_page > 1 {
            self.current_page -= 1;
        }
    }

    pub fn total_pages(&self, total_items: usize) -> usize {
        total_pages(total_items, self.items_per_page)
    }

    /// Pull `current_page` back into range for `total_items`
    pub fn clamp_to(&mut self, total_items: usize) {
        let last = self.total_pages(total_items).max(1);
        self.current_page = self.current_page.clamp(1, last);
    }

    pub fn slice<T: Clone>(&self, items: &[T]) -> PageSlice<T> {
        paginate(items, self.current_page, self.items_per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forty_items_two_pages() {
        let items: Vec<u32> = (1..=40).collect();

        let first = paginate(&items, 1, 25);
        assert_eq!(first.total_pages, 2);
        assert_eq!(first.items.len(), 25);
        assert!(first.has_next());
        assert!(!first.has_previous());

        let second = paginate(&items, 2, 25);
        assert_eq!(second.items.len(), 15);
        assert_eq!(second.items[0], 26);
        assert_eq!(second.start_index(), 26);
        assert_eq!(second.end_index(), 40);
        assert!(!second.has_next());
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let items: Vec<u32> = (1..=10).collect();
        let page = paginate(&items, 5, 25);

        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.start_index(), 0);
    }

    #[test]
    fn test_empty_collection() {
        let items: Vec<u32> = Vec::new();
        let page = paginate(&items, 1, 10);

        assert_eq!(page.total_pages, 0);
        assert_eq!(page.summary(), "Showing 0-0 of 0 (page 1/1)");
    }

    #[test]
    fn test_zero_page_size_treated_as_one() {
        let items = vec!['a', 'b'];
        let page = paginate(&items, 2, 0);
        assert_eq!(page.items, vec!['b']);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_state_navigation() {
        let mut state = PaginationState::new(10);
        state.next(25);
        state.next(25);
        state.next(25);
        assert_eq!(state.current_page, 3);

        state.previous();
        assert_eq!(state.current_page, 2);

        state.set_items_per_page(5);
        assert_eq!(state.current_page, 1);
        assert_eq!(state.items_per_page, 5);
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut state = PaginationState::new(10);
        state.go_to(4);
        state.clamp_to(12);
        assert_eq!(state.current_page, 2);

        state.clamp_to(0);
        assert_eq!(state.current_page, 1);
    }
}
