//! Page slicing for post listings.
//!
//! Page numbers are 1-based. Requests for a page that is not a number fall
//! back to the first page; requests past the end get the last page. An
//! empty listing still has one (empty) page.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: usize = 10;

/// `?page=` query parameter. Kept as a string so garbage is tolerated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn raw(&self) -> Option<&str> {
        self.page.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    count: usize,
    per_page: usize,
}

/// The resolved page and the rows it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: usize,
    pub offset: usize,
    pub limit: usize,
}

impl Paginator {
    pub fn new(count: usize, per_page: usize) -> Self {
        Self {
            count,
            per_page: per_page.max(1),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn num_pages(&self) -> usize {
        if self.count == 0 {
            1
        } else {
            (self.count + self.per_page - 1) / self.per_page
        }
    }

    /// Resolve a raw page parameter to a valid page.
    pub fn window(&self, raw: Option<&str>) -> PageWindow {
        let requested = raw
            .and_then(|r| r.trim().parse::<usize>().ok())
            .filter(|n| *n >= 1)
            .unwrap_or(1);
        let number = requested.min(self.num_pages());

        PageWindow {
            number,
            offset: (number - 1) * self.per_page,
            limit: self.per_page,
        }
    }
}

/// One page of a listing, shaped for templates.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub object_list: Vec<T>,
    pub number: usize,
    pub num_pages: usize,
    pub count: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_page_number: Option<usize>,
    pub next_page_number: Option<usize>,
}

impl<T> Page<T> {
    pub fn new(object_list: Vec<T>, window: PageWindow, paginator: &Paginator) -> Self {
        let num_pages = paginator.num_pages();
        let has_previous = window.number > 1;
        let has_next = window.number < num_pages;

        Self {
            object_list,
            number: window.number,
            num_pages,
            count: paginator.count(),
            has_previous,
            has_next,
            previous_page_number: has_previous.then(|| window.number - 1),
            next_page_number: has_next.then(|| window.number + 1),
        }
    }

    pub fn len(&self) -> usize {
        self.object_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_list.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            object_list: self.object_list.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            has_previous: self.has_previous,
            has_next: self.has_next,
            previous_page_number: self.previous_page_number,
            next_page_number: self.next_page_number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seventeen_items_make_two_pages() {
        let paginator = Paginator::new(17, DEFAULT_PER_PAGE);
        assert_eq!(paginator.num_pages(), 2);

        let first = paginator.window(None);
        assert_eq!((first.number, first.offset, first.limit), (1, 0, 10));

        let second = paginator.window(Some("2"));
        assert_eq!((second.number, second.offset), (2, 10));
    }

    #[test]
    fn garbage_and_out_of_range_pages() {
        let paginator = Paginator::new(17, DEFAULT_PER_PAGE);
        assert_eq!(paginator.window(Some("abc")).number, 1);
        assert_eq!(paginator.window(Some("0")).number, 1);
        assert_eq!(paginator.window(Some("-3")).number, 1);
        assert_eq!(paginator.window(Some("99")).number, 2);
    }

    #[test]
    fn empty_listing_has_one_page() {
        let paginator = Paginator::new(0, DEFAULT_PER_PAGE);
        assert_eq!(paginator.num_pages(), 1);
        assert_eq!(paginator.window(Some("5")).number, 1);
    }

    #[test]
    fn page_navigation_flags() {
        let paginator = Paginator::new(25, DEFAULT_PER_PAGE);
        let window = paginator.window(Some("2"));
        let page = Page::new(vec![0; 10], window, &paginator);

        assert!(page.has_previous);
        assert!(page.has_next);
        assert_eq!(page.previous_page_number, Some(1));
        assert_eq!(page.next_page_number, Some(3));
        assert_eq!(page.num_pages, 3);

        let last = Page::new(vec![0; 5], paginator.window(Some("3")), &paginator);
        assert!(!last.has_next);
        assert_eq!(last.next_page_number, None);
        assert_eq!(last.map(|n| n + 1).len(), 5);
    }
}
