//! Splits an ordered collection into pages ([`Paginator`], [`Page`]) and
//! computes the [`PaginationWindow`]: the page links shown around the current
//! page on a listing, plus the ellipsis and first/last shortcut flags.

use std::fmt;

/// The number of neighbor links shown on each side of the current page.
const WINDOW_RADIUS: usize = 2;

/// A validated position within a paginated listing. `current_page` is
/// 1-based and never exceeds `total_pages`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageContext {
    current_page: usize,
    total_pages: usize,
}

impl PageContext {
    /// Returns [`Error::EmptyPage`] unless `1 <= current_page <= total_pages`.
    pub fn new(current_page: usize, total_pages: usize) -> Result<PageContext> {
        if current_page < 1 || current_page > total_pages {
            return Err(Error::EmptyPage(current_page));
        }
        Ok(PageContext {
            current_page,
            total_pages,
        })
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn window(&self) -> PaginationWindow {
        PaginationWindow::compute(self.current_page, self.total_pages)
    }
}

/// The page links to render around the current page. `left` and `right` are
/// in ascending order and never include the current page itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaginationWindow {
    pub left: Vec<usize>,
    pub right: Vec<usize>,

    /// Pages are hidden between page 1 and the start of `left`.
    pub left_has_more: bool,

    /// Pages are hidden between the end of `right` and the last page.
    pub right_has_more: bool,

    /// A shortcut link to page 1 should be shown.
    pub show_first: bool,

    /// A shortcut link to the last page should be shown.
    pub show_last: bool,
}

impl PaginationWindow {
    /// Computes the window for `current_page` of `total_pages`. The caller
    /// must uphold `1 <= current_page <= total_pages`; use [`PageContext`] to
    /// check it. Listings with a single page skip the window entirely and use
    /// [`PaginationWindow::default`].
    pub fn compute(current_page: usize, total_pages: usize) -> PaginationWindow {
        debug_assert!(
            current_page >= 1 && current_page <= total_pages,
            "page {} out of range 1..={}",
            current_page,
            total_pages
        );

        let left: Vec<usize> = if current_page == 1 {
            Vec::new()
        } else {
            let start = current_page.saturating_sub(WINDOW_RADIUS).max(1);
            (start..current_page).collect()
        };

        let right: Vec<usize> = if current_page >= total_pages {
            Vec::new()
        } else {
            let stop = (current_page + WINDOW_RADIUS).min(total_pages);
            (current_page + 1..=stop).collect()
        };

        let (left_has_more, show_first) = match left.first() {
            Some(&lowest) => (lowest > 2, lowest > 1),
            None => (false, false),
        };

        let (right_has_more, show_last) = match right.last() {
            Some(&highest) => (highest + 1 < total_pages, highest < total_pages),
            None => (false, false),
        };

        PaginationWindow {
            left,
            right,
            left_has_more,
            right_has_more,
            show_first,
            show_last,
        }
    }
}

/// A page selector as it arrives from a request's `page` parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageNumber {
    Number(usize),
    Last,
}

impl PageNumber {
    /// Parses a raw `page` parameter. A missing parameter selects the first
    /// page and the literal `last` selects the final one.
    pub fn parse(raw: Option<&str>) -> Result<PageNumber> {
        match raw.map(str::trim) {
            None | Some("") => Ok(PageNumber::Number(1)),
            Some("last") => Ok(PageNumber::Last),
            Some(s) => s
                .parse::<usize>()
                .map(PageNumber::Number)
                .map_err(|_| Error::InvalidPage(s.to_owned())),
        }
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        PageNumber::Number(1)
    }
}

/// Splits a slice into pages of `per_page` items.
pub struct Paginator<'a, T> {
    items: &'a [T],
    per_page: usize,
}

impl<'a, T> Paginator<'a, T> {
    /// A zero `per_page` is treated as one item per page.
    pub fn new(items: &'a [T], per_page: usize) -> Paginator<'a, T> {
        Paginator {
            items,
            per_page: per_page.max(1),
        }
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// The number of pages. An empty collection still has a single (empty)
    /// first page.
    pub fn num_pages(&self) -> usize {
        match self.items.len() % self.per_page {
            0 => (self.items.len() / self.per_page).max(1),
            _ => self.items.len() / self.per_page + 1,
        }
    }

    pub fn page(&self, number: PageNumber) -> Result<Page<'a, T>> {
        let num_pages = self.num_pages();
        let number = match number {
            PageNumber::Last => num_pages,
            PageNumber::Number(n) => n,
        };
        let context = PageContext::new(number, num_pages)?;

        let start = (number - 1) * self.per_page;
        let stop = (start + self.per_page).min(self.items.len());
        Ok(Page {
            items: &self.items[start.min(stop)..stop],
            context,
            start_index: start,
        })
    }
}

/// One page of a [`Paginator`].
pub struct Page<'a, T> {
    pub items: &'a [T],
    context: PageContext,
    start_index: usize,
}

impl<'a, T> Page<'a, T> {
    pub fn number(&self) -> usize {
        self.context.current_page
    }

    pub fn num_pages(&self) -> usize {
        self.context.total_pages
    }

    pub fn context(&self) -> PageContext {
        self.context
    }

    pub fn has_next(&self) -> bool {
        self.number() < self.num_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.number() > 1
    }

    pub fn next_page_number(&self) -> Option<usize> {
        if self.has_next() {
            Some(self.number() + 1)
        } else {
            None
        }
    }

    pub fn previous_page_number(&self) -> Option<usize> {
        if self.has_previous() {
            Some(self.number() - 1)
        } else {
            None
        }
    }

    /// The 1-based position of the first item on this page within the whole
    /// collection, or 0 for an empty page.
    pub fn start_index(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            self.start_index + 1
        }
    }
}

/// The result of a fallible pagination operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a bad page request.
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// Returned when the `page` parameter is neither a number nor `last`.
    InvalidPage(String),

    /// Returned when the page number is outside the listing.
    EmptyPage(usize),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidPage(raw) => {
                write!(f, "page `{}` is not a number", raw)
            }
            Error::EmptyPage(n) => write!(f, "page {} contains no results", n),
        }
    }
}

impl std::error::Error for Error {}
