//! The request handlers. Each handler is a straight pipeline over a
//! [`Store`]: fetch, paginate, compute the [`PaginationWindow`], and assemble
//! a plain context record for [`crate::render`].
//!
//! * [`list`] serves the index, category, tag, archive and search listings.
//! * [`detail`] serves a single post and records the view.

use std::fmt;

use chrono::NaiveDateTime;
use log::{debug, info};
use url::Url;

use crate::pagination::{self, PageNumber, PaginationWindow, Paginator};
use crate::post::{Comment, Post, PostId};
use crate::query::PostFilter;
use crate::store::Store;
use crate::url::Urls;

/// Shown in place of results when a search has no terms.
pub const EMPTY_SEARCH_MESSAGE: &str = "Please enter a keyword";

/// Selects which posts a listing shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Listing {
    /// All posts.
    Index,

    /// Posts filed under the category with this slug.
    Category(String),

    /// Posts carrying the tag with this slug.
    Tag(String),

    /// Posts created in a given month.
    Archives { year: i32, month: u32 },

    /// Posts whose title or body contains the terms.
    Search(String),
}

/// A named link, e.g., to a category or tag listing.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
    pub name: String,
    pub url: Url,
}

/// A page number together with its URL.
#[derive(Clone, Debug, PartialEq)]
pub struct PageLink {
    pub number: usize,
    pub url: Url,
}

/// A post as it appears in templates. The body is cut at the fold.
#[derive(Clone, Debug, PartialEq)]
pub struct PostView {
    pub id: PostId,
    pub url: Url,
    pub title: String,
    pub created_time: NaiveDateTime,
    pub modified_time: NaiveDateTime,
    pub category: Link,
    pub tags: Vec<Link>,

    /// The author's display name.
    pub author: String,
    pub views: u64,
    pub excerpt: String,

    /// Whether `excerpt` is shorter than the whole body.
    pub summarized: bool,
    pub comment_count: usize,
}

impl PostView {
    fn new<S: Store + ?Sized>(store: &S, urls: &Urls, post: &Post) -> Result<PostView> {
        let (excerpt, summarized) = post.summary();
        Ok(PostView {
            id: post.id,
            url: urls.post(post.id)?,
            title: post.title.clone(),
            created_time: post.created_time,
            modified_time: post.modified_time,
            category: Link {
                name: post.category.name.clone(),
                url: urls.category(&post.category.slug)?,
            },
            tags: post
                .tags
                .iter()
                .map(|t| {
                    Ok(Link {
                        name: t.name.clone(),
                        url: urls.tag(&t.slug)?,
                    })
                })
                .collect::<Result<Vec<Link>>>()?,
            author: match store.profile(&post.author) {
                Some(profile) => profile.display_name().to_owned(),
                None => post.author.clone(),
            },
            views: post.views,
            excerpt: excerpt.to_owned(),
            summarized,
            comment_count: store.comments(post.id).len(),
        })
    }
}

/// Everything a listing template needs.
#[derive(Clone, Debug, PartialEq)]
pub struct ListingContext {
    /// Describes the listing, e.g., the category name. `None` for the index.
    pub heading: Option<String>,
    pub post_list: Vec<PostView>,

    /// The 1-based number of the page being shown.
    pub page_number: usize,
    pub num_pages: usize,

    /// Whether there is more than one page.
    pub is_paginated: bool,
    pub previous_url: Option<Url>,
    pub next_url: Option<Url>,
    pub first_url: Url,
    pub last_url: Url,

    /// Empty unless `is_paginated`.
    pub window: PaginationWindow,
    pub left_links: Vec<PageLink>,
    pub right_links: Vec<PageLink>,

    /// Set instead of results when the request can't produce any, e.g., an
    /// empty search.
    pub error_msg: Option<String>,
}

/// Everything a post template needs.
#[derive(Clone, Debug, PartialEq)]
pub struct DetailContext {
    pub post: PostView,

    /// The whole body as HTML.
    pub body: String,
    pub comment_list: Vec<Comment>,
}

/// Serves a listing page: resolves `listing` into a [`PostFilter`], fetches
/// the matching posts, selects `page` of them and computes the pagination
/// window around it.
pub fn list<S: Store + ?Sized>(
    store: &S,
    urls: &Urls,
    listing: &Listing,
    page: PageNumber,
    page_size: usize,
) -> Result<ListingContext> {
    let (filter, heading, listing_url) = match listing {
        Listing::Index => (PostFilter::default(), None, urls.index()),
        Listing::Category(slug) => {
            let category = store
                .category(slug)
                .ok_or_else(|| Error::NotFound(format!("category `{}`", slug)))?;
            (
                PostFilter {
                    category: Some(category.slug.clone()),
                    ..PostFilter::default()
                },
                Some(category.name.clone()),
                urls.category(&category.slug)?,
            )
        }
        Listing::Tag(slug) => {
            let tag = store
                .tag(slug)
                .ok_or_else(|| Error::NotFound(format!("tag `{}`", slug)))?;
            (
                PostFilter {
                    tag: Some(tag.slug.clone()),
                    ..PostFilter::default()
                },
                Some(tag.name.clone()),
                urls.tag(&tag.slug)?,
            )
        }
        Listing::Archives { year, month } => (
            PostFilter {
                archive: Some((*year, *month)),
                ..PostFilter::default()
            },
            Some(format!("{}-{:02}", year, month)),
            urls.archive(*year, *month)?,
        ),
        Listing::Search(terms) => {
            let terms = terms.trim();
            if terms.is_empty() {
                debug!("empty search");
                return Ok(ListingContext::message(urls.search("")?, EMPTY_SEARCH_MESSAGE));
            }
            (
                PostFilter {
                    search: Some(terms.to_owned()),
                    ..PostFilter::default()
                },
                Some(terms.to_owned()),
                urls.search(terms)?,
            )
        }
    };

    let posts = store.find_posts(&filter);
    let paginator = Paginator::new(&posts, page_size);
    let page = paginator.page(page)?;
    let is_paginated = page.num_pages() > 1;
    info!(
        "listing {:?}: page {} of {} ({} posts)",
        listing,
        page.number(),
        page.num_pages(),
        paginator.count()
    );

    let window = if is_paginated {
        page.context().window()
    } else {
        PaginationWindow::default()
    };
    let page_links = |numbers: &[usize]| -> Vec<PageLink> {
        numbers
            .iter()
            .map(|&number| PageLink {
                number,
                url: urls.page(&listing_url, number),
            })
            .collect()
    };

    Ok(ListingContext {
        heading,
        post_list: page
            .items
            .iter()
            .map(|post| PostView::new(store, urls, post))
            .collect::<Result<Vec<PostView>>>()?,
        page_number: page.number(),
        num_pages: page.num_pages(),
        is_paginated,
        previous_url: page
            .previous_page_number()
            .map(|n| urls.page(&listing_url, n)),
        next_url: page.next_page_number().map(|n| urls.page(&listing_url, n)),
        first_url: urls.page(&listing_url, 1),
        last_url: urls.page(&listing_url, page.num_pages()),
        left_links: page_links(window.left.as_slice()),
        right_links: page_links(window.right.as_slice()),
        window,
        error_msg: None,
    })
}

impl ListingContext {
    /// A single empty page carrying only a message.
    fn message(listing_url: Url, message: &str) -> ListingContext {
        ListingContext {
            heading: None,
            post_list: Vec::new(),
            page_number: 1,
            num_pages: 1,
            is_paginated: false,
            previous_url: None,
            next_url: None,
            first_url: listing_url.clone(),
            last_url: listing_url,
            window: PaginationWindow::default(),
            left_links: Vec::new(),
            right_links: Vec::new(),
            error_msg: Some(message.to_owned()),
        }
    }
}

/// Serves a post page. The view is recorded with [`Store::increase_views`]
/// only after the post was found, and the returned context carries the
/// updated count.
pub fn detail<S: Store + ?Sized>(store: &mut S, urls: &Urls, id: PostId) -> Result<DetailContext> {
    let mut context = {
        let post = store
            .post(id)
            .ok_or_else(|| Error::NotFound(format!("post {}", id)))?;
        DetailContext {
            post: PostView::new(&*store, urls, post)?,
            body: post.body.clone(),
            comment_list: store.comments(id).into_iter().cloned().collect(),
        }
    };

    if let Some(views) = store.increase_views(id) {
        context.post.views = views;
    }
    info!("post {} served ({} views)", id, context.post.views);
    Ok(context)
}

/// The result of a fallible handler.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a request that can't be served.
#[derive(Debug)]
pub enum Error {
    /// Returned when the requested post, category or tag doesn't exist.
    NotFound(String),

    /// Returned for a bad `page` parameter.
    Page(pagination::Error),

    /// Returned when a page URL can't be built.
    UrlParse(url::ParseError),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotFound(what) => write!(f, "no such {}", what),
            Error::Page(err) => err.fmt(f),
            Error::UrlParse(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::NotFound(_) => None,
            Error::Page(err) => Some(err),
            Error::UrlParse(err) => Some(err),
        }
    }
}

impl From<pagination::Error> for Error {
    /// Converts a [`pagination::Error`] into an [`Error`]. This allows us to
    /// use the `?` operator when selecting a page.
    fn from(err: pagination::Error) -> Error {
        Error::Page(err)
    }
}

impl From<url::ParseError> for Error {
    /// Converts a [`url::ParseError`] into an [`Error`]. This allows us to use
    /// the `?` operator when building URLs.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::test::post;
    use crate::store::{test::fixture, MemoryStore};
    use crate::tag::Category;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn urls() -> Urls {
        Urls::new(Url::parse("https://example.org/").unwrap())
    }

    /// Twelve posts, one per month of 2017, half of them in the `odd`
    /// category.
    fn year_of_posts() -> MemoryStore {
        let posts = (1..=12)
            .map(|month| {
                let mut p = post(month, (2017, month as u32, 1), &format!("Post {}", month));
                if month % 2 == 1 {
                    p.category = Category::new("Odd");
                }
                p
            })
            .collect();
        MemoryStore::new(posts, vec![], vec![]).unwrap()
    }

    fn ids(context: &ListingContext) -> Vec<u64> {
        context.post_list.iter().map(|p| p.id.0).collect()
    }

    #[test]
    fn test_index_first_page() -> TestResult {
        let store = year_of_posts();
        let context = list(&store, &urls(), &Listing::Index, PageNumber::default(), 2)?;
        assert_eq!(vec![12, 11], ids(&context));
        assert_eq!(6, context.num_pages);
        assert!(context.is_paginated);
        assert_eq!(PaginationWindow::compute(1, 6), context.window);
        assert_eq!(None, context.previous_url);
        assert_eq!(
            Some("https://example.org/?page=2"),
            context.next_url.as_ref().map(Url::as_str)
        );
        let right: Vec<&str> = context.right_links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(
            vec!["https://example.org/?page=2", "https://example.org/?page=3"],
            right
        );
        Ok(())
    }

    #[test]
    fn test_single_page_has_empty_window() -> TestResult {
        let store = year_of_posts();
        let context = list(&store, &urls(), &Listing::Index, PageNumber::default(), 20)?;
        assert_eq!(12, context.post_list.len());
        assert!(!context.is_paginated);
        assert_eq!(PaginationWindow::default(), context.window);
        assert!(context.left_links.is_empty() && context.right_links.is_empty());
        Ok(())
    }

    #[test]
    fn test_category_listing() -> TestResult {
        let store = year_of_posts();
        let context = list(
            &store,
            &urls(),
            &Listing::Category(String::from("odd")),
            PageNumber::Last,
            4,
        )?;
        assert_eq!(Some(String::from("Odd")), context.heading);
        assert_eq!(vec![3, 1], ids(&context));
        assert_eq!(2, context.page_number);
        assert_eq!(
            "https://example.org/category/odd/?page=1",
            context.first_url.as_str()
        );
        Ok(())
    }

    #[test]
    fn test_unknown_category_is_not_found() {
        let store = year_of_posts();
        let result = list(
            &store,
            &urls(),
            &Listing::Category(String::from("even")),
            PageNumber::default(),
            4,
        );
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_tag_listing() -> TestResult {
        let store = fixture()?;
        let context = list(
            &store,
            &urls(),
            &Listing::Tag(String::from("pagination")),
            PageNumber::default(),
            1,
        )?;
        assert_eq!(Some(String::from("pagination")), context.heading);
        assert_eq!(vec![4], ids(&context));
        assert_eq!(2, context.num_pages);
        assert_eq!(
            Some("https://example.org/tag/pagination/?page=2"),
            context.next_url.as_ref().map(Url::as_str)
        );
        let right: Vec<&str> = context.right_links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(vec!["https://example.org/tag/pagination/?page=2"], right);

        let last = list(
            &store,
            &urls(),
            &Listing::Tag(String::from("pagination")),
            PageNumber::Last,
            1,
        )?;
        assert_eq!(vec![2], ids(&last));
        Ok(())
    }

    #[test]
    fn test_unknown_tag_is_not_found() -> TestResult {
        let store = fixture()?;
        let result = list(
            &store,
            &urls(),
            &Listing::Tag(String::from("haskell")),
            PageNumber::default(),
            4,
        );
        assert!(matches!(result, Err(Error::NotFound(_))));
        Ok(())
    }

    #[test]
    fn test_archives_listing() -> TestResult {
        let store = year_of_posts();
        let context = list(
            &store,
            &urls(),
            &Listing::Archives { year: 2017, month: 3 },
            PageNumber::default(),
            4,
        )?;
        assert_eq!(vec![3], ids(&context));
        assert_eq!(Some(String::from("2017-03")), context.heading);
        Ok(())
    }

    #[test]
    fn test_empty_search_sets_message() -> TestResult {
        let store = year_of_posts();
        let context = list(
            &store,
            &urls(),
            &Listing::Search(String::from("  ")),
            PageNumber::default(),
            4,
        )?;
        assert!(context.post_list.is_empty());
        assert_eq!(Some(String::from(EMPTY_SEARCH_MESSAGE)), context.error_msg);
        Ok(())
    }

    #[test]
    fn test_search_pages_keep_terms() -> TestResult {
        let store = year_of_posts();
        let context = list(
            &store,
            &urls(),
            &Listing::Search(String::from("post 1")),
            PageNumber::default(),
            2,
        )?;
        // "Post 1", "Post 10", "Post 11", "Post 12"
        assert_eq!(vec![12, 11], ids(&context));
        assert_eq!(
            Some("https://example.org/search/?q=post+1&page=2"),
            context.next_url.as_ref().map(Url::as_str)
        );
        Ok(())
    }

    #[test]
    fn test_page_out_of_range() {
        let store = year_of_posts();
        let result = list(&store, &urls(), &Listing::Index, PageNumber::Number(7), 2);
        assert!(matches!(
            result,
            Err(Error::Page(pagination::Error::EmptyPage(7)))
        ));
    }

    #[test]
    fn test_detail_counts_views() -> TestResult {
        let mut store = fixture()?;
        let before = store.post(PostId(4)).map(|p| p.views).unwrap_or_default();

        let context = detail(&mut store, &urls(), PostId(4))?;
        assert_eq!(before + 1, context.post.views);
        assert_eq!(before + 1, store.post(PostId(4)).unwrap().views);
        assert_eq!(2, context.comment_list.len());
        assert_eq!(2, context.post.comment_count);
        assert_eq!("Alice", context.post.author);
        assert_eq!("https://example.org/post/4/", context.post.url.as_str());
        Ok(())
    }

    #[test]
    fn test_detail_not_found_records_nothing() -> TestResult {
        let mut store = year_of_posts();
        assert!(matches!(
            detail(&mut store, &urls(), PostId(99)),
            Err(Error::NotFound(_))
        ));
        assert!(store.posts().iter().all(|p| p.views == 0));
        Ok(())
    }
}
