//! Builds the absolute URLs of the blog's pages under a site root.

use crate::post::PostId;
use url::{ParseError, Url};

const PAGE_PARAMETER: &str = "page";
const SEARCH_PARAMETER: &str = "q";

/// Builds page URLs. The routes are:
///
/// * `{root}post/{id}/`
/// * `{root}category/{slug}/`
/// * `{root}tag/{slug}/`
/// * `{root}archives/{year}/{month}/`
/// * `{root}search/?q={terms}`
///
/// Any listing URL can carry a `page` query parameter, see [`Urls::page`].
#[derive(Clone, Debug)]
pub struct Urls {
    root: Url,
}

impl Urls {
    /// Constructs a new `Urls`. A trailing slash is added to `root` if it is
    /// missing; without it [`Url::join`] would treat the last path component
    /// as a file name and drop it.
    pub fn new(mut root: Url) -> Urls {
        if !root.path().ends_with('/') {
            let path = format!("{}/", root.path());
            root.set_path(&path);
        }
        Urls { root }
    }

    pub fn root(&self) -> &Url {
        &self.root
    }

    pub fn index(&self) -> Url {
        self.root.clone()
    }

    pub fn post(&self, id: PostId) -> Result<Url> {
        self.root.join(&format!("post/{}/", id))
    }

    pub fn category(&self, slug: &str) -> Result<Url> {
        self.root.join(&format!("category/{}/", slug))
    }

    pub fn tag(&self, slug: &str) -> Result<Url> {
        self.root.join(&format!("tag/{}/", slug))
    }

    pub fn archive(&self, year: i32, month: u32) -> Result<Url> {
        self.root.join(&format!("archives/{}/{}/", year, month))
    }

    pub fn search(&self, terms: &str) -> Result<Url> {
        let mut url = self.root.join("search/")?;
        url.query_pairs_mut().append_pair(SEARCH_PARAMETER, terms);
        Ok(url)
    }

    /// Returns `listing` with its `page` parameter set to `number`. Other
    /// query parameters (e.g., the search terms) are preserved.
    pub fn page(&self, listing: &Url, number: usize) -> Url {
        let kept: Vec<(String, String)> = listing
            .query_pairs()
            .filter(|(k, _)| k != PAGE_PARAMETER)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        let mut url = listing.clone();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair(PAGE_PARAMETER, &number.to_string());
        url
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;
