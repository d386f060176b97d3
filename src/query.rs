//! Defines [`PostFilter`], the explicit filter parameters of a listing.

use crate::post::Post;
use chrono::Datelike;

/// Narrows a listing of posts. Every criterion that is set must match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// Only posts filed under the category with this slug.
    pub category: Option<String>,

    /// Only posts carrying the tag with this slug.
    pub tag: Option<String>,

    /// Only posts created in this `(year, month)`.
    pub archive: Option<(i32, u32)>,

    /// Only posts whose title or body contains these terms, ignoring case.
    pub search: Option<String>,
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        if let Some(category) = &self.category {
            if post.category.slug != *category {
                return false;
            }
        }

        if let Some(tag) = &self.tag {
            if !post.tags.iter().any(|t| t.slug == *tag) {
                return false;
            }
        }

        if let Some((year, month)) = self.archive {
            if post.created_time.year() != year || post.created_time.month() != month {
                return false;
            }
        }

        if let Some(terms) = &self.search {
            let terms = terms.to_lowercase();
            if !post.title.to_lowercase().contains(&terms)
                && !post.body.to_lowercase().contains(&terms)
            {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::test::post;
    use crate::tag::{Category, Tag};

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(PostFilter::default().matches(&post(1, (2017, 5, 1), "any")));
    }

    #[test]
    fn test_category_and_tag() {
        let mut p = post(1, (2017, 5, 1), "tagged");
        p.category = Category::new("Rust");
        p.tags.insert(Tag::new("Async"));

        let mut filter = PostFilter {
            category: Some(String::from("rust")),
            tag: Some(String::from("async")),
            ..PostFilter::default()
        };
        assert!(filter.matches(&p));

        filter.tag = Some(String::from("web"));
        assert!(!filter.matches(&p));
    }

    #[test]
    fn test_archive() {
        let p = post(1, (2017, 5, 31), "may");
        let filter = |year, month| PostFilter {
            archive: Some((year, month)),
            ..PostFilter::default()
        };
        assert!(filter(2017, 5).matches(&p));
        assert!(!filter(2017, 6).matches(&p));
        assert!(!filter(2018, 5).matches(&p));
    }

    #[test]
    fn test_search_title_or_body_ignoring_case() {
        let mut p = post(1, (2017, 5, 1), "Pagination Notes");
        p.body = String::from("<p>All about Windows</p>");
        let search = |terms: &str| PostFilter {
            search: Some(terms.to_owned()),
            ..PostFilter::default()
        };
        assert!(search("pagination").matches(&p));
        assert!(search("WINDOWS").matches(&p));
        assert!(!search("tables").matches(&p));
    }
}
