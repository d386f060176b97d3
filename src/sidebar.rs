//! The navigation shown next to every page: recent posts, monthly archives,
//! categories and tags.

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::store::Store;
use crate::url::{Result, Urls};
use crate::view::Link;

/// A navigation link with the number of posts behind it.
#[derive(Clone, Debug, PartialEq)]
pub struct Counted {
    pub link: Link,
    pub count: usize,
}

/// A month that has posts.
#[derive(Clone, Debug, PartialEq)]
pub struct ArchiveMonth {
    pub year: i32,
    pub month: u32,
    pub count: usize,
    pub url: url::Url,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sidebar {
    pub recent_posts: Vec<Link>,

    /// Newest month first.
    pub archives: Vec<ArchiveMonth>,
    pub categories: Vec<Counted>,
    pub tags: Vec<Counted>,
}

impl Sidebar {
    /// Collects the sidebar from `store`, listing at most `recent` recent
    /// posts. Categories and tags without posts are left out.
    pub fn collect<S: Store + ?Sized>(store: &S, urls: &Urls, recent: usize) -> Result<Sidebar> {
        let posts = store.posts();

        let recent_posts = posts
            .iter()
            .take(recent)
            .map(|p| {
                Ok(Link {
                    name: p.title.clone(),
                    url: urls.post(p.id)?,
                })
            })
            .collect::<Result<Vec<Link>>>()?;

        let mut months: BTreeMap<(i32, u32), usize> = BTreeMap::new();
        for post in posts {
            let key = (post.created_time.year(), post.created_time.month());
            *months.entry(key).or_default() += 1;
        }
        let archives = months
            .into_iter()
            .rev()
            .map(|((year, month), count)| {
                Ok(ArchiveMonth {
                    year,
                    month,
                    count,
                    url: urls.archive(year, month)?,
                })
            })
            .collect::<Result<Vec<ArchiveMonth>>>()?;

        let mut categories = Vec::new();
        for category in store.categories() {
            let count = posts.iter().filter(|p| p.category == *category).count();
            if count > 0 {
                categories.push(Counted {
                    link: Link {
                        name: category.name.clone(),
                        url: urls.category(&category.slug)?,
                    },
                    count,
                });
            }
        }

        let mut tags = Vec::new();
        for tag in store.tags() {
            let count = posts.iter().filter(|p| p.tags.contains(tag)).count();
            if count > 0 {
                tags.push(Counted {
                    link: Link {
                        name: tag.name.clone(),
                        url: urls.tag(&tag.slug)?,
                    },
                    count,
                });
            }
        }

        Ok(Sidebar {
            recent_posts,
            archives,
            categories,
            tags,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::store::test::fixture;
    use url::Url;

    #[test]
    fn test_collect() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let store = fixture()?;
        let urls = Urls::new(Url::parse("https://example.org/")?);
        let sidebar = Sidebar::collect(&store, &urls, 2)?;

        let recent: Vec<&str> = sidebar.recent_posts.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(vec!["Windows and Ellipses", "Tagging Posts"], recent);

        let months: Vec<(i32, u32, usize)> = sidebar
            .archives
            .iter()
            .map(|a| (a.year, a.month, a.count))
            .collect();
        assert_eq!(vec![(2017, 6, 1), (2017, 5, 2), (2016, 12, 1)], months);

        let categories: Vec<(&str, usize)> = sidebar
            .categories
            .iter()
            .map(|c| (c.link.name.as_str(), c.count))
            .collect();
        assert_eq!(vec![("Notes", 1), ("Rust", 3)], categories);
        Ok(())
    }
}
