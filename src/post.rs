//! Defines the domain records of the blog: [`Post`], [`Comment`] and
//! [`Profile`].

use crate::tag::{Category, Tag};
use chrono::NaiveDateTime;
use std::collections::BTreeSet;
use std::fmt;

/// The marker separating a post's excerpt from the rest of its body.
const FOLD_TAG: &str = "<!-- more -->";

/// Identifies a [`Post`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PostId(pub u64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Represents a blog post.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    pub id: PostId,

    /// The title of the post.
    pub title: String,

    /// The post body, already rendered to HTML.
    pub body: String,

    pub created_time: NaiveDateTime,
    pub modified_time: NaiveDateTime,

    pub category: Category,
    pub tags: BTreeSet<Tag>,

    /// The username of the author. See [`Profile`].
    pub author: String,

    /// How many times the post's detail page has been served.
    pub views: u64,
}

impl Post {
    /// Returns the part of the body above the fold and whether the body was
    /// actually folded.
    pub fn summary(&self) -> (&str, bool) {
        match self.body.find(FOLD_TAG) {
            Some(i) => (&self.body[..i], true),
            None => (&self.body, false),
        }
    }

    /// Sorts posts newest first. Posts created at the same time are ordered
    /// by descending id so the order is stable across loads.
    pub fn sort(posts: &mut [Post]) {
        posts.sort_by(|a, b| {
            b.created_time
                .cmp(&a.created_time)
                .then_with(|| b.id.cmp(&a.id))
        });
    }
}

/// A reader's comment on a [`Post`].
#[derive(Clone, Debug, PartialEq)]
pub struct Comment {
    pub post: PostId,
    pub name: String,
    pub email: String,
    pub url: Option<String>,
    pub text: String,
    pub created_time: NaiveDateTime,
}

/// Extra details about an author.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    pub username: String,
    pub nickname: String,
}

impl Profile {
    /// The nickname, or the username when no nickname was set.
    pub fn display_name(&self) -> &str {
        match self.nickname.trim() {
            "" => self.username.as_str(),
            nickname => nickname,
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use chrono::NaiveDate;

    pub(crate) fn post(id: u64, date: (i32, u32, u32), title: &str) -> Post {
        let created_time = NaiveDate::from_ymd_opt(date.0, date.1, date.2)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        Post {
            id: PostId(id),
            title: title.to_owned(),
            body: format!("<p>{}</p>", title),
            created_time,
            modified_time: created_time,
            category: Category::new("General"),
            tags: BTreeSet::new(),
            author: String::from("alice"),
            views: 0,
        }
    }

    #[test]
    fn test_summary_folds() {
        let mut p = post(1, (2017, 5, 1), "Folded");
        p.body = String::from("<p>intro</p><!-- more --><p>rest</p>");
        assert_eq!(("<p>intro</p>", true), p.summary());
    }

    #[test]
    fn test_summary_without_fold() {
        let p = post(1, (2017, 5, 1), "Whole");
        assert_eq!(("<p>Whole</p>", false), p.summary());
    }

    #[test]
    fn test_sort_newest_first() {
        let mut posts = vec![
            post(1, (2017, 1, 1), "old"),
            post(2, (2018, 1, 1), "new"),
            post(3, (2017, 1, 1), "old twin"),
        ];
        Post::sort(&mut posts);
        let ids: Vec<u64> = posts.iter().map(|p| p.id.0).collect();
        assert_eq!(vec![2, 3, 1], ids);
    }

    #[test]
    fn test_display_name() {
        let mut profile = Profile {
            username: String::from("alice"),
            nickname: String::from("  "),
        };
        assert_eq!("alice", profile.display_name());
        profile.nickname = String::from("Al");
        assert_eq!("Al", profile.display_name());
    }
}
