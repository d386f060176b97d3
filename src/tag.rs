//! Defines the [`Tag`] and [`Category`] types, the two taxonomies a
//! [`crate::post::Post`] is filed under.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// A free-form label. A post carries any number of tags.
#[derive(Clone, Debug)]
pub struct Tag {
    /// The slugified name. This is the identity of the tag so e.g., `macOS`
    /// and `MacOS` resolve to the same one, and it is safe to drop into a URL
    /// path.
    pub slug: String,

    /// The name as written by the author.
    pub name: String,
}

impl Tag {
    pub fn new(name: &str) -> Tag {
        Tag {
            slug: slug::slugify(name),
            name: name.trim().to_owned(),
        }
    }
}

impl Hash for Tag {
    /// Delegates directly to the `slug` field.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slug.hash(state)
    }
}

impl PartialEq for Tag {
    /// Delegates directly to the `slug` field.
    fn eq(&self, other: &Self) -> bool {
        self.slug == other.slug
    }
}
impl Eq for Tag {}

impl PartialOrd for Tag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.slug.cmp(&other.slug)
    }
}

/// The single section a post is filed under. Like [`Tag`], a category is
/// identified by its slug.
#[derive(Clone, Debug)]
pub struct Category {
    pub slug: String,
    pub name: String,
}

impl Category {
    pub fn new(name: &str) -> Category {
        Category {
            slug: slug::slugify(name),
            name: name.trim().to_owned(),
        }
    }
}

impl Hash for Category {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slug.hash(state)
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        self.slug == other.slug
    }
}
impl Eq for Category {}

impl PartialOrd for Category {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Category {
    fn cmp(&self, other: &Self) -> Ordering {
        self.slug.cmp(&other.slug)
    }
}
