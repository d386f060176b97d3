//! The persistence seam. [`Store`] is what the views read from and issue
//! commands to; [`MemoryStore`] is the implementation backed by a data
//! directory on disk and held in memory.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Deserialize;

use crate::parser::{self, parse_date_time};
use crate::post::{Comment, Post, PostId, Profile};
use crate::query::PostFilter;
use crate::tag::{Category, Tag};

/// Read access to blog content plus the single write command the views need.
pub trait Store {
    /// All posts, newest first.
    fn posts(&self) -> &[Post];

    fn post(&self, id: PostId) -> Option<&Post>;

    fn categories(&self) -> &[Category];

    fn category(&self, slug: &str) -> Option<&Category>;

    fn tags(&self) -> &[Tag];

    fn tag(&self, slug: &str) -> Option<&Tag>;

    /// The comments on a post, oldest first.
    fn comments(&self, post: PostId) -> Vec<&Comment>;

    fn profile(&self, username: &str) -> Option<&Profile>;

    /// Records one more view of a post and returns the new count, or `None`
    /// if there is no such post.
    fn increase_views(&mut self, id: PostId) -> Option<u64>;

    /// The posts matching `filter`, newest first.
    fn find_posts(&self, filter: &PostFilter) -> Vec<&Post> {
        self.posts().iter().filter(|p| filter.matches(p)).collect()
    }
}

/// A [`Store`] holding everything in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    posts: Vec<Post>,
    index: HashMap<PostId, usize>,
    categories: Vec<Category>,
    tags: Vec<Tag>,
    comments: HashMap<PostId, Vec<Comment>>,
    profiles: HashMap<String, Profile>,
}

impl MemoryStore {
    /// Builds a store from already-parsed records. Fails if two posts share
    /// an id or a comment refers to a missing post.
    pub fn new(
        mut posts: Vec<Post>,
        comments: Vec<Comment>,
        profiles: Vec<Profile>,
    ) -> Result<MemoryStore> {
        Post::sort(&mut posts);

        let mut index = HashMap::with_capacity(posts.len());
        for (i, post) in posts.iter().enumerate() {
            if index.insert(post.id, i).is_some() {
                return Err(Error::DuplicatePost(post.id));
            }
        }

        let categories: BTreeSet<Category> = posts.iter().map(|p| p.category.clone()).collect();
        let tags: BTreeSet<Tag> = posts.iter().flat_map(|p| p.tags.iter().cloned()).collect();

        let mut by_post: HashMap<PostId, Vec<Comment>> = HashMap::new();
        for comment in comments {
            if !index.contains_key(&comment.post) {
                return Err(Error::OrphanComment(comment.post));
            }
            by_post.entry(comment.post).or_default().push(comment);
        }
        for list in by_post.values_mut() {
            list.sort_by(|a, b| a.created_time.cmp(&b.created_time));
        }

        Ok(MemoryStore {
            posts,
            index,
            categories: categories.into_iter().collect(),
            tags: tags.into_iter().collect(),
            comments: by_post,
            profiles: profiles
                .into_iter()
                .map(|p| (p.username.clone(), p))
                .collect(),
        })
    }

    /// Loads a data directory laid out as:
    ///
    /// * `posts/` - post source files, see [`parser::parse_posts`]
    /// * `comments.yaml` - optional list of comments
    /// * `profiles.yaml` - optional list of author profiles
    pub fn load(data_directory: &Path) -> Result<MemoryStore> {
        let posts = parser::parse_posts(&data_directory.join("posts"))?;

        let comments = match read_optional::<Vec<CommentRecord>>(
            &data_directory.join("comments.yaml"),
        )? {
            Some(records) => records
                .into_iter()
                .map(CommentRecord::into_comment)
                .collect::<Result<Vec<Comment>>>()?,
            None => Vec::new(),
        };

        let profiles = read_optional::<Vec<ProfileRecord>>(&data_directory.join("profiles.yaml"))?
            .unwrap_or_default()
            .into_iter()
            .map(|r| Profile {
                username: r.username,
                nickname: r.nickname,
            })
            .collect();

        let store = MemoryStore::new(posts, comments, profiles)?;
        info!(
            "loaded {} posts, {} categories, {} tags from {}",
            store.posts.len(),
            store.categories.len(),
            store.tags.len(),
            data_directory.display()
        );
        Ok(store)
    }
}

impl Store for MemoryStore {
    fn posts(&self) -> &[Post] {
        &self.posts
    }

    fn post(&self, id: PostId) -> Option<&Post> {
        self.index.get(&id).map(|&i| &self.posts[i])
    }

    fn categories(&self) -> &[Category] {
        &self.categories
    }

    fn category(&self, slug: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.slug == slug)
    }

    fn tags(&self) -> &[Tag] {
        &self.tags
    }

    fn tag(&self, slug: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.slug == slug)
    }

    fn comments(&self, post: PostId) -> Vec<&Comment> {
        match self.comments.get(&post) {
            Some(list) => list.iter().collect(),
            None => Vec::new(),
        }
    }

    fn profile(&self, username: &str) -> Option<&Profile> {
        self.profiles.get(username)
    }

    fn increase_views(&mut self, id: PostId) -> Option<u64> {
        let i = *self.index.get(&id)?;
        let post = &mut self.posts[i];
        post.views += 1;
        debug!("post {} now has {} views", id, post.views);
        Some(post.views)
    }
}

/// Deserializes the YAML file at `path`, or returns `None` if it doesn't
/// exist.
fn read_optional<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match File::open(path) {
        Ok(file) => serde_yaml::from_reader(file)
            .map(Some)
            .map_err(|e| Error::DeserializeYaml(path.to_owned(), e)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("no {} found, skipping", path.display());
            Ok(None)
        }
        Err(e) => Err(Error::Io(path.to_owned(), e)),
    }
}

#[derive(Deserialize)]
struct CommentRecord {
    post: u64,
    name: String,
    email: String,
    #[serde(default)]
    url: Option<String>,
    text: String,
    created_time: String,
}

impl CommentRecord {
    fn into_comment(self) -> Result<Comment> {
        Ok(Comment {
            post: PostId(self.post),
            created_time: parse_date_time(&self.created_time)?,
            name: self.name,
            email: self.email,
            url: self.url.filter(|u| !u.trim().is_empty()),
            text: self.text,
        })
    }
}

#[derive(Deserialize)]
struct ProfileRecord {
    username: String,
    #[serde(default)]
    nickname: String,
}

/// The result of a fallible store operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading a [`MemoryStore`].
#[derive(Debug)]
pub enum Error {
    /// Returned for errors parsing post source files.
    Parse(parser::Error),

    /// Returned when a data file isn't valid YAML for its record type.
    DeserializeYaml(PathBuf, serde_yaml::Error),

    /// Returned when two posts share an id.
    DuplicatePost(PostId),

    /// Returned when a comment refers to a post that doesn't exist.
    OrphanComment(PostId),

    /// Returned for other I/O errors.
    Io(PathBuf, std::io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => err.fmt(f),
            Error::DeserializeYaml(path, err) => {
                write!(f, "parsing `{}`: {}", path.display(), err)
            }
            Error::DuplicatePost(id) => write!(f, "duplicate post id {}", id),
            Error::OrphanComment(id) => {
                write!(f, "comment refers to unknown post {}", id)
            }
            Error::Io(path, err) => {
                write!(f, "reading `{}`: {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::DeserializeYaml(_, err) => Some(err),
            Error::DuplicatePost(_) => None,
            Error::OrphanComment(_) => None,
            Error::Io(_, err) => Some(err),
        }
    }
}

impl From<parser::Error> for Error {
    /// Converts [`parser::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: parser::Error) -> Error {
        Error::Parse(err)
    }
}
