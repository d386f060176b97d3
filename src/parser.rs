//! Parses [`Post`] objects from markdown source files with YAML frontmatter.
//! See [`parse_posts`] for the file format.

use std::{
    collections::BTreeSet,
    fmt,
    fs::File,
    path::{Path, PathBuf},
};

use chrono::{NaiveDate, NaiveDateTime};
use log::debug;
use serde::Deserialize;

use crate::{
    markdown,
    post::{Post, PostId},
    tag::{Category, Tag},
};

const MARKDOWN_EXTENSION: &str = "md";

/// The accepted layouts for dates in frontmatter and data files, tried in
/// order. A bare date means midnight.
const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a date in one of the accepted layouts.
pub fn parse_date_time(input: &str) -> Result<NaiveDateTime> {
    let input = input.trim();
    for format in DATE_TIME_FORMATS.iter() {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| Error::InvalidDate(input.to_owned()))
}

/// Searches `source_directory` recursively for post files (extension `.md`)
/// and returns the parsed posts sorted newest first. Each post file must be
/// structured as follows:
///
/// 1. Initial frontmatter fence (`---`)
/// 2. YAML frontmatter with fields `Id`, `Title`, `Date`, `Category`,
///    `Author` and optionally `Modified`, `Tags` and `Views`
/// 3. Terminal frontmatter fence (`---`)
/// 4. Post body in markdown
///
/// For example:
///
/// ```md
/// ---
/// Id: 1
/// Title: Hello, world!
/// Date: 2021-04-16 09:30:00
/// Category: Notes
/// Tags: [greet]
/// Author: alice
/// ---
/// # Hello
///
/// World
/// ```
pub fn parse_posts(source_directory: &Path) -> Result<Vec<Post>> {
    use walkdir::WalkDir;

    let mut posts = Vec::new();
    let walker = WalkDir::new(source_directory)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()));
    for result in walker {
        let entry = result?;
        if entry.file_type().is_file()
            && entry.path().extension().map_or(false, |e| e == MARKDOWN_EXTENSION)
        {
            posts.push(parse_post(entry.path())?);
        }
    }

    Post::sort(&mut posts);
    Ok(posts)
}

/// Parses a single [`Post`] from the file at `path`, annotating any failure
/// with the path.
pub fn parse_post(path: &Path) -> Result<Post> {
    match read_post(path) {
        Ok(p) => {
            debug!("parsed post {} from {}", p.id, path.display());
            Ok(p)
        }
        Err(e) => Err(Error::Annotated(
            format!("parsing post `{}`", path.display()),
            Box::new(e),
        )),
    }
}

fn read_post(path: &Path) -> Result<Post> {
    use std::io::Read;
    let mut contents = String::new();
    File::open(path)
        .map_err(|e| Error::Io(path.to_owned(), e))?
        .read_to_string(&mut contents)
        .map_err(|e| Error::Io(path.to_owned(), e))?;
    from_str(&contents)
}

/// Parses a [`Post`] from the contents of a source file.
pub fn from_str(input: &str) -> Result<Post> {
    fn frontmatter_indices(input: &str) -> Result<(usize, usize, usize)> {
        const FENCE: &str = "---";
        if !input.starts_with(FENCE) {
            return Err(Error::FrontmatterMissingStartFence);
        }
        match input[FENCE.len()..].find(FENCE) {
            None => Err(Error::FrontmatterMissingEndFence),
            Some(offset) => Ok((
                FENCE.len(),                        // yaml_start
                FENCE.len() + offset,               // yaml_stop
                FENCE.len() + offset + FENCE.len(), // body_start
            )),
        }
    }

    let (yaml_start, yaml_stop, body_start) = frontmatter_indices(input)?;
    let frontmatter: Frontmatter = serde_yaml::from_str(&input[yaml_start..yaml_stop])?;

    let created_time = parse_date_time(&frontmatter.date)?;
    let modified_time = match &frontmatter.modified {
        Some(modified) => parse_date_time(modified)?,
        None => created_time,
    };

    let mut post = Post {
        id: PostId(frontmatter.id),
        title: frontmatter.title,
        body: String::new(),
        created_time,
        modified_time,
        category: Category::new(&frontmatter.category),
        tags: frontmatter.tags.iter().map(|t| Tag::new(t)).collect(),
        author: frontmatter.author,
        views: frontmatter.views,
    };
    markdown::to_html(&mut post.body, &input[body_start..]);
    Ok(post)
}

#[derive(Deserialize)]
struct Frontmatter {
    #[serde(rename = "Id")]
    id: u64,

    #[serde(rename = "Title")]
    title: String,

    /// The creation date of the post.
    #[serde(rename = "Date")]
    date: String,

    /// The last modification date. Defaults to `Date`.
    #[serde(default, rename = "Modified")]
    modified: Option<String>,

    #[serde(rename = "Category")]
    category: String,

    #[serde(default, rename = "Tags")]
    tags: BTreeSet<String>,

    #[serde(rename = "Author")]
    author: String,

    /// A view count carried over from an earlier export.
    #[serde(default, rename = "Views")]
    views: u64,
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] object.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post source file is missing its starting frontmatter
    /// fence (`---`).
    FrontmatterMissingStartFence,

    /// Returned when a post source file is missing its terminal frontmatter
    /// fence (`---` i.e., the starting fence was found but the ending one was
    /// missing).
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when a date matches none of the accepted layouts.
    InvalidDate(String),

    /// Returned for I/O errors reading a source file.
    Io(PathBuf, std::io::Error),

    /// Returned for WalkDir I/O errors.
    WalkDir(walkdir::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingStartFence => {
                write!(f, "Post must begin with `---`")
            }
            Error::FrontmatterMissingEndFence => {
                write!(f, "Missing closing `---`")
            }
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::InvalidDate(input) => write!(
                f,
                "invalid date `{}` (expected YYYY-MM-DD with an optional HH:MM[:SS])",
                input
            ),
            Error::Io(path, err) => {
                write!(f, "reading `{}`: {}", path.display(), err)
            }
            Error::WalkDir(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontmatterMissingStartFence => None,
            Error::FrontmatterMissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
            Error::InvalidDate(_) => None,
            Error::Io(_, err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator while walking the source directory.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Timelike;

    const SIMPLE: &str = "---
Id: 7
Title: Simple
Date: 2017-05-01 10:30:00
Category: Python Tutorials
Tags: [Django, python]
Author: alice
---
Today is the first day.

<!-- more -->

The rest.
";

    #[test]
    fn test_from_str() -> Result<()> {
        let post = from_str(SIMPLE)?;
        assert_eq!(PostId(7), post.id);
        assert_eq!("Simple", post.title);
        assert_eq!("python-tutorials", post.category.slug);
        assert_eq!(10, post.created_time.hour());
        assert_eq!(post.created_time, post.modified_time);
        assert_eq!(0, post.views);
        let tags: Vec<&str> = post.tags.iter().map(|t| t.slug.as_str()).collect();
        assert_eq!(vec!["django", "python"], tags);
        assert_eq!(("<p>Today is the first day.</p>\n", true), post.summary());
        Ok(())
    }

    #[test]
    fn test_missing_fences() {
        assert!(matches!(
            from_str("Title: nope"),
            Err(Error::FrontmatterMissingStartFence)
        ));
        assert!(matches!(
            from_str("---\nTitle: nope\n"),
            Err(Error::FrontmatterMissingEndFence)
        ));
    }

    #[test]
    fn test_parse_date_time_layouts() -> Result<()> {
        assert_eq!(
            parse_date_time("2017-05-01 00:00:00")?,
            parse_date_time("2017-05-01")?
        );
        assert_eq!(30, parse_date_time("2017-05-01 10:30")?.minute());
        assert!(matches!(
            parse_date_time("May 1st"),
            Err(Error::InvalidDate(_))
        ));
        Ok(())
    }

    #[test]
    fn test_parse_posts() -> Result<()> {
        let posts = parse_posts(Path::new("./testdata/blog/posts"))?;
        let ids: Vec<u64> = posts.iter().map(|p| p.id.0).collect();
        assert_eq!(vec![4, 3, 2, 1], ids);
        Ok(())
    }

    #[test]
    fn test_parse_post_annotates_errors() {
        let err = parse_post(Path::new("./testdata/does-not-exist.md")).unwrap_err();
        assert!(err.to_string().starts_with("parsing post"), "{}", err);
    }
}
