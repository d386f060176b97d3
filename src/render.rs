//! Applies the theme templates to view contexts. See [`Renderer`].

use crate::sidebar::Sidebar;
use crate::view::{DetailContext, ListingContext};
use gtmpl::{Template, Value};
use log::debug;
use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use url::Url;

/// Renders listing and post pages. Every page is given the listing or post
/// context merged with `site_title`, `site_root` and `sidebar`.
pub struct Renderer {
    /// The template for listing pages.
    index_template: Template,

    /// The template for post pages.
    detail_template: Template,

    /// The site's title, typically shown in the page header.
    site_title: String,

    /// The URL of the site's home page, typically the destination for the
    /// site-header link.
    site_root: Url,
}

impl Renderer {
    /// Loads and parses the templates. Each template may be split over
    /// several files which are concatenated in order, e.g., a shared base
    /// followed by the page-specific template.
    pub fn new<P: AsRef<Path>>(
        index_template: &[P],
        detail_template: &[P],
        site_title: &str,
        site_root: &Url,
    ) -> Result<Renderer> {
        Ok(Renderer {
            index_template: parse_template(index_template.iter())?,
            detail_template: parse_template(detail_template.iter())?,
            site_title: site_title.to_owned(),
            site_root: site_root.clone(),
        })
    }

    pub fn render_listing<W: Write>(
        &self,
        w: &mut W,
        context: &ListingContext,
        sidebar: &Sidebar,
    ) -> Result<()> {
        self.render(w, &self.index_template, Value::from(context), sidebar)
    }

    pub fn render_detail<W: Write>(
        &self,
        w: &mut W,
        context: &DetailContext,
        sidebar: &Sidebar,
    ) -> Result<()> {
        self.render(w, &self.detail_template, Value::from(context), sidebar)
    }

    fn render<W: Write>(
        &self,
        w: &mut W,
        template: &Template,
        mut value: Value,
        sidebar: &Sidebar,
    ) -> Result<()> {
        if let Value::Object(obj) = &mut value {
            obj.insert(
                "site_title".to_owned(),
                Value::String(self.site_title.clone()),
            );
            obj.insert(
                "site_root".to_owned(),
                Value::String(self.site_root.to_string()),
            );
            obj.insert("sidebar".to_owned(), Value::from(sidebar));
        }
        template.execute(w, &gtmpl::Context::from(value)?)?;
        Ok(())
    }
}

// Loads the template file contents, concatenates them, and parses the result
// into a template.
fn parse_template<P: AsRef<Path>>(template_files: impl Iterator<Item = P>) -> Result<Template> {
    let mut contents = String::new();
    for template_file in template_files {
        use std::io::Read;
        let template_file = template_file.as_ref();
        debug!("loading template {}", template_file.display());
        File::open(template_file)
            .map_err(|e| Error::OpenTemplateFile {
                path: template_file.to_owned(),
                err: e,
            })?
            .read_to_string(&mut contents)?;
        contents.push(' ');
    }

    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

/// The result of a fallible rendering operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading templates or rendering a page.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// Returned for errors executing a template.
    Template(String),

    /// Returned for other I/O errors.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`]. This
    /// allows us to use the `?` operator for fallible template operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate(err) => err.fmt(f),
            Error::Template(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::Template(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}
