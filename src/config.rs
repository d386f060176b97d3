use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

const PROJECT_FILE: &str = "quire.yaml";

#[derive(Deserialize)]
struct PageSize(usize);
impl Default for PageSize {
    fn default() -> Self {
        PageSize(10)
    }
}

#[derive(Deserialize)]
struct RecentPosts(usize);
impl Default for RecentPosts {
    fn default() -> Self {
        RecentPosts(5)
    }
}

#[derive(Deserialize)]
struct Project {
    pub title: String,
    pub site_root: Url,

    /// Relative to the project file. Defaults to the project directory.
    #[serde(default)]
    pub data_directory: PathBuf,

    #[serde(default)]
    pub page_size: PageSize,

    #[serde(default)]
    pub recent_posts: RecentPosts,
}

#[derive(Deserialize)]
struct Theme {
    index_template: Vec<PathBuf>,
    detail_template: Vec<PathBuf>,
}

pub struct Config {
    pub title: String,
    pub site_root: Url,

    /// Holds `posts/`, `comments.yaml` and `profiles.yaml`.
    pub data_directory: PathBuf,

    /// The number of posts per listing page.
    pub page_size: usize,

    /// The number of posts in the sidebar's recent list.
    pub recent_posts: usize,
    pub index_template: Vec<PathBuf>,
    pub detail_template: Vec<PathBuf>,
}

impl Config {
    /// Finds `quire.yaml` in `dir` or the nearest parent directory that has
    /// one and loads it.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path)
                .with_context(|| format!("Loading configuration `{}`", path.display()))
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    pub fn from_project_file(path: &Path) -> Result<Config> {
        let project: Project = serde_yaml::from_reader(open(path, "project")?)?;
        if project.page_size.0 == 0 {
            return Err(anyhow!("`page_size` must be at least 1"));
        }

        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => {
                let theme_dir = project_root.join("theme");
                let theme_file = open(&theme_dir.join("theme.yaml"), "theme")?;
                let theme: Theme = serde_yaml::from_reader(theme_file)?;
                Ok(Config {
                    title: project.title,
                    site_root: project.site_root,
                    data_directory: project_root.join(project.data_directory),
                    page_size: project.page_size.0,
                    recent_posts: project.recent_posts.0,
                    index_template: theme
                        .index_template
                        .iter()
                        .map(|relpath| theme_dir.join(relpath))
                        .collect(),
                    detail_template: theme
                        .detail_template
                        .iter()
                        .map(|relpath| theme_dir.join(relpath))
                        .collect(),
                })
            }
        }
    }
}

fn open(path: &Path, kind: &str) -> Result<File> {
    File::open(path).with_context(|| format!("Opening {} file `{}`", kind, path.display()))
}
