//! Loads the project configuration from a `tagcloud.yaml` file. All fields
//! are optional:
//!
//! ```yaml
//! posts_directory: posts          # relative to the project file
//! template: templates/tags.html   # relative to the project file
//! output: _site/tags.html         # relative to the project file
//! tags_url: /tags/
//! weighting: min_max              # or `average`
//! links: slug                     # or `raw`
//! min_font: 75
//! max_font: 280
//! preview_fallback: empty         # or `full_text`
//! ```

use crate::cloud::{Links, TagWeightRenderer, Weighting, MAX_FONT, MIN_FONT, TAGS_URL};
use crate::filters::PreviewFallback;
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The name of the project file.
pub const PROJECT_FILE: &str = "tagcloud.yaml";

#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Project {
    posts_directory: PathBuf,
    template: PathBuf,
    output: PathBuf,
    tags_url: String,
    weighting: Weighting,
    links: Links,
    min_font: u64,
    max_font: u64,
    preview_fallback: PreviewFallback,
}

impl Default for Project {
    fn default() -> Self {
        Project {
            posts_directory: PathBuf::from("posts"),
            template: PathBuf::from("templates/tags.html"),
            output: PathBuf::from("_site/tags.html"),
            tags_url: TAGS_URL.to_owned(),
            weighting: Weighting::default(),
            links: Links::default(),
            min_font: MIN_FONT,
            max_font: MAX_FONT,
            preview_fallback: PreviewFallback::default(),
        }
    }
}

/// The resolved project configuration. Paths are absolute or relative to the
/// current directory, never to the project file.
#[derive(Clone, Debug)]
pub struct Config {
    /// The directory containing the project file.
    pub project_directory: PathBuf,

    /// The directory the posts are loaded from.
    pub posts_directory: PathBuf,

    /// The template to render.
    pub template: PathBuf,

    /// Where the rendered template is written.
    pub output: PathBuf,

    pub tags_url: String,
    pub weighting: Weighting,
    pub links: Links,
    pub min_font: u64,
    pub max_font: u64,
    pub preview_fallback: PreviewFallback,
}

impl Config {
    /// Searches `dir` and then each of its ancestors for a project file and
    /// loads the first one found.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        for ancestor in dir.ancestors() {
            let path = ancestor.join(PROJECT_FILE);
            if path.is_file() {
                return Config::from_project_file(&path);
            }
        }
        Err(Error::NotFound(dir.to_owned()))
    }

    /// Loads the project file at `path`.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        let project: Project = serde_yaml::from_reader(file).map_err(|err| Error::Parse {
            path: path.to_owned(),
            err,
        })?;

        let root = match path.parent() {
            Some(root) => root,
            None => return Err(Error::NoParent(path.to_owned())),
        };
        Ok(Config {
            project_directory: root.to_owned(),
            posts_directory: root.join(project.posts_directory),
            template: root.join(project.template),
            output: root.join(project.output),
            tags_url: project.tags_url,
            weighting: project.weighting,
            links: project.links,
            min_font: project.min_font,
            max_font: project.max_font,
            preview_fallback: project.preview_fallback,
        })
    }

    /// Builds the tag cloud renderer described by this configuration.
    pub fn renderer(&self) -> TagWeightRenderer {
        TagWeightRenderer::new()
            .with_weighting(self.weighting)
            .with_links(self.links)
            .with_font_range(self.min_font, self.max_font)
            .with_tags_url(&self.tags_url)
    }
}

/// The result of loading the configuration.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading the configuration.
#[derive(Debug)]
pub enum Error {
    /// Returned when no project file exists in the directory or any of its
    /// ancestors.
    NotFound(PathBuf),

    /// Returned when the project file can't be opened.
    Open { path: PathBuf, err: std::io::Error },

    /// Returned when the project file isn't valid.
    Parse { path: PathBuf, err: serde_yaml::Error },

    /// Returned when the project file path has no parent directory.
    NoParent(PathBuf),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotFound(dir) => write!(
                f,
                "Could not find `{}` in '{}' or any parent directory",
                PROJECT_FILE,
                dir.display()
            ),
            Error::Open { path, err } => {
                write!(f, "Opening project file '{}': {}", path.display(), err)
            }
            Error::Parse { path, err } => {
                write!(f, "Loading project file '{}': {}", path.display(), err)
            }
            Error::NoParent(path) => write!(
                f,
                "Can't get parent directory for project file '{}'",
                path.display()
            ),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::NotFound(_) => None,
            Error::Open { path: _, err } => Some(err),
            Error::Parse { path: _, err } => Some(err),
            Error::NoParent(_) => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_project_file() -> Result<()> {
        let config = Config::from_project_file(Path::new("./testdata/tagcloud.yaml"))?;
        assert_eq!(Path::new("./testdata"), config.project_directory);
        assert_eq!(Path::new("./testdata/posts"), config.posts_directory);
        assert_eq!(Path::new("./testdata/templates/tags.html"), config.template);
        assert_eq!(Weighting::MinMax, config.weighting);
        assert_eq!(Links::Slug, config.links);
        assert_eq!(PreviewFallback::FullText, config.preview_fallback);
        assert_eq!("/blog/tags/", config.tags_url);
        Ok(())
    }

    #[test]
    fn test_from_directory_searches_ancestors() -> Result<()> {
        let config = Config::from_directory(Path::new("./testdata/posts/bundle"))?;
        assert_eq!(Path::new("./testdata"), config.project_directory);
        Ok(())
    }

    #[test]
    fn test_defaults() -> Result<()> {
        let config = Config::from_project_file(Path::new("./testdata/minimal/tagcloud.yaml"))?;
        assert_eq!(Path::new("./testdata/minimal/posts"), config.posts_directory);
        assert_eq!(Path::new("./testdata/minimal/_site/tags.html"), config.output);
        assert_eq!(Weighting::MinMax, config.weighting);
        assert_eq!(Links::Slug, config.links);
        assert_eq!(PreviewFallback::Empty, config.preview_fallback);

        let renderer = config.renderer();
        assert_eq!(MIN_FONT, renderer.min_font);
        assert_eq!(MAX_FONT, renderer.max_font);
        assert_eq!(TAGS_URL, renderer.tags_url);
        Ok(())
    }

    #[test]
    fn test_unknown_weighting() {
        match Config::from_project_file(Path::new("./testdata/invalid/tagcloud.yaml")) {
            Err(Error::Parse { .. }) => {}
            other => panic!("wanted Parse; found {:?}", other),
        }
    }

    #[test]
    fn test_missing_project_file() {
        match Config::from_project_file(Path::new("./testdata/posts/tagcloud.yaml")) {
            Err(Error::Open { .. }) => {}
            other => panic!("wanted Open; found {:?}", other),
        }
    }
}
