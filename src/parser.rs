//! Parses [`Post`] objects from a directory of markdown files. See
//! [`parse_posts`] for the expected layout.

use crate::markdown;
use crate::post::Post;
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

const MARKDOWN_EXTENSION: &str = "md";
const BUNDLE_INDEX: &str = "index.md";

/// Searches `source_directory` for posts and returns them sorted by date
/// (most recent first). A post is either a `.md` file directly inside
/// `source_directory` or a bundle: a subdirectory containing an `index.md`.
/// Each post file must be structured as follows:
///
/// 1. Initial frontmatter fence (`---`)
/// 2. YAML frontmatter with fields `Title`, `Date`, and optionally `Tags`
/// 3. Terminal frontmatter fence (`---`)
/// 4. Post body
///
/// For example:
///
/// ```md
/// ---
/// Title: Hello, world!
/// Date: 2021-04-16
/// Tags: [greet]
/// ---
/// # Hello
///
/// World
/// ```
pub fn parse_posts(source_directory: &Path) -> Result<Vec<Post>> {
    let mut posts = Vec::new();
    let walker = WalkDir::new(source_directory)
        .min_depth(1)
        .max_depth(2)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()));

    for result in walker {
        let entry = result?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let id = match entry.depth() {
            1 if path.extension().map_or(false, |ext| ext == MARKDOWN_EXTENSION) => {
                path.file_stem()
            }
            2 if entry.file_name() == BUNDLE_INDEX => {
                path.parent().and_then(Path::file_name)
            }
            _ => continue,
        }
        .and_then(|id| id.to_str())
        .ok_or_else(|| Error::InvalidFileName(path.to_owned()))?;

        posts.push(parse_post(id, path)?);
    }

    posts.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(posts)
}

/// Parses the post at `path`, annotating any error with the path.
fn parse_post(id: &str, path: &Path) -> Result<Post> {
    match read_post(id, path) {
        Ok(post) => {
            debug!(id, tags = post.tags.len(), "parsed post");
            Ok(post)
        }
        Err(e) => Err(Error::Annotated(
            format!("parsing post `{}`", path.display()),
            Box::new(e),
        )),
    }
}

fn read_post(id: &str, path: &Path) -> Result<Post> {
    use std::io::Read;
    let mut contents = String::new();
    File::open(path)?.read_to_string(&mut contents)?;
    parse_post_str(id, &contents)
}

/// Parses a single [`Post`] from its `id` and source text.
pub fn parse_post_str(id: &str, input: &str) -> Result<Post> {
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

    let mut tags: Vec<String> = Vec::with_capacity(frontmatter.tags.len());
    for tag in frontmatter.tags {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    Ok(Post {
        id: id.to_owned(),
        title: frontmatter.title,
        date: frontmatter.date,
        tags,
        body: markdown::to_html(&input[body_start..]),
    })
}

#[derive(Deserialize, Clone)]
struct Frontmatter {
    /// The title of the post.
    #[serde(rename = "Title")]
    pub title: String,

    /// The date of the post.
    #[serde(rename = "Date")]
    pub date: String,

    /// The tags associated with the post.
    #[serde(default, rename = "Tags")]
    pub tags: Vec<String>,
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

    /// Returned for other I/O errors.
    Io(std::io::Error),

    /// Returned for WalkDir I/O errors.
    WalkDir(walkdir::Error),

    /// Returned when a post's file name isn't valid UTF-8.
    InvalidFileName(PathBuf),

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
            Error::Io(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::InvalidFileName(path) => {
                write!(f, "invalid file name: {:?}", path)
            }
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
            Error::Io(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::InvalidFileName(_) => None,
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
    /// use the `?` operator while walking the posts directory.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
