//! Exports the [`build`] function which stitches together the high-level
//! steps of rendering a template: loading the posts ([`crate::parser`]),
//! registering the tag cloud and filters ([`crate::registry`]), applying the
//! template, and writing the result to disk.

use crate::config::Config;
use crate::parser::Error as ParseError;
use crate::registry::{Error as RegistryError, Registry};
use crate::site::Site;
use std::fmt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Loads the site described by `config` and renders its template, returning
/// the rendered text.
pub fn render(config: &Config) -> Result<String> {
    let site = Site::load(&config.posts_directory)?;
    let registry = Registry::standard(config.renderer(), config.preview_fallback)?;
    let source = read_template(&config.template)?;
    Ok(registry.apply(&source, &site)?)
}

/// Renders the template described by `config` and writes the result to
/// `config.output`, creating its parent directories as needed.
pub fn build(config: &Config) -> Result<()> {
    let output = render(config)?;
    write_output(&config.output, &output)?;
    info!(output = %config.output.display(), bytes = output.len(), "wrote page");
    Ok(())
}

fn read_template(path: &Path) -> Result<String> {
    let mut contents = String::new();
    File::open(path)
        .and_then(|mut file| file.read_to_string(&mut contents))
        .map_err(|err| Error::OpenTemplateFile {
            path: path.to_owned(),
            err,
        })?;
    Ok(contents)
}

fn write_output(path: &Path, contents: &str) -> Result<()> {
    let annotate = |err: std::io::Error| Error::WriteOutput {
        path: path.to_owned(),
        err,
    };
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(annotate)?;
    }
    File::create(path)
        .and_then(|mut file| file.write_all(contents.as_bytes()))
        .map_err(annotate)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for rendering a site. Errors can be during parsing,
/// registration and templating, or I/O on the template and output files.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors during parsing.
    Parse(ParseError),

    /// Returned for errors registering tags and filters or applying the
    /// template.
    Registry(RegistryError),

    /// Returned for I/O problems while reading the template file.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for I/O problems while writing the output file.
    WriteOutput { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => err.fmt(f),
            Error::Registry(err) => err.fmt(f),
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::WriteOutput { path, err } => {
                write!(f, "Writing output file '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Registry(err) => Some(err),
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::WriteOutput { path: _, err } => Some(err),
        }
    }
}

impl From<ParseError> for Error {
    /// Converts [`ParseError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<RegistryError> for Error {
    /// Converts [`RegistryError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: RegistryError) -> Error {
        Error::Registry(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn config() -> Config {
        match Config::from_project_file(Path::new("./testdata/tagcloud.yaml")) {
            Ok(config) => config,
            Err(err) => panic!("loading test config: {}", err),
        }
    }

    #[test]
    fn test_render() -> Result<()> {
        let output = render(&config())?;
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            vec![
                r#"<div class="tag-cloud">"#,
                r#"<span style="font-size: 280%"><a href="/blog/tags/rust/" rel="tag">rust</a></span>"#,
                r#"<span style="font-size: 75%"><a href="/blog/tags/sci-fi/" rel="tag">Sci Fi</a></span>"#,
                r#"<span style="font-size: 75%"><a href="/blog/tags/web/" rel="tag">web</a></span>"#,
                "</div>",
            ],
            lines[..5].to_vec(),
        );

        // The project asks for full-text previews, so the fold-less post is
        // previewed in full.
        assert!(output.contains("<li>Older: <p>An older post without a fold.</p>"));
        assert!(output.contains("<li>Hello: <p>Hello <em>world</em>.</p>"));
        assert!(!output.contains("Rest."));
        Ok(())
    }

    #[test]
    fn test_build_writes_output() -> Result<()> {
        let mut config = config();
        let dir = std::env::temp_dir().join(format!("tagcloud-build-{}", std::process::id()));
        config.output = dir.join("nested").join("tags.html");

        build(&config)?;
        let written = std::fs::read_to_string(&config.output).map_err(|err| {
            Error::WriteOutput {
                path: config.output.clone(),
                err,
            }
        })?;
        assert_eq!(render(&config)?, written);

        let _ = std::fs::remove_dir_all(&dir);
        Ok(())
    }

    #[test]
    fn test_missing_template() {
        let mut config = config();
        config.template = PathBuf::from("./testdata/templates/missing.html");
        match render(&config) {
            Err(Error::OpenTemplateFile { path, .. }) => {
                assert_eq!(config.template, path)
            }
            other => panic!("wanted OpenTemplateFile; found {:?}", other),
        }
    }
}
