//! The [`Registry`] holds the named template tags and filters available to a
//! template. It is filled once, before any template is rendered, and then
//! applied to any number of templates.
//!
//! Filters are functions called from inside the template, e.g.
//! `{{ preview .body }}`. Tags are rendered against the whole [`Site`] before
//! the template executes and their output is exposed as `.tags.<name>`, e.g.
//! `{{ .tags.tag_cloud }}`.

use crate::cloud::{self, TagWeightRenderer};
use crate::filters::{self, PreviewFallback};
use crate::site::Site;
use gtmpl::{Context, Template};
use gtmpl_value::{Func, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::debug;

/// A named transformation rendered once per template against a [`Site`].
pub trait TemplateTag {
    /// The name the tag is registered under.
    fn name(&self) -> &str;

    /// Renders the tag's output.
    fn render(&self, site: &Site) -> Result<String>;
}

impl TemplateTag for TagWeightRenderer {
    fn name(&self) -> &str {
        "tag_cloud"
    }

    fn render(&self, site: &Site) -> Result<String> {
        Ok(TagWeightRenderer::render(self, &site.tags)?)
    }
}

/// The set of tags and filters available to templates.
#[derive(Default)]
pub struct Registry {
    tags: Vec<Box<dyn TemplateTag>>,
    filters: Vec<(String, Func)>,
    names: HashSet<String>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Registry {
        Registry::default()
    }

    /// Creates a registry with the `tag_cloud` tag (rendered by `cloud`) and
    /// the filters `date_to_month`, `date_to_month_abbr`, `date_to_utc`,
    /// `preview` (using `preview_fallback`), and `markdownify`.
    pub fn standard(
        cloud: TagWeightRenderer,
        preview_fallback: PreviewFallback,
    ) -> Result<Registry> {
        let mut registry = Registry::new();
        registry.register_tag(Box::new(cloud))?;
        registry.register_filter("date_to_month", filters::date_to_month)?;
        registry.register_filter("date_to_month_abbr", filters::date_to_month_abbr)?;
        registry.register_filter("date_to_utc", filters::date_to_utc)?;
        registry.register_filter("preview", filters::preview_filter_for(preview_fallback))?;
        registry.register_filter("markdownify", filters::markdownify)?;
        Ok(registry)
    }

    fn claim(&mut self, name: &str) -> Result<()> {
        let mut chars = name.chars();
        let valid = match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        };
        if !valid {
            return Err(Error::InvalidName(name.to_owned()));
        }
        if !self.names.insert(name.to_owned()) {
            return Err(Error::Duplicate(name.to_owned()));
        }
        Ok(())
    }

    /// Registers a tag under [`TemplateTag::name`]. Fails if the name is
    /// already taken by a tag or a filter.
    pub fn register_tag(&mut self, tag: Box<dyn TemplateTag>) -> Result<()> {
        self.claim(tag.name())?;
        debug!(name = tag.name(), "registered tag");
        self.tags.push(tag);
        Ok(())
    }

    /// Registers a filter under `name`. Fails if the name is already taken by
    /// a tag or a filter.
    pub fn register_filter(&mut self, name: &str, filter: Func) -> Result<()> {
        self.claim(name)?;
        debug!(name, "registered filter");
        self.filters.push((name.to_owned(), filter));
        Ok(())
    }

    /// The names of the registered tags, in registration order.
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|tag| tag.name())
    }

    /// The names of the registered filters, in registration order.
    pub fn filter_names(&self) -> impl Iterator<Item = &str> {
        self.filters.iter().map(|(name, _)| name.as_str())
    }

    /// Parses `source` into a template that can call every registered filter.
    pub fn parse(&self, source: &str) -> Result<Template> {
        // gtmpl's lexer never returns on an action that is left open.
        if let Some(offset) = unclosed_action(source) {
            return Err(Error::ParseTemplate(format!(
                "unclosed action starting at byte {}",
                offset
            )));
        }

        let mut template = Template::default();
        for (name, filter) in self.filters.iter() {
            template.add_func(name, *filter);
        }
        template.parse(source).map_err(Error::ParseTemplate)?;
        Ok(template)
    }

    /// Renders every registered tag against `site`, keyed by tag name.
    pub fn render_tags(&self, site: &Site) -> Result<HashMap<String, Value>> {
        let mut rendered = HashMap::with_capacity(self.tags.len());
        for tag in self.tags.iter() {
            let output = tag.render(site).map_err(|err| Error::Tag {
                name: tag.name().to_owned(),
                err: Box::new(err),
            })?;
            rendered.insert(tag.name().to_owned(), Value::String(output));
        }
        Ok(rendered)
    }

    /// Renders the template `source` against `site`. The template sees the
    /// site as `.site` (see [`crate::value`]) and the output of the registered
    /// tags as `.tags`.
    pub fn apply(&self, source: &str, site: &Site) -> Result<String> {
        let template = self.parse(source)?;

        let mut root: HashMap<String, Value> = HashMap::new();
        root.insert("site".to_owned(), Value::from(site));
        root.insert("tags".to_owned(), Value::Object(self.render_tags(site)?));
        let context = Context::from(Value::Object(root)).map_err(Error::Execute)?;

        let mut out: Vec<u8> = Vec::new();
        template.execute(&mut out, &context).map_err(Error::Execute)?;
        Ok(String::from_utf8(out)?)
    }
}

/// Finds the byte offset of the first `{{` with no `}}` after it.
fn unclosed_action(source: &str) -> Option<usize> {
    let mut start = 0;
    while let Some(open) = source[start..].find("{{") {
        let open = start + open;
        match source[open + 2..].find("}}") {
            Some(close) => start = open + 2 + close + 2,
            None => return Some(open),
        }
    }
    None
}

/// The result of a fallible registry operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem registering or applying tags and filters.
#[derive(Debug)]
pub enum Error {
    /// Returned when a name is registered twice.
    Duplicate(String),

    /// Returned when a name can't be called from a template.
    InvalidName(String),

    /// Returned when the tag cloud can't be rendered.
    Cloud(cloud::Error),

    /// Returned when a registered tag fails, naming the tag.
    Tag { name: String, err: Box<Error> },

    /// Returned for errors parsing a template.
    ParseTemplate(String),

    /// Returned for errors executing a template, including filter errors.
    Execute(String),

    /// Returned when a template produces invalid UTF-8.
    Utf8(std::string::FromUtf8Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Duplicate(name) => write!(f, "`{}` is already registered", name),
            Error::InvalidName(name) => {
                write!(f, "`{}` is not a valid tag or filter name", name)
            }
            Error::Cloud(err) => err.fmt(f),
            Error::Tag { name, err } => write!(f, "rendering tag `{}`: {}", name, err),
            Error::ParseTemplate(err) => write!(f, "parsing template: {}", err),
            Error::Execute(err) => write!(f, "executing template: {}", err),
            Error::Utf8(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Duplicate(_) => None,
            Error::InvalidName(_) => None,
            Error::Cloud(err) => Some(err),
            Error::Tag { name: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::Execute(_) => None,
            Error::Utf8(err) => Some(err),
        }
    }
}

impl From<cloud::Error> for Error {
    /// Converts a [`cloud::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator when rendering the tag cloud.
    fn from(err: cloud::Error) -> Error {
        Error::Cloud(err)
    }
}

impl From<std::string::FromUtf8Error> for Error {
    /// Converts a [`std::string::FromUtf8Error`] into an [`Error`].
    fn from(err: std::string::FromUtf8Error) -> Error {
        Error::Utf8(err)
    }
}
