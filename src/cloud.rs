//! Renders a [`TagSet`] as an HTML tag cloud. Each tag becomes a link wrapped
//! in a `<span>` whose font size (a percentage) reflects how many posts carry
//! the tag relative to the other tags.
//!
//! Two weightings are supported (see [`Weighting`]) as well as two ways of
//! building tag links (see [`Links`]). They are kept as separate, explicit
//! choices; [`TagWeightRenderer::new`] uses [`Weighting::MinMax`] and
//! [`Links::Slug`].

use crate::tag::{Tag, TagSet};
use pulldown_cmark::escape::{escape_href, escape_html};
use serde::Deserialize;
use std::fmt;
use std::io;
use tracing::debug;

/// The weight of the least-used tags under [`Weighting::MinMax`].
pub const MIN_FONT: u64 = 75;

/// The weight of the most-used tags under [`Weighting::MinMax`].
pub const MAX_FONT: u64 = 280;

/// The base path for tag pages.
pub const TAGS_URL: &str = "/tags/";

/// How tag weights are computed from post counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    /// Scales counts linearly between the smallest and largest count onto
    /// `[min_font, max_font]`. If every tag has the same count, every tag gets
    /// `min_font`. Tags are emitted in [`TagSet`] order.
    MinMax,

    /// Weighs each tag as a percentage of the average count, so a tag with an
    /// average number of posts gets 100. Tags are emitted sorted by name.
    Average,
}

impl Default for Weighting {
    fn default() -> Self {
        Weighting::MinMax
    }
}

/// How a tag's name becomes the last segment of its link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Links {
    /// Use [`crate::tag::slugify`] on the name.
    Slug,

    /// Use the name as-is (percent-escaped where needed).
    Raw,
}

impl Default for Links {
    fn default() -> Self {
        Links::Slug
    }
}

/// A tag paired with its display weight.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightedTag<'a> {
    pub tag: &'a Tag,

    /// The font size as an integer percentage.
    pub weight: u64,
}

/// Computes tag weights and renders the tag cloud. The renderer holds only
/// its settings, so one instance can serve any number of renders.
#[derive(Clone, Debug)]
pub struct TagWeightRenderer {
    pub weighting: Weighting,
    pub links: Links,

    /// The smallest weight under [`Weighting::MinMax`].
    pub min_font: u64,

    /// The largest weight under [`Weighting::MinMax`].
    pub max_font: u64,

    /// The prefix for tag links; the link for a tag is
    /// `{tags_url}{slug}/`.
    pub tags_url: String,
}

impl Default for TagWeightRenderer {
    fn default() -> Self {
        TagWeightRenderer::new()
    }
}

impl TagWeightRenderer {
    /// Creates a renderer with min/max weighting between [`MIN_FONT`] and
    /// [`MAX_FONT`], slugged links, and [`TAGS_URL`] as the link prefix.
    pub fn new() -> TagWeightRenderer {
        TagWeightRenderer {
            weighting: Weighting::default(),
            links: Links::default(),
            min_font: MIN_FONT,
            max_font: MAX_FONT,
            tags_url: TAGS_URL.to_owned(),
        }
    }

    pub fn with_weighting(mut self, weighting: Weighting) -> Self {
        self.weighting = weighting;
        self
    }

    pub fn with_links(mut self, links: Links) -> Self {
        self.links = links;
        self
    }

    pub fn with_font_range(mut self, min_font: u64, max_font: u64) -> Self {
        self.min_font = min_font;
        self.max_font = max_font;
        self
    }

    pub fn with_tags_url(mut self, tags_url: &str) -> Self {
        self.tags_url = tags_url.to_owned();
        self
    }

    /// Computes the weight of every tag in `tags`, in output order. Only
    /// [`Weighting::MinMax`] reads the font range, so only it can fail with
    /// [`Error::InvalidFontRange`].
    pub fn weights<'a>(&self, tags: &'a TagSet) -> Result<Vec<WeightedTag<'a>>> {
        match self.weighting {
            Weighting::MinMax => self.min_max_weights(tags),
            Weighting::Average => Ok(average_weights(tags)),
        }
    }

    fn min_max_weights<'a>(&self, tags: &'a TagSet) -> Result<Vec<WeightedTag<'a>>> {
        if self.min_font > self.max_font {
            return Err(Error::InvalidFontRange {
                min_font: self.min_font,
                max_font: self.max_font,
            });
        }

        let counts = tags.iter().map(|tag| tag.count() as u64);
        let (min_count, max_count) = match (counts.clone().min(), counts.max()) {
            (Some(min), Some(max)) => (min, max),
            _ => return Ok(Vec::new()),
        };

        // The product is taken in u128 so any u64 font range fits; the
        // quotient never exceeds the font range.
        let range = (self.max_font - self.min_font) as u128;
        Ok(tags
            .iter()
            .map(|tag| WeightedTag {
                tag,
                weight: match max_count - min_count {
                    0 => self.min_font,
                    spread => {
                        let offset = (tag.count() as u64 - min_count) as u128 * range
                            / spread as u128;
                        self.min_font + offset as u64
                    }
                },
            })
            .collect())
    }

    /// Renders the tag cloud: one `<span>` per tag, each on its own line. An
    /// empty tag set renders as an empty string.
    pub fn render(&self, tags: &TagSet) -> Result<String> {
        let weighted = self.weights(tags)?;
        let mut out = String::new();
        for WeightedTag { tag, weight } in weighted {
            let segment = match self.links {
                Links::Slug => tag.slug(),
                Links::Raw => tag.name.clone(),
            };
            if tag.name.is_empty() {
                return Err(Error::EmptyTagName);
            }
            if segment.is_empty() {
                return Err(Error::EmptySlug(tag.name.clone()));
            }

            debug!(tag = %tag.name, count = tag.count(), weight, "weighted tag");
            out.push_str(&format!(r#"<span style="font-size: {}%"><a href=""#, weight));
            escape_href(&mut out, &format!("{}{}/", self.tags_url, segment))?;
            out.push_str(r#"" rel="tag">"#);
            escape_html(&mut out, &tag.name)?;
            out.push_str("</a></span>\n");
        }
        Ok(out)
    }
}

fn average_weights(tags: &TagSet) -> Vec<WeightedTag> {
    if tags.is_empty() {
        return Vec::new();
    }

    let total: u64 = tags.iter().map(|tag| tag.count() as u64).sum();
    let len = tags.len() as f64;

    // count / (total / len) * 100, multiplied out first so whole
    // percentages stay exact when truncated.
    let mut weighted: Vec<WeightedTag> = tags
        .iter()
        .map(|tag| WeightedTag {
            tag,
            // Every count is zero, so every tag is exactly average.
            weight: match total {
                0 => 100,
                _ => (tag.count() as f64 * len * 100.0 / total as f64) as u64,
            },
        })
        .collect();
    weighted.sort_by(|a, b| a.tag.name.cmp(&b.tag.name));
    weighted
}

/// The result of a fallible tag cloud operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem rendering a tag cloud.
#[derive(Debug)]
pub enum Error {
    /// Returned when the renderer is configured with `min_font` greater than
    /// `max_font`.
    InvalidFontRange { min_font: u64, max_font: u64 },

    /// Returned when a tag has an empty name.
    EmptyTagName,

    /// Returned when slugging a tag's name leaves nothing to link to.
    EmptySlug(String),

    /// Returned when writing escaped output fails.
    Io(io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidFontRange { min_font, max_font } => write!(
                f,
                "invalid font range: min_font {} is greater than max_font {}",
                min_font, max_font
            ),
            Error::EmptyTagName => write!(f, "tag name is empty"),
            Error::EmptySlug(name) => {
                write!(f, "tag `{}` has no characters usable in a URL", name)
            }
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidFontRange { .. } => None,
            Error::EmptyTagName => None,
            Error::EmptySlug(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator with the escaping functions.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}
