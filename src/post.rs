//! Defines the [`Post`] type.

use crate::filters::{preview, PreviewFallback, PREVIEW_DELIMITER};

/// Represents a blog post, the unit that tags are attached to.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    /// The post's identifier: its path relative to the posts directory, less
    /// the `.md` extension (or the bundle directory name for `index.md`
    /// bundles).
    pub id: String,

    /// The title of the post.
    pub title: String,

    /// The date of the post as written in the frontmatter.
    pub date: String,

    /// The post's tags in the order they were written, without duplicates.
    pub tags: Vec<String>,

    /// The HTML body of the post.
    pub body: String,
}

impl Post {
    /// Returns the part of the body above the `<!-- more -->` fold. Posts
    /// without a fold are summarized by their whole body.
    pub fn summary(&self) -> &str {
        preview(&self.body, PREVIEW_DELIMITER, PreviewFallback::FullText)
    }
}
