//! Defines the [`Site`] type: the posts of a blog and the [`TagSet`] built
//! from them. A [`Site`] is what template tags render against.

use crate::parser;
use crate::post::Post;
use crate::tag::TagSet;
use std::path::Path;
use tracing::info;

pub struct Site {
    /// The site's posts, most recent first.
    pub posts: Vec<Post>,

    /// Every tag used by the posts, in the order first seen while walking
    /// `posts`.
    pub tags: TagSet,
}

impl Site {
    /// Builds a site from posts which are already in display order.
    pub fn new(posts: Vec<Post>) -> Site {
        let tags = TagSet::from_posts(&posts);
        Site { posts, tags }
    }

    /// Loads every post in `posts_directory`. See [`parser::parse_posts`].
    pub fn load(posts_directory: &Path) -> parser::Result<Site> {
        let site = Site::new(parser::parse_posts(posts_directory)?);
        info!(
            posts = site.posts.len(),
            tags = site.tags.len(),
            directory = %posts_directory.display(),
            "loaded site"
        );
        Ok(site)
    }
}
