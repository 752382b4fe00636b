//! Defines the [`Tag`] and [`TagSet`] types. A [`TagSet`] maps each tag name
//! to the posts that carry it and is the input for [`crate::cloud`].

use crate::post::Post;
use regex::Regex;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

/// A tag and the IDs of the posts which carry it.
#[derive(Clone, Debug)]
pub struct Tag {
    /// The tag's name exactly as it was written in the post frontmatter.
    pub name: String,

    /// The IDs of the posts tagged with `name`, in the order they were added.
    pub posts: Vec<String>,
}

impl Tag {
    /// Creates a tag with no posts.
    pub fn new(name: &str) -> Tag {
        Tag {
            name: name.to_owned(),
            posts: Vec::new(),
        }
    }

    /// The number of posts carrying this tag.
    pub fn count(&self) -> usize {
        self.posts.len()
    }

    /// The URL-safe form of the tag's name. See [`slugify`].
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }
}

impl Hash for Tag {
    /// Implements [`Hash`] for [`Tag`] by delegating directly to the `name`
    /// field.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state)
    }
}

impl PartialEq for Tag {
    /// Implements [`PartialEq`] and [`Eq`] for [`Tag`] by delegating directly
    /// to the `name` field.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
impl Eq for Tag {}

/// A mapping from tag name to [`Tag`] which remembers the order in which tags
/// were first inserted. Iteration follows that order.
#[derive(Clone, Debug, Default)]
pub struct TagSet {
    tags: Vec<Tag>,
    positions: HashMap<String, usize>,
}

impl TagSet {
    pub fn new() -> TagSet {
        TagSet::default()
    }

    /// Builds a tag set from posts. Tags are inserted in the order they are
    /// first encountered while walking `posts` front to back.
    pub fn from_posts(posts: &[Post]) -> TagSet {
        let mut tags = TagSet::new();
        for post in posts {
            for name in post.tags.iter() {
                tags.insert(name, &post.id);
            }
        }
        tags
    }

    /// Returns the tag called `name`, creating an empty one at the end of
    /// the set if it doesn't exist yet.
    pub fn entry(&mut self, name: &str) -> &mut Tag {
        let index = match self.positions.get(name) {
            Some(&index) => index,
            None => {
                self.tags.push(Tag::new(name));
                self.positions.insert(name.to_owned(), self.tags.len() - 1);
                self.tags.len() - 1
            }
        };
        &mut self.tags[index]
    }

    /// Records that the post identified by `post_id` carries the tag `name`.
    pub fn insert(&mut self, name: &str, post_id: &str) {
        self.entry(name).posts.push(post_id.to_owned());
    }

    pub fn get(&self, name: &str) -> Option<&Tag> {
        self.positions.get(name).map(|&index| &self.tags[index])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Builds a tag set where each tag carries `count` placeholder posts.
    #[cfg(test)]
    pub(crate) fn from_counts(counts: &[(&str, usize)]) -> TagSet {
        let mut tags = TagSet::new();
        for (name, count) in counts {
            let tag = tags.entry(name);
            for i in 0..*count {
                tag.posts.push(format!("{}-{}", name, i));
            }
        }
        tags
    }
}

/// Converts a tag name into a URL-safe slug: runs of whitespace become `-`,
/// characters outside `[A-Za-z0-9_-]` are dropped, and the result is
/// lowercased.
pub fn slugify(name: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    static DISALLOWED: OnceLock<Regex> = OnceLock::new();

    // Both patterns are literals, so compilation can't fail.
    let whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").unwrap());
    let disallowed =
        DISALLOWED.get_or_init(|| Regex::new(r"[^A-Za-z0-9_-]").unwrap());

    let hyphenated = whitespace.replace_all(name, "-");
    disallowed.replace_all(&hyphenated, "").to_lowercase()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_slugify_spaces_and_punctuation() {
        assert_eq!("sci-fi", slugify("Sci Fi!"));
    }

    #[test]
    fn test_slugify_keeps_underscores_and_hyphens() {
        assert_eq!("rust_lang-2021", slugify("Rust_Lang-2021"));
    }

    #[test]
    fn test_slugify_collapses_whitespace_runs() {
        assert_eq!("a-b-c", slugify("a \t b\n\nc"));
    }

    #[test]
    fn test_slugify_drops_non_ascii() {
        assert_eq!("caf", slugify("Café"));
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let mut tags = TagSet::new();
        tags.insert("zeta", "p1");
        tags.insert("alpha", "p1");
        tags.insert("zeta", "p2");

        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(vec!["zeta", "alpha"], names);
        assert_eq!(2, tags.get("zeta").map(Tag::count).unwrap_or(0));
        assert_eq!(1, tags.get("alpha").map(Tag::count).unwrap_or(0));
    }

    #[test]
    fn test_from_posts_walks_posts_in_order() {
        let post = |id: &str, tags: &[&str]| Post {
            id: id.to_owned(),
            title: id.to_owned(),
            date: String::from("2021-01-01"),
            body: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        };
        let posts = vec![post("b", &["rust", "web"]), post("a", &["web"])];

        let tags = TagSet::from_posts(&posts);
        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(vec!["rust", "web"], names);
        assert_eq!(
            Some(&vec![String::from("b"), String::from("a")]),
            tags.get("web").map(|t| &t.posts),
        );
    }

    #[test]
    fn test_empty() {
        let tags = TagSet::new();
        assert!(tags.is_empty());
        assert_eq!(0, tags.len());
        assert!(tags.get("anything").is_none());
    }
}
