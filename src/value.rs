//! Conversions from the site model into [`Value`]s for templating.

use crate::post::Post;
use crate::site::Site;
use crate::tag::{Tag, TagSet};
use gtmpl_value::Value;
use std::collections::HashMap;

fn strings(items: &[String]) -> Value {
    Value::Array(items.iter().map(|s| Value::String(s.clone())).collect())
}

impl From<&Post> for Value {
    /// Converts a [`Post`] into an object with fields `id`, `title`, `date`,
    /// `tags`, `body`, and `summary`.
    fn from(p: &Post) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("id".to_owned(), Value::String(p.id.clone()));
        m.insert("title".to_owned(), Value::String(p.title.clone()));
        m.insert("date".to_owned(), Value::String(p.date.clone()));
        m.insert("tags".to_owned(), strings(&p.tags));
        m.insert("body".to_owned(), Value::String(p.body.clone()));
        m.insert("summary".to_owned(), Value::String(p.summary().to_owned()));
        Value::Object(m)
    }
}

impl From<&Tag> for Value {
    /// Converts a [`Tag`] into an object with fields `name`, `slug`, `count`,
    /// and `posts` (the IDs of the tagged posts).
    fn from(t: &Tag) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("name".to_owned(), Value::String(t.name.clone()));
        m.insert("slug".to_owned(), Value::String(t.slug()));
        m.insert("count".to_owned(), Value::from(t.count() as u64));
        m.insert("posts".to_owned(), strings(&t.posts));
        Value::Object(m)
    }
}

impl From<&TagSet> for Value {
    /// Converts a [`TagSet`] into an array of tags in set order.
    fn from(tags: &TagSet) -> Value {
        Value::Array(tags.iter().map(Value::from).collect())
    }
}

impl From<&Site> for Value {
    /// Converts a [`Site`] into an object with fields `posts` and `tags`.
    fn from(site: &Site) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert(
            "posts".to_owned(),
            Value::Array(site.posts.iter().map(Value::from).collect()),
        );
        m.insert("tags".to_owned(), Value::from(&site.tags));
        Value::Object(m)
    }
}
