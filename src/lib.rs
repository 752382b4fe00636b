//! The library code for `tagcloud`, which renders weighted tag clouds and
//! provides the usual blog template filters for a static site. The work can
//! be broken down into three steps:
//!
//! 1. Loading posts from source files on disk ([`crate::parser`]) into a
//!    [`crate::site::Site`], which also indexes the posts by tag
//!    ([`crate::tag::TagSet`])
//! 2. Registering the template tags and filters ([`crate::registry`])
//! 3. Applying a template and writing the result to disk ([`crate::build`])
//!
//! The interesting part is the tag cloud itself ([`crate::cloud`]), which
//! turns the number of posts per tag into a font size. Everything else is
//! plumbing around it.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod cloud;
pub mod config;
pub mod filters;
pub mod markdown;
pub mod parser;
pub mod post;
pub mod registry;
pub mod site;
pub mod tag;
pub mod value;
