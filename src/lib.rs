//! The library code for the `quire` blog engine. Serving a page is a linear
//! pipeline with explicit inputs and outputs at each stage:
//!
//! 1. Fetching the posts a request asks for from a [`store::Store`], narrowed
//!    by a [`query::PostFilter`] (category, tag, month or search terms)
//! 2. Selecting the requested page of them ([`pagination::Paginator`])
//! 3. Computing the [`pagination::PaginationWindow`], the page links shown
//!    around the current page
//! 4. Assembling a plain context record ([`view`]) and applying the theme's
//!    template to it ([`render`])
//!
//! Serving a single post follows the same shape; recording the view is an
//! explicit [`store::Store::increase_views`] command issued by
//! [`view::detail`] after the post was found, never a side effect of reading
//! it.
//!
//! Posts are markdown files with YAML frontmatter ([`parser`]), loaded into a
//! [`store::MemoryStore`] together with comments and author profiles.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod config;
pub mod markdown;
pub mod pagination;
pub mod parser;
pub mod post;
pub mod query;
pub mod render;
pub mod sidebar;
pub mod store;
pub mod tag;
pub mod url;
pub mod value;
pub mod view;
