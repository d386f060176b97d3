//! Conversions from the view contexts into [`Value`]s for templating.

use crate::pagination::PaginationWindow;
use crate::post::Comment;
use crate::sidebar::{ArchiveMonth, Counted, Sidebar};
use crate::view::{DetailContext, Link, ListingContext, PageLink, PostView};
use chrono::NaiveDateTime;
use gtmpl::Value;
use std::collections::HashMap;
use url::Url;

const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

fn object(fields: Vec<(&str, Value)>) -> Value {
    let m: HashMap<String, Value> = fields
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect();
    Value::Object(m)
}

fn array<'a, T: 'a>(items: impl IntoIterator<Item = &'a T>) -> Value
where
    Value: From<&'a T>,
{
    Value::Array(items.into_iter().map(Value::from).collect())
}

fn string(s: &str) -> Value {
    Value::String(s.to_owned())
}

fn number(n: usize) -> Value {
    Value::from(n as u64)
}

fn optional<T: Into<Value>>(opt: Option<T>) -> Value {
    match opt {
        Some(v) => v.into(),
        None => Value::Nil,
    }
}

fn date_time(dt: &NaiveDateTime) -> Value {
    Value::String(dt.format(DATE_TIME_FORMAT).to_string())
}

fn url_value(u: &Url) -> Value {
    Value::String(u.to_string())
}

impl From<&Link> for Value {
    fn from(link: &Link) -> Value {
        object(vec![("name", string(&link.name)), ("url", url_value(&link.url))])
    }
}

impl From<&PageLink> for Value {
    fn from(link: &PageLink) -> Value {
        object(vec![
            ("number", number(link.number)),
            ("url", url_value(&link.url)),
        ])
    }
}

impl From<&PostView> for Value {
    fn from(p: &PostView) -> Value {
        object(vec![
            ("id", Value::from(p.id.0)),
            ("url", url_value(&p.url)),
            ("title", string(&p.title)),
            ("created_time", date_time(&p.created_time)),
            ("modified_time", date_time(&p.modified_time)),
            ("category", (&p.category).into()),
            ("tags", array(&p.tags)),
            ("author", string(&p.author)),
            ("views", Value::from(p.views)),
            ("excerpt", string(&p.excerpt)),
            ("summarized", Value::Bool(p.summarized)),
            ("comment_count", number(p.comment_count)),
        ])
    }
}

impl From<&Comment> for Value {
    /// The fields are reader input and are passed through as-is; themes must
    /// escape them with the `html` function.
    fn from(c: &Comment) -> Value {
        object(vec![
            ("name", string(&c.name)),
            ("email", string(&c.email)),
            ("url", optional(c.url.as_deref().map(string))),
            ("text", string(&c.text)),
            ("created_time", date_time(&c.created_time)),
        ])
    }
}

impl From<&ListingContext> for Value {
    /// The pagination window is flattened into the keys `left`, `right`,
    /// `left_has_more`, `right_has_more`, `first` and `last`.
    fn from(c: &ListingContext) -> Value {
        let PaginationWindow {
            left,
            right,
            left_has_more,
            right_has_more,
            show_first,
            show_last,
        } = &c.window;
        let numbers = |pages: &[usize]| Value::Array(pages.iter().map(|&n| number(n)).collect());

        object(vec![
            ("heading", optional(c.heading.as_deref().map(string))),
            ("post_list", array(&c.post_list)),
            ("page_number", number(c.page_number)),
            ("num_pages", number(c.num_pages)),
            ("is_paginated", Value::Bool(c.is_paginated)),
            ("previous_url", optional(c.previous_url.as_ref().map(url_value))),
            ("next_url", optional(c.next_url.as_ref().map(url_value))),
            ("first_url", url_value(&c.first_url)),
            ("last_url", url_value(&c.last_url)),
            ("left", numbers(left.as_slice())),
            ("right", numbers(right.as_slice())),
            ("left_has_more", Value::Bool(*left_has_more)),
            ("right_has_more", Value::Bool(*right_has_more)),
            ("first", Value::Bool(*show_first)),
            ("last", Value::Bool(*show_last)),
            ("left_links", array(&c.left_links)),
            ("right_links", array(&c.right_links)),
            ("error_msg", optional(c.error_msg.as_deref().map(string))),
        ])
    }
}

impl From<&DetailContext> for Value {
    fn from(c: &DetailContext) -> Value {
        object(vec![
            ("post", (&c.post).into()),
            ("body", string(&c.body)),
            ("comment_list", array(&c.comment_list)),
        ])
    }
}

impl From<&Counted> for Value {
    fn from(c: &Counted) -> Value {
        object(vec![
            ("name", string(&c.link.name)),
            ("url", url_value(&c.link.url)),
            ("count", number(c.count)),
        ])
    }
}

impl From<&ArchiveMonth> for Value {
    fn from(a: &ArchiveMonth) -> Value {
        object(vec![
            ("year", Value::from(i64::from(a.year))),
            ("month", Value::from(u64::from(a.month))),
            ("count", number(a.count)),
            ("url", url_value(&a.url)),
        ])
    }
}

impl From<&Sidebar> for Value {
    fn from(s: &Sidebar) -> Value {
        object(vec![
            ("recent_posts", array(&s.recent_posts)),
            ("archives", array(&s.archives)),
            ("categories", array(&s.categories)),
            ("tags", array(&s.tags)),
        ])
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn field<'a>(value: &'a Value, key: &str) -> &'a Value {
        match value {
            Value::Object(m) => &m[key],
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_listing_window_keys() {
        let context = ListingContext {
            heading: None,
            post_list: vec![],
            page_number: 5,
            num_pages: 10,
            is_paginated: true,
            previous_url: None,
            next_url: None,
            first_url: Url::parse("https://example.org/?page=1").unwrap(),
            last_url: Url::parse("https://example.org/?page=10").unwrap(),
            window: PaginationWindow::compute(5, 10),
            left_links: vec![],
            right_links: vec![],
            error_msg: None,
        };
        let value = Value::from(&context);

        match field(&value, "left") {
            Value::Array(pages) => assert_eq!(2, pages.len()),
            _ => panic!("left is not an array"),
        }
        for key in &["left_has_more", "right_has_more", "first", "last"] {
            match field(&value, key) {
                Value::Bool(b) => assert!(*b, "{}", key),
                _ => panic!("{} is not a bool", key),
            }
        }
        match field(&value, "heading") {
            Value::Nil => {}
            _ => panic!("heading is set"),
        }
    }
}
