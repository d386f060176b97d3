use pulldown_cmark::{html, Event, Options, Parser, Tag};

/// The deepest heading level HTML supports.
const MAX_HEADING: u32 = 6;

/// Converts markdown to HTML, appending the result to `w`.
pub fn to_html(w: &mut String, markdown: &str) {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    html::push_html(w, Parser::new_ext(markdown, options).map(convert));
}

fn convert(ev: Event) -> Event {
    match ev {
        Event::Start(tag) => Event::Start(convert_tag(tag)),
        Event::End(tag) => Event::End(convert_tag(tag)),
        _ => ev,
    }
}

fn convert_tag(tag: Tag) -> Tag {
    match tag {
        // The headings in the post itself need to be demoted twice to be
        // subordinate to both the site title (h1) and the post title (h2).
        // So `#` becomes h3 instead of h1.
        Tag::Heading(s) => Tag::Heading((s + 2).min(MAX_HEADING)),
        _ => tag,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn render(markdown: &str) -> String {
        let mut s = String::new();
        to_html(&mut s, markdown);
        s
    }

    #[test]
    fn test_headings_are_demoted() {
        assert_eq!("<h3>Title</h3>\n", render("# Title"));
        assert_eq!("<h6>Deep</h6>\n", render("##### Deep"));
    }

    #[test]
    fn test_fold_marker_survives() {
        let html = render("intro\n\n<!-- more -->\n\nrest");
        assert!(html.contains("<!-- more -->"), "{}", html);
    }

    #[test]
    fn test_strikethrough() {
        assert_eq!("<p><del>old</del></p>\n", render("~~old~~"));
    }
}
