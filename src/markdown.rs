use pulldown_cmark::{html, Options, Parser};

/// The markdown extensions enabled for post bodies and the `markdownify`
/// filter.
fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Converts markdown to HTML, appending the result to `out`.
pub fn push_html(out: &mut String, markdown: &str) {
    html::push_html(out, Parser::new_ext(markdown, options()));
}

/// Converts markdown to a new HTML string.
pub fn to_html(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    push_html(&mut out, markdown);
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_paragraph() {
        assert_eq!("<p>Hello, <em>world</em>.</p>\n", to_html("Hello, *world*."));
    }

    #[test]
    fn test_strikethrough_enabled() {
        assert_eq!("<p><del>gone</del></p>\n", to_html("~~gone~~"));
    }

    #[test]
    fn test_push_html_appends() {
        let mut out = String::from("<div>");
        push_html(&mut out, "# Title");
        assert_eq!("<div><h1>Title</h1>\n", out);
    }
}
