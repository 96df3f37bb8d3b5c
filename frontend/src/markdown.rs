use pulldown_cmark::{Options, Parser, html::push_html};

/// Renders the report body to HTML for injection into the report card.
pub fn render_markdown(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(text, options);
    let mut html = String::with_capacity(text.len() * 2);
    push_html(&mut html, parser);
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_and_paragraphs() {
        let html = render_markdown("# Saturn\n\nRings and moons.");
        assert!(html.contains("<h1>Saturn</h1>"));
        assert!(html.contains("<p>Rings and moons.</p>"));
    }

    #[test]
    fn emphasis_and_lists() {
        let html = render_markdown("**Key finding**\n\n- one\n- two");
        assert!(html.contains("<strong>Key finding</strong>"));
        assert!(html.contains("<li>one</li>"));
    }

    #[test]
    fn plain_text_passes_through_as_paragraph() {
        assert_eq!(render_markdown("just text"), "<p>just text</p>\n");
    }
}
