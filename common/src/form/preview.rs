//! Markdown preview of the description field.

use pulldown_cmark::{html, CowStr, Event, Parser, Tag};

/// Renders `text` as HTML. Raw HTML in the source is shown as text, and link
/// or image targets outside [`is_safe_link`] are emptied.
pub fn markdown_preview(text: &str) -> String {
    let parser = Parser::new(text).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) if !is_safe_link(&dest_url) => Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::Borrowed(""),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) if !is_safe_link(&dest_url) => Event::Start(Tag::Image {
            link_type,
            dest_url: CowStr::Borrowed(""),
            title,
            id,
        }),
        other => other,
    });
    let mut output = String::new();
    html::push_html(&mut output, parser);
    output
}

/// Web and mail URLs, or references relative to the page.
pub fn is_safe_link(dest: &str) -> bool {
    match url::Url::parse(dest.trim()) {
        Ok(url) => matches!(url.scheme(), "http" | "https" | "mailto"),
        Err(url::ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_links_lose_their_target() {
        for text in [
            "[x](javascript:alert(1))",
            "[x](JavaScript:alert(1))",
            "[x](data:text/html,hi)",
        ] {
            let html = markdown_preview(text);
            assert!(!html.to_lowercase().contains("script:"), "{text} -> {html}");
            assert!(!html.contains("data:"), "{text} -> {html}");
        }
        assert_eq!(
            markdown_preview("[x](javascript:alert(1))"),
            "<p><a href=\"\">x</a></p>\n"
        );
        // Autolinks keep their text but not the target.
        assert!(markdown_preview("<javascript:alert(1)>").contains("href=\"\""));
    }

    #[test]
    fn image_sources_are_filtered_too() {
        let html = markdown_preview("![pic](javascript:alert(1))");
        assert!(html.contains("src=\"\""), "{html}");
    }

    #[test]
    fn ordinary_links_are_kept() {
        let html = markdown_preview("[shop](https://example.com/board) and [notes](./notes.md)");
        assert!(html.contains("href=\"https://example.com/board\""));
        assert!(html.contains("href=\"./notes.md\""));
        assert!(markdown_preview("[mail](mailto:a@example.com)").contains("mailto:a@example.com"));
    }

    #[test]
    fn raw_html_is_escaped() {
        let html = markdown_preview("<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn link_rules() {
        assert!(is_safe_link("https://example.com"));
        assert!(is_safe_link("/devices/plug"));
        assert!(is_safe_link("#wiring"));
        assert!(!is_safe_link("javascript:void(0)"));
        assert!(!is_safe_link("vbscript:msgbox"));
        assert!(!is_safe_link(" javascript:alert(1)"));
    }
}
