// SPDX-License-Identifier: MIT
// Copyright 2026 SEQHER Web Team

//! Server-side HTML for program pages.

use crate::models::{PageMetadata, ProgramView};
use std::fmt::Write;

/// Escape text for HTML element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Full detail page for one program.
pub fn render_program_page(view: &ProgramView, metadata: &PageMetadata) -> String {
    let mut body = String::new();

    body.push_str("<article class=\"program\">\n");
    body.push_str("<a class=\"back-link\" href=\"/programs\">&larr; Back to Programs</a>\n");
    let _ = writeln!(body, "<h1>{}</h1>", escape_html(&view.title));

    if !view.tags.is_empty() {
        body.push_str("<ul class=\"badges\">\n");
        for tag in &view.tags {
            let _ = writeln!(body, "<li class=\"badge\">{}</li>", escape_html(tag));
        }
        body.push_str("</ul>\n");
    }

    if let Some(image) = &view.image {
        let _ = writeln!(
            body,
            "<img class=\"hero\" src=\"{}\" alt=\"{}\" data-ai-hint=\"{}\">",
            escape_html(&image.url),
            escape_html(&view.title),
            escape_html(&image.hint)
        );
    }

    let _ = writeln!(body, "<p class=\"lead\">{}</p>", escape_html(&view.summary));
    let _ = writeln!(
        body,
        "<div class=\"description\">{}</div>",
        escape_html(&view.description)
    );

    body.push_str(concat!(
        "<section class=\"get-involved\">\n",
        "<h2>Get Involved</h2>\n",
        "<p>Your support keeps this program running.</p>\n",
        "<a class=\"button\" href=\"/donate\">Donate Now</a>\n",
        "<a class=\"button secondary\" href=\"/appointment\">Volunteer</a>\n",
        "</section>\n",
    ));
    body.push_str("</article>\n");

    document(metadata, &body)
}

/// Page shown for unknown program ids.
pub fn render_not_found() -> String {
    let metadata = PageMetadata::not_found();
    let body = concat!(
        "<section class=\"not-found\">\n",
        "<h1>Program Not Found</h1>\n",
        "<p>The program you are looking for does not exist or has been removed.</p>\n",
        "<a href=\"/programs\">See all programs</a>\n",
        "</section>\n",
    );
    document(&metadata, body)
}

fn document(metadata: &PageMetadata, body: &str) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape_html(&metadata.title));
    if let Some(description) = &metadata.description {
        let _ = writeln!(
            html,
            "<meta name=\"description\" content=\"{}\">",
            escape_html(description)
        );
    }
    html.push_str("</head>\n<body>\n<main>\n");
    html.push_str(body);
    html.push_str("</main>\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProgramImage;

    fn view() -> ProgramView {
        ProgramView {
            id: "clean-water".to_string(),
            title: "Clean <Water>".to_string(),
            summary: "Wells & pumps".to_string(),
            description: "Built with \"local\" crews".to_string(),
            tags: vec!["SDG 6".to_string()],
            image: Some(ProgramImage {
                url: "https://images.example.org/water.jpg".to_string(),
                hint: "water well".to_string(),
            }),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_program_page_content() {
        let metadata = PageMetadata {
            title: "Clean <Water> | SEQHER".to_string(),
            description: Some("Wells & pumps".to_string()),
        };
        let html = render_program_page(&view(), &metadata);

        assert!(html.contains("<title>Clean &lt;Water&gt; | SEQHER</title>"));
        assert!(html.contains("<meta name=\"description\" content=\"Wells &amp; pumps\">"));
        assert!(html.contains("<h1>Clean &lt;Water&gt;</h1>"));
        assert!(html.contains("<li class=\"badge\">SDG 6</li>"));
        assert!(html.contains("src=\"https://images.example.org/water.jpg\""));
        assert!(html.contains("href=\"/programs\""));
        assert!(html.contains("href=\"/donate\""));
        assert!(html.contains("href=\"/appointment\">Volunteer</a>"));
        assert!(html.contains("&quot;local&quot;"));
        assert!(!html.contains("<Water>"));
    }

    #[test]
    fn test_program_page_without_image_or_tags() {
        let mut view = view();
        view.image = None;
        view.tags.clear();
        let html = render_program_page(&view, &PageMetadata::not_found());

        assert!(!html.contains("<img"));
        assert!(!html.contains("class=\"badges\""));
    }

    #[test]
    fn test_not_found_page() {
        let html = render_not_found();
        assert!(html.contains("<title>Program Not Found</title>"));
        assert!(!html.contains("name=\"description\""));
    }
}
