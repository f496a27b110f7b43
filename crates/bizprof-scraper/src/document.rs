//! Document Model Adapter: raw markup to visible text, links, and the
//! element facts the extractors need.
//!
//! `scraper::Html` is not `Send`, so everything is pulled out of the tree in
//! one synchronous pass and the tree is dropped before returning.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

/// Elements whose content never counts as visible text.
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "svg", "iframe", "template", "canvas", "object", "embed",
    "video", "audio", "head",
];

/// Elements that start a new line of visible text.
const BLOCK_TAGS: &[&str] = &[
    "blockquote", "br", "dd", "div", "dl", "dt", "fieldset", "figcaption", "hr", "li", "pre",
    "tbody", "td", "th", "thead", "tr",
];

/// Block elements followed by a paragraph break.
const PARAGRAPH_TAGS: &[&str] = &[
    "address", "article", "aside", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "main", "nav", "ol", "p", "section", "table", "ul",
];

static ONCLICK_TARGET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:location(?:\.href)?|window\.open)\s*(?:=|\()\s*['"]([^'"]+)['"]"#)
        .expect("valid regex")
});

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

/// A clickable element (anchor or button) that navigates somewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub target: Url,
    /// Visible text, falling back to `aria-label` then `title`.
    pub label: String,
    /// Visible text, `aria-label`, and `title` joined, for intent matching.
    pub match_text: String,
}

/// A user-editable form control.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub placeholder: String,
    pub label: String,
}

/// Everything the extractors read from one page.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    pub visible_text: String,
    /// Every anchor target resolved against the page URL, unfiltered.
    pub links: Vec<Url>,
    pub actions: Vec<Action>,
    pub images: Vec<Url>,
    /// Raw bodies of `application/ld+json` script blocks.
    pub structured_blocks: Vec<String>,
    pub form_fields: Vec<FormField>,
    pub frame_sources: Vec<Url>,
}

/// Parses `raw` as HTML served from `page_url`.
#[must_use]
pub fn parse_document(raw: &str, page_url: &Url) -> ParsedDocument {
    let html = Html::parse_document(raw);

    let mut text = String::new();
    collect_text(html.root_element(), &mut text);

    ParsedDocument {
        visible_text: normalize_visible_text(&text),
        links: collect_links(&html, page_url),
        actions: collect_actions(&html, page_url),
        images: collect_images(&html, page_url),
        structured_blocks: collect_structured_blocks(&html),
        form_fields: collect_form_fields(&html),
        frame_sources: collect_frames(&html, page_url),
    }
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.extend(text.chars().map(|c| if c == '\n' { ' ' } else { c }));
            }
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_TAGS.contains(&name) {
                    continue;
                }
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                let is_paragraph = PARAGRAPH_TAGS.contains(&name);
                let is_block = is_paragraph || BLOCK_TAGS.contains(&name);
                if is_block {
                    out.push('\n');
                }
                collect_text(child_el, out);
                if is_paragraph {
                    out.push_str("\n\n");
                } else if is_block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Collapses runs of spaces within a line and allows at most one blank line
/// between paragraphs. Pipe separators become spaces.
///
/// Text-node newlines are folded to spaces before this runs, so line breaks
/// come only from block elements.
#[must_use]
pub fn normalize_visible_text(raw: &str) -> String {
    let replaced = raw.replace('|', " ").replace(['\r', '\u{a0}'], " ");
    let mut lines: Vec<String> = Vec::new();
    let mut pending_blank = false;
    for line in replaced.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            pending_blank = !lines.is_empty();
            continue;
        }
        if pending_blank {
            lines.push(String::new());
            pending_blank = false;
        }
        lines.push(collapsed);
    }
    lines.join("\n")
}

fn element_text(element: ElementRef<'_>) -> String {
    let joined = element.text().collect::<Vec<_>>().join(" ");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn resolve(page_url: &Url, raw: &str) -> Option<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with("javascript:") {
        return None;
    }
    page_url.join(trimmed).ok()
}

fn collect_links(html: &Html, page_url: &Url) -> Vec<Url> {
    html.select(&selector("a[href]"))
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve(page_url, href))
        .collect()
}

fn collect_actions(html: &Html, page_url: &Url) -> Vec<Action> {
    let mut actions = Vec::new();
    for el in html.select(&selector("a[href], button")) {
        let attrs = el.value();
        let raw_target = if attrs.name() == "a" {
            attrs.attr("href").map(str::to_string)
        } else {
            attrs
                .attr("formaction")
                .or_else(|| attrs.attr("data-href"))
                .or_else(|| attrs.attr("data-url"))
                .map(str::to_string)
                .or_else(|| {
                    attrs.attr("onclick").and_then(|js| {
                        ONCLICK_TARGET_RE
                            .captures(js)
                            .and_then(|c| c.get(1))
                            .map(|m| m.as_str().to_string())
                    })
                })
        };
        let Some(target) = raw_target.and_then(|t| resolve(page_url, &t)) else {
            continue;
        };

        let text = element_text(el);
        let aria = attrs.attr("aria-label").unwrap_or_default().trim();
        let title = attrs.attr("title").unwrap_or_default().trim();
        let label = [text.as_str(), aria, title]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or_default()
            .to_string();
        let match_text = [text.as_str(), aria, title]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        actions.push(Action {
            target,
            label,
            match_text,
        });
    }
    actions
}

fn collect_images(html: &Html, page_url: &Url) -> Vec<Url> {
    html.select(&selector("img"))
        .filter_map(|img| {
            img.value()
                .attr("src")
                .or_else(|| img.value().attr("data-src"))
        })
        .filter_map(|src| resolve(page_url, src))
        .collect()
}

fn collect_structured_blocks(html: &Html) -> Vec<String> {
    html.select(&selector("script[type]"))
        .filter(|script| {
            script
                .value()
                .attr("type")
                .is_some_and(|t| t.trim().to_ascii_lowercase().starts_with("application/ld+json"))
        })
        .map(|script| script.text().collect::<String>())
        .filter(|body| !body.trim().is_empty())
        .collect()
}

fn collect_form_fields(html: &Html) -> Vec<FormField> {
    let labels: HashMap<String, String> = html
        .select(&selector("label[for]"))
        .filter_map(|label| {
            let id = label.value().attr("for")?.trim().to_string();
            Some((id, element_text(label)))
        })
        .collect();

    html.select(&selector("form input, form textarea, form select"))
        .filter(|field| {
            let kind = field
                .value()
                .attr("type")
                .unwrap_or_default()
                .to_ascii_lowercase();
            !matches!(kind.as_str(), "hidden" | "submit" | "button" | "reset" | "image")
        })
        .map(|field| {
            let attrs = field.value();
            let by_id = attrs
                .attr("id")
                .and_then(|id| labels.get(id.trim()))
                .cloned();
            let wrapping = field
                .ancestors()
                .filter_map(ElementRef::wrap)
                .find(|a| a.value().name() == "label")
                .map(element_text);
            FormField {
                name: attrs.attr("name").unwrap_or_default().to_string(),
                placeholder: attrs.attr("placeholder").unwrap_or_default().to_string(),
                label: by_id.or(wrapping).unwrap_or_default(),
            }
        })
        .collect()
}

fn collect_frames(html: &Html, page_url: &Url) -> Vec<Url> {
    html.select(&selector("iframe[src]"))
        .filter_map(|frame| frame.value().attr("src"))
        .filter_map(|src| resolve(page_url, src))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("https://example.com/about/").unwrap()
    }

    #[test]
    fn visible_text_skips_scripts_and_styles() {
        let html = r#"<html><head><title>T</title><style>.a{}</style></head>
            <body><p>Hello   world</p><script>var x = 1;</script>
            <noscript>enable js</noscript><div>Second <b>line</b></div></body></html>"#;
        let doc = parse_document(html, &page());
        assert_eq!(doc.visible_text, "Hello world\n\nSecond line");
    }

    #[test]
    fn visible_text_keeps_at_most_one_blank_line() {
        assert_eq!(
            normalize_visible_text("a\n\n\n\n b  c \n\n\nd | e"),
            "a\n\nb c\n\nd e"
        );
    }

    #[test]
    fn links_are_resolved_against_page_url() {
        let html = r#"<a href="contact">C</a><a href="/menu#lunch">M</a>
            <a href="https://facebook.com/acme">F</a><a href="javascript:void(0)">J</a>"#;
        let doc = parse_document(html, &page());
        let links: Vec<&str> = doc.links.iter().map(Url::as_str).collect();
        assert_eq!(
            links,
            vec![
                "https://example.com/about/contact",
                "https://example.com/menu#lunch",
                "https://facebook.com/acme",
            ]
        );
    }

    #[test]
    fn structured_blocks_are_kept() {
        let html = r#"<script type="application/ld+json">{"@type":"Organization"}</script>
            <script type="text/javascript">ignored()</script>"#;
        let doc = parse_document(html, &page());
        assert_eq!(doc.structured_blocks, vec![r#"{"@type":"Organization"}"#]);
        assert!(doc.visible_text.is_empty());
    }

    #[test]
    fn button_targets_come_from_onclick() {
        let html = r#"<button onclick="window.location.href='/quote'" aria-label="Get a quote"></button>"#;
        let doc = parse_document(html, &page());
        assert_eq!(doc.actions.len(), 1);
        assert_eq!(doc.actions[0].target.as_str(), "https://example.com/quote");
        assert_eq!(doc.actions[0].label, "Get a quote");
    }

    #[test]
    fn form_fields_pick_up_labels() {
        let html = r#"<form><label for="em">Your Email</label><input id="em" type="email">
            <label>Phone <input name="tel"></label><input type="hidden" name="token">
            <textarea placeholder="How can we help?"></textarea></form>"#;
        let doc = parse_document(html, &page());
        assert_eq!(doc.form_fields.len(), 3);
        assert_eq!(doc.form_fields[0].label, "Your Email");
        assert_eq!(doc.form_fields[1].name, "tel");
        assert_eq!(doc.form_fields[1].label, "Phone");
        assert_eq!(doc.form_fields[2].placeholder, "How can we help?");
    }

    #[test]
    fn images_and_frames_are_resolved() {
        let html = r#"<img src="/img/bbb-seal.png"><img data-src="lazy.jpg">
            <iframe src="https://form.jotform.com/123"></iframe>"#;
        let doc = parse_document(html, &page());
        assert_eq!(doc.images[0].as_str(), "https://example.com/img/bbb-seal.png");
        assert_eq!(doc.images[1].as_str(), "https://example.com/about/lazy.jpg");
        assert_eq!(doc.frame_sources[0].host_str(), Some("form.jotform.com"));
    }
}
