//! Docusaurus sites. Content is the first `article` (or `main`); pages carry a sidebar ToC,
//! breadcrumbs, pager, edit links, and `#` hash-links inside every heading.

use super::{first_code, select_first, HeadingRules, SiteRules};
use crate::extract::{Cleanup, TextPattern};
use scraper::{ElementRef, Html};

pub static RULES: SiteRules = SiteRules {
    name: "docusaurus",
    select_content,
    cleanup: &[
        Cleanup::Text {
            pattern: TextPattern::Exact("On this page"),
            owner: None,
            containers: &["div", "span", "aside", "li"],
        },
        Cleanup::Class {
            tag: Some("nav"),
            contains: "pagination",
            ignore_case: false,
        },
        Cleanup::Text {
            pattern: TextPattern::Contains(&["Edit this page", "Редактировать"]),
            owner: Some("a"),
            containers: &["div", "footer"],
        },
        Cleanup::Class {
            tag: Some("button"),
            contains: "copy",
            ignore_case: true,
        },
        Cleanup::Attr {
            tag: Some("nav"),
            name: "aria-label",
            value: "Breadcrumbs",
        },
        Cleanup::Class {
            tag: Some("div"),
            contains: "tableOfContents",
            ignore_case: false,
        },
        Cleanup::Tag("footer"),
    ],
    headings: HeadingRules {
        levels: 1..=4,
        strip: strip_from_heading,
    },
    code_element: first_code,
    dedup_leading_heading: true,
    trailing_noise: &[],
};

fn select_content(doc: &Html) -> Option<ElementRef<'_>> {
    select_first(doc, "article")
        .or_else(|| select_first(doc, "main"))
        .or_else(|| select_first(doc, r#"div[class*="docMainContainer"]"#))
}

/// Hash-links and their icons; the heading text itself is left alone.
fn strip_from_heading(el: ElementRef<'_>) -> bool {
    let v = el.value();
    match v.name() {
        "a" => {
            v.attr("class").is_some_and(|c| c.contains("hash-link"))
                || v.attr("aria-hidden") == Some("true")
        }
        "svg" => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_article_over_main() {
        let doc = Html::parse_document(
            "<html><body><main><article><p>a</p></article></main></body></html>",
        );
        assert_eq!(select_content(&doc).map(|n| n.value().name()), Some("article"));
    }

    #[test]
    fn falls_back_to_main_then_container() {
        let doc = Html::parse_document("<html><body><main><p>a</p></main></body></html>");
        assert_eq!(select_content(&doc).map(|n| n.value().name()), Some("main"));

        let doc = Html::parse_document(
            r#"<html><body><div class="docMainContainer_abc"><p>a</p></div></body></html>"#,
        );
        assert_eq!(select_content(&doc).map(|n| n.value().name()), Some("div"));

        let doc = Html::parse_document("<html><body><div><p>a</p></div></body></html>");
        assert!(select_content(&doc).is_none());
    }

    #[test]
    fn hash_link_is_stripped_but_plain_link_kept() {
        let doc = Html::parse_fragment(
            r##"<h2>Setup <a class="hash-link" href="#setup">#</a><a href="/x">x</a></h2>"##,
        );
        let links: Vec<bool> = select_first(&doc, "h2")
            .map(|h| {
                h.children()
                    .filter_map(ElementRef::wrap)
                    .map(strip_from_heading)
                    .collect()
            })
            .unwrap_or_default();
        assert_eq!(links, vec![true, false]);
    }
}
