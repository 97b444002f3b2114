//! Timeweb Cloud knowledge base. Content lives in `[itemprop=articleBody]`; headings carry
//! permalink anchors and hover wrappers; code blocks are highlight.js output.

use super::{first_code, select_first, HeadingRules, SiteRules};
use crate::extract::{Cleanup, TextPattern};
use scraper::{ElementRef, Html};

pub static RULES: SiteRules = SiteRules {
    name: "timeweb",
    select_content,
    cleanup: &[
        Cleanup::Class {
            tag: Some("div"),
            contains: "copyButton",
            ignore_case: false,
        },
        Cleanup::Class {
            tag: Some("div"),
            contains: "qr",
            ignore_case: true,
        },
        Cleanup::Feedback {
            pattern: TextPattern::Contains(&["Была ли статья полезна"]),
            card_class: "twCard",
            heading: "h5",
        },
    ],
    headings: HeadingRules {
        levels: 2..=4,
        strip: strip_from_heading,
    },
    code_element,
    dedup_leading_heading: false,
    trailing_noise: &["Пока нет комментариев"],
};

fn select_content(doc: &Html) -> Option<ElementRef<'_>> {
    select_first(doc, r#"[itemprop="articleBody"]"#)
}

/// Every link, icon, and nested wrapper goes; only the heading's own text stays.
fn strip_from_heading(el: ElementRef<'_>) -> bool {
    matches!(el.value().name(), "a" | "svg" | "div")
}

/// Prefer the highlighted code element when a block carries both raw and highlighted copies.
fn code_element(pre: ElementRef<'_>) -> Option<ElementRef<'_>> {
    pre.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "code" && e.value().attr("data-highlighted") == Some("yes"))
        .or_else(|| first_code(pre))
}
