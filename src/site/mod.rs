//! Site families. Each family is a fixed bundle of selection, cleanup, and rendering rules;
//! the shared extractor and renderer only ever call through [SiteRules].

pub mod docusaurus;
pub mod timeweb;

use crate::extract::Cleanup;
use scraper::{ElementRef, Html};
use serde::Deserialize;
use std::ops::RangeInclusive;

/// Markup family of a documentation site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteFamily {
    /// Timeweb Cloud knowledge base (`itemprop="articleBody"`).
    Timeweb,
    /// Docusaurus-generated sites.
    Docusaurus,
}

impl SiteFamily {
    pub fn rules(self) -> &'static SiteRules {
        match self {
            SiteFamily::Timeweb => &timeweb::RULES,
            SiteFamily::Docusaurus => &docusaurus::RULES,
        }
    }

    pub fn name(self) -> &'static str {
        self.rules().name
    }

    pub fn parse(s: &str) -> Option<SiteFamily> {
        match s.to_lowercase().as_str() {
            "timeweb" => Some(SiteFamily::Timeweb),
            "docusaurus" => Some(SiteFamily::Docusaurus),
            _ => None,
        }
    }
}

/// Heading levels a family renders itself, and which nested nodes it strips from them.
pub struct HeadingRules {
    pub levels: RangeInclusive<u8>,
    /// True for anchor links, icons, and hover-control wrappers inside a heading.
    pub strip: fn(ElementRef<'_>) -> bool,
}

/// Everything that varies between families.
pub struct SiteRules {
    pub name: &'static str,
    pub select_content: for<'a> fn(&'a Html) -> Option<ElementRef<'a>>,
    /// Applied after [SHARED_CLEANUP].
    pub cleanup: &'static [Cleanup],
    pub headings: HeadingRules,
    /// The code element inside a `pre` block.
    pub code_element: for<'a> fn(ElementRef<'a>) -> Option<ElementRef<'a>>,
    /// Drop the first of two leading top-level headings.
    pub dedup_leading_heading: bool,
    /// Lines removed from the end of the rendered body (site widgets rendered as text).
    pub trailing_noise: &'static [&'static str],
}

/// Cleanup every family gets: navigation, chrome, and non-content markup.
pub const SHARED_CLEANUP: &[Cleanup] = &[
    Cleanup::Tag("nav"),
    Cleanup::Tag("footer"),
    Cleanup::Tag("aside"),
    Cleanup::Tag("button"),
    Cleanup::Tag("script"),
    Cleanup::Tag("style"),
    Cleanup::Tag("noscript"),
    Cleanup::Tag("svg"),
    Cleanup::Tag("template"),
];

/// First descendant `code` element, if any.
pub(crate) fn first_code(pre: ElementRef<'_>) -> Option<ElementRef<'_>> {
    pre.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "code")
}

/// First element matching a CSS selector.
pub(crate) fn select_first<'a>(doc: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let sel = scraper::Selector::parse(css).ok()?;
    doc.select(&sel).next()
}
