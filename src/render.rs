//! Markdown rendering of a pruned content node.
//!
//! A single depth-first walk. Headings and code blocks go through the site family's
//! rules; everything else uses the generic block/inline conversion below. Output is not
//! yet normalized; see [crate::postprocess].

use crate::client::Fetch;
use crate::extract::collapse_whitespace;
use crate::images::{is_decorative, ImageResolver};
use crate::site::SiteRules;
use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::ElementRef;

/// Where images are localized while rendering one page.
pub struct ImageContext<'r> {
    pub resolver: &'r mut ImageResolver,
    pub fetcher: &'r mut dyn Fetch,
    pub slug: &'r str,
}

/// Renders content nodes to Markdown with one family's rules.
pub struct Renderer<'r> {
    rules: &'static SiteRules,
    images: Option<ImageContext<'r>>,
}

impl<'r> Renderer<'r> {
    /// Renderer that leaves image URLs as they appear in the page.
    pub fn new(rules: &'static SiteRules) -> Self {
        Self {
            rules,
            images: None,
        }
    }

    /// Download images through `ctx` and reference the local copies.
    pub fn with_images(mut self, ctx: ImageContext<'r>) -> Self {
        self.images = Some(ctx);
        self
    }

    /// Markdown for the children of `root` (the content element itself adds nothing).
    pub fn render(&mut self, root: ElementRef<'_>) -> String {
        self.children(*root)
    }

    fn node(&mut self, node: NodeRef<'_, Node>) -> String {
        match node.value() {
            Node::Text(t) => {
                let text = inline_text(t);
                if opens_block(node) {
                    escape_leading_hash(&text)
                } else {
                    text
                }
            }
            Node::Element(_) => match ElementRef::wrap(node) {
                Some(el) => self.element(el),
                None => String::new(),
            },
            Node::Document | Node::Fragment => self.children(node),
            _ => String::new(),
        }
    }

    fn children(&mut self, node: NodeRef<'_, Node>) -> String {
        let mut out = String::new();
        for child in node.children() {
            out.push_str(&self.node(child));
        }
        out
    }

    fn element(&mut self, el: ElementRef<'_>) -> String {
        let name = el.value().name();
        if let Some(level) = heading_level(name) {
            return if self.rules.headings.levels.contains(&level) {
                self.family_heading(el, level)
            } else {
                self.generic_heading(el, level)
            };
        }
        match name {
            "pre" => self.code_block(el),
            "code" => self.inline_code(el),
            "img" => self.image(el),
            "p" | "div" | "section" | "article" | "main" | "header" | "figure" | "figcaption"
            | "details" | "summary" | "dl" | "dt" | "dd" | "address" | "li" => {
                let inner = self.children(*el);
                block(&inner)
            }
            "br" => "\n".to_string(),
            "hr" => "\n\n---\n\n".to_string(),
            "strong" | "b" => self.emphasis(el, "**"),
            "em" | "i" => self.emphasis(el, "*"),
            "del" | "s" => self.emphasis(el, "~~"),
            "a" => self.link(el),
            "ul" => self.list(el, false),
            "ol" => self.list(el, true),
            "blockquote" => self.blockquote(el),
            "table" => block(&html2md::parse_html(&el.html())),
            "script" | "style" | "noscript" | "template" | "svg" | "head" | "title" | "meta"
            | "link" | "button" => String::new(),
            _ => self.children(*el),
        }
    }

    /// Family-handled heading: stripped children removed, plain text only.
    fn family_heading(&mut self, el: ElementRef<'_>, level: u8) -> String {
        let mut raw = String::new();
        heading_text(el, self.rules.headings.strip, &mut raw);
        let text = collapse_whitespace(&raw);
        if text.is_empty() {
            return String::new();
        }
        format!("\n\n{} {}\n\n", "#".repeat(level as usize), text)
    }

    fn generic_heading(&mut self, el: ElementRef<'_>, level: u8) -> String {
        let inner = self.children(*el);
        let text = collapse_whitespace(&inner);
        if text.is_empty() {
            return String::new();
        }
        format!("\n\n{} {}\n\n", "#".repeat(level as usize), text)
    }

    fn code_block(&mut self, pre: ElementRef<'_>) -> String {
        match (self.rules.code_element)(pre) {
            Some(code) => {
                let lang = language_of(code).or_else(|| language_of(pre)).unwrap_or("");
                let text = normalize_code(&code_text(code));
                format!("\n\n```{}\n{}\n```\n\n", lang, text)
            }
            None => {
                let text = normalize_code(&code_text(pre));
                format!("\n\n```\n{}\n```\n\n", text)
            }
        }
    }

    fn inline_code(&mut self, el: ElementRef<'_>) -> String {
        let in_pre = el
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|a| a.value().name() == "pre");
        if in_pre {
            return el.text().collect();
        }
        let img = el
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == "img");
        if let Some(img) = img {
            return self.image(img);
        }
        let text = el
            .text()
            .collect::<String>()
            .replace('\u{a0}', " ")
            .replace('\n', " ");
        let text = text.trim();
        if text.is_empty() {
            String::new()
        } else if text.contains('`') {
            format!("`` {} ``", text)
        } else {
            format!("`{}`", text)
        }
    }

    fn image(&mut self, img: ElementRef<'_>) -> String {
        let v = img.value();
        let src = v.attr("src").unwrap_or("").trim();
        if src.is_empty() || is_decorative(v.attr("width"), v.attr("height")) {
            return String::new();
        }
        let alt = collapse_whitespace(v.attr("alt").unwrap_or(""));
        let target = match self.images.as_mut() {
            Some(ctx) => match ctx.resolver.resolve(&mut *ctx.fetcher, src, ctx.slug) {
                Ok(asset) => asset.local_path,
                Err(e) => {
                    log::warn!("Image not saved, keeping remote URL: {}", e);
                    src.to_string()
                }
            },
            None => src.to_string(),
        };
        format!("![{}]({})\n\n", alt, target)
    }

    fn emphasis(&mut self, el: ElementRef<'_>, marker: &str) -> String {
        let inner = self.children(*el);
        let text = inner.trim();
        if text.is_empty() {
            return if inner.is_empty() { String::new() } else { " ".to_string() };
        }
        let (lead, trail) = edge_spaces(&inner);
        format!("{}{}{}{}{}", lead, marker, text, marker, trail)
    }

    fn link(&mut self, el: ElementRef<'_>) -> String {
        let inner = self.children(*el);
        let text = inner.trim();
        let href = el.value().attr("href").unwrap_or("").trim();
        if text.is_empty() {
            return String::new();
        }
        if href.is_empty() || href.starts_with("javascript:") {
            return inner;
        }
        let (lead, trail) = edge_spaces(&inner);
        format!("{}[{}]({}){}", lead, text, href, trail)
    }

    fn list(&mut self, el: ElementRef<'_>, ordered: bool) -> String {
        let start = if ordered {
            el.value()
                .attr("start")
                .and_then(|s| s.trim().parse::<usize>().ok())
                .unwrap_or(1)
        } else {
            1
        };
        let items: Vec<ElementRef<'_>> = el
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|c| c.value().name() == "li")
            .collect();
        let mut rendered = Vec::with_capacity(items.len());
        for (i, li) in items.into_iter().enumerate() {
            let marker = if ordered {
                format!("{}. ", start.saturating_add(i))
            } else {
                "- ".to_string()
            };
            let body = squeeze_blank_lines(&self.children(*li));
            rendered.push(indent_continuation(&marker, body.trim()));
        }
        if rendered.is_empty() {
            return String::new();
        }
        format!("\n\n{}\n\n", rendered.join("\n"))
    }

    fn blockquote(&mut self, el: ElementRef<'_>) -> String {
        let inner = squeeze_blank_lines(&self.children(*el));
        let text = inner.trim();
        if text.is_empty() {
            return String::new();
        }
        let quoted: Vec<String> = text
            .lines()
            .map(|l| {
                if l.trim().is_empty() {
                    ">".to_string()
                } else {
                    format!("> {}", l)
                }
            })
            .collect();
        format!("\n\n{}\n\n", quoted.join("\n"))
    }
}

fn heading_level(name: &str) -> Option<u8> {
    let digit = name.strip_prefix('h')?;
    match digit.parse::<u8>() {
        Ok(n @ 1..=6) => Some(n),
        _ => None,
    }
}

fn heading_text(el: ElementRef<'_>, strip: fn(ElementRef<'_>) -> bool, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(t) => out.push_str(t),
            Node::Element(_) => {
                if let Some(c) = ElementRef::wrap(child) {
                    if !strip(c) {
                        heading_text(c, strip, out);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Text of a code element with `br` as a newline (Prism emits one `br` per token line).
fn code_text(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in el.descendants() {
        match node.value() {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) if e.name() == "br" => out.push('\n'),
            _ => {}
        }
    }
    out
}

/// True when nothing but whitespace precedes `node` among its siblings.
fn opens_block(node: NodeRef<'_, Node>) -> bool {
    node.prev_siblings().all(|s| match s.value() {
        Node::Text(t) => t.trim().is_empty(),
        Node::Comment(_) => true,
        _ => false,
    })
}

/// A `#` at the start of paragraph text would read as a heading.
fn escape_leading_hash(text: &str) -> String {
    let rest = text.trim_start();
    if rest.starts_with('#') {
        format!("{}\\{}", &text[..text.len() - rest.len()], rest)
    } else {
        text.to_string()
    }
}

/// `language-xyz` class on the element, if any.
fn language_of<'a>(el: ElementRef<'a>) -> Option<&'a str> {
    el.value()
        .classes()
        .find_map(|c| c.strip_prefix("language-"))
        .filter(|l| !l.is_empty())
}

/// Non-breaking spaces become spaces, lines lose trailing whitespace, and blank lines at
/// either end are dropped. Leading indentation is kept.
fn normalize_code(raw: &str) -> String {
    let lines: Vec<&str> = raw.split('\n').map(str::trim_end).collect();
    let joined = lines.join("\n").replace('\u{a0}', " ");
    let lines: Vec<&str> = joined.split('\n').map(str::trim_end).collect();
    lines.join("\n").trim_matches('\n').to_string()
}

/// Whitespace runs collapse to one space; leading and trailing whitespace survive as a space.
fn inline_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() && ch != '\u{a0}' {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

/// At most one blank line in a row, so nested blocks indent or quote cleanly.
fn squeeze_blank_lines(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut newlines = 0;
    for ch in s.chars() {
        if ch == '\n' {
            newlines += 1;
            if newlines > 2 {
                continue;
            }
        } else {
            newlines = 0;
        }
        out.push(ch);
    }
    out
}

fn block(inner: &str) -> String {
    let text = inner.trim();
    if text.is_empty() {
        String::new()
    } else {
        format!("\n\n{}\n\n", text)
    }
}

fn edge_spaces(s: &str) -> (&'static str, &'static str) {
    let lead = if s.starts_with(char::is_whitespace) { " " } else { "" };
    let trail = if s.ends_with(char::is_whitespace) { " " } else { "" };
    (lead, trail)
}

/// Prefix the first line with `marker`; indent the rest to line up under it.
fn indent_continuation(marker: &str, body: &str) -> String {
    let pad = " ".repeat(marker.len());
    let mut lines = body.lines();
    let mut out = format!("{}{}", marker, lines.next().unwrap_or(""));
    for line in lines {
        out.push('\n');
        if !line.trim().is_empty() {
            out.push_str(&pad);
            out.push_str(line);
        }
    }
    out
}
