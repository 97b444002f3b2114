//! Content extraction: pick the content node for a site family, then prune boilerplate.
//!
//! Pruning is two-pass. [plan_removals] is a read-only query over the parsed page that
//! returns node ids; [prune] applies them to a cloned tree. The original document is
//! never mutated while it is being walked.

use crate::error::ExtractionError;
use crate::site::{SiteRules, SHARED_CLEANUP};
use ego_tree::{NodeId, NodeRef};
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// How a cleanup rule recognizes text.
#[derive(Debug, Clone, Copy)]
pub enum TextPattern {
    /// Whole text node, ignoring surrounding whitespace.
    Exact(&'static str),
    /// Text node containing any of the needles.
    Contains(&'static [&'static str]),
}

impl TextPattern {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            TextPattern::Exact(s) => text.trim() == *s,
            TextPattern::Contains(needles) => needles.iter().any(|n| text.contains(n)),
        }
    }
}

/// One boilerplate-removal rule, applied to every descendant of the content node.
#[derive(Debug, Clone, Copy)]
pub enum Cleanup {
    /// Every element with this tag name.
    Tag(&'static str),
    /// Elements (optionally of one tag) whose class attribute contains a substring.
    Class {
        tag: Option<&'static str>,
        contains: &'static str,
        ignore_case: bool,
    },
    /// Elements (optionally of one tag) carrying an exact attribute value.
    Attr {
        tag: Option<&'static str>,
        name: &'static str,
        value: &'static str,
    },
    /// Text matching `pattern`. With `owner`, the text's parent must be that tag and the
    /// parent is the removal target; otherwise the text node itself is. The target's parent
    /// is removed instead when its tag is listed in `containers`.
    Text {
        pattern: TextPattern,
        owner: Option<&'static str>,
        containers: &'static [&'static str],
    },
    /// Feedback widget anchored on `pattern`: the nearest ancestor whose class contains
    /// `card_class`, or a `section` sitting directly under the content node. Failing both,
    /// the enclosing `heading` element together with every following sibling.
    Feedback {
        pattern: TextPattern,
        card_class: &'static str,
        heading: &'static str,
    },
}

/// Pruned copy of a page with the content node's id.
#[derive(Debug, Clone)]
pub struct ContentNode {
    doc: Html,
    root: NodeId,
}

impl ContentNode {
    /// The content element inside the pruned tree.
    pub fn root(&self) -> ElementRef<'_> {
        self.doc
            .tree
            .get(self.root)
            .and_then(ElementRef::wrap)
            .unwrap_or_else(|| self.doc.root_element())
    }

    pub fn html(&self) -> String {
        self.root().html()
    }
}

/// Select the content node with the family's selector and strip boilerplate.
pub fn extract_content(
    doc: &Html,
    rules: &SiteRules,
    url: &str,
) -> Result<ContentNode, ExtractionError> {
    let node = (rules.select_content)(doc).ok_or_else(|| ExtractionError::NoContent {
        url: url.to_string(),
        family: rules.name,
    })?;
    let mut removals = plan_removals(node, SHARED_CLEANUP);
    removals.extend(plan_removals(node, rules.cleanup));
    Ok(prune(doc, node.id(), &removals))
}

/// Text of the first `h1` anywhere in the document, whitespace collapsed.
pub fn page_title(doc: &Html) -> Option<String> {
    let sel = Selector::parse("h1").ok()?;
    doc.select(&sel)
        .next()
        .map(|h| collapse_whitespace(&h.text().collect::<String>()))
        .filter(|t| !t.is_empty())
}

/// Ids of the subtrees under `root` that the rules remove. `root` itself is never included.
pub fn plan_removals(root: ElementRef<'_>, rules: &[Cleanup]) -> Vec<NodeId> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let mut push = |id: NodeId| {
        if id != root.id() && seen.insert(id) {
            out.push(id);
        }
    };
    for rule in rules {
        match *rule {
            Cleanup::Tag(tag) => {
                for el in elements_below(root) {
                    if el.value().name() == tag {
                        push(el.id());
                    }
                }
            }
            Cleanup::Class {
                tag,
                contains,
                ignore_case,
            } => {
                for el in elements_below(root) {
                    if !tag_matches(el, tag) {
                        continue;
                    }
                    let class = el.value().attr("class").unwrap_or("");
                    let hit = if ignore_case {
                        class
                            .to_lowercase()
                            .contains(&contains.to_lowercase())
                    } else {
                        class.contains(contains)
                    };
                    if hit {
                        push(el.id());
                    }
                }
            }
            Cleanup::Attr { tag, name, value } => {
                for el in elements_below(root) {
                    if tag_matches(el, tag) && el.value().attr(name) == Some(value) {
                        push(el.id());
                    }
                }
            }
            Cleanup::Text {
                pattern,
                owner,
                containers,
            } => {
                for text in matching_text(root, pattern) {
                    let target = match owner {
                        Some(tag) => match text.parent().and_then(ElementRef::wrap) {
                            Some(parent) if parent.value().name() == tag => *parent,
                            _ => continue,
                        },
                        None => text,
                    };
                    let container = target
                        .parent()
                        .and_then(ElementRef::wrap)
                        .filter(|p| p.id() != root.id())
                        .filter(|p| containers.contains(&p.value().name()));
                    match container {
                        Some(c) => push(c.id()),
                        None => push(target.id()),
                    }
                }
            }
            Cleanup::Feedback {
                pattern,
                card_class,
                heading,
            } => {
                for text in matching_text(root, pattern) {
                    if let Some(card) = feedback_card(root, text, card_class) {
                        push(card);
                        continue;
                    }
                    let enclosing = text
                        .ancestors()
                        .take_while(|a| a.id() != root.id())
                        .filter_map(ElementRef::wrap)
                        .find(|a| a.value().name() == heading);
                    if let Some(h) = enclosing {
                        for sibling in h.next_siblings() {
                            push(sibling.id());
                        }
                        push(h.id());
                    }
                }
            }
        }
    }
    out
}

/// Clone `doc`, detach every planned node, and point at the content node in the copy.
pub fn prune(doc: &Html, content: NodeId, removals: &[NodeId]) -> ContentNode {
    let mut copy = doc.clone();
    for id in removals {
        if let Some(mut node) = copy.tree.get_mut(*id) {
            node.detach();
        }
    }
    ContentNode {
        doc: copy,
        root: content,
    }
}

pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn elements_below<'a>(root: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    root.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
}

fn tag_matches(el: ElementRef<'_>, tag: Option<&str>) -> bool {
    tag.map_or(true, |t| el.value().name() == t)
}

fn matching_text<'a>(
    root: ElementRef<'a>,
    pattern: TextPattern,
) -> impl Iterator<Item = NodeRef<'a, Node>> {
    root.descendants().filter(move |n| match n.value() {
        Node::Text(t) => pattern.matches(t),
        _ => false,
    })
}

fn feedback_card(root: ElementRef<'_>, text: NodeRef<'_, Node>, card_class: &str) -> Option<NodeId> {
    text.ancestors()
        .take_while(|a| a.id() != root.id())
        .filter_map(ElementRef::wrap)
        .find(|a| {
            let class = a.value().attr("class").unwrap_or("");
            let top_section = a.value().name() == "section"
                && a.parent().map(|p| p.id()) == Some(root.id());
            class.contains(card_class) || top_section
        })
        .map(|a| a.id())
}
