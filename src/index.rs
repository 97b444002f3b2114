//! Table of contents for one source: unsectioned pages first, then one `###` block per
//! top-level slug segment.

use crate::model::IndexEntry;
use crate::slug::section_of;
use std::collections::BTreeMap;

const INTRO: &str = "Table of contents for all documentation pages.";

/// Markdown for `index.md`. Entries keep their order inside each group.
pub fn build_index(entries: &[IndexEntry], title: &str) -> String {
    let mut top: Vec<&IndexEntry> = Vec::new();
    let mut sections: BTreeMap<&str, Vec<&IndexEntry>> = BTreeMap::new();
    for entry in entries {
        match section_of(&entry.slug) {
            Some(section) => sections.entry(section).or_default().push(entry),
            None => top.push(entry),
        }
    }

    let mut lines = vec![format!("# {}", title), String::new(), INTRO.to_string(), String::new()];

    if !top.is_empty() {
        lines.extend(top.iter().map(|e| entry_line(e)));
        lines.push(String::new());
    }

    for (section, group) in &sections {
        lines.push(format!("### {}", section_heading(section)));
        lines.push(String::new());
        lines.extend(group.iter().map(|e| entry_line(e)));
        lines.push(String::new());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn entry_line(entry: &IndexEntry) -> String {
    format!("- [{}]({}.md)", entry.title, entry.slug)
}

/// Hyphens become spaces; every letter that follows a non-letter is uppercased and
/// the rest lowercased (`k8s-addons` -> `K8S Addons`).
pub fn section_heading(section: &str) -> String {
    let mut out = String::with_capacity(section.len());
    let mut prev_alpha = false;
    for ch in section.chars() {
        let ch = if ch == '-' { ' ' } else { ch };
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}
