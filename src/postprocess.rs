//! Text-level cleanup of rendered Markdown and the leading-title guarantee.

use crate::model::RenderedDocument;
use crate::site::SiteRules;

/// Right-trim every line, collapse runs of blank lines to one, trim the whole text.
pub fn clean_markdown(md: &str) -> String {
    let mut out = String::with_capacity(md.len());
    let mut blank_run = 0usize;
    for line in md.split('\n') {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim().to_string()
}

/// Turn a rendered body into a finished document: cleaned text, family noise removed,
/// a duplicated title dropped, and exactly one leading `# ` heading (`fallback_title`
/// when the body has none).
pub fn finish_document(
    slug: &str,
    body: &str,
    fallback_title: &str,
    rules: &SiteRules,
) -> RenderedDocument {
    let mut text = clean_markdown(body);

    for noise in rules.trailing_noise {
        if let Some(rest) = text.strip_suffix(noise) {
            text = rest.trim_end().to_string();
        }
    }

    if rules.dedup_leading_heading {
        text = drop_duplicate_title(&text);
    }

    let markdown = if text.starts_with("# ") {
        format!("{}\n", text)
    } else if text.is_empty() {
        format!("# {}\n", fallback_title)
    } else {
        format!("# {}\n\n{}\n", fallback_title, text)
    };
    let title = leading_title(&markdown).unwrap_or(fallback_title).to_string();

    RenderedDocument {
        slug: slug.to_string(),
        title,
        markdown,
    }
}

/// A pre-rendered Markdown document: trimmed, title taken from a leading `# ` line.
pub fn finish_raw(slug: &str, text: &str) -> RenderedDocument {
    let text = text.trim();
    let title = leading_title(text).unwrap_or(slug).to_string();
    RenderedDocument {
        slug: slug.to_string(),
        title,
        markdown: format!("{}\n", text),
    }
}

/// Text of the first line when it is a top-level heading.
pub fn leading_title(md: &str) -> Option<&str> {
    md.lines()
        .next()
        .and_then(|l| l.strip_prefix("# "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// `# A`, blank, `# B`, then something that is not a third heading: keep from `# B`.
fn drop_duplicate_title(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let is_h1 = |i: usize| lines.get(i).is_some_and(|l| l.starts_with("# "));
    if lines.len() > 2 && is_h1(0) && lines[1].is_empty() && is_h1(2) && !is_h1(4) {
        lines[2..].join("\n")
    } else {
        text.to_string()
    }
}
