//! Data model shared by the pipeline stages.
//!
//! A [SourceProfile] drives one run; every other type here lives only inside that run.

use crate::site::SiteFamily;
use serde::Deserialize;

/// One documentation site to mirror. Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SourceProfile {
    /// Name used on the command line (e.g. `jitsu`).
    pub name: String,
    /// Scheme and host, no trailing slash (e.g. `https://docs.jitsu.com`).
    pub base_url: String,
    /// Which extraction and rendering rules apply.
    pub family: SiteFamily,
    /// Directory under the output root that receives this source's files.
    pub output_dir: String,
    /// Stripped from page paths before slug derivation.
    #[serde(default)]
    pub path_prefix: String,
    /// Heading of the generated `index.md`.
    pub index_title: String,
    /// Page paths relative to `base_url`, in index order.
    #[serde(default)]
    pub pages: Vec<String>,
    /// Pre-rendered Markdown documents fetched verbatim.
    #[serde(default)]
    pub raw: Vec<RawSource>,
}

impl SourceProfile {
    /// Pages plus raw documents.
    pub fn total_documents(&self) -> usize {
        self.pages.len() + self.raw.len()
    }
}

/// A Markdown document fetched as-is and stored under `slug`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawSource {
    pub url: String,
    pub slug: String,
}

/// Final Markdown for one page.
///
/// `markdown` starts with exactly one `# ` heading, has no trailing whitespace on any line,
/// and never contains two consecutive blank lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub slug: String,
    pub title: String,
    pub markdown: String,
}

/// One line of the generated table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub slug: String,
    pub title: String,
}

impl From<&RenderedDocument> for IndexEntry {
    fn from(doc: &RenderedDocument) -> Self {
        IndexEntry {
            slug: doc.slug.clone(),
            title: doc.title.clone(),
        }
    }
}

/// A localized image: where it came from and where it is stored relative to the source dir.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub url: String,
    pub slug: String,
    pub local_path: String,
}
