//! Source run orchestration: fetch, extract, render, and finish each page in declared order,
//! then raw Markdown sources, then the index.
//!
//! A page failure of any kind is logged and recorded in the [RunSummary]; only an output
//! directory that cannot be created stops a source.

use crate::client::{Fetch, Politeness};
use crate::error::{PageError, PipelineError};
use crate::extract::{extract_content, page_title};
use crate::images::ImageResolver;
use crate::index::build_index;
use crate::model::{IndexEntry, RenderedDocument, SourceProfile};
use crate::postprocess::{finish_document, finish_raw};
use crate::render::{ImageContext, Renderer};
use crate::site::SiteFamily;
use crate::slug::derive_slug;
use scraper::Html;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Title used when a single page has no `h1`.
pub const UNTITLED: &str = "Untitled";

/// Options for one source run.
#[derive(Default)]
pub struct RunOptions<'a> {
    /// Called after each document with (done, total).
    pub progress: Option<&'a dyn Fn(u32, u32)>,
}

/// A page or raw document that was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub url: String,
    pub reason: String,
}

/// Outcome counts of one source run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub source: String,
    pub output_dir: PathBuf,
    pub attempted: usize,
    pub succeeded: usize,
    pub images_downloaded: usize,
    pub images_reused: usize,
    pub failures: Vec<PageFailure>,
}

/// How a single page is turned into Markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    /// Extract and render with a site family's rules.
    Family(SiteFamily),
    /// The URL already serves Markdown.
    Raw,
}

/// Sequential runner over one fetcher. Page requests are paced; image requests are not.
pub struct Pipeline<F: Fetch> {
    fetcher: F,
    delay: Duration,
}

impl<F: Fetch> Pipeline<F> {
    pub fn new(fetcher: F, delay: Duration) -> Self {
        Self { fetcher, delay }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Mirror one source into `<output_root>/<profile.output_dir>`.
    pub fn run_source(
        &mut self,
        profile: &SourceProfile,
        output_root: &Path,
        options: &RunOptions<'_>,
    ) -> Result<RunSummary, PipelineError> {
        let out_dir = output_root.join(&profile.output_dir);
        let images_dir = out_dir.join("images");
        std::fs::create_dir_all(&images_dir).map_err(|e| PipelineError::OutputDir {
            path: images_dir.clone(),
            source: e,
        })?;

        let total = profile.total_documents();
        log::info!(
            "[{}] Fetching {} documents -> {}",
            profile.name,
            total,
            out_dir.display()
        );

        let mut summary = RunSummary {
            source: profile.name.clone(),
            output_dir: out_dir.clone(),
            attempted: total,
            ..RunSummary::default()
        };
        let mut entries: Vec<IndexEntry> = Vec::new();
        let mut pacer = Politeness::new(self.delay);
        let mut resolver = ImageResolver::new(&images_dir, profile.base_url.as_str());
        let mut done = 0u32;
        let report = |done: u32| {
            if let Some(p) = options.progress {
                p(done, total as u32);
            }
        };

        for path in &profile.pages {
            let url = format!("{}{}", profile.base_url.trim_end_matches('/'), path);
            let slug = derive_slug(path, &profile.path_prefix);
            // The delay counts from the end of the page's image downloads.
            pacer.wait();
            match self.process_page(profile.family, &url, &slug, &out_dir, &mut resolver) {
                Ok(doc) => record(&mut entries, &doc, &mut summary),
                Err(e) => {
                    log::warn!("Skipping {}: {}", url, e);
                    summary.failures.push(PageFailure {
                        url,
                        reason: e.to_string(),
                    });
                }
            }
            pacer.restart();
            done += 1;
            report(done);
        }

        for raw in &profile.raw {
            pacer.wait();
            match self.process_raw(&raw.url, &raw.slug, &out_dir) {
                Ok(doc) => record(&mut entries, &doc, &mut summary),
                Err(e) => {
                    log::warn!("Skipping {}: {}", raw.url, e);
                    summary.failures.push(PageFailure {
                        url: raw.url.clone(),
                        reason: e.to_string(),
                    });
                }
            }
            pacer.restart();
            done += 1;
            report(done);
        }

        if !entries.is_empty() {
            let index_path = out_dir.join("index.md");
            match std::fs::write(&index_path, build_index(&entries, &profile.index_title)) {
                Ok(()) => log::info!("Index: {}", index_path.display()),
                Err(e) => log::warn!("Failed to write {}: {}", index_path.display(), e),
            }
        }

        summary.images_downloaded = resolver.downloaded();
        summary.images_reused = resolver.reused();
        Ok(summary)
    }

    fn process_page(
        &mut self,
        family: SiteFamily,
        url: &str,
        slug: &str,
        out_dir: &Path,
        resolver: &mut ImageResolver,
    ) -> Result<RenderedDocument, PageError> {
        log::debug!("Fetching {}", url);
        let rules = family.rules();
        let fetched = self.fetcher.fetch(url)?;
        let doc = Html::parse_document(&fetched.text());
        let fallback_title = page_title(&doc).unwrap_or_else(|| slug.to_string());
        let content = extract_content(&doc, rules, url)?;
        let body = Renderer::new(rules)
            .with_images(ImageContext {
                resolver,
                fetcher: &mut self.fetcher,
                slug,
            })
            .render(content.root());
        let rendered = finish_document(slug, &body, &fallback_title, rules);
        write_document(out_dir, &rendered)?;
        Ok(rendered)
    }

    fn process_raw(
        &mut self,
        url: &str,
        slug: &str,
        out_dir: &Path,
    ) -> Result<RenderedDocument, PageError> {
        log::debug!("Fetching raw {}", url);
        let fetched = self.fetcher.fetch(url)?;
        let rendered = finish_raw(slug, &fetched.text());
        write_document(out_dir, &rendered)?;
        Ok(rendered)
    }
}

/// Count a saved document and add it to the index; a repeated slug replaces the earlier entry.
fn record(entries: &mut Vec<IndexEntry>, doc: &RenderedDocument, summary: &mut RunSummary) {
    summary.succeeded += 1;
    match entries.iter_mut().find(|e| e.slug == doc.slug) {
        Some(existing) => {
            log::warn!(
                "Slug collision: {}.md was written twice; keeping the later page",
                doc.slug
            );
            *existing = IndexEntry::from(doc);
        }
        None => entries.push(IndexEntry::from(doc)),
    }
}

fn write_document(out_dir: &Path, doc: &RenderedDocument) -> Result<PathBuf, PageError> {
    let path = out_dir.join(format!("{}.md", doc.slug));
    std::fs::write(&path, &doc.markdown).map_err(|e| PageError::Io {
        path: path.clone(),
        source: e,
    })?;
    log::info!(
        "Saved {} ({} chars)",
        path.display(),
        doc.markdown.chars().count()
    );
    Ok(path)
}

/// Fetch and convert one page. Images stay remote; a page without `h1` is titled
/// [UNTITLED].
pub fn fetch_single_page(
    fetcher: &mut dyn Fetch,
    url: &str,
    slug: &str,
    mode: PageMode,
) -> Result<RenderedDocument, PageError> {
    let fetched = fetcher.fetch(url)?;
    match mode {
        PageMode::Raw => Ok(finish_raw(slug, &fetched.text())),
        PageMode::Family(family) => {
            let rules = family.rules();
            let doc = Html::parse_document(&fetched.text());
            let title = page_title(&doc).unwrap_or_else(|| UNTITLED.to_string());
            let content = extract_content(&doc, rules, url)?;
            let body = Renderer::new(rules).render(content.root());
            Ok(finish_document(slug, &body, &title, rules))
        }
    }
}

/// Write a single-page result, creating parent directories.
pub fn write_single_page(path: &Path, doc: &RenderedDocument) -> Result<(), PageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PageError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, &doc.markdown).map_err(|e| PageError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
