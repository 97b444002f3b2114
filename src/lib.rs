//! docsfetch: mirror documentation sites into a normalized local Markdown corpus with
//! localized images and a generated index.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod images;
pub mod index;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod postprocess;
pub mod render;
pub mod site;
pub mod slug;
pub mod sources;

// Re-exports for CLI and consumers.
pub use client::{Fetch, Fetched, PoliteClient, PoliteClientBuilder, Politeness};
pub use error::{ExtractionError, FetchError, ImageDownloadError, PageError, PipelineError};
pub use model::{ImageAsset, IndexEntry, RawSource, RenderedDocument, SourceProfile};
pub use pipeline::{
    fetch_single_page, PageFailure, PageMode, Pipeline, RunOptions, RunSummary,
};
pub use site::SiteFamily;
pub use slug::derive_slug;
