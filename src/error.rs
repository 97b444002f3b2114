//! Error types for fetching, extraction, image localization, and a whole source run.
//!
//! Everything below [PipelineError] is page-local: the orchestrator logs it and moves on.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to retrieve one URL. Never carries partial content.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: could not reach {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("Timed out fetching {url}")]
    Timeout { url: String },

    #[error("HTTP {status} when fetching: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Failed to read response body from {url}: {source}")]
    BodyRead { url: String, source: reqwest::Error },
}

/// The page parsed but no content node matched the site family's selectors.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("No content node found at {url} ({family} layout)")]
    NoContent { url: String, family: &'static str },
}

/// Failure to localize one image. The renderer falls back to the remote URL.
#[derive(Debug, Error)]
pub enum ImageDownloadError {
    #[error("Invalid image URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to write image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a single page was skipped.
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Run-level failure: nothing can be written for this source.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
