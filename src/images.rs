//! Image localization: normalize `src`, pick a deterministic filename, download once per slug.

use crate::client::Fetch;
use crate::error::ImageDownloadError;
use crate::model::ImageAsset;
use reqwest::Url;
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Images whose explicit width and height are both at most this are decorative and dropped.
pub const DECORATIVE_MAX_PX: u32 = 100;

/// Path segments that say nothing about the image and get replaced by a URL hash.
const PLACEHOLDER_SEGMENTS: &[&str] = &["assets"];

const DEFAULT_EXTENSION: &str = "png";

/// Downloads images under `<images_root>/<slug>/` and hands back paths relative to the
/// source directory (`images/<slug>/<file>`).
#[derive(Debug)]
pub struct ImageResolver {
    images_root: PathBuf,
    base_url: String,
    downloaded: usize,
    reused: usize,
}

impl ImageResolver {
    pub fn new(images_root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            images_root: images_root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            downloaded: 0,
            reused: 0,
        }
    }

    /// Number of images fetched over the network so far.
    pub fn downloaded(&self) -> usize {
        self.downloaded
    }

    /// Number of references served from files already on disk.
    pub fn reused(&self) -> usize {
        self.reused
    }

    /// Localize `src` for `slug`. An existing file is reused without a request.
    pub fn resolve(
        &mut self,
        fetcher: &mut dyn Fetch,
        src: &str,
        slug: &str,
    ) -> Result<ImageAsset, ImageDownloadError> {
        let url = normalize_url(src, &self.base_url);
        let filename = image_filename(&url)?;
        let dir = self.images_root.join(slug);
        let path = dir.join(&filename);
        let local_path = format!("images/{}/{}", slug, filename);
        let asset = ImageAsset {
            url: url.clone(),
            slug: slug.to_string(),
            local_path,
        };

        if path.exists() {
            self.reused += 1;
            return Ok(asset);
        }

        let fetched = fetcher.fetch(&url)?;
        std::fs::create_dir_all(&dir).map_err(|e| ImageDownloadError::Io {
            path: dir.clone(),
            source: e,
        })?;
        std::fs::write(&path, &fetched.body).map_err(|e| ImageDownloadError::Io {
            path: path.clone(),
            source: e,
        })?;
        self.downloaded += 1;
        log::info!(
            "Saved image {} ({} KB)",
            asset.local_path,
            fetched.body.len() / 1024
        );
        Ok(asset)
    }
}

/// Protocol-relative gets `https:`, root-relative gets the site's base URL, anything else
/// is taken as absolute.
pub fn normalize_url(src: &str, base_url: &str) -> String {
    let src = src.trim();
    if let Some(rest) = src.strip_prefix("//") {
        format!("https://{}", rest)
    } else if src.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), src)
    } else {
        src.to_string()
    }
}

/// Last path segment of `url`, or a 12-hex-digit hash of the URL when the segment is
/// missing or a placeholder. Names without an extension get `.png`.
pub fn image_filename(url: &str) -> Result<String, ImageDownloadError> {
    let parsed = Url::parse(url).map_err(|e| ImageDownloadError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let segment = parsed
        .path()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("")
        .to_string();
    let mut name = if segment.is_empty() || PLACEHOLDER_SEGMENTS.contains(&segment.as_str()) {
        short_hash(url)
    } else {
        segment
    };
    if !name.contains('.') {
        name.push('.');
        name.push_str(DEFAULT_EXTENSION);
    }
    Ok(name)
}

/// True when both `width` and `height` are present, numeric, and at most [DECORATIVE_MAX_PX].
pub fn is_decorative(width: Option<&str>, height: Option<&str>) -> bool {
    match (width, height) {
        (Some(w), Some(h)) => match (w.trim().parse::<u32>(), h.trim().parse::<u32>()) {
            (Ok(w), Ok(h)) => w <= DECORATIVE_MAX_PX && h <= DECORATIVE_MAX_PX,
            _ => false,
        },
        _ => false,
    }
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(12);
    for byte in digest.iter().take(6) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
