//! Page identity: source-relative URL path to a stable, filesystem-safe slug.

/// Separator that replaces `/` inside a slug.
pub const SLUG_SEPARATOR: &str = "--";

/// Derive the slug for `path` relative to `path_prefix`.
///
/// `/docs/k8s/addons/nginx-ingress` with prefix `/docs/k8s` gives `addons--nginx-ingress`.
/// The prefix's own root page falls back to the prefix's last segment, or to the whole
/// path when the prefix is empty.
pub fn derive_slug(path: &str, path_prefix: &str) -> String {
    let relative = path
        .strip_prefix(path_prefix)
        .unwrap_or(path)
        .trim_matches('/');
    if !relative.is_empty() {
        return relative.replace('/', SLUG_SEPARATOR);
    }
    let fallback = if path_prefix.is_empty() {
        path.trim_matches('/')
    } else {
        path_prefix
            .split('/')
            .filter(|s| !s.is_empty())
            .last()
            .unwrap_or("")
    };
    fallback.replace('/', SLUG_SEPARATOR)
}

/// Section key of a slug: the non-empty part before the first separator, if any.
pub fn section_of(slug: &str) -> Option<&str> {
    slug.split_once(SLUG_SEPARATOR)
        .map(|(section, _)| section)
        .filter(|section| !section.is_empty())
}
