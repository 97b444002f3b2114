//! Optional config file loading. Search order: ./docsfetch.toml, then
//! $XDG_CONFIG_HOME/docsfetch/config.toml (or ~/.config/docsfetch/config.toml).

use crate::model::SourceProfile;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file contents. All fields optional; only present keys override defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct Config {
    /// Output root when -o is not set. Paths are relative to CWD.
    pub output_dir: Option<PathBuf>,
    /// HTTP User-Agent header.
    pub user_agent: Option<String>,
    /// Delay in milliseconds between page requests.
    pub request_delay_ms: Option<u64>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Extra source profiles. A name matching a built-in replaces it.
    pub sources: Vec<SourceProfile>,
}

/// Search order: (1) ./docsfetch.toml, (2) $XDG_CONFIG_HOME/docsfetch/config.toml.
/// Missing file returns Ok(None). Invalid TOML or I/O error reading a present file returns Err.
pub fn load_config() -> Result<Option<Config>, String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Cannot determine current directory: {}", e))?;
    let mut paths = vec![cwd.join("docsfetch.toml")];
    if let Some(d) = dirs::config_dir() {
        paths.push(d.join("docsfetch").join("config.toml"));
    }
    for path in &paths {
        if path.exists() {
            return load_from(path).map(Some);
        }
    }
    Ok(None)
}

/// Read and parse one config file.
pub fn load_from(path: &Path) -> Result<Config, String> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
    toml::from_str(&s).map_err(|e| format!("Invalid config {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::SiteFamily;

    #[test]
    fn parse_empty_config() -> Result<(), toml::de::Error> {
        let c: Config = toml::from_str("")?;
        assert!(c.output_dir.is_none());
        assert!(c.user_agent.is_none());
        assert!(c.request_delay_ms.is_none());
        assert!(c.timeout_secs.is_none());
        assert!(c.sources.is_empty());
        Ok(())
    }

    #[test]
    fn parse_full_config() -> Result<(), toml::de::Error> {
        let s = r#"
            output_dir = "out"
            user_agent = "Custom/1.0"
            request_delay_ms = 250
            timeout_secs = 60

            [[sources]]
            name = "mydocs"
            base_url = "https://docs.example.com"
            family = "docusaurus"
            output_dir = "mydocs"
            index_title = "My docs"
            pages = ["/intro", "/guides/setup"]
            raw = [{ url = "https://raw.example.com/README.md", slug = "readme" }]
        "#;
        let c: Config = toml::from_str(s)?;
        assert_eq!(c.output_dir.as_deref(), Some(Path::new("out")));
        assert_eq!(c.user_agent.as_deref(), Some("Custom/1.0"));
        assert_eq!(c.request_delay_ms, Some(250));
        assert_eq!(c.timeout_secs, Some(60));
        assert_eq!(c.sources.len(), 1);
        let src = &c.sources[0];
        assert_eq!(src.family, SiteFamily::Docusaurus);
        assert_eq!(src.path_prefix, "");
        assert_eq!(src.pages.len(), 2);
        assert_eq!(src.raw[0].slug, "readme");
        Ok(())
    }

    #[test]
    fn unknown_family_is_rejected() {
        let s = r#"
            [[sources]]
            name = "x"
            base_url = "https://x.test"
            family = "mkdocs"
            output_dir = "x"
            index_title = "X"
        "#;
        assert!(toml::from_str::<Config>(s).is_err());
    }

    #[test]
    fn invalid_toml_errors() {
        assert!(toml::from_str::<Config>("output_dir = [").is_err());
    }

    #[test]
    fn load_from_reports_path() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("docsfetch.toml");
        std::fs::write(&path, "timeout_secs = 5\n")?;
        assert_eq!(load_from(&path)?.timeout_secs, Some(5));

        std::fs::write(&path, "timeout_secs = \"five\"\n")?;
        let err = load_from(&path).err().unwrap_or_default();
        assert!(err.contains("docsfetch.toml"), "{err}");
        Ok(())
    }
}
