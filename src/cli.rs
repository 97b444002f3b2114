//! CLI parsing and orchestration. Parses args, resolves sources and settings, runs each
//! source or a single page. Maps errors to exit codes.

use crate::client::{PoliteClient, DEFAULT_DELAY_MS, DEFAULT_TIMEOUT_SECS};
use crate::config::{self, Config};
use crate::error::{PageError, PipelineError};
use crate::logging;
use crate::model::SourceProfile;
use crate::pipeline::{
    fetch_single_page, write_single_page, PageMode, Pipeline, RunOptions, RunSummary,
};
use crate::site::SiteFamily;
use crate::sources;
use clap::Parser;
use std::cell::RefCell;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Output root when neither -o nor the config file sets one.
pub const DEFAULT_OUTPUT_DIR: &str = "docs";

/// CLI error carrying exit code and message.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    #[error("{0}")]
    Page(#[from] PageError),
}

impl CliRunError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CliRunError::InvalidInput(_) => 1,
            CliRunError::Pipeline(_) => 2,
            CliRunError::Page(_) => 3,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "docsfetch")]
#[command(about = "Mirror documentation sites into a local Markdown corpus")]
#[command(
    after_help = "Config file keys (output_dir, user_agent, request_delay_ms, timeout_secs, [[sources]]) are read from ./docsfetch.toml or ~/.config/docsfetch/config.toml. CLI flags override config."
)]
pub struct Args {
    /// Sources to fetch (default: all known sources). See --list.
    #[arg(conflicts_with = "url")]
    pub sources: Vec<String>,

    /// Output root; each source writes to a subdirectory. Default: ./docs.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Delay between page requests in milliseconds (overrides config; default 1000).
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Request timeout in seconds (overrides config; default 30).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// HTTP User-Agent (overrides config).
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Print known sources and exit.
    #[arg(long)]
    pub list: bool,

    /// Suppress progress and info output (warnings and errors only).
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug logging and the full error chain.
    #[arg(long)]
    pub verbose: bool,

    /// Fetch a single page instead of whole sources.
    #[arg(long)]
    pub url: Option<String>,

    /// Page type for --url: timeweb, docusaurus, or raw.
    #[arg(long, value_parser = parse_page_mode, requires = "url")]
    pub site: Option<PageMode>,

    /// Output file for --url.
    #[arg(long, requires = "url")]
    pub out_file: Option<PathBuf>,
}

fn parse_page_mode(s: &str) -> Result<PageMode, String> {
    if s.eq_ignore_ascii_case("raw") {
        return Ok(PageMode::Raw);
    }
    SiteFamily::parse(s).map(PageMode::Family).ok_or_else(|| {
        format!(
            "Invalid --site value: '{}'. Use timeweb, docusaurus, or raw.",
            s
        )
    })
}

/// Effective settings after CLI > config file > default.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Settings {
    output_root: PathBuf,
    delay: Duration,
    timeout_secs: u64,
    user_agent: Option<String>,
}

fn settings(args: &Args, config: Option<&Config>) -> Settings {
    let output_root = args
        .output
        .clone()
        .or_else(|| config.and_then(|c| c.output_dir.clone()))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    let delay_ms = args
        .delay_ms
        .or_else(|| config.and_then(|c| c.request_delay_ms))
        .unwrap_or(DEFAULT_DELAY_MS);
    let timeout_secs = args
        .timeout
        .or_else(|| config.and_then(|c| c.timeout_secs))
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    let user_agent = args
        .user_agent
        .clone()
        .or_else(|| config.and_then(|c| c.user_agent.clone()));
    Settings {
        output_root,
        delay: Duration::from_millis(delay_ms),
        timeout_secs,
        user_agent,
    }
}

fn build_client(settings: &Settings) -> Result<PoliteClient, CliRunError> {
    let mut builder = PoliteClient::builder().timeout_secs(settings.timeout_secs);
    if let Some(ua) = &settings.user_agent {
        builder = builder.user_agent(ua.clone());
    }
    builder
        .build()
        .map_err(|e| CliRunError::InvalidInput(format!("Failed to create HTTP client: {}", e)))
}

/// Requested profiles, or an error naming the unknown source and the available ones.
fn resolve_sources<'a>(
    catalog: &'a [SourceProfile],
    names: &[String],
) -> Result<Vec<&'a SourceProfile>, CliRunError> {
    sources::select(catalog, names).map_err(|unknown| {
        let available: Vec<&str> = catalog.iter().map(|p| p.name.as_str()).collect();
        CliRunError::InvalidInput(format!(
            "Unknown source: {}. Available: {}",
            unknown,
            available.join(", ")
        ))
    })
}

fn log_summary(summary: &RunSummary) {
    log::info!(
        "[{}] Done: {}/{} documents, {} images downloaded, {} reused -> {}",
        summary.source,
        summary.succeeded,
        summary.attempted,
        summary.images_downloaded,
        summary.images_reused,
        summary.output_dir.display()
    );
    for failure in &summary.failures {
        log::warn!("[{}] Failed: {}: {}", summary.source, failure.url, failure.reason);
    }
}

/// Entry point for the CLI. Returns Ok(()) on success; Err with exit code and message on failure.
pub fn run(args: &Args) -> Result<(), CliRunError> {
    logging::init(logging::level_for(args.quiet, args.verbose));

    let config = config::load_config().map_err(CliRunError::InvalidInput)?;
    let extra = config.as_ref().map(|c| c.sources.as_slice()).unwrap_or(&[]);
    let catalog = sources::catalog(extra);

    if args.list {
        for p in &catalog {
            println!(
                "{}\t{}\t{}\t{} documents",
                p.name,
                p.family.name(),
                p.base_url,
                p.total_documents()
            );
        }
        return Ok(());
    }

    let settings = settings(args, config.as_ref());

    if let Some(url) = &args.url {
        return run_single(args, url, &settings);
    }

    let selected = resolve_sources(&catalog, &args.sources)?;
    let client = build_client(&settings)?;
    let mut pipeline = Pipeline::new(client, settings.delay);

    for profile in selected {
        let progress_state: RefCell<Option<indicatif::ProgressBar>> = RefCell::new(None);
        let progress_cb = |n: u32, total: u32| {
            if total == 0 {
                return;
            }
            let mut state = progress_state.borrow_mut();
            let pb = state.get_or_insert_with(|| {
                let bar = indicatif::ProgressBar::new(total as u64);
                if let Ok(style) = indicatif::ProgressStyle::default_bar()
                    .template("{spinner} {msg} [{bar:40}] {pos}/{len} ({elapsed})")
                {
                    bar.set_style(
                        style
                            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                            .progress_chars("█▉▊▋▌▍▎▏ "),
                    );
                }
                bar.enable_steady_tick(Duration::from_millis(80));
                bar
            });
            pb.set_position(n as u64);
            pb.set_message(format!("{} {}/{}", profile.name, n, total));
        };
        let progress: Option<&dyn Fn(u32, u32)> =
            if args.quiet { None } else { Some(&progress_cb) };
        let options = RunOptions { progress };

        let summary = pipeline.run_source(profile, &settings.output_root, &options)?;

        if let Some(pb) = progress_state.borrow_mut().take() {
            pb.disable_steady_tick();
            pb.finish_and_clear();
        }
        log_summary(&summary);
    }
    Ok(())
}

fn run_single(args: &Args, url: &str, settings: &Settings) -> Result<(), CliRunError> {
    let mode = args.site.ok_or_else(|| {
        CliRunError::InvalidInput("--url needs --site timeweb|docusaurus|raw".to_string())
    })?;
    let out_file = args
        .out_file
        .as_ref()
        .ok_or_else(|| CliRunError::InvalidInput("--url needs --out-file FILE".to_string()))?;
    let slug = out_file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("page");

    let mut client = build_client(settings)?;
    log::info!("Fetching {}", url);
    let doc = fetch_single_page(&mut client, url, slug, mode)?;
    write_single_page(out_file, &doc)?;
    log::info!(
        "Saved {} ({} chars)",
        out_file.display(),
        doc.markdown.chars().count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;

    fn parse(argv: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("docsfetch").chain(argv.iter().copied()))
    }

    #[test]
    fn parse_page_mode_all() {
        assert_eq!(parse_page_mode("raw"), Ok(PageMode::Raw));
        assert_eq!(
            parse_page_mode("timeweb"),
            Ok(PageMode::Family(SiteFamily::Timeweb))
        );
        assert_eq!(
            parse_page_mode("Docusaurus"),
            Ok(PageMode::Family(SiteFamily::Docusaurus))
        );
        assert!(parse_page_mode("mkdocs").is_err());
    }

    #[test]
    fn positional_sources_and_output() -> Result<(), clap::Error> {
        let args = parse(&["jitsu", "timeweb-k8s", "-o", "/tmp/docs", "--delay-ms", "0"])?;
        assert_eq!(args.sources, vec!["jitsu", "timeweb-k8s"]);
        assert_eq!(args.output, Some(PathBuf::from("/tmp/docs")));
        assert_eq!(args.delay_ms, Some(0));
        assert!(args.url.is_none());
        Ok(())
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(parse(&["--frobnicate"]).is_err());
    }

    #[test]
    fn single_page_flags() -> Result<(), clap::Error> {
        let args = parse(&[
            "--url",
            "https://docs.jitsu.com/self-hosting",
            "--site",
            "docusaurus",
            "--out-file",
            "out/page.md",
        ])?;
        assert_eq!(args.site, Some(PageMode::Family(SiteFamily::Docusaurus)));
        assert_eq!(args.out_file, Some(PathBuf::from("out/page.md")));
        assert!(parse(&["--site", "raw"]).is_err());
        assert!(parse(&["jitsu", "--url", "https://x.test"]).is_err());
        Ok(())
    }

    #[test]
    fn settings_precedence_cli_config_default() {
        let config = Config {
            output_dir: Some(PathBuf::from("from-config")),
            user_agent: Some("Config/1.0".to_string()),
            request_delay_ms: Some(250),
            timeout_secs: None,
            sources: Vec::new(),
        };
        let args = Args {
            sources: Vec::new(),
            output: None,
            delay_ms: Some(10),
            timeout: None,
            user_agent: None,
            list: false,
            quiet: false,
            verbose: false,
            url: None,
            site: None,
            out_file: None,
        };
        let s = settings(&args, Some(&config));
        assert_eq!(s.output_root, PathBuf::from("from-config"));
        assert_eq!(s.delay, Duration::from_millis(10));
        assert_eq!(s.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(s.user_agent.as_deref(), Some("Config/1.0"));

        let s = settings(&args, None);
        assert_eq!(s.output_root, PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert!(s.user_agent.is_none());
    }

    #[test]
    fn unknown_source_is_invalid_input() {
        let catalog = sources::builtin();
        let err = resolve_sources(&catalog, &["jitsu".to_string(), "nope".to_string()])
            .err()
            .map(|e| (e.exit_code(), e.to_string()));
        assert_eq!(
            err,
            Some((
                1,
                "Unknown source: nope. Available: timeweb-k8s, jitsu".to_string()
            ))
        );
    }

    #[test]
    fn cli_run_error_exit_codes() {
        assert_eq!(CliRunError::InvalidInput("x".into()).exit_code(), 1);
        assert_eq!(
            CliRunError::Pipeline(PipelineError::OutputDir {
                path: PathBuf::from("/x"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            })
            .exit_code(),
            2
        );
        assert_eq!(
            CliRunError::Page(PageError::Fetch(FetchError::Timeout {
                url: "https://x.test".into()
            }))
            .exit_code(),
            3
        );
    }
}
