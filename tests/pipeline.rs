use docsfetch::{
    Fetch, FetchError, Fetched, Pipeline, RunOptions, SiteFamily, SourceProfile,
};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::time::Duration;

struct StaticSite {
    pages: HashMap<String, String>,
    requests: Vec<String>,
}

impl StaticSite {
    fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(u, b)| (u.to_string(), b.to_string()))
                .collect(),
            requests: Vec::new(),
        }
    }
}

impl Fetch for StaticSite {
    fn fetch(&mut self, url: &str) -> Result<Fetched, FetchError> {
        self.requests.push(url.to_string());
        self.pages
            .get(url)
            .map(|body| Fetched {
                status: 200,
                body: body.clone().into_bytes(),
            })
            .ok_or_else(|| FetchError::HttpStatus {
                status: 404,
                url: url.to_string(),
            })
    }
}

const ROOT_PAGE: &str = r##"<html><head><title>K8s</title></head><body>
<header><h1>Kubernetes</h1></header>
<div itemprop="articleBody">
  <p>Managed clusters.</p>
  <h2><a href="#create">#</a>Create a cluster<div class="copyLink">copy</div></h2>
  <pre><code class="language-bash" data-highlighted="yes">kubectl get nodes&nbsp;&nbsp;
</code></pre>
  <div class="QrBlock">scan me</div>
  <div class="twCard"><h5>Была ли статья полезна?</h5><button>Да</button></div>
  <p>Пока нет комментариев</p>
</div>
</body></html>"##;

const ADDON_PAGE: &str = r##"<html><body>
<h1>Velero</h1>
<div itemprop="articleBody">
  <p>Backups with <code>velero</code>.</p>
  <ul><li>Install</li><li>Configure</li></ul>
  <p><img src="//cdn.test/velero/assets" alt="schema"></p>
</div>
</body></html>"##;

fn timeweb_profile() -> SourceProfile {
    SourceProfile {
        name: "timeweb-test".to_string(),
        base_url: "https://tw.test".to_string(),
        family: SiteFamily::Timeweb,
        output_dir: "timeweb".to_string(),
        path_prefix: "/docs/k8s".to_string(),
        index_title: "Kubernetes".to_string(),
        pages: vec![
            "/docs/k8s".to_string(),
            "/docs/k8s/addons/velero".to_string(),
            "/docs/k8s/addons/missing".to_string(),
        ],
        raw: Vec::new(),
    }
}

#[test]
fn timeweb_source_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let site = StaticSite::new(&[
        ("https://tw.test/docs/k8s", ROOT_PAGE),
        ("https://tw.test/docs/k8s/addons/velero", ADDON_PAGE),
        ("https://cdn.test/velero/assets", "PNGDATA"),
    ]);
    let mut pipeline = Pipeline::new(site, Duration::ZERO);
    let summary = pipeline.run_source(&timeweb_profile(), dir.path(), &RunOptions::default())?;

    assert_eq!(summary.attempted, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.images_downloaded, 1);
    assert_eq!(summary.failures.len(), 1);

    let out = dir.path().join("timeweb");
    let root = std::fs::read_to_string(out.join("k8s.md"))?;
    assert_eq!(
        root,
        "# Kubernetes\n\nManaged clusters.\n\n## Create a cluster\n\n```bash\nkubectl get nodes\n```\n"
    );

    let velero = std::fs::read_to_string(out.join("addons--velero.md"))?;
    assert!(velero.starts_with("# Velero\n\nBackups with `velero`."));
    assert!(velero.contains("- Install\n- Configure"));
    let image_line = velero
        .lines()
        .find(|l| l.starts_with("![schema]("))
        .unwrap_or_default();
    assert!(image_line.starts_with("![schema](images/addons--velero/"));
    assert!(image_line.ends_with(".png)"));
    for line in velero.lines() {
        assert_eq!(line, line.trim_end());
    }
    assert!(!velero.contains("\n\n\n"));

    let index = std::fs::read_to_string(out.join("index.md"))?;
    assert_eq!(
        index,
        "# Kubernetes\n\n\
         Table of contents for all documentation pages.\n\n\
         - [Kubernetes](k8s.md)\n\n\
         ### Addons\n\n\
         - [Velero](addons--velero.md)\n\n"
    );
    Ok(())
}

#[test]
fn rerun_reuses_downloaded_images() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let pages = [
        ("https://tw.test/docs/k8s/addons/velero", ADDON_PAGE),
        ("https://cdn.test/velero/assets", "PNGDATA"),
    ];
    let mut profile = timeweb_profile();
    profile.pages = vec!["/docs/k8s/addons/velero".to_string()];

    let mut first = Pipeline::new(StaticSite::new(&pages), Duration::ZERO);
    first.run_source(&profile, dir.path(), &RunOptions::default())?;
    let before = std::fs::read_to_string(dir.path().join("timeweb/addons--velero.md"))?;

    let mut second = Pipeline::new(StaticSite::new(&pages), Duration::ZERO);
    let summary = second.run_source(&profile, dir.path(), &RunOptions::default())?;
    assert_eq!(summary.images_downloaded, 0);
    assert_eq!(summary.images_reused, 1);
    assert_eq!(second.fetcher().requests.len(), 1);

    let after = std::fs::read_to_string(dir.path().join("timeweb/addons--velero.md"))?;
    assert_eq!(before, after);
    Ok(())
}
