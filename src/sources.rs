//! Built-in source profiles and lookup by name, with config-file profiles layered on top.

use crate::model::{RawSource, SourceProfile};
use crate::site::SiteFamily;

const TIMEWEB_K8S_PAGES: &[&str] = &[
    "/docs/k8s",
    "/docs/k8s/create-cluster",
    "/docs/k8s/manage-cluster",
    "/docs/k8s/container-registry",
    "/docs/k8s/cluster-connection",
    "/docs/k8s/cluster-connection/kubectl",
    "/docs/k8s/cluster-connection/lens",
    "/docs/k8s/cluster-connection/freelens",
    "/docs/k8s/kubernetes-load-balancer",
    "/docs/k8s/kubernetes-autoscaling",
    "/docs/k8s/kubernetes-autoscaling/kubernetes-autoscaler",
    "/docs/k8s/kubernetes-autoscaling/autoscaling-to-zero-nodes",
    "/docs/k8s/network-drives-connection",
    "/docs/k8s/connect-oidc-provider-to-cluster",
    "/docs/k8s/helm",
    "/docs/k8s/helm-chart-creation",
    "/docs/k8s/network-plugins",
    "/docs/k8s/addons",
    "/docs/k8s/addons/nginx-ingress",
    "/docs/k8s/addons/openfaas",
    "/docs/k8s/addons/minio-operator",
    "/docs/k8s/addons/dbaas-operator",
    "/docs/k8s/addons/cert-manager",
    "/docs/k8s/addons/cert-manager-webhook",
    "/docs/k8s/addons/traefik",
    "/docs/k8s/addons/fluent-operator",
    "/docs/k8s/addons/velero",
    "/docs/k8s/addons/externaldns",
    "/docs/k8s/addons/grafana-loki",
    "/docs/k8s/addons/victoriametrics-operator",
    "/docs/k8s/addons/vault",
    "/docs/k8s/addons/wordpress",
    "/docs/k8s/addons/twc-alert-bot",
    "/docs/k8s/addons/apache-pulsar",
    "/docs/k8s/addons/cpa",
    "/docs/k8s/addons/csi-s3",
];

const JITSU_PAGES: &[&str] = &[
    "/self-hosting",
    "/self-hosting/quick-start",
    "/self-hosting/quick-start/syncs",
    "/self-hosting/production-deployment",
    "/self-hosting/configuration",
];

/// Profiles compiled into the binary, in default run order.
pub fn builtin() -> Vec<SourceProfile> {
    vec![
        SourceProfile {
            name: "timeweb-k8s".to_string(),
            base_url: "https://timeweb.cloud".to_string(),
            family: SiteFamily::Timeweb,
            output_dir: "timeweb-kubernetes".to_string(),
            path_prefix: "/docs/k8s".to_string(),
            index_title: "Timeweb Cloud Documentation: Kubernetes".to_string(),
            pages: TIMEWEB_K8S_PAGES.iter().map(|p| p.to_string()).collect(),
            raw: Vec::new(),
        },
        SourceProfile {
            name: "jitsu".to_string(),
            base_url: "https://docs.jitsu.com".to_string(),
            family: SiteFamily::Docusaurus,
            output_dir: "jitsu".to_string(),
            path_prefix: String::new(),
            index_title: "Jitsu Documentation: Self-Hosting".to_string(),
            pages: JITSU_PAGES.iter().map(|p| p.to_string()).collect(),
            raw: vec![RawSource {
                url: "https://raw.githubusercontent.com/jitsucom/bulker/main/.docs/server-config.md"
                    .to_string(),
                slug: "bulker-server-config".to_string(),
            }],
        },
    ]
}

/// Built-ins with `extra` applied: a profile with a built-in's name replaces it in place,
/// new names are appended.
pub fn catalog(extra: &[SourceProfile]) -> Vec<SourceProfile> {
    let mut all = builtin();
    for profile in extra {
        match all.iter_mut().find(|p| p.name == profile.name) {
            Some(existing) => *existing = profile.clone(),
            None => all.push(profile.clone()),
        }
    }
    all
}

/// Resolve requested names against `catalog`; no names means every profile.
///
/// Fails with the first unknown name.
pub fn select<'a>(
    catalog: &'a [SourceProfile],
    names: &[String],
) -> Result<Vec<&'a SourceProfile>, String> {
    if names.is_empty() {
        return Ok(catalog.iter().collect());
    }
    names
        .iter()
        .map(|name| {
            catalog
                .iter()
                .find(|p| &p.name == name)
                .ok_or_else(|| name.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slug::derive_slug;
    use std::collections::HashSet;

    #[test]
    fn builtin_names_and_counts() {
        let all = builtin();
        let names: Vec<&str> = all.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["timeweb-k8s", "jitsu"]);
        assert_eq!(all[0].pages.len(), 36);
        assert_eq!(all[1].total_documents(), 6);
    }

    #[test]
    fn builtin_slugs_are_unique() {
        for profile in builtin() {
            let slugs: HashSet<String> = profile
                .pages
                .iter()
                .map(|p| derive_slug(p, &profile.path_prefix))
                .chain(profile.raw.iter().map(|r| r.slug.clone()))
                .collect();
            assert_eq!(slugs.len(), profile.total_documents(), "{}", profile.name);
        }
    }

    #[test]
    fn timeweb_root_page_is_k8s() {
        let all = builtin();
        assert_eq!(derive_slug(&all[0].pages[0], &all[0].path_prefix), "k8s");
    }

    #[test]
    fn config_profiles_override_and_extend() {
        let mut jitsu = builtin()[1].clone();
        jitsu.pages.truncate(1);
        let mut extra = jitsu.clone();
        extra.name = "custom".to_string();
        let all = catalog(&[jitsu, extra]);
        assert_eq!(all.len(), 3);
        assert_eq!(all[1].pages.len(), 1);
        assert_eq!(all[2].name, "custom");
    }

    #[test]
    fn select_defaults_to_all_and_rejects_unknown() {
        let all = builtin();
        assert_eq!(select(&all, &[]).map(|v| v.len()), Ok(2));
        let picked = select(&all, &["jitsu".to_string()]);
        assert_eq!(picked.map(|v| v[0].name.clone()), Ok("jitsu".to_string()));
        assert_eq!(
            select(&all, &["jitsu".to_string(), "nope".to_string()]).map(|v| v.len()),
            Err("nope".to_string())
        );
    }
}
