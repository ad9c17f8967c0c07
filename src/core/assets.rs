//! Offline copies of the theme's third-party JS and CSS.
//!
//! The theme lists its CDN assets in `<theme>/data/assets.toml` and renders
//! each one with `printf url version`. Each asset is downloaded to
//! `static/<kind>/vendor/<name>/<version>/<file>` and a site-level
//! `data/assets.toml` override is written whose `url` keeps a single `%s` for
//! the version, so the theme's `printf` resolves to the local copy.
//!
//! URLs with more than one `%s` take extra arguments chosen by the theme at
//! render time (e.g. the highlight.js style). Those stay on the CDN.

use crate::domain::ports::Storage;
use crate::utils::error::{AcademicError, Result};
use crate::utils::validation::{validate_relative_dir, validate_url};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

pub const SITE_MANIFEST_PATH: &str = "data/assets.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetManifest {
    #[serde(default)]
    pub js: BTreeMap<String, AssetSpec>,
    #[serde(default)]
    pub css: BTreeMap<String, AssetSpec>,
    #[serde(flatten)]
    pub other: toml::Table,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSpec {
    pub version: String,
    /// CDN URL; `%s` is replaced with `version`.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sri: Option<String>,
    #[serde(flatten)]
    pub extra: toml::Table,
}

impl AssetSpec {
    /// Number of `%s` placeholders in `url`.
    pub fn placeholders(&self) -> usize {
        self.url.matches("%s").count()
    }

    /// `url` with its first `%s` filled in with `version`.
    pub fn resolved_url(&self) -> String {
        self.url.replacen("%s", &self.version, 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AssetKind {
    Js,
    Css,
}

impl AssetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AssetKind::Js => "js",
            AssetKind::Css => "css",
        }
    }

    pub fn vendor_dir(self) -> String {
        format!("static/{}/vendor", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct AssetSettings {
    pub theme_dir: String,
    pub concurrent_downloads: usize,
    /// Per-request timeout.
    pub timeout_seconds: u64,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            theme_dir: "themes/academic".to_string(),
            concurrent_downloads: 4,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFailure {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct AssetReport {
    /// Site-relative paths of downloaded files, sorted.
    pub downloaded: Vec<String>,
    /// `<kind>.<name>` of assets left on the CDN, sorted.
    pub skipped: Vec<String>,
    pub failed: Vec<AssetFailure>,
}

#[derive(Debug, Clone)]
struct DownloadJob {
    kind: AssetKind,
    name: String,
    version: String,
    url: String,
    file_name: String,
}

impl DownloadJob {
    fn label(&self) -> String {
        format!("{}.{}", self.kind.as_str(), self.name)
    }

    fn dest_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.kind.vendor_dir(),
            self.name,
            self.version,
            self.file_name
        )
    }

    /// Site URL with `%s` standing in for the version folder.
    fn public_url(&self) -> String {
        format!(
            "/{}/vendor/{}/%s/{}",
            self.kind.as_str(),
            self.name,
            self.file_name
        )
    }
}

fn file_name_from_url(url: &str, fallback: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

async fn fetch(client: &Client, url: &str) -> Result<Vec<u8>> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}

pub struct AssetImporter<S: Storage> {
    storage: S,
    client: Client,
    settings: AssetSettings,
}

impl<S: Storage> AssetImporter<S> {
    pub fn new(storage: S, settings: AssetSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;
        Ok(Self {
            storage,
            client,
            settings,
        })
    }

    fn theme_manifest_path(&self) -> String {
        format!("{}/data/assets.toml", self.settings.theme_dir.trim_end_matches('/'))
    }

    pub async fn load_manifest(&self) -> Result<AssetManifest> {
        if !self.storage.exists(&self.settings.theme_dir).await {
            tracing::error!(
                "Could not detect Academic theme folder at `{}`",
                self.settings.theme_dir
            );
            return Err(AcademicError::ThemeNotFound {
                path: self.settings.theme_dir.clone(),
            });
        }

        let path = self.theme_manifest_path();
        let raw = self.storage.read_file(&path).await?;
        let text = String::from_utf8(raw).map_err(|e| AcademicError::AssetManifestError {
            message: format!("{} is not valid UTF-8: {}", path, e),
        })?;
        toml::from_str(&text).map_err(|e| AcademicError::AssetManifestError {
            message: format!("{}: {}", path, e),
        })
    }

    fn plan(&self, manifest: &AssetManifest, report: &mut AssetReport) -> Vec<DownloadJob> {
        let mut jobs = Vec::new();
        let groups = [(AssetKind::Js, &manifest.js), (AssetKind::Css, &manifest.css)];
        for (kind, assets) in groups {
            for (name, spec) in assets {
                let label = format!("{}.{}", kind.as_str(), name);
                if spec.placeholders() > 1 {
                    tracing::warn!(
                        "Keeping {} on the CDN: its URL takes more than the version ({})",
                        label,
                        spec.url
                    );
                    report.skipped.push(label);
                    continue;
                }

                let url = spec.resolved_url();
                let checked = validate_url(&label, &url)
                    .and_then(|_| validate_relative_dir(&label, name))
                    .and_then(|_| validate_relative_dir(&label, &spec.version));
                if let Err(e) = checked {
                    tracing::error!("Skipping asset {}: {}", label, e);
                    report.failed.push(AssetFailure {
                        name: label,
                        reason: e.to_string(),
                    });
                    continue;
                }
                let fallback = format!("{}.{}", name, kind.as_str());
                jobs.push(DownloadJob {
                    kind,
                    name: name.clone(),
                    version: spec.version.clone(),
                    file_name: file_name_from_url(&url, &fallback),
                    url,
                });
            }
        }
        jobs
    }

    pub async fn run(&self) -> Result<AssetReport> {
        let manifest = self.load_manifest().await?;
        let mut report = AssetReport::default();

        for kind in [AssetKind::Js, AssetKind::Css] {
            tracing::debug!("Removing {}", kind.vendor_dir());
            self.storage.remove_dir(&kind.vendor_dir()).await?;
        }

        let jobs = self.plan(&manifest, &mut report);
        tracing::info!("Downloading {} assets...", jobs.len());

        let semaphore = Arc::new(Semaphore::new(self.settings.concurrent_downloads.max(1)));
        let mut downloads = JoinSet::new();
        for job in jobs {
            let client = self.client.clone();
            let semaphore = Arc::clone(&semaphore);
            downloads.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                tracing::debug!("Downloading {} from {}", job.label(), job.url);
                let result = fetch(&client, &job.url).await;
                (job, result)
            });
        }

        let mut local = manifest.clone();
        while let Some(joined) = downloads.join_next().await {
            let (job, result) = match joined {
                Ok(done) => done,
                Err(e) => {
                    tracing::error!("Download task failed: {}", e);
                    report.failed.push(AssetFailure {
                        name: "unknown".to_string(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let stored = match result {
                Ok(bytes) => self.storage.write_file(&job.dest_path(), &bytes).await,
                Err(e) => Err(e),
            };
            match stored {
                Ok(()) => {
                    let group = match job.kind {
                        AssetKind::Js => &mut local.js,
                        AssetKind::Css => &mut local.css,
                    };
                    if let Some(spec) = group.get_mut(&job.name) {
                        spec.url = job.public_url();
                        spec.sri = None;
                    }
                    report.downloaded.push(job.dest_path());
                }
                Err(e) => {
                    tracing::error!("Could not download {}: {}", job.label(), e);
                    report.failed.push(AssetFailure {
                        name: job.label(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        report.downloaded.sort();
        report.skipped.sort();
        report.failed.sort_by(|a, b| a.name.cmp(&b.name));

        let rendered = toml::to_string(&local)?;
        self.storage
            .write_file(SITE_MANIFEST_PATH, rendered.as_bytes())
            .await?;
        tracing::info!("Wrote local asset overrides to {}", SITE_MANIFEST_PATH);

        Ok(report)
    }
}
