use crate::core::bibtex::parse_bibtex;
use crate::core::publication::{build_bundle, TransformOptions};
use crate::domain::model::{BibEntry, EntryFailure, ImportReport, PublicationBundle, TransformResult};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::utils::error::{AcademicError, Result};
use std::collections::HashSet;
use std::path::Path;

/// BibTeX file → publication page bundles under `content/<publication_dir>`.
pub struct BibtexPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    publish_date: String,
}

impl<S: Storage, C: ConfigProvider> BibtexPipeline<S, C> {
    pub fn new(storage: S, config: C, publish_date: String) -> Self {
        Self {
            storage,
            config,
            publish_date,
        }
    }

    fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            publication_dir: self.config.publication_dir().to_string(),
            featured: self.config.featured(),
            normalize: self.config.normalize(),
        }
    }

    async fn write_bundle(&self, bundle: &PublicationBundle) -> Result<()> {
        tracing::info!("Creating folder {}", bundle.bundle_dir);
        self.storage.create_dir(&bundle.bundle_dir).await?;

        tracing::info!("Saving citation to {}", bundle.cite_path());
        self.storage
            .write_file(&bundle.cite_path(), bundle.citation.as_bytes())
            .await?;

        tracing::info!("Saving Markdown to '{}'", bundle.markdown_path());
        self.storage
            .write_file(&bundle.markdown_path(), bundle.markdown.as_bytes())
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for BibtexPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<BibEntry>> {
        let path = self.config.bibtex_path();
        if !Path::new(path).is_file() {
            tracing::error!("Please check the path to your BibTeX file and re-run");
            return Err(AcademicError::BibtexNotFound {
                path: path.to_string(),
            });
        }

        let content = tokio::fs::read_to_string(path).await?;
        let bibliography = parse_bibtex(&content);

        if !bibliography.errors.is_empty() {
            tracing::warn!(
                "{} malformed entr{} skipped in {}",
                bibliography.errors.len(),
                if bibliography.errors.len() == 1 { "y" } else { "ies" },
                path
            );
        }
        tracing::debug!("Read {} entries from {}", bibliography.entries.len(), path);

        Ok(bibliography.entries)
    }

    async fn transform(&self, entries: Vec<BibEntry>) -> Result<TransformResult> {
        let options = self.transform_options();
        let mut result = TransformResult::default();

        for entry in entries {
            tracing::info!("Parsing entry {}", entry.key);
            match build_bundle(&entry, &options, &self.publish_date) {
                Ok(bundle) => result.bundles.push(bundle),
                Err(e) => {
                    tracing::error!("Could not import entry `{}`: {}", entry.key, e);
                    result.failures.push(EntryFailure {
                        key: entry.key,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(result)
    }

    async fn load(&self, result: TransformResult) -> Result<ImportReport> {
        let mut report = ImportReport {
            failed: result.failures,
            dry_run: self.config.dry_run(),
            ..ImportReport::default()
        };

        // Bundle folders claimed earlier in this run; a dry run never creates them.
        let mut planned = HashSet::new();

        for bundle in result.bundles {
            if planned.contains(&bundle.bundle_dir) {
                tracing::warn!(
                    "Skipping entry `{}`: {} is already used by another entry in this file",
                    bundle.key,
                    bundle.bundle_dir
                );
                report.skipped.push(bundle.bundle_dir);
                continue;
            }
            planned.insert(bundle.bundle_dir.clone());

            if !self.config.overwrite() && self.storage.exists(&bundle.bundle_dir).await {
                tracing::warn!(
                    "Skipping creation of {} as it already exists. To overwrite, add the `--overwrite` argument.",
                    bundle.bundle_dir
                );
                report.skipped.push(bundle.bundle_dir);
                continue;
            }

            match self.write_bundle(&bundle).await {
                Ok(()) => report.created.push(bundle.bundle_dir),
                Err(e) => {
                    tracing::error!("Could not save file: {}", e);
                    report.failed.push(EntryFailure {
                        key: bundle.key,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }
}
