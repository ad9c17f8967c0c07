use crate::adapters::storage::{DryRunStorage, LocalStorage};
use crate::config::ImportSettings;
use crate::core::assets::{AssetImporter, AssetReport, AssetSettings};
use crate::core::etl::EtlEngine;
use crate::core::pipeline::BibtexPipeline;
use crate::core::publication::publish_timestamp;
use crate::domain::model::ImportReport;
use crate::utils::error::{AcademicError, Result};
use crate::utils::validation::Validate;
use chrono::Utc;
use std::path::Path;

/// Imports every entry of `settings.bibtex` as a publication page bundle.
pub async fn import_bibtex(settings: ImportSettings) -> Result<ImportReport> {
    settings.validate()?;

    let publish_date = publish_timestamp(Utc::now());
    let storage = LocalStorage::new(settings.site_dir.clone());

    if settings.dry_run {
        let pipeline = BibtexPipeline::new(DryRunStorage::new(storage), settings, publish_date);
        EtlEngine::new(pipeline).run().await
    } else {
        let pipeline = BibtexPipeline::new(storage, settings, publish_date);
        EtlEngine::new(pipeline).run().await
    }
}

/// Downloads the theme's JS/CSS into `static/` and points Hugo at them.
/// Fails with [`AcademicError::AssetDownloadError`] if any asset failed.
pub async fn import_assets(site_dir: &Path, settings: AssetSettings) -> Result<AssetReport> {
    let importer = AssetImporter::new(LocalStorage::new(site_dir), settings)?;
    let report = importer.run().await?;

    if report.failed.is_empty() {
        Ok(report)
    } else {
        Err(AcademicError::AssetDownloadError {
            count: report.failed.len(),
        })
    }
}
