use crate::domain::model::ImportReport;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<ImportReport> {
        tracing::info!("Starting BibTeX import");

        let entries = self.pipeline.extract().await?;
        tracing::info!("Extracted {} entries", entries.len());

        let transformed = self.pipeline.transform(entries).await?;
        tracing::info!(
            "Transformed {} entries ({} failed)",
            transformed.bundles.len(),
            transformed.failures.len()
        );

        let report = self.pipeline.load(transformed).await?;
        tracing::info!(
            "Import finished: {} created, {} skipped, {} failed{}",
            report.created.len(),
            report.skipped.len(),
            report.failed.len(),
            if report.dry_run { " (dry run)" } else { "" }
        );

        Ok(report)
    }
}
