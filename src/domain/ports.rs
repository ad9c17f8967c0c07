use crate::domain::model::{BibEntry, ImportReport, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

/// File access relative to the site root.
pub trait Storage: Send + Sync {
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn create_dir(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;
    fn remove_dir(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn bibtex_path(&self) -> &str;
    fn publication_dir(&self) -> &str;
    fn featured(&self) -> bool;
    fn overwrite(&self) -> bool;
    fn normalize(&self) -> bool;
    fn dry_run(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<BibEntry>>;
    async fn transform(&self, entries: Vec<BibEntry>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<ImportReport>;
}
