#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_file_extension, validate_path, validate_relative_dir, Validate};
use std::path::PathBuf;

/// Resolved settings for one BibTeX import.
#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub bibtex: String,
    pub site_dir: PathBuf,
    pub publication_dir: String,
    pub featured: bool,
    pub overwrite: bool,
    pub normalize: bool,
    pub dry_run: bool,
}

impl ImportSettings {
    pub fn new(bibtex: impl Into<String>) -> Self {
        Self {
            bibtex: bibtex.into(),
            site_dir: PathBuf::from("."),
            publication_dir: "publication".to_string(),
            featured: false,
            overwrite: false,
            normalize: false,
            dry_run: false,
        }
    }
}

impl ConfigProvider for ImportSettings {
    fn bibtex_path(&self) -> &str {
        &self.bibtex
    }

    fn publication_dir(&self) -> &str {
        &self.publication_dir
    }

    fn featured(&self) -> bool {
        self.featured
    }

    fn overwrite(&self) -> bool {
        self.overwrite
    }

    fn normalize(&self) -> bool {
        self.normalize
    }

    fn dry_run(&self) -> bool {
        self.dry_run
    }
}

impl Validate for ImportSettings {
    fn validate(&self) -> Result<()> {
        validate_path("bibtex", &self.bibtex)?;
        if let Err(e) = validate_file_extension("bibtex", &self.bibtex, &["bib", "bibtex"]) {
            // Not fatal: BibTeX exports sometimes come as .txt.
            tracing::warn!("{}", e);
        }
        validate_relative_dir("publication_dir", &self.publication_dir)?;
        Ok(())
    }
}
