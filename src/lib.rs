pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{Cli, Commands, ImportAction, ImportArgs};

pub use adapters::{DryRunStorage, LocalStorage};
pub use app::{import_assets, import_bibtex};
pub use config::toml_config::AcademicConfig;
pub use config::ImportSettings;
pub use crate::core::{assets::AssetSettings, etl::EtlEngine, pipeline::BibtexPipeline};
pub use utils::error::{AcademicError, Result};
