use crate::config::toml_config::AcademicConfig;
use crate::config::ImportSettings;
use crate::core::assets::AssetSettings;
use crate::utils::error::Result;
use crate::utils::validation::validate_required_field;
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Academic Admin Tool
#[derive(Debug, Parser)]
#[command(name = "academic")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Admin tool for Hugo Academic websites")]
#[command(
    long_about = "Admin tool for Hugo Academic websites.\n\nImports BibTeX publications and offline assets. Any other command is passed to `hugo`."
)]
pub struct Cli {
    /// Configuration file (default: academic.toml in the site folder, if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Root folder of the website
    #[arg(long, global = true, default_value = ".")]
    pub site_dir: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import data into Academic
    Import(ImportArgs),
    /// Anything else is run by Hugo
    #[command(external_subcommand)]
    Hugo(Vec<String>),
}

#[derive(Debug, Clone, Default, Args)]
pub struct ImportArgs {
    /// Import third-party JS and CSS for generating an offline site
    #[arg(long)]
    pub assets: bool,

    /// File path to your BibTeX file
    #[arg(long)]
    pub bibtex: Option<String>,

    /// Directory that your publications are stored in (default `publication`)
    #[arg(long)]
    pub publication_dir: Option<String>,

    /// Flag publications as featured
    #[arg(long)]
    pub featured: bool,

    /// Overwrite existing publications
    #[arg(long)]
    pub overwrite: bool,

    /// Normalize each keyword to lowercase with uppercase first letter
    #[arg(long)]
    pub normalize: bool,

    /// Verbose mode
    #[arg(short, long)]
    pub verbose: bool,

    /// Perform a dry run (BibTeX only)
    #[arg(long = "dry-run", visible_alias = "dr")]
    pub dry_run: bool,
}

/// What `academic import` was asked to do.
#[derive(Debug, Clone)]
pub enum ImportAction {
    Assets(AssetSettings),
    Bibtex(ImportSettings),
}

impl Cli {
    pub fn verbose(&self) -> bool {
        matches!(&self.command, Some(Commands::Import(args)) if args.verbose)
    }

    /// Usage text shown when the tool is run without a command.
    pub fn help_text() -> String {
        Self::command().render_help().to_string()
    }
}

impl ImportArgs {
    /// `--assets` wins over `--bibtex`; with neither, `--bibtex` is reported
    /// as missing.
    pub fn action(&self, config: &AcademicConfig, site_dir: PathBuf) -> Result<ImportAction> {
        if self.assets {
            return Ok(ImportAction::Assets(AssetSettings {
                theme_dir: config.assets.theme_dir.clone(),
                concurrent_downloads: config.assets.concurrent_downloads,
                timeout_seconds: config.assets.timeout_seconds,
            }));
        }
        self.to_settings(config, site_dir).map(ImportAction::Bibtex)
    }

    /// Command-line flags win over `[import]` in the config file.
    pub fn to_settings(&self, config: &AcademicConfig, site_dir: PathBuf) -> Result<ImportSettings> {
        let bibtex = validate_required_field("--bibtex", &self.bibtex)?;
        Ok(ImportSettings {
            bibtex: bibtex.clone(),
            site_dir,
            publication_dir: self
                .publication_dir
                .clone()
                .unwrap_or_else(|| config.import.publication_dir.clone()),
            featured: self.featured || config.import.featured,
            overwrite: self.overwrite || config.import.overwrite,
            normalize: self.normalize || config.import.normalize,
            dry_run: self.dry_run,
        })
    }
}
