use academic_admin::adapters::hugo::run_hugo;
use academic_admin::domain::model::ImportReport;
use academic_admin::utils::error::AcademicError;
use academic_admin::utils::{logger, validation::Validate};
use academic_admin::{
    import_assets, import_bibtex, AcademicConfig, Cli, Commands, ImportAction, ImportArgs,
};
use clap::Parser;
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The log format lives in the config file, so it is read before logging starts.
    let config = match AcademicConfig::discover(cli.config.as_deref(), &cli.site_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    logger::init_cli_logger(cli.verbose(), config.logging.format);
    tracing::debug!("CLI: {:?}", cli);

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        exit_with(&e);
    }

    match run(cli, config).await {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => exit_with(&e),
    }
}

async fn run(cli: Cli, config: AcademicConfig) -> Result<i32, AcademicError> {
    match cli.command {
        None => {
            println!("{}", Cli::help_text());
            Ok(0)
        }
        Some(Commands::Hugo(args)) => run_hugo(&config.hugo.binary, &args).await,
        Some(Commands::Import(args)) => {
            run_import(&args, &config, cli.site_dir).await?;
            Ok(0)
        }
    }
}

async fn run_import(
    args: &ImportArgs,
    config: &AcademicConfig,
    site_dir: PathBuf,
) -> Result<(), AcademicError> {
    match args.action(config, site_dir.clone())? {
        ImportAction::Assets(settings) => {
            let report = import_assets(&site_dir, settings).await?;
            println!("✅ Downloaded {} assets", report.downloaded.len());
            if !report.skipped.is_empty() {
                println!(
                    "⏭️  Kept {} on the CDN: {}",
                    report.skipped.len(),
                    report.skipped.join(", ")
                );
            }
        }
        ImportAction::Bibtex(settings) => {
            let report = import_bibtex(settings).await?;
            print_summary(&report);
        }
    }
    Ok(())
}

fn print_summary(report: &ImportReport) {
    let prefix = if report.dry_run { "[dry run] " } else { "" };
    println!(
        "✅ {}Imported {} of {} publications",
        prefix,
        report.created.len(),
        report.total()
    );
    if !report.skipped.is_empty() {
        println!(
            "⏭️  Skipped {} existing (use --overwrite to replace them)",
            report.skipped.len()
        );
    }
    for failure in &report.failed {
        eprintln!("⚠️  {}: {}", failure.key, failure.reason);
    }
}

fn exit_with(e: &AcademicError) -> ! {
    tracing::error!(
        "{} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    std::process::exit(e.severity().exit_code())
}
