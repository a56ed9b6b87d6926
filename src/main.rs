// ==========================================
// Fleet Import - CLI entry point
// ==========================================
// preview:  parse + validate a spreadsheet, print the summary
// template: write the CSV template for an import type
// ==========================================

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fleet_import::{
    generate_template, template_file_name, ConfigManager, ExistenceCache, FleetImporter,
    FleetImporterImpl, ImportPreview, ImportType, Severity,
};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "fleet-import", version, about = "Fleet spreadsheet import preview")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse and validate a file without persisting anything
    Preview {
        /// Import type (vehicles, deliveries, fuelings, maintenances, drivers, assemblers)
        #[arg(short, long = "type", value_parser = parse_import_type)]
        import_type: ImportType,

        /// Spreadsheet to import (.csv, .xlsx, .xls)
        #[arg(short, long)]
        file: PathBuf,

        /// JSON snapshot of existing vehicles, drivers and assemblers
        #[arg(long)]
        cache: Option<PathBuf>,

        /// Config file (defaults to the user config directory)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the full preview as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the CSV template for an import type
    Template {
        #[arg(short, long = "type", value_parser = parse_import_type)]
        import_type: ImportType,

        /// Output path (defaults to the suggested template name)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn parse_import_type(value: &str) -> Result<ImportType, String> {
    value.parse()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.log_json {
        fleet_import::logging::init_json();
    } else {
        fleet_import::logging::init();
    }

    tracing::debug!("{} v{}", fleet_import::APP_NAME, fleet_import::VERSION);

    match cli.command {
        Command::Preview {
            import_type,
            file,
            cache,
            config,
            json,
        } => run_preview(import_type, file, cache, config, json).await,
        Command::Template { import_type, out } => run_template(import_type, out),
    }
}

async fn run_preview(
    import_type: ImportType,
    file: PathBuf,
    cache: Option<PathBuf>,
    config: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let config = match config {
        Some(path) => ConfigManager::from_file(&path),
        None => ConfigManager::load_default(),
    }
    .map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?;

    let cache = match cache {
        Some(path) => load_cache(&path)?,
        None => ExistenceCache::new(),
    };

    let importer = FleetImporterImpl::new(config);
    let preview = importer
        .preview_file(&file, import_type, &cache)
        .await
        .with_context(|| format!("preview failed for {}", file.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&preview)?);
    } else {
        print_summary(&preview);
    }
    Ok(())
}

fn load_cache(path: &Path) -> Result<ExistenceCache> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read cache file {}", path.display()))?;
    let cache: ExistenceCache = serde_json::from_str(&raw)
        .with_context(|| format!("invalid cache file {}", path.display()))?;
    Ok(cache.normalized())
}

fn run_template(import_type: ImportType, out: Option<PathBuf>) -> Result<()> {
    let body = generate_template(import_type)?;
    let path = out.unwrap_or_else(|| PathBuf::from(template_file_name(import_type)));
    std::fs::write(&path, body).with_context(|| format!("cannot write {}", path.display()))?;
    println!("{}", path.display());
    Ok(())
}

fn print_summary(preview: &ImportPreview) {
    let s = &preview.summary;
    println!("{} ({})", preview.file_name, preview.import_type);
    println!("  rows:         {}", s.total_rows);
    println!("  blank rows:   {}", s.skipped_blank_rows);
    println!("  create:       {}", s.will_create);
    println!("  update:       {}", s.will_update);
    println!("  skip:         {}", s.will_skip);
    println!(
        "  warnings:     {} (critical rows {}, moderate rows {}, info rows {})",
        s.total_warnings, s.critical_rows, s.moderate_rows, s.info_rows
    );

    for warning in preview.warnings() {
        let tag = match warning.severity {
            Severity::Critical => "CRIT",
            Severity::Moderate => "WARN",
            Severity::Info => "INFO",
        };
        println!(
            "  [{}] line {:>4} {:<18} {}",
            tag, warning.line_number, warning.field, warning.message
        );
    }
}
