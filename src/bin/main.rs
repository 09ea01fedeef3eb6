//! relcat CLI - generate a documentation catalog for a project
//!
//! Usage:
//!   relcat generate [--config <relcat.toml>] [--manifest <manifest.json>] [--sqlite <db> | --rows <rows.json>]
//!   relcat inspect [--manifest <manifest.json>] [--sqlite <db> | --rows <rows.json>]
//!
//! Examples:
//!   relcat generate --sqlite warehouse.db --database warehouse --manifest target/manifest.json
//!   relcat inspect --rows captured_rows.json --manifest target/manifest.json

use clap::{Args, Parser, Subcommand};
use relcat::adapter::{self, CatalogAdapter, JsonRowsAdapter, SqliteAdapter};
use relcat::config::Settings;
use relcat::generate::{self, build_and_resolve, GenerateTask, NodeResult};
use relcat::manifest::Manifest;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "relcat")]
#[command(about = "relcat - build a documentation catalog of warehouse relations")]
#[command(version)]
struct Cli {
    /// Path to relcat.toml (defaults to the usual search locations)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build, resolve and write catalog.json
    Generate {
        #[command(flatten)]
        source: SourceArgs,

        /// Output directory (overrides target_path)
        #[arg(short, long)]
        target: Option<PathBuf>,

        /// JSON file of compile results; enables the compile gate
        #[arg(long)]
        compile_results: Option<PathBuf>,
    },

    /// Build and resolve the catalog without writing anything
    Inspect {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Project manifest (overrides manifest.path)
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Introspect a SQLite database file
    #[arg(long, conflicts_with = "rows")]
    sqlite: Option<PathBuf>,

    /// Read captured catalog rows from a JSON file
    #[arg(long)]
    rows: Option<PathBuf>,

    /// Database name reported for SQLite relations (overrides adapter.database)
    #[arg(long)]
    database: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&settings.log_level);

    match cli.command {
        Commands::Generate {
            source,
            target,
            compile_results,
        } => cmd_generate(settings, source, target, compile_results),
        Commands::Inspect { source } => cmd_inspect(settings, source),
    }
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_env("RELCAT_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_adapter(settings: &Settings, source: &SourceArgs) -> Result<Box<dyn CatalogAdapter>, String> {
    let database = source
        .database
        .clone()
        .unwrap_or_else(|| settings.adapter.database.clone());

    if let Some(path) = &source.sqlite {
        return SqliteAdapter::open(path, database)
            .map(|a| Box::new(a) as Box<dyn CatalogAdapter>)
            .map_err(|e| format!("Error opening '{}': {}", path.display(), e));
    }
    if let Some(path) = &source.rows {
        return Ok(Box::new(JsonRowsAdapter::new(path)));
    }
    adapter::from_settings(&settings.adapter).map_err(|e| format!("Adapter error: {}", e))
}

fn load_manifest(settings: &Settings, source: &SourceArgs) -> Result<Manifest, String> {
    let path = match &source.manifest {
        Some(path) => Some(path.clone()),
        None => settings
            .manifest_path()
            .map_err(|e| format!("Configuration error: {}", e))?,
    };

    match path {
        Some(path) => Manifest::from_file(&path).map_err(|e| e.to_string()),
        None => {
            tracing::warn!("no manifest configured, every table will be unmatched");
            Ok(Manifest::default())
        }
    }
}

fn load_compile_results(path: &Path) -> Result<Vec<NodeResult>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Error reading file '{}': {}", path.display(), e))?;
    serde_json::from_str(&content)
        .map_err(|e| format!("Error parsing compile results '{}': {}", path.display(), e))
}

fn cmd_generate(
    mut settings: Settings,
    source: SourceArgs,
    target: Option<PathBuf>,
    compile_results: Option<PathBuf>,
) -> ExitCode {
    if let Some(target) = target {
        settings.target_path = target.display().to_string();
    }
    if compile_results.is_some() {
        settings.compile = true;
    }

    let prepared = open_adapter(&settings, &source).and_then(|adapter| {
        let manifest = load_manifest(&settings, &source)?;
        let compiled = compile_results
            .as_deref()
            .map(load_compile_results)
            .transpose()?;
        Ok((adapter, manifest, compiled))
    });
    let (adapter, manifest, compiled) = match prepared {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let task = GenerateTask::new(settings);
    match task.run(adapter.as_ref(), &manifest, compiled) {
        Ok(results) => {
            println!(
                "{} nodes documented, {} tables without a node",
                results.nodes.len(),
                results.unmatched.len()
            );
            if generate::interpret_results(&results) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("Generation error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_inspect(settings: Settings, source: SourceArgs) -> ExitCode {
    let prepared = open_adapter(&settings, &source).and_then(|adapter| {
        let manifest = load_manifest(&settings, &source)?;
        Ok((adapter, manifest))
    });
    let (adapter, manifest) = match prepared {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let rows = match adapter.get_catalog(&manifest).and_then(|t| t.into_rows()) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("Adapter error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let resolved = match build_and_resolve(rows, &manifest) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Catalog error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if !resolved.nodes().is_empty() {
        println!("Nodes:");
        for (unique_id, table) in resolved.nodes() {
            println!(
                "  - {} -> {} ({} columns)",
                unique_id,
                table.key(),
                table.columns.len()
            );
        }
        println!();
    }

    if !resolved.unmatched().is_empty() {
        println!("Tables without a node:");
        for table in resolved.unmatched() {
            println!("  - {} (unmatched)", table.key());
        }
    } else {
        println!("Every table matched a node.");
    }

    ExitCode::SUCCESS
}
