//! GGM OpenRegister CLI
//!
//! Generates one OpenRegister configuration document per GGM domain from a
//! JSON export of the modelling-tool repository.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use ggm_openregister::{Generator, GeneratorConfig, ModelSnapshot, OutputFormat, OutputWriter};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ggm-openregister")]
#[command(about = "Generate OpenRegister configuration from the Gemeentelijk Gegevensmodel")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ggm-openregister.toml lookup)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one document per configured domain
    Generate {
        /// Model snapshot (JSON export of the repository tables)
        snapshot: PathBuf,

        /// Output directory (overrides the configured one)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write compact JSON
        #[arg(long)]
        compact: bool,

        /// Write a checksums.sha256 file next to the documents
        #[arg(long)]
        checksums: bool,

        /// Dry run - don't write any documents
        #[arg(long)]
        dry_run: bool,

        /// Write a JSON generation report to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// List the configured domains
    Domains,

    /// Build the cross-domain index and report per-domain counts
    Inspect {
        /// Model snapshot (JSON export of the repository tables)
        snapshot: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_ref().map(|p| p.to_string_lossy().into_owned());
    let mut config = GeneratorConfig::load_from(config_path.as_deref())
        .context("Failed to load configuration")?;

    match cli.command {
        Commands::Generate {
            snapshot,
            output,
            compact,
            checksums,
            dry_run,
            report,
        } => {
            if let Some(dir) = output {
                config.output.dir = dir;
            }
            if compact {
                config.output.format = OutputFormat::Compact;
            }
            if checksums {
                config.output.include_checksums = true;
            }

            println!("📦 GGM OpenRegister");
            println!("  Snapshot: {:?}", snapshot);
            println!("  Model version: {}", config.model.version);
            println!();

            let model = ModelSnapshot::from_path(&snapshot)?;
            let generation = Generator::new(&model, &config).run()?;

            let writer = OutputWriter::from_config(&config).dry_run(dry_run);
            let summary = writer.write(&generation, &config.model.version)?;

            for domain in &summary.domains {
                println!(
                    "  {} → {} schemas ({} renamed, {} relationships dropped)",
                    domain.file,
                    domain.schemas,
                    domain.renamed_slugs,
                    domain.unresolved_associations
                );
            }
            println!();

            if let Some(path) = report {
                summary
                    .save(&path)
                    .with_context(|| format!("Failed to write report to {}", path.display()))?;
                println!("📝 Report written to {:?}", path);
            }

            if dry_run {
                println!(
                    "✅ Dry run complete: {} schemas in {} documents",
                    summary.total_schemas,
                    summary.domains.len()
                );
            } else {
                println!(
                    "✅ Wrote {} schemas in {} documents to {:?}",
                    summary.total_schemas,
                    summary.domains.len(),
                    writer.dir()
                );
            }
            Ok(())
        }

        Commands::Domains => {
            config.validate()?;
            println!("📂 {} domains", config.domains.len());
            for domain in &config.domains {
                println!(
                    "  [{:>4}] {:<36} {} → {}",
                    domain.root_id, domain.slug, domain.name, domain.file
                );
            }
            Ok(())
        }

        Commands::Inspect { snapshot } => {
            let model = ModelSnapshot::from_path(&snapshot)?;
            let generator = Generator::new(&model, &config);
            let index = generator.index()?;

            println!(
                "🔍 {} entities indexed across {} domains",
                index.len(),
                config.domains.len()
            );
            for domain in &config.domains {
                println!("  {:<36} {:>5}", domain.slug, index.count_in_domain(&domain.slug));
            }

            let generation = generator.run()?;
            let dropped: usize = generation
                .domains
                .iter()
                .map(|d| d.stats.build.unresolved_associations)
                .sum();
            let parents: usize = generation
                .domains
                .iter()
                .map(|d| d.stats.build.unresolved_parents)
                .sum();
            println!();
            println!("  Unresolved relationships: {}", dropped);
            println!("  Unresolved parents:       {}", parents);
            Ok(())
        }
    }
}
