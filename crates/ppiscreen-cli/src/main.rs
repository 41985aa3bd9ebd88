//! ppiscreen - potency classification for protein-protein interaction inhibitors.
//! Entry point for the command-line binary.

mod config;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use ppiscreen_chem::FingerprintGenerator;
use ppiscreen_models::Pipeline;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Overrides;

#[derive(Parser)]
#[command(name = "ppiscreen", version, about = "Potency classification for PPI inhibitor tables")]
struct Cli {
    /// Config file (TOML, YAML or JSON)
    #[arg(long, short, global = true, env = "PPISCREEN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline and emit the JSON run report
    Run {
        #[command(flatten)]
        overrides: Overrides,

        /// Write the report here instead of stdout
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Load and label the table, print class balance and histograms
    Summary {
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Print the fingerprint bit string of one SMILES
    Fingerprint {
        smiles: String,

        #[arg(long)]
        bits: Option<usize>,

        #[arg(long)]
        radius: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ppiscreen=info,warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("ppiscreen {}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Run { overrides, report } => {
            let config = config::resolve(cli.config.as_deref(), &overrides)?;
            let report_path = report.or_else(|| config.output.report_path.as_ref().map(PathBuf::from));
            let pipeline = Pipeline::new(config)?;
            let run = pipeline.run().context("Pipeline run failed")?;

            match report_path {
                Some(path) => run
                    .write_json(&path)
                    .with_context(|| format!("Failed to write report to {}", path.display()))?,
                None => println!("{}", run.to_json_pretty()?),
            }
        }
        Command::Summary { overrides } => {
            let config = config::resolve(cli.config.as_deref(), &overrides)?;
            let summary = Pipeline::new(config)?.summarize().context("Summary failed")?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Fingerprint { smiles, bits, radius } => {
            let config = config::load(cli.config.as_deref())?;
            let generator = FingerprintGenerator::new(
                radius.unwrap_or(config.fingerprint.radius),
                bits.unwrap_or(config.fingerprint.n_bits),
            )?;
            let fp = generator
                .generate(&smiles)
                .with_context(|| format!("Cannot fingerprint {smiles}"))?;
            println!("{fp}");
            info!("{} of {} bits set", fp.count_ones(), fp.n_bits());
        }
    }

    Ok(())
}
