//! pylos-dataset: builds value-network training data from recorded games.
//!
//! Reads a JSON array of games (file or stdin), writes one JSON object per
//! training example to stdout or `--output`. Logs go to stderr; set
//! `RUST_LOG=debug` to see filtered games.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use pylos_dataset::config::DatasetConfig;
use pylos_dataset::dataset::DatasetBuilder;
use pylos_dataset::game::{load_corpus, read_corpus};
use pylos_dataset::nn::features::FeatureSetPolicy;

/// Build Pylos value-network training data from recorded games
#[derive(Parser, Debug)]
#[command(name = "pylos-dataset", version, about)]
struct Opt {
    /// Game corpus (JSON array), or "-" for stdin
    #[arg(long, default_value = "-")]
    input: String,
    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Per-move decay of the game outcome, in (0, 1]
    #[arg(long)]
    discount: Option<f64>,
    /// Only use games where both players are listed (comma separated)
    #[arg(long, value_delimiter = ',')]
    players: Vec<String>,
    /// Feature layout: aggregate or spatial
    #[arg(long)]
    feature_set: Option<String>,
    /// Symmetric copies per position: 1, 4 or 8
    #[arg(long)]
    symmetries: Option<usize>,
    /// Shuffle seed, 0 for entropy
    #[arg(long)]
    seed: Option<u64>,
    /// Output file (default: stdout)
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn build_config(opt: &Opt) -> Result<DatasetConfig> {
    let mut config = match &opt.config {
        Some(path) => DatasetConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => DatasetConfig::default(),
    };
    if let Some(d) = opt.discount {
        config.discount_factor = d;
    }
    if !opt.players.is_empty() {
        config.participant_filter = opt.players.iter().map(|p| p.trim().to_string()).collect();
    }
    if let Some(name) = &opt.feature_set {
        config.feature_set_policy = FeatureSetPolicy::from_name(name)
            .with_context(|| format!("unknown feature set '{}' (aggregate or spatial)", name))?;
    }
    if let Some(n) = opt.symmetries {
        config.symmetry_count = n;
    }
    if let Some(seed) = opt.seed {
        config.seed = seed;
    }
    Ok(config)
}

fn run() -> Result<()> {
    let opt = Opt::parse();
    let config = build_config(&opt)?;
    let builder = DatasetBuilder::new(config).context("invalid configuration")?;

    let games = if opt.input == "-" {
        read_corpus(io::stdin().lock()).context("failed to read corpus from stdin")?
    } else {
        load_corpus(Path::new(&opt.input))?
    };
    info!("Loaded {} games", games.len());

    let start = Instant::now();
    let dataset = builder.build(&games)?;
    info!(
        "Built {} examples in {:.1}s",
        dataset.len(),
        start.elapsed().as_secs_f64()
    );

    match &opt.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create output file {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            dataset
                .write_jsonl(&mut writer)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("Wrote {} examples to {}", dataset.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            dataset
                .write_jsonl(&mut writer)
                .context("failed to write output")?;
            writer.flush()?;
        }
    }
    Ok(())
}
