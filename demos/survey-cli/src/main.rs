//! survey-cli — offline driver for the stated-preference survey core.
//!
//! ```text
//! survey-cli generate [--out design.json] [--force]   write the design artifact
//! survey-cli show     [--design design.json] [--json] print scenarios + balance
//! survey-cli simulate [--respondents N] [--threads T] [--out responses.csv]
//! survey-cli export   [--out file.csv]                copy the response file
//! ```
//!
//! Every subcommand reads `--config <file.toml>` (defaults otherwise) and
//! accepts `--seed` to override the configured seed.  Logging goes to
//! stderr and honours `RUST_LOG` (default `info`).

mod respondent;

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sp_core::SurveyConfig;
use sp_design::{BalanceReport, Design, DesignGenerator, alternative_label, load_design, save_design};
use sp_output::{CsvSink, OutputError, RecordLayout};
use sp_survey::SurveyBuilder;

use respondent::SyntheticRespondent;

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "survey-cli", version, about = "Stated-preference mode-choice survey tools")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured design seed.
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the choice design and save it as JSON.
    Generate {
        /// Output path (default: `design_path` from the config).
        #[arg(long)]
        out: Option<PathBuf>,

        /// Overwrite an existing artifact.
        #[arg(long)]
        force: bool,
    },

    /// Print a saved design and its level balance.
    Show {
        /// Design artifact (default: `design_path` from the config).
        #[arg(long)]
        design: Option<PathBuf>,

        /// Dump the raw JSON instead of the table.
        #[arg(long)]
        json: bool,
    },

    /// Drive synthetic respondents through the full survey.
    Simulate {
        #[arg(long, default_value_t = 100)]
        respondents: usize,

        /// Worker threads (default: all cores).
        #[arg(long)]
        threads: Option<usize>,

        /// Response file (default: `responses_path` from the config).
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Copy the response file to `--out` or stdout.
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.seed)?;

    match cli.command {
        Command::Generate { out, force } => generate(&config, out, force),
        Command::Show { design, json } => show(&config, design, json),
        Command::Simulate { respondents, threads, out } => simulate(config, respondents, threads, out),
        Command::Export { out } => export(&config, out),
    }
}

/// CLI overrides beat the file, the file beats the defaults.
fn load_config(path: Option<&Path>, seed: Option<u64>) -> Result<SurveyConfig> {
    let mut config = match path {
        Some(p) => SurveyConfig::load(p).with_context(|| format!("reading config {}", p.display()))?,
        None => SurveyConfig::default(),
    };
    if let Some(seed) = seed {
        config.seed = seed;
    }
    Ok(config)
}

// ── Subcommands ───────────────────────────────────────────────────────────────

fn generate(config: &SurveyConfig, out: Option<PathBuf>, force: bool) -> Result<()> {
    let path = out.unwrap_or_else(|| config.design_path.clone());
    if path.exists() && !force {
        bail!("{} already exists; pass --force to overwrite it", path.display());
    }

    let t0 = Instant::now();
    let generator = DesignGenerator::new(&config.catalog).with_max_attempts(config.max_attempts);
    let (design, report) = generator
        .generate_with_report(config.n_scenarios, config.n_alternatives, config.seed)
        .context("generating design")?;
    save_design(&path, &design).with_context(|| format!("saving {}", path.display()))?;

    println!("{report}");
    info!(
        path      = %path.display(),
        scenarios = design.len(),
        seed      = config.seed,
        elapsed   = ?t0.elapsed(),
        "design written"
    );
    Ok(())
}

fn show(config: &SurveyConfig, path: Option<PathBuf>, json: bool) -> Result<()> {
    let path = path.unwrap_or_else(|| config.design_path.clone());
    let design = load_design(&path).with_context(|| format!("loading {}", path.display()))?;
    design
        .validate(&config.catalog, config.n_alternatives)
        .with_context(|| format!("{} does not match the configured catalog", path.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &design)?;
        writeln!(out)?;
        return Ok(());
    }
    print_design(&mut out, config, &design)?;
    writeln!(out)?;
    writeln!(out, "{}", BalanceReport::of_design(&design, &config.catalog))?;
    Ok(())
}

fn print_design<W: Write>(out: &mut W, config: &SurveyConfig, design: &Design) -> io::Result<()> {
    for scenario in design.scenarios() {
        writeln!(out, "Scenario {}", scenario.scenario_id)?;
        for (label, alt) in scenario.iter() {
            let cells: Vec<String> = config
                .catalog
                .names()
                .map(|name| alt.get(name).map(ToString::to_string).unwrap_or_default())
                .collect();
            writeln!(out, "  {label}: {}", cells.join(" | "))?;
        }
    }
    Ok(())
}

fn simulate(
    mut config:  SurveyConfig,
    respondents: usize,
    threads:     Option<usize>,
    out:         Option<PathBuf>,
) -> Result<()> {
    if let Some(out) = out {
        config.responses_path = out;
    }
    let seed = config.seed;
    let survey = SurveyBuilder::new(config).build_csv().context("starting survey")?;

    let mut pool = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        pool = pool.num_threads(n);
    }
    let pool = pool.build().context("building thread pool")?;

    info!(respondents, threads = pool.current_num_threads(), "simulation starting");
    let t0 = Instant::now();
    let answered: usize = pool.install(|| {
        (0..respondents as u64)
            .into_par_iter()
            .map(|i| SyntheticRespondent::new(seed.wrapping_add(i)).run(&survey))
            .collect::<Result<Vec<_>>>()
            .map(|counts| counts.into_iter().sum())
    })?;

    info!(
        respondents,
        rows    = answered,
        path    = %survey.sink().path().display(),
        elapsed = ?t0.elapsed(),
        "simulation complete"
    );
    Ok(())
}

fn export(config: &SurveyConfig, out: Option<PathBuf>) -> Result<()> {
    let labels: Vec<String> = (0..config.n_alternatives).map(alternative_label).collect();
    let sink = CsvSink::new(&config.responses_path, RecordLayout::new(&config.catalog, &labels));

    let result = match &out {
        Some(path) => {
            let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            sink.export(&mut file)
        }
        None => sink.export(&mut io::stdout().lock()),
    };
    match result {
        Ok(bytes) => {
            info!(bytes, from = %config.responses_path.display(), "responses exported");
            Ok(())
        }
        Err(OutputError::NoData) => bail!("no responses recorded yet at {}", config.responses_path.display()),
        Err(e) => Err(e.into()),
    }
}
