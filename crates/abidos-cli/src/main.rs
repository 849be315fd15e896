//! abidos — fusion planner on the command line.
//!
//! Thin front end over `abidos-logic`: forwards raw tokens to the command
//! adapter, prints the reply, and hosts the self-check harness.
//!
//! Usage:
//!   abidos optimize 1000 500 100
//!   abidos optimize 1000 500 100 --json --rates rates.json
//!   abidos check --verbose

use std::path::{Path, PathBuf};
use std::process;

use abidos_logic::command::{self, NO_SOLUTION_REPLY};
use abidos_logic::optimizer::{search_space, NoSolution, Solution};
use abidos_logic::rates::{validate_rates, ConversionRates};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod check;

/// Plans evaluated before the search is refused; roughly a few seconds.
const DEFAULT_MAX_SEARCH_SPACE: u64 = 25_000_000;

#[derive(Parser)]
#[command(
    name = "abidos",
    version,
    about = "Fusion planner — maximize fusions from timber, tender and abidos"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute the best conversion plan for a resource pool
    Optimize {
        /// Timber, tender and abidos, in that order
        #[arg(value_name = "QUANTITY", allow_negative_numbers = true)]
        quantities: Vec<String>,
        /// Print the solution as JSON
        #[arg(long)]
        json: bool,
        /// JSON file overriding conversion rates
        #[arg(long, value_name = "PATH")]
        rates: Option<PathBuf>,
        /// Refuse pools needing more plans than this (0 = unlimited)
        #[arg(long, default_value_t = DEFAULT_MAX_SEARCH_SPACE)]
        max_search_space: u64,
    },
    /// Run the headless self-check harness
    Check {
        /// Print every check, not only failures
        #[arg(long)]
        verbose: bool,
        /// Seed for the random sweep
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Number of random pools to sweep
        #[arg(long, default_value_t = 200)]
        samples: usize,
    },
    /// Print help for the optimize command
    Usage,
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::Optimize {
            quantities,
            json,
            rates,
            max_search_space,
        } => run_optimize(&quantities, json, rates.as_deref(), max_search_space),
        Command::Check {
            verbose,
            seed,
            samples,
        } => Ok(check::run(verbose, seed, samples)),
        Command::Usage => {
            println!("{}", command::USAGE);
            Ok(true)
        }
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(err) => {
            eprintln!("error: {err:#}");
            process::exit(2);
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`). `log` records
/// from the logic crate are bridged into the subscriber.
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load and validate a rates file, or fall back to the standard rates.
fn load_rates(path: Option<&Path>) -> Result<ConversionRates> {
    let Some(path) = path else {
        return Ok(ConversionRates::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading rates file {}", path.display()))?;
    let rates: ConversionRates = serde_json::from_str(&text)
        .with_context(|| format!("parsing rates file {}", path.display()))?;

    let errors = validate_rates(&rates);
    if !errors.is_empty() {
        let joined = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        bail!("invalid rates in {}: {}", path.display(), joined);
    }
    log::info!("loaded rates from {}: {:?}", path.display(), rates);
    Ok(rates)
}

/// Returns the plan count when the tokens describe a pool whose search
/// exceeds `budget`.
fn oversized(quantities: &[String], rates: &ConversionRates, budget: u64) -> Option<u128> {
    if budget == 0 {
        return None;
    }
    let pool = command::parse_resources(quantities).ok()?;
    search_space(pool, rates).filter(|plans| *plans > u128::from(budget))
}

fn run_optimize(
    quantities: &[String],
    json: bool,
    rates_path: Option<&Path>,
    max_search_space: u64,
) -> Result<bool> {
    let rates = load_rates(rates_path)?;

    if let Some(plans) = oversized(quantities, &rates, max_search_space) {
        log::warn!("refusing search over {plans} plans (budget {max_search_space})");
        if json {
            let reason =
                format!("search space of {plans} plans exceeds budget of {max_search_space}");
            let body = serde_json::json!({ "error": reason });
            println!("{}", serde_json::to_string_pretty(&body)?);
        } else {
            println!("{NO_SOLUTION_REPLY}");
        }
        return Ok(false);
    }

    let result = command::run_command(quantities, &rates);
    match &result {
        Ok(solution) => {
            log::debug!("solved {:?} → {} fusions", quantities, solution.max_fusions)
        }
        Err(reason) => log::info!("no solution for {:?}: {}", quantities, reason),
    }

    if json {
        println!("{}", render_json(&result)?);
    } else {
        println!("{}", command::render_reply(&result, &rates));
    }
    Ok(result.is_ok())
}

fn render_json(result: &Result<Solution, NoSolution>) -> Result<String> {
    let text = match result {
        Ok(solution) => serde_json::to_string_pretty(solution)?,
        Err(reason) => serde_json::to_string_pretty(&serde_json::json!({
            "error": reason.to_string()
        }))?,
    };
    Ok(text)
}
