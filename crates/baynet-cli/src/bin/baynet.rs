//! baynet CLI - batch answering of Bayesian network queries
//!
//! Usage:
//!   baynet                             # Read input.txt, write output.txt
//!   baynet queries.txt -o answers.txt  # Explicit input and output files
//!   baynet queries.txt --format json   # One JSON document with every answer
//!   baynet queries.txt --print-network # Dump the loaded network to stderr

use std::path::PathBuf;
use std::process;

use baynet_core::{run_batch, BatchAnswer, BatchInput, EliminationConfig};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "baynet")]
#[command(version)]
#[command(about = "baynet - exact inference over XMLBIF Bayesian networks")]
#[command(
    long_about = "Answers d-separation (A-B|E) and probability (P(Q=q|E=e) H1-H2) queries against the network named on the first line of the input file"
)]
struct Cli {
    /// Batch input: network path on the first line, one query per line after it
    #[arg(value_name = "INPUT", default_value = "input.txt")]
    input: PathBuf,

    /// File the answers are written to
    #[arg(short, long, value_name = "OUTPUT", default_value = "output.txt")]
    output: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Print the loaded network structure to stderr
    #[arg(long)]
    print_network: bool,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One answer per line
    Text,
    /// JSON report with the query next to each answer
    Json,
}

#[derive(Serialize)]
struct Report<'a> {
    network: String,
    answers: &'a [BatchAnswer],
    failed: usize,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let input = match BatchInput::read(&cli.input) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Error reading input '{}': {}", cli.input.display(), e);
            process::exit(1);
        }
    };

    let network = match input.load_network() {
        Ok(network) => network,
        Err(e) => {
            eprintln!(
                "Error loading network '{}': {}",
                input.network_path.display(),
                e
            );
            process::exit(1);
        }
    };

    if cli.print_network {
        eprint!("{}", network);
    }

    let answers = match run_batch(&network, &input.queries, EliminationConfig::default()) {
        Ok(answers) => answers,
        Err(e) => {
            eprintln!("Error running batch: {}", e);
            process::exit(1);
        }
    };
    let failed = answers.iter().filter(|a| a.failed).count();

    let rendered = match cli.format {
        Format::Text => render_text(&answers),
        Format::Json => {
            let report = Report {
                network: input.network_path.display().to_string(),
                answers: &answers,
                failed,
            };
            match serde_json::to_string_pretty(&report) {
                Ok(json) => json + "\n",
                Err(e) => {
                    eprintln!("Error serializing to JSON: {}", e);
                    process::exit(1);
                }
            }
        }
    };

    if let Err(e) = std::fs::write(&cli.output, rendered) {
        eprintln!("Error writing output '{}': {}", cli.output.display(), e);
        process::exit(1);
    }

    tracing::info!(
        answered = answers.len(),
        failed,
        output = %cli.output.display(),
        "batch complete"
    );
}

fn render_text(answers: &[BatchAnswer]) -> String {
    let mut out = String::new();
    for answer in answers {
        out.push_str(&answer.output);
        out.push('\n');
    }
    out
}
