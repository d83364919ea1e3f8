mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use repay_core::formatting::Locale;

use commands::loan::{CalculateArgs, RateCutArgs, SweepArgs};
use commands::normalize::{FormatArgs, ParseArgs};
use commands::Context;

/// Equal-installment loan repayment calculator
#[derive(Parser)]
#[command(
    name = "repay",
    version,
    about = "Equal-installment loan repayment calculator",
    long_about = "Computes the fixed monthly installment, total payment and total interest \
                  of an amortizing loan from an amount, an annual rate in percent and a term \
                  in months. Amounts are handled with decimal precision and displayed in won."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, default_value = "repay.toml", global = true)]
    config: PathBuf,

    /// Display locale (ko-KR, en-US, de-DE); overrides the config file
    #[arg(long, global = true)]
    locale: Option<Locale>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly payment, total payment and total interest
    Calculate(CalculateArgs),
    /// Savings from lowering the annual rate by a number of percentage points
    RateCut(RateCutArgs),
    /// Payment and interest across a range of annual rates
    Sweep(SweepArgs),
    /// Leniently parse free text into a number
    Parse(ParseArgs),
    /// Format a number with thousands grouping
    Format(FormatArgs),
    /// Line-oriented session that recomputes as fields change
    Interactive,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn exit_with_error(e: impl std::fmt::Display) -> ! {
    eprintln!("{}: {}", "error".red().bold(), e);
    process::exit(1);
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = Context::load(&cli.config, cli.locale).unwrap_or_else(|e| exit_with_error(e));
    ctx.analytics.init();
    ctx.analytics.page_view("/");

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Calculate(args) => commands::loan::run_calculate(args, &ctx),
        Commands::RateCut(args) => commands::loan::run_rate_cut(args, &ctx),
        Commands::Sweep(args) => commands::loan::run_sweep(args, &ctx),
        Commands::Parse(args) => commands::normalize::run_parse(args),
        Commands::Format(args) => commands::normalize::run_format(args, &ctx),
        Commands::Interactive => {
            if let Err(e) = commands::interactive::run_interactive(&ctx) {
                exit_with_error(e);
            }
            return;
        }
        Commands::Version => {
            println!("repay {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => exit_with_error(e),
    }
}
