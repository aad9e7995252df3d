// stockmatch CLI - match buyer preferences against supplier stock

mod exit_codes;
mod logging;
mod run;
mod score;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::EXIT_SUCCESS;

#[derive(Parser)]
#[command(name = "smatch")]
#[command(about = "Rank supplier stock against buyer preferences")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Only log warnings and errors; skip the run summary
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run matching from a TOML config file
    #[command(after_help = "\
Examples:
  smatch run stock.toml
  smatch run stock.toml --json
  smatch run stock.toml --output result.json
  STOCKMATCH_LOG=debug smatch run stock.toml")]
    Run {
        /// Path to the config file
        config: PathBuf,

        /// Output JSON to stdout instead of the CSV table
        #[arg(long)]
        json: bool,

        /// Also write the JSON result to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate a config without running
    #[command(after_help = "\
Examples:
  smatch validate stock.toml")]
    Validate {
        /// Path to the config file
        config: PathBuf,
    },

    /// Score a single buyer/item pair and explain the result
    #[command(after_help = "\
Examples:
  smatch score --grade A36 --finish pickled --thickness 2.0 --width 1000 \\
      --item-grade A36 --item-finish pickled --item-thickness 2.0 --item-width 1000 \\
      --item-weight 3000 --item-quantity 50
  smatch score --grade S235 --finish gebeizt --translated \\
      --item-grade S235 --item-finish pickled --item-weight 900 --item-quantity 4 --json")]
    Score(score::ScoreArgs),
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  stockmatch-matcher ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  stockmatch-matcher ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.quiet);

    let result = match cli.command {
        Commands::Run { config, json, output } => run::cmd_run(config, json, output, cli.quiet),
        Commands::Validate { config } => run::cmd_validate(config),
        Commands::Score(args) => score::cmd_score(args),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
