//! Command line surface.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "textfit", version, about = "Detect text that overflows its box")]
pub struct Args {
    /// Optional configuration file path (overrides discovery of `textfit.toml`).
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Measure each selector once and print one JSON object per line.
    Check {
        /// Page description (TOML).
        #[arg(long)]
        page: PathBuf,
        /// Measure this text instead of the element's own content.
        #[arg(long)]
        text: Option<String>,
        #[arg(long, value_enum, default_value_t = StrategyArg::Auto)]
        strategy: StrategyArg,
        #[arg(required = true)]
        selectors: Vec<String>,
    },
    /// Print the platform scrollbar width of the page.
    Scrollbar {
        #[arg(long)]
        page: PathBuf,
    },
    /// Re-check selectors whenever the page file changes, until Ctrl-C.
    Watch {
        #[arg(long)]
        page: PathBuf,
        /// Tick interval driving debounce deadlines.
        #[arg(long, default_value_t = 25)]
        tick_ms: u64,
        #[arg(required = true)]
        selectors: Vec<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyArg {
    /// Range first, clone on failure; clone whenever `--text` is given.
    Auto,
    Range,
    Clone,
    /// Run both strategies and report whether they agree.
    Compare,
}
