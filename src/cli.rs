//! Command-line interface for gambit.

use clap::{Parser, Subcommand};
use gambit::{GameMode, Seat};

/// Gambit - tic-tac-toe against a language-model move oracle
#[derive(Parser, Debug)]
#[command(name = "gambit")]
#[command(about = "Play tic-tac-toe against an LLM or a friend", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file (defaults are used if it is missing)
    #[arg(short, long, global = true, default_value = "gambit.toml")]
    pub config: std::path::PathBuf,

    /// Override the model named in the config file
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Use the offline random oracle instead of an LLM
    #[arg(long, global = true)]
    pub offline: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play in the terminal UI
    Play {
        /// Starting mode: "ai" or "pvp" (overrides the config file)
        #[arg(long)]
        mode: Option<GameMode>,
    },

    /// Ask the oracle for one move and print the cell it would play
    Suggest {
        /// Board in compact notation, e.g. "XX.OO...." or "XX./OO./..."
        board: String,

        /// Seat to move for
        #[arg(long, default_value = "O")]
        seat: Seat,
    },
}
