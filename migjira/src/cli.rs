use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};

/// Command line interface for migjira
#[derive(Parser, Debug)]
#[command(author, version, about = "migjira: Jira issues to Markdown")]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Commands,

  #[command(flatten)]
  pub verbosity: Verbosity<InfoLevel>,

  /// Path to the configuration file (TOML or JSON). Defaults to
  /// `migjira.toml` or `.config/migjira.toml` in the working directory.
  #[arg(short = 'c', long = "config-file", global = true)]
  pub config_file: Option<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times)
  #[arg(long = "config", global = true, action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,
}

/// All supported subcommands for the migjira CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Initialize a new migjira configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "migjira.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json"])]
    format: String,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },

  /// Convert cached issue records into Markdown pages.
  Convert {
    /// Issue record file, or directory searched recursively for them.
    /// Defaults to the configured JSON directory.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory for Markdown pages.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of threads to use for parallel processing.
    #[arg(short = 'p', long = "jobs")]
    jobs: Option<usize>,
  },

  /// Convert a single wiki markup text to Markdown and print it.
  Markup {
    /// File to read. Reads standard input when omitted.
    file: Option<PathBuf>,

    /// JSON object mapping account ids to display names, used for mentions.
    #[arg(short, long)]
    users: Option<PathBuf>,

    /// Do not append hard line breaks.
    #[arg(long = "no-hard-breaks")]
    no_hard_breaks: bool,
  },
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}
