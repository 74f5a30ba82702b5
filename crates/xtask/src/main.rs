use std::{
  fs,
  io::{self, Write},
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate_to};
use clap_mangen::Man;

/// Name of the installed binary.
const BIN_NAME: &str = "migjira";

/// Shells we ship completions for.
const SHELLS: [Shell; 4] =
  [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell];

#[derive(Parser)]
#[command(author, version, about)]
struct Xtask {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build distribution artifacts for the migjira CLI
  Dist {
    /// Output directory for generated files.
    #[arg(short, long, default_value = "dist")]
    output_dir: PathBuf,

    /// Only generate shell completions.
    #[arg(long, conflicts_with = "manpage_only")]
    completions_only: bool,

    /// Only generate the manpage.
    #[arg(long, conflicts_with = "completions_only")]
    manpage_only: bool,
  },
}

fn main() -> Result<()> {
  let Commands::Dist {
    output_dir,
    completions_only,
    manpage_only,
  } = Xtask::parse().command;

  let mut stdout = io::stdout().lock();
  if !manpage_only {
    let dir = generate_completions(&output_dir)?;
    writeln!(stdout, "Shell completions generated in {}", dir.display())?;
  }
  if !completions_only {
    let path = generate_manpage(&output_dir)?;
    writeln!(stdout, "Manpage generated at {}", path.display())?;
  }
  Ok(())
}

/// Write completion scripts for every supported shell into
/// `output_dir/completions`.
fn generate_completions(output_dir: &Path) -> Result<PathBuf> {
  let dir = output_dir.join("completions");
  fs::create_dir_all(&dir)
    .with_context(|| format!("Failed to create {}", dir.display()))?;

  let mut cmd = migjira::cli::Cli::command();
  for shell in SHELLS {
    generate_to(shell, &mut cmd, BIN_NAME, &dir).with_context(|| {
      format!("Failed to generate {shell} completions")
    })?;
  }
  Ok(dir)
}

/// Render `output_dir/man/migjira.1`.
fn generate_manpage(output_dir: &Path) -> Result<PathBuf> {
  let dir = output_dir.join("man");
  fs::create_dir_all(&dir)
    .with_context(|| format!("Failed to create {}", dir.display()))?;

  let path = dir.join(format!("{BIN_NAME}.1"));
  let mut file = fs::File::create(&path).with_context(|| {
    format!("Failed to create manpage file at {}", path.display())
  })?;
  Man::new(migjira::cli::Cli::command())
    .render(&mut file)
    .context("Failed to render manpage")?;
  Ok(path)
}
