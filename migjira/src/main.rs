use std::{
  fs,
  io::{self, Write},
  path::Path,
};

use color_eyre::eyre::{Context, Result, bail};
use log::{info, warn};
use migjira::{
  cli::{Cli, Commands},
  convert::convert_records,
};
use migjira_config::Config;
use migjira_markup::{AttachmentMap, Converter, ConverterOptions, UserMapping};

fn main() -> Result<()> {
  color_eyre::install()?;

  // Parse command line arguments
  let cli = Cli::parse_args();

  // Initialize logging first so we can log during command handling
  env_logger::Builder::new()
    .filter_level(cli.verbosity.log_level_filter())
    .write_style(env_logger::WriteStyle::Always)
    .init();

  match &cli.command {
    Commands::Init {
      output,
      format,
      force,
    } => init_config(output, format, *force),

    Commands::Markup {
      file,
      users,
      no_hard_breaks,
    } => {
      let config = load_config(&cli)?;
      convert_markup(&config, file.as_deref(), users.as_deref(), !no_hard_breaks)
    },

    Commands::Convert {
      input,
      output,
      jobs,
    } => {
      let mut config = load_config(&cli)?;
      config.merge_with_cli(output.as_deref(), *jobs);
      config.validate().wrap_err("Invalid configuration")?;
      let input = input
        .clone()
        .unwrap_or_else(|| config.output.json_dir.clone());
      run_convert(&config, &input)
    },
  }
}

fn load_config(cli: &Cli) -> Result<Config> {
  let mut config = Config::load(cli.config_file.as_deref())
    .wrap_err("Failed to load configuration")?;
  config
    .apply_overrides(&cli.config_overrides)
    .wrap_err("Failed to apply configuration overrides")?;
  Ok(config)
}

fn init_config(output: &Path, format: &str, force: bool) -> Result<()> {
  // Check if file already exists and that we're not forcing overwrite
  if output.exists() && !force {
    bail!(
      "Configuration file already exists: {}. Use --force to overwrite.",
      output.display()
    );
  }

  // Create parent directories if needed
  if let Some(parent) = output.parent() {
    if !parent.as_os_str().is_empty() && !parent.exists() {
      fs::create_dir_all(parent).wrap_err_with(|| {
        format!("Failed to create directory: {}", parent.display())
      })?;
      info!("Created directory: {}", parent.display());
    }
  }

  Config::generate_default_config(format, output).wrap_err_with(|| {
    format!("Failed to generate configuration file: {}", output.display())
  })?;

  info!("Configuration file created at {}", output.display());
  Ok(())
}

fn run_convert(config: &Config, input: &Path) -> Result<()> {
  // Setup thread pool once for all parallel operations
  let thread_count = config.jobs.unwrap_or_else(num_cpus::get);
  rayon::ThreadPoolBuilder::new()
    .num_threads(thread_count)
    .build_global()?;

  let summary = convert_records(input, config)?;
  if summary.failed > 0 {
    warn!(
      "{} of {} records failed to convert",
      summary.failed,
      summary.failed + summary.converted
    );
  }
  Ok(())
}

fn convert_markup(
  config: &Config,
  file: Option<&Path>,
  users: Option<&Path>,
  hard_breaks: bool,
) -> Result<()> {
  let text = match file {
    Some(path) => {
      fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?
    },
    None => io::read_to_string(io::stdin()).wrap_err("Failed to read stdin")?,
  };

  let users: UserMapping = match users {
    Some(path) => {
      let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
      serde_json::from_str(&content).wrap_err_with(|| {
        format!("Invalid user mapping in {}", path.display())
      })?
    },
    None => UserMapping::new(),
  };
  let attachments = AttachmentMap::new();

  let options = ConverterOptions::default()
    .with_attachment_url(&config.output.attachments_url)
    .with_hard_breaks(hard_breaks);
  let markdown =
    Converter::with_options(&users, &attachments, options).convert(&text);

  let mut stdout = io::stdout().lock();
  writeln!(stdout, "{markdown}").wrap_err("Failed to write output")?;
  Ok(())
}
