use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::path::{Path, PathBuf};
use wavstretch::app::{run_parameters, run_stretch};
use wavstretch::cli::{Cli, Commands, ConfigAction};
use wavstretch::config::Config;
use wavstretch::output::{StderrReporter, error_line, note_line, stderr_color};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", error_line(&format!("{:#}", e), stderr_color()));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            let config = load_config(cli.config.as_deref())?;
            let params = run_parameters(&cli, &config)?;
            let reporter = StderrReporter::new(cli.quiet, cli.verbose);
            if !cli.quiet && cli.verbose >= 2 {
                let banner = format!("wavstretch {}", wavstretch::version_string());
                eprintln!("{}", note_line(&banner, stderr_color()));
            }
            run_stretch(&params, &reporter)?;
        }
        Some(Commands::Config { action }) => {
            handle_config_command(action, cli.config.as_deref())?;
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "wavstretch",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// An explicit `--config` path must exist; the default path may be missing.
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = match custom_path {
        Some(path) => Config::load(path)?,
        None => match Config::default_path() {
            Some(path) => Config::load_or_default(&path)?,
            None => Config::default(),
        },
    };
    Ok(config)
}

fn config_path(custom_path: Option<&Path>) -> Option<PathBuf> {
    custom_path.map(Path::to_path_buf).or_else(Config::default_path)
}

fn handle_config_command(action: ConfigAction, custom_path: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Dump => {
            let config = load_config(custom_path)?;
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Path => match config_path(custom_path) {
            Some(path) => {
                println!("{}", path.display());
                if !path.exists() {
                    eprintln!(
                        "{}",
                        note_line("(file does not exist; built-in defaults apply)", stderr_color())
                    );
                }
            }
            None => {
                anyhow::bail!("No configuration directory on this platform");
            }
        },
    }
    Ok(())
}
