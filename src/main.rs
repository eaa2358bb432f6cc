//! ReedSTYLE components CLI
//!
//! Usage:
//!   reedstyle-components [OPTIONS] <COMMAND>
//!
//! Commands:
//!   list              List the loaded presets
//!   resolve <NAME>    Print a preset flattened with its ancestors
//!   check             Lint the definitions
//!
//! Options:
//!   -c, --config <FILE>  Configuration file (TOML format)
//!   -d, --dir <DIR>      Directory the definition paths are relative to
//!   -v, --verbose        Log what the loader does
//!   -h, --help           Print help

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use reedstyle_components::lint::{self, LintWarning};
use reedstyle_components::parser::parse_report;
use reedstyle_components::{
    load_definitions, DefinitionOrigin, DefinitionSource, FileSource, LoadedDefinitions,
    SystemConfig,
};

#[derive(Parser)]
#[command(name = "reedstyle-components")]
#[command(about = "Resolve and check ReedSTYLE component presets")]
struct Cli {
    /// Configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory the definition paths are relative to
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Log what the loader does
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the loaded presets
    List,

    /// Print a preset flattened with its ancestors
    Resolve {
        /// Preset name
        name: String,

        /// Print JSON instead of attribute lines
        #[arg(long)]
        json: bool,
    },

    /// Lint the definitions
    Check,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = match &cli.config {
        Some(path) => match SystemConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => SystemConfig::default(),
    };

    let source = FileSource::new(&cli.dir);
    let loaded = load_definitions(&source, &config.sources, &config.parser);

    match cli.command {
        Command::List => list(&loaded),
        Command::Resolve { name, json } => resolve(&loaded, &name, json),
        Command::Check => check(&loaded, &source, &config),
    }
}

fn list(loaded: &LoadedDefinitions) -> ExitCode {
    for preset in loaded.registry.iter() {
        match &preset.parent {
            Some(parent) => println!("{} (extends {})", preset.name, parent),
            None => println!("{}", preset.name),
        }
    }
    ExitCode::SUCCESS
}

fn resolve(loaded: &LoadedDefinitions, name: &str, json: bool) -> ExitCode {
    let resolved = match loaded.registry.resolve(name) {
        Ok(Some(resolved)) => resolved,
        Ok(None) => {
            eprintln!("Error: unknown preset '{}'", name);
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if json {
        match serde_json::to_string_pretty(&resolved.public_attributes()) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        print!("{}", resolved);
    }
    ExitCode::SUCCESS
}

fn check(loaded: &LoadedDefinitions, source: &FileSource, config: &SystemConfig) -> ExitCode {
    let primary = config.sources.primary.as_str();
    let fallback = config.sources.fallback.as_str();
    let (warnings, text, filename): (Vec<LintWarning>, Option<String>, &str) = match loaded.origin {
        DefinitionOrigin::Primary => match source.fetch(primary) {
            Ok(text) => {
                let parsed = parse_report(&text, &config.parser);
                (lint::check_parsed(&parsed), Some(text), primary)
            }
            Err(_) => (lint::check(&loaded.registry), None, primary),
        },
        DefinitionOrigin::Fallback => (lint::check(&loaded.registry), None, fallback),
        DefinitionOrigin::Empty => {
            for err in &loaded.errors {
                eprintln!("Error: {}", err);
            }
            return ExitCode::FAILURE;
        }
    };

    for warning in &warnings {
        eprintln!("{}", warning.format(text.as_deref(), filename));
    }

    let errors = warnings.iter().filter(|w| w.is_error()).count();
    println!(
        "{} presets, {} errors, {} warnings",
        loaded.registry.len(),
        errors,
        warnings.len() - errors
    );

    if errors > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
