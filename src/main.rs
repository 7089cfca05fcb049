//! tiercache - inspect and edit a persisted settings store
//!
//! ```text
//! tiercache [--config FILE] [--cache-root DIR] [--directory NAME] <COMMAND>
//!
//!   dump                 print every setting as one JSON object
//!   keys                 list known setting keys and whether they are set
//!   get <key>            print one setting
//!   set <key> <json>     store a setting
//!   remove <key>         delete a setting
//!   clear                delete every setting
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tiercache::{CacheProvider, DynamicJson, SettingKey, TierCacheConfig, TypeSafeStore};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Inspect and edit a tiercache settings store
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML configuration file
    #[arg(long, env = "TIERCACHE_CONFIG")]
    config: Option<PathBuf>,

    /// Parent directory of the disk tier (overrides the config file)
    #[arg(long, env = "TIERCACHE_CACHE_ROOT")]
    cache_root: Option<PathBuf>,

    /// Disk tier directory name (overrides the config file)
    #[arg(long, env = "TIERCACHE_DIRECTORY")]
    directory: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every setting as one JSON object
    Dump,
    /// List known setting keys
    Keys,
    /// Print one setting
    Get { key: String },
    /// Store a setting given as JSON text
    Set { key: String, value: String },
    /// Delete a setting
    Remove { key: String },
    /// Delete every setting
    Clear,
}

// =============================================================================
// Main
// =============================================================================

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(&args);

    let config = load_config(&args)?;
    debug!(?config, "Using configuration");

    let provider = CacheProvider::new(&config).context("opening cache")?;
    provider.warmup();
    let central = provider.central();

    let mutated = match args.command {
        Command::Dump => {
            println!("{}", serde_json::to_string_pretty(&central.dump())?);
            false
        }
        Command::Keys => {
            for key in SettingKey::ALL {
                let state = central
                    .json(key)
                    .map_or_else(|| "-".to_string(), |v| v.kind().to_string());
                println!("{key}\t{state}");
            }
            false
        }
        Command::Get { key } => {
            let key: SettingKey = key.parse()?;
            let value = central.json(&key).unwrap_or_default();
            println!("{}", serde_json::to_string_pretty(&value)?);
            false
        }
        Command::Set { key, value } => {
            let key: SettingKey = key.parse()?;
            let value: DynamicJson =
                serde_json::from_str(&value).with_context(|| format!("parsing value for {key}"))?;
            central.set_json(&key, value)?;
            true
        }
        Command::Remove { key } => {
            let key: SettingKey = key.parse()?;
            central.remove_object(&key)?;
            true
        }
        Command::Clear => {
            central.remove_all_objects()?;
            true
        }
    };

    if mutated {
        if !central.synchronize(false) {
            bail!("settings could not be written to {}", config.disk_config().path().display());
        }
        info!("Settings written");
    }

    Ok(())
}

fn load_config(args: &Args) -> tiercache::Result<TierCacheConfig> {
    let mut config = match &args.config {
        Some(path) => TierCacheConfig::from_file(path)?,
        None => TierCacheConfig::default(),
    };
    if let Some(root) = &args.cache_root {
        config.cache_root = root.clone();
    }
    if let Some(directory) = &args.directory {
        config.disk_directory = directory.clone();
    }
    config.validate()?;
    Ok(config)
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
