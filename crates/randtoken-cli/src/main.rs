use anyhow::Context;
use clap::{Parser, Subcommand};
use randtoken_core::{DEFAULT_CONFIG_FILE, RandtokenConfig};
use randtoken_vault::LifecycleManager;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "randtoken",
    version,
    about = "Issue, export and retire one-time random token batches"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, global = true, env = "RANDTOKEN_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Data directory holding tokens.json and exports/ (overrides the config file).
    #[arg(long, global = true, env = "RANDTOKEN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Store(StoreCommand),

    /// Show usage instructions and the active token policy.
    Tutorial,
}

/// Commands that open the token store.
#[derive(Subcommand, Debug)]
enum StoreCommand {
    /// Generate a batch of tokens under a new sequence id.
    Generate {
        /// Sequence id, unique among live records.
        seq_id: String,

        /// Guard password required to export the tokens later.
        password: String,

        /// Free-form description (multiple words are joined with spaces).
        #[arg(required = true, num_args = 1..)]
        remark: Vec<String>,
    },

    /// Export a batch of tokens. The record is deleted afterwards.
    Export {
        seq_id: String,

        password: String,

        /// Pass `confirm` to acknowledge that the record will be deleted.
        confirm: Option<String>,
    },

    /// List token records (tokens themselves are never shown).
    List,

    /// Delete a token record without exporting it.
    Delete { seq_id: String },
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config, cli.data_dir)?;

    let output = match cli.cmd {
        Command::Tutorial => Ok(commands::tutorial::render(&config)),
        Command::Store(cmd) => {
            let manager = LifecycleManager::open(&config);
            let output = run(&manager, &config, cmd);
            if let Err(e) = manager.shutdown() {
                tracing::error!("Failed to flush token store on shutdown: {}", e);
            }
            output
        }
    };

    println!("{}", output?);
    Ok(())
}

fn run(
    manager: &LifecycleManager,
    config: &RandtokenConfig,
    cmd: StoreCommand,
) -> anyhow::Result<String> {
    match cmd {
        StoreCommand::Generate {
            seq_id,
            password,
            remark,
        } => commands::tokens::generate(manager, &seq_id, &password, &remark.join(" ")),
        StoreCommand::Export {
            seq_id,
            password,
            confirm,
        } => commands::tokens::export(manager, &seq_id, &password, confirm.as_deref()),
        StoreCommand::List => commands::list::list(manager, &config.display),
        StoreCommand::Delete { seq_id } => commands::tokens::delete(manager, &seq_id),
    }
}

fn load_config(path: &Path, data_dir: Option<PathBuf>) -> anyhow::Result<RandtokenConfig> {
    let mut config = RandtokenConfig::load_or_default(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

    if let Some(data_dir) = data_dir {
        config.storage.data_dir = data_dir;
    }

    tracing::debug!(
        "Using data directory {}",
        config.storage.data_dir.display()
    );
    Ok(config)
}
