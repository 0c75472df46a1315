//! CLI frontend for the Fabelweg narrative engine.

mod commands;
mod terminal;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Where saves go unless `--saves` says otherwise.
const DEFAULT_SAVES_DIR: &str = ".fw-saves";

#[derive(Parser)]
#[command(
    name = "fw",
    about = "Fabelweg: play and check branching interactive fiction",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log engine decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a template story file
    Init {
        /// Name of the story (creates `<name>.json`)
        name: String,
    },

    /// Validate a story file and summarize its contents
    Check {
        /// Story file
        story: PathBuf,
    },

    /// Play a story in the terminal
    Play {
        /// Story file
        story: PathBuf,

        /// Directory for save slots
        #[arg(short, long, default_value = DEFAULT_SAVES_DIR)]
        saves: PathBuf,

        /// RNG seed for reproducible random conditions
        #[arg(long)]
        seed: Option<u64>,

        /// Resume from a save slot instead of starting a new game
        #[arg(short, long)]
        load: Option<String>,

        /// Do not autosave after each scene
        #[arg(long)]
        no_autosave: bool,

        /// Player name recorded in saves
        #[arg(short, long, default_value = "Player")]
        player: String,
    },

    /// List save slots
    Saves {
        /// Directory for save slots
        #[arg(short, long, default_value = DEFAULT_SAVES_DIR)]
        saves: PathBuf,

        /// Number of numbered slots to show
        #[arg(long, default_value = "5")]
        slots: u32,
    },

    /// Delete a save slot
    Delete {
        /// Slot id
        slot: String,

        /// Directory for save slots
        #[arg(short, long, default_value = DEFAULT_SAVES_DIR)]
        saves: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init { name } => commands::init::run(&name),
        Commands::Check { story } => commands::check::run(&story),
        Commands::Play {
            story,
            saves,
            seed,
            load,
            no_autosave,
            player,
        } => commands::play::run(&commands::play::PlayOptions {
            story,
            saves,
            seed,
            load,
            autosave: !no_autosave,
            player,
        }),
        Commands::Saves { saves, slots } => commands::saves::run(&saves, slots),
        Commands::Delete { slot, saves } => commands::delete::run(&saves, &slot),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
