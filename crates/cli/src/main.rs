//! Mythos CLI: the main entry point.
//!
//! Commands:
//! - `onboard`: Create the config file
//! - `status`:  Show the active configuration
//! - `chat`:    Play a session, one message or interactively
//! - `render`:  Print the prompt a turn would send, without calling a model
//! - `preset`:  Validate and summarize a preset file
//! - `author`:  Generate a persona, a persona field, or world items

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(
    name = "mythos",
    about = "Mythos — preset-driven role-play in the terminal",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create ~/.mythos/config.toml with defaults
    Onboard,

    /// Show the active configuration
    Status,

    /// Play a session
    Chat {
        /// Preset file to load before the first turn
        #[arg(short, long)]
        preset: Option<PathBuf>,

        /// Session file to resume and save after every turn
        #[arg(short, long)]
        session: Option<PathBuf>,

        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Print the linearized prompt for an input
    Render {
        /// The player's line
        #[arg(short, long)]
        input: String,

        #[arg(short, long)]
        preset: Option<PathBuf>,

        #[arg(short, long)]
        session: Option<PathBuf>,
    },

    /// Validate and summarize a preset file
    Preset {
        file: PathBuf,
    },

    /// Model-assisted persona and world authoring
    Author {
        #[command(subcommand)]
        target: AuthorTarget,

        /// Session file whose persona/world is read and updated
        #[arg(short, long, global = true)]
        session: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub(crate) enum AuthorTarget {
    /// Build a full persona from a short idea
    Persona {
        idea: String,
    },

    /// Write or polish one persona field
    Field {
        /// Field key (name, age, gender, personality, background, appearance, skills, goals, hobbies)
        field: String,
    },

    /// Generate skills, NPCs or entities and append them
    Items {
        #[arg(value_enum)]
        kind: ItemKindArg,

        /// Extra direction for the model
        #[arg(long, default_value = "")]
        hint: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum ItemKindArg {
    Skills,
    Npcs,
    Entities,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Status => commands::status::run().await?,
        Commands::Chat {
            preset,
            session,
            message,
        } => commands::chat::run(preset, session, message).await?,
        Commands::Render {
            input,
            preset,
            session,
        } => commands::render::run(&input, preset, session)?,
        Commands::Preset { file } => commands::preset::run(&file)?,
        Commands::Author { target, session } => commands::author::run(target, session).await?,
    }

    Ok(())
}
