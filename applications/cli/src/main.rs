/// Duaelmix - command-line dual-track player
mod config;
mod drag;
mod library;
mod player;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::CliConfig;
use duaelmix_core::SubIndex;
use duaelmix_playback::DragRef;
use duaelmix_remote::{HttpModeClient, ModeChannel, RemoteConfig};
use library::{format_playlist, Library};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "duaelmix")]
#[command(about = "Dual-track music player", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "duaelmix.toml")]
    config: PathBuf,

    /// Override the data directory
    #[arg(short, long, env = "DUAELMIX_STORAGE_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import audio files; each becomes an unpaired track
    Add {
        /// Files to import
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Show the playlist
    List,
    /// Drag SRC onto DST (t:<pair>:<slot>, p:<pair>, g:<index>, trash)
    Move {
        #[arg(value_parser = drag::parse_drag_ref)]
        src: DragRef,
        #[arg(value_parser = drag::parse_drag_ref)]
        dst: DragRef,
    },
    /// Play the playlist
    Play {
        /// Repeat the current pair instead of advancing
        #[arg(long)]
        repeat: bool,

        /// Follow mode changes from this server
        #[arg(long, env = "DUAELMIX_REMOTE_URL")]
        remote: Option<String>,
    },
    /// Act as a remote control: switch this player's session to a mode
    Mode {
        /// 0 for driving, 1 for driven
        #[arg(value_parser = clap::value_parser!(u8).range(0..=1))]
        mode: u8,

        /// Server URL
        #[arg(long, env = "DUAELMIX_REMOTE_URL")]
        remote: Option<String>,
    },
    /// Print the session id and its remote control URLs
    Session {
        /// Server URL
        #[arg(long, env = "DUAELMIX_REMOTE_URL")]
        remote: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "duaelmix=info,duaelmix_playback=info,duaelmix_audio=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = CliConfig::load_from(&cli.config)?;
    if let Some(dir) = cli.data_dir {
        config.storage.dir = dir;
    }
    let library = Library::open(config).await?;

    match cli.command {
        Commands::Add { files } => add(&library, files).await?,
        Commands::List => println!("{}", format_playlist(&library.playlist()?, None)),
        Commands::Move { src, dst } => move_item(&library, src, dst).await?,
        Commands::Play { repeat, remote } => {
            let remote = remote.or_else(|| library.config().remote.url.clone());
            player::run(&library, repeat, remote).await?;
        }
        Commands::Mode { mode, remote } => publish_mode(&library, mode, remote).await?,
        Commands::Session { remote } => session(&library, remote)?,
    }

    Ok(())
}

async fn add(library: &Library, files: Vec<PathBuf>) -> anyhow::Result<()> {
    let mut imports = Vec::with_capacity(files.len());
    for path in &files {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("{} has no usable file name", path.display()))?
            .to_string();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        imports.push((name, bytes));
    }

    let controller = library.offline_controller()?;
    for (path, result) in files.iter().zip(controller.add_files(imports).await) {
        match result {
            Ok(Some(track)) => println!("Added {}", track.name),
            Ok(None) => println!("Skipped {} (not audio)", path.display()),
            Err(e) if e.is_duplicate_key() => {
                println!("Skipped {} (already imported)", path.display());
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to add {}", path.display())),
        }
    }
    Ok(())
}

async fn move_item(library: &Library, src: DragRef, dst: DragRef) -> anyhow::Result<()> {
    let controller = library.offline_controller()?;
    controller.move_item(src, dst).await?;
    controller.flush_deletes().await;

    let snapshot = controller.snapshot()?;
    println!("{}", format_playlist(&snapshot.playlist, None));
    Ok(())
}

fn remote_client(library: &Library, remote: Option<String>) -> anyhow::Result<HttpModeClient> {
    let url = remote
        .or_else(|| library.config().remote.url.clone())
        .context("No server configured; pass --remote or set DUAELMIX_REMOTE_URL")?;
    Ok(HttpModeClient::new(RemoteConfig::new(url, library.session_id()?))?)
}

async fn publish_mode(library: &Library, mode: u8, remote: Option<String>) -> anyhow::Result<()> {
    let sub = SubIndex::try_from(mode)?;
    remote_client(library, remote)?.publish(sub).await?;
    println!("Mode set to {}", sub);
    Ok(())
}

fn session(library: &Library, remote: Option<String>) -> anyhow::Result<()> {
    println!("Session: {}", library.session_id()?);
    if remote.is_some() || library.config().remote.url.is_some() {
        let client = remote_client(library, remote)?;
        println!("Driving: {}", client.mode_url(SubIndex::Driving));
        println!("Driven:  {}", client.mode_url(SubIndex::Driven));
    }
    Ok(())
}
