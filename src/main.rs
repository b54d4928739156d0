mod config;
mod logging;
mod ports;
mod services;
mod session;
mod spotify_rs;
mod transfer;
mod youtube_rs;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::{
    Result,
    eyre::{OptionExt, WrapErr},
};

use crate::{
    config::Config,
    logging::setup_logging,
    services::{spotify::client::SpotifyHttpAdapter, youtube::client::YoutubeHttpAdapter},
    session::{Service, Session},
    transfer::{
        PlaylistTransferService, TransferError, TransferReport, source_reader::fetch_all_playlists,
    },
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "PLAYLIST_TRANSFER_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Console log level
    #[arg(long, default_value = "warn", global = true, env = "LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// File log level
    #[arg(long, default_value = "debug", global = true)]
    log_file_level: log::LevelFilter,

    /// Path to log file
    #[arg(long, env = "PLAYLIST_TRANSFER_LOG_FILE", global = true)]
    log_file: Option<PathBuf>,

    /// YouTube OAuth access token (overrides the config file)
    #[arg(long, env = "YOUTUBE_ACCESS_TOKEN", global = true, hide_env_values = true)]
    youtube_token: Option<String>,

    /// Spotify OAuth access token (overrides the config file)
    #[arg(long, env = "SPOTIFY_ACCESS_TOKEN", global = true, hide_env_values = true)]
    spotify_token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List your YouTube playlists
    Playlists,
    /// Copy a YouTube playlist into a new Spotify playlist
    Transfer {
        /// The YouTube playlist id
        #[arg(short, long)]
        playlist: String,

        /// Name of the Spotify playlist (default: the YouTube playlist's title)
        #[arg(short, long)]
        name: Option<String>,

        /// Write tracks that could not be matched to this file
        #[arg(short, long)]
        unmatched_output: Option<PathBuf>,

        /// Print the transfer report as JSON
        #[arg(long)]
        json: bool,
    },
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

async fn connect_youtube(config: &Config) -> Result<YoutubeHttpAdapter> {
    let source = config.youtube.token_source("YouTube")?;
    let session = Session::open(Service::Youtube, source)
        .await
        .wrap_err("Failed to get YouTube access token")?;
    Ok(YoutubeHttpAdapter::new(session))
}

async fn connect_spotify(config: &Config) -> Result<SpotifyHttpAdapter> {
    let source = config.spotify.token_source("Spotify")?;
    let session = Session::open(Service::Spotify, source)
        .await
        .wrap_err("Failed to get Spotify access token")?;
    let spotify = SpotifyHttpAdapter::new(session);

    let user = spotify
        .current_user()
        .await
        .wrap_err("Spotify authentication failed")?;
    log::info!(
        "Connected to Spotify as {}",
        user.display_name.as_deref().unwrap_or(&user.id)
    );

    Ok(spotify)
}

/// Loads the config file and applies access tokens given on the command line.
fn load_config(
    path: Option<&Path>,
    youtube_token: Option<String>,
    spotify_token: Option<String>,
) -> Result<Config> {
    log::debug!("Loading configuration");
    let mut config = {
        if let Some(path) = path {
            Config::from_file(path)
        } else {
            Config::load()
        }
    }
    .wrap_err("Failed to load playlist-transfer config")?;

    if let Some(token) = youtube_token {
        config.youtube.access_token = Some(token);
    }
    if let Some(token) = spotify_token {
        config.spotify.access_token = Some(token);
    }

    Ok(config)
}

fn print_unmatched(report: &TransferReport) {
    if !report.unmatched.is_empty() {
        println!(
            "{} tracks could not be matched on Spotify.",
            report.unmatched.len()
        );
        println!("{}", report.unmatched_text());
    }
}

fn print_report(report: &TransferReport) {
    if report.destination_playlist_id.is_none() {
        println!("No tracks found in the selected playlist.");
        return;
    }

    println!(
        "Transfer complete! {} tracks added to Spotify.",
        report.matched_count
    );
    print_unmatched(report);
}

fn write_unmatched(report: &TransferReport, path: Option<&Path>) -> Result<()> {
    if let Some(path) = path
        && !report.unmatched.is_empty()
    {
        report.write_unmatched(path)?;
        log::info!("Wrote unmatched tracks to {}", path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    setup_logging(args.log_level, args.log_file.clone(), args.log_file_level)?;

    log::debug!("playlist-transfer starting");

    match args.command {
        Commands::Playlists => {
            let config =
                load_config(args.config.as_deref(), args.youtube_token, args.spotify_token)?;
            let youtube = connect_youtube(&config).await?;
            let playlists = fetch_all_playlists(&youtube).await?;

            if playlists.is_empty() {
                println!("No playlists found in your YouTube account.");
            }
            for playlist in playlists {
                println!(
                    "{} ({} tracks) [{}]",
                    playlist.title, playlist.track_count, playlist.id
                );
            }
        }
        Commands::Transfer {
            playlist,
            name,
            unmatched_output,
            json,
        } => {
            let config =
                load_config(args.config.as_deref(), args.youtube_token, args.spotify_token)?;
            let youtube = connect_youtube(&config).await?;
            let spotify = connect_spotify(&config).await?;

            let name = match name {
                Some(name) => name,
                None => fetch_all_playlists(&youtube)
                    .await?
                    .into_iter()
                    .find(|p| p.id == playlist)
                    .map(|p| p.title)
                    .ok_or_eyre(format!(
                        "Playlist {} not found in your YouTube account; pass --name",
                        playlist
                    ))?,
            };

            log::info!("Transferring {} to Spotify playlist '{}'", playlist, name);
            let service =
                PlaylistTransferService::new(youtube, spotify, config.transfer.options());
            let report = match service.transfer(&playlist, &name).await {
                Ok(report) => report,
                Err(TransferError::AppendTracks { source, report }) => {
                    // the searches already ran, keep their outcome
                    write_unmatched(&report, unmatched_output.as_deref())?;
                    if json {
                        println!("{}", serde_json::to_string_pretty(&report)?);
                    } else {
                        print_unmatched(&report);
                    }
                    return Err(source.into());
                }
                Err(e) => return Err(e.into()),
            };

            write_unmatched(&report, unmatched_output.as_deref())?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Commands::Config(config_commands) => match config_commands {
            ConfigCommands::CreateDefault => {
                log::debug!("Creating default config");
                let path = Config::create_default()?;
                println!("{}", path.display());
            }
            ConfigCommands::Path => match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            },
        },
    }

    Ok(())
}
