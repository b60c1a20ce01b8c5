use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use ytmp4_client::commands::{self, SessionView};
use ytmp4_client::core::monitoring::StatsDisplay;
use ytmp4_client::utils::logging::init_tracing;
use ytmp4_client::{AppConfig, AppState};

#[derive(Debug, Parser)]
#[command(name = "ytmp4-client", version, about = "Client for the ytmp4 download service")]
struct Cli {
    /// Configuration file instead of the platform default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyze a YouTube URL, then request the chosen links
    Analyze {
        url: String,
        #[arg(long)]
        video: bool,
        #[arg(long)]
        audio: bool,
    },
    /// One-shot metadata and best-quality video link
    Fetch { url: String },
    /// Print cache statistics once
    Stats,
    /// Poll cache statistics on the configured interval
    Watch {
        /// Stop after this many refreshes
        #[arg(long)]
        ticks: Option<u32>,
    },
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    Show,
    Path,
    Reset,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // logging needs the configured level, so load warnings are reported afterwards
    let loaded = AppConfig::try_load(cli.config.as_deref());
    let config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => AppConfig::from_env(),
    };
    init_tracing(&config.logging.level);
    info!("🚀 {} v{} starting", ytmp4_client::NAME, ytmp4_client::VERSION);
    if let Err(error) = loaded {
        warn!("Failed to load configuration ({:#}), falling back to defaults", error);
    }

    let state = match AppState::from_config(config, cli.config.as_deref()) {
        Ok(state) => state,
        Err(error) => {
            eprintln!("Error: {error:#}");
            std::process::exit(1);
        }
    };

    if let Err(error) = run(&state, cli.command).await {
        print_notifications(&state).await;
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
    print_notifications(&state).await;
}

async fn run(state: &AppState, command: Command) -> Result<(), String> {
    match command {
        Command::Analyze { url, video, audio } => {
            commands::analyze_video(state, url).await?;
            print_session(&commands::get_session_state(state).await?);

            // keep going after a failed link so the other kind still gets a chance
            let mut failed = None;
            if video {
                match commands::download_video(state).await {
                    Ok(outcome) => println!("Video: {}", outcome.trigger.url),
                    Err(error) => failed = Some(error),
                }
            }
            if audio {
                match commands::download_audio(state).await {
                    Ok(outcome) => println!("Audio: {}", outcome.trigger.url),
                    Err(error) => failed = Some(error),
                }
            }
            failed.map_or(Ok(()), Err)
        }
        Command::Fetch { url } => {
            let outcome = commands::quick_fetch_video(state, url).await?;
            println!("Title:    {}", outcome.metadata.title);
            println!("Duration: {}", outcome.metadata.duration);
            println!("Video:    {}", outcome.trigger.url);
            Ok(())
        }
        Command::Stats => {
            print_stats(&commands::get_cache_stats(state).await?);
            Ok(())
        }
        Command::Watch { ticks } => watch(state, ticks).await,
        Command::Config(ConfigCommand::Show) => {
            let config = commands::get_config(state).await?;
            println!("{}", config.export().map_err(|e| e.to_string())?);
            Ok(())
        }
        Command::Config(ConfigCommand::Path) => {
            println!("{}", commands::get_config_path(state).await?);
            Ok(())
        }
        Command::Config(ConfigCommand::Reset) => {
            commands::reset_config(state).await?;
            println!("Configuration reset: {}", state.config_path().display());
            Ok(())
        }
    }
}

async fn watch(state: &AppState, ticks: Option<u32>) -> Result<(), String> {
    let interval = Duration::from_secs(state.config.read().await.polling.stats_interval_seconds);
    commands::start_stats_polling(state).await?;

    let mut ticker = tokio::time::interval(interval);
    let mut seen = 0;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // let the poller's own tick land first
                tokio::time::sleep(Duration::from_millis(500)).await;
                print_stats(&commands::get_stats_display(state).await?);
                seen += 1;
                if ticks.is_some_and(|limit| seen >= limit) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    commands::stop_stats_polling(state).await
}

fn print_session(view: &SessionView) {
    if let Some(metadata) = &view.metadata {
        println!("Title:    {}", metadata.title);
        println!("Duration: {}", metadata.duration);
        println!("Thumb:    {}", metadata.thumbnail);
    }
}

fn print_stats(display: &StatsDisplay) {
    println!(
        "Hit rate: {:>8} | Requests: {:>8} | Cached videos: {:>8}",
        display.hit_rate, display.total_requests, display.cached_videos
    );
}

async fn print_notifications(state: &AppState) {
    if let Ok(notifications) = commands::get_notifications(state).await {
        for notification in notifications {
            eprintln!("[{}] {}", notification.severity.as_str(), notification.message);
        }
    }
}
