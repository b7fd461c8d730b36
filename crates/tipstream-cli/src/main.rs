mod config;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::style;
use cookie_store::CookieStore;
use tracing_subscriber::{fmt, EnvFilter};

use tipstream_core::{Match, ResolveError, Tipstream};

fn version_string() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");

    let rendered = if GIT_HASH.is_empty() {
        VERSION.to_string()
    } else {
        format!("{VERSION}+{GIT_HASH}")
    };
    // Leaked once at startup; clap wants a 'static str.
    Box::leak(rendered.into_boxed_str())
}

/// Resolve Tipsport live-TV broadcasts into playable stream links.
#[derive(Parser)]
#[command(name = "tipstream", version = version_string(), about)]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long, default_value = "tipstream.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List today's broadcastable matches.
    Matches,
    /// Resolve a relative match path (e.g. /sparta-trinec/2768186) into a
    /// playable link.
    Resolve {
        match_path: String,
    },
    /// Verify the configured credentials and persist the session cookies.
    Login,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let app_config = match config::AppConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            init_tracing("pretty");
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&app_config.log_format);

    let site_config = match app_config.to_site_config() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let cookie_file = app_config.cookie_file();
    let client = Tipstream::with_cookie_store(site_config, load_cookie_store(&cookie_file));

    let outcome = match cli.command {
        Commands::Matches => run_matches(&client).await,
        Commands::Resolve { match_path } => run_resolve(&client, &match_path).await,
        Commands::Login => run_login(&client).await,
    };

    // The jar may have picked up a fresh session even on a failed resolve.
    save_cookie_store(&cookie_file, &client);

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            present_error(&e);
            if e.is_recoverable() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run_matches(client: &Tipstream) -> Result<(), ResolveError> {
    let matches = client.matches().await?;
    if matches.is_empty() {
        println!("{}", style("No matches in today's programme").dim());
        return Ok(());
    }
    for m in &matches {
        print_match(m);
    }
    Ok(())
}

fn print_match(m: &Match) {
    let marker = if m.live {
        style("live").green().bold()
    } else {
        style("    ").dim()
    };
    let score = m.score.as_deref().unwrap_or("-:-");
    println!(
        "{} {} {:>5} {} {} {}",
        marker,
        style(m.start_time.format("%H:%M")).bold(),
        score,
        m.name,
        style(&m.competition).dim(),
        style(&m.url).dim(),
    );
}

async fn run_resolve(client: &Tipstream, match_path: &str) -> Result<(), ResolveError> {
    let descriptor = client.resolve(match_path).await?;
    // The link alone on stdout, so it can be piped straight into a player.
    println!("{}", descriptor.player_link());
    Ok(())
}

async fn run_login(client: &Tipstream) -> Result<(), ResolveError> {
    client.login().await?;
    println!("{}", style("Login successful").green());
    Ok(())
}

fn present_error(error: &ResolveError) {
    let message = match error {
        ResolveError::Network { .. } => "Check internet connection".to_string(),
        ResolveError::AuthenticationFailure => "Login failed. Check username/password".to_string(),
        ResolveError::OperatorMessage(text) => text.clone(),
        ResolveError::StreamNotStarted => "Stream has not started yet".to_string(),
        ResolveError::UnsupportedFormat => "Unsupported stream format".to_string(),
        ResolveError::InvalidStreamIdentifier(path) => {
            format!("No stream number in '{path}'")
        }
        other => other.to_string(),
    };
    eprintln!("{} {}", style("error:").red().bold(), message);
    tracing::debug!(?error, "resolution failed");
}

fn load_cookie_store(path: &Path) -> CookieStore {
    File::open(path)
        .ok()
        .map(BufReader::new)
        .and_then(|reader| cookie_store::serde::json::load(reader).ok())
        .unwrap_or_default()
}

fn save_cookie_store(path: &Path, client: &Tipstream) {
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::warn!(path = %parent.display(), error = %e, "cannot create cookie dir");
            return;
        }
    }
    let store = client.cookie_store();
    let Ok(guard) = store.lock() else {
        tracing::warn!("cookie store lock poisoned, not saving");
        return;
    };
    match File::create(path) {
        Ok(file) => {
            let mut writer = BufWriter::new(file);
            if let Err(e) = cookie_store::serde::json::save(&guard, &mut writer) {
                tracing::warn!(error = %e, "failed to serialize cookie store");
            }
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to write cookie file");
        }
    }
}

fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    match log_format {
        "json" => fmt().with_env_filter(filter).json().init(),
        _ => fmt().with_env_filter(filter).init(),
    }
}
