//! Vocalis CLI - Call records and statistics from the terminal
//!
//! Read-only client over the Vocalis query API.

mod api;
mod config;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::Password;

use api::VocalisClient;
use config::Config;

#[derive(Parser)]
#[command(name = "vocalis")]
#[command(about = "Vocalis CLI - call records, transcripts and statistics", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Login and store the shared secret
    Login {
        /// Shared secret (will prompt if not provided)
        #[arg(short, long)]
        key: Option<String>,

        /// Server base URL
        #[arg(short, long)]
        url: Option<String>,
    },

    /// Call operations
    Calls {
        #[command(subcommand)]
        action: CallsAction,
    },

    /// Show aggregate statistics
    Stats,

    /// Show current configuration
    Config,
}

#[derive(Subcommand)]
enum CallsAction {
    /// List recent calls
    List,
    /// Show one call with its transcripts
    Get {
        /// Engine-assigned call identifier
        uuid: String,
    },
    /// Show the ordered transcripts of a call
    Transcripts {
        /// Engine-assigned call identifier
        uuid: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Login { key, url } => cmd_login(key, url).await,
        Commands::Calls { action } => match action {
            CallsAction::List => cmd_calls_list().await,
            CallsAction::Get { uuid } => cmd_calls_get(&uuid).await,
            CallsAction::Transcripts { uuid } => cmd_calls_transcripts(&uuid).await,
        },
        Commands::Stats => cmd_stats().await,
        Commands::Config => cmd_config(),
    }
}

/// Build a client from stored config
fn client() -> Result<VocalisClient> {
    let config = Config::load()?;
    let Some(api_key) = config.api_key.clone() else {
        bail!("Not logged in. Run `vocalis login` first.");
    };
    Ok(VocalisClient::new(&config.base_url, &api_key))
}

async fn cmd_login(key: Option<String>, url: Option<String>) -> Result<()> {
    let mut config = Config::load()?;

    if let Some(url) = url {
        config.set_base_url(url);
    }

    let key = match key {
        Some(key) => key,
        None => Password::new()
            .with_prompt("Shared secret")
            .interact()?,
    };

    config.set_api_key(key.clone());

    // Verify connectivity before persisting
    let client = VocalisClient::new(&config.base_url, &key);
    if client.health().await.unwrap_or(false) {
        println!("{} Connected to {}", "✓".green(), config.base_url);
    } else {
        println!(
            "{} Could not reach {} (secret saved anyway)",
            "!".yellow(),
            config.base_url
        );
    }

    config.save()?;
    println!("{} Configuration saved", "✓".green());
    Ok(())
}

async fn cmd_calls_list() -> Result<()> {
    let calls = client()?.list_calls().await?;

    if calls.is_empty() {
        println!("{}", "No calls recorded.".dimmed());
        return Ok(());
    }

    for call in calls {
        let status = match call.status.as_str() {
            "active" => call.status.green(),
            "completed" => call.status.blue(),
            "error" => call.status.red(),
            _ => call.status.normal(),
        };
        let duration = call
            .duration
            .map(|d| format!("{}s", d))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  {}  {:>9}  {}  {}",
            call.start_time.format("%Y-%m-%d %H:%M:%S"),
            status,
            duration,
            call.uuid.bold(),
            call.caller_number.unwrap_or_default().dimmed(),
        );
    }
    Ok(())
}

async fn cmd_calls_get(uuid: &str) -> Result<()> {
    let call = client()?.get_call(uuid).await?;

    println!("{}: {}", "Call".bold(), call.uuid);
    if let Some(number) = &call.caller_number {
        println!("{}: {}", "Caller".bold(), number);
    }
    println!("{}: {}", "Status".bold(), call.status);
    println!(
        "{}: {}",
        "Started".bold(),
        call.start_time.format("%Y-%m-%d %H:%M:%S")
    );
    if let Some(end) = call.end_time {
        println!("{}: {}", "Ended".bold(), end.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(duration) = call.duration {
        println!("{}: {}s", "Duration".bold(), duration);
    }
    if !call.metadata.is_null() && call.metadata != serde_json::json!({}) {
        println!(
            "{}: {}",
            "Metadata".bold(),
            serde_json::to_string_pretty(&call.metadata)?
        );
    }

    if !call.transcripts.is_empty() {
        println!("\n{}", "Transcript".bold());
        for fragment in &call.transcripts {
            print_fragment(&fragment.speaker, &fragment.text, fragment.timestamp);
        }
    }
    Ok(())
}

async fn cmd_calls_transcripts(uuid: &str) -> Result<()> {
    let transcripts = client()?.get_transcripts(uuid).await?;

    if transcripts.is_empty() {
        println!("{}", "No transcripts for this call.".dimmed());
        return Ok(());
    }

    for fragment in &transcripts {
        print_fragment(&fragment.speaker, &fragment.text, fragment.timestamp);
    }
    Ok(())
}

fn print_fragment(speaker: &str, text: &str, timestamp: chrono::DateTime<chrono::Utc>) {
    let speaker = match speaker {
        "user" => speaker.cyan(),
        "agent" => speaker.magenta(),
        _ => speaker.normal(),
    };
    println!(
        "{} {:>5}  {}",
        timestamp.format("%H:%M:%S").to_string().dimmed(),
        speaker,
        text
    );
}

async fn cmd_stats() -> Result<()> {
    let stats = client()?.stats().await?;

    println!("{}: {}", "Total calls".bold(), stats.total_calls);
    println!("{}: {}", "Active".bold(), stats.active_calls);
    println!("{}: {}", "Completed".bold(), stats.completed_calls);
    println!(
        "{}: {}s",
        "Average duration".bold(),
        stats.average_duration
    );
    Ok(())
}

fn cmd_config() -> Result<()> {
    let config = Config::load()?;

    println!("{}: {:?}", "Config file".bold(), Config::config_path()?);
    println!("{}: {}", "Server".bold(), config.base_url);
    println!(
        "{}: {}",
        "Shared secret".bold(),
        if config.api_key.is_some() {
            "set".green()
        } else {
            "not set".red()
        }
    );
    Ok(())
}
