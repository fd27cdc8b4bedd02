//! # Philotes
//!
//! Rotating 1:1 matching for communities: members holding a matching role
//! are paired every week, steering away from people they already met.
//!
//! Usage:
//!   philotes pair --participants a,b,c,d          # Pair a list, print JSON
//!   philotes onboard --guild 42                   # Create bot channel, register guild
//!   philotes command --guild 42 "/setRoles Dev"   # Run one chat command
//!   philotes match --guild 42                     # Run one full round now
//!   philotes history --guild 42                   # Show recorded pairs
//!   philotes serve                                # Run rounds on schedule

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use philotes_bot::{CommandHandler, IncomingMessage, Onboarder, RoundRunner};
use philotes_channels::LocalGuild;
use philotes_core::traits::{CommunityStore, HistoryStore};
use philotes_core::{HistoricalPairs, ParticipantSet, PhilotesConfig};
use philotes_matching::{PairingEngine, repeat_pairings};
use philotes_memory::SqliteStore;
use philotes_scheduler::{MatchScheduler, spawn_scheduler, targets_from_config};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "philotes",
    version,
    about = "🤝 Philotes: rotating 1:1 community matching"
)]
struct Cli {
    /// Config file (default: ~/.philotes/config.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pair participants with the engine alone and print the groups as JSON
    Pair {
        /// Comma-separated participant IDs
        #[arg(long, value_delimiter = ',')]
        participants: Vec<String>,
        /// JSON file: { "id": ["previous partner", ...] }
        #[arg(long)]
        history: Option<String>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Onboard a guild: bot channel + community record
    Onboard {
        #[arg(long)]
        guild: String,
    },
    /// Run one full matching round
    Match {
        #[arg(long)]
        guild: String,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Send one chat command as if typed in the bot channel
    Command {
        #[arg(long)]
        guild: String,
        /// Channel the message comes from (default: the bot channel)
        #[arg(long)]
        channel: Option<String>,
        /// Message author is a bot
        #[arg(long)]
        author_bot: bool,
        /// Message text, e.g. "/setRoles Dev, Design"
        text: String,
    },
    /// Print the latest round and every member's previous partners
    History {
        #[arg(long)]
        guild: String,
    },
    /// Run scheduled rounds for every active guild
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "philotes=debug" } else { "philotes=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => PhilotesConfig::load_from(Path::new(&shellexpand::tilde(path).to_string()))?,
        None => PhilotesConfig::load()?,
    };

    match cli.command {
        Commands::Pair {
            participants,
            history,
            seed,
        } => pair(participants, history.as_deref(), seed),
        Commands::Onboard { guild } => {
            let store = open_store(&config)?;
            let local = open_guild(&config, &guild)?;
            let outcome = Onboarder::new(store, local, &config)?.onboard(&guild).await?;
            println!(
                "✅ Guild {} onboarded ({}). Bot channel: {}",
                guild,
                if outcome.returning { "welcome back" } else { "new" },
                outcome.bot_channel_id
            );
            Ok(())
        }
        Commands::Match { guild, seed } => {
            let store = open_store(&config)?;
            let community = store
                .load_community(&guild)
                .await?
                .with_context(|| format!("guild {guild} is not onboarded, run `philotes onboard --guild {guild}`"))?;
            let outcome = runner(&config, store, &guild, seed)?.run_round(&community).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Commands::Command {
            guild,
            channel,
            author_bot,
            text,
        } => {
            let store = open_store(&config)?;
            let channel_id = match channel {
                Some(channel) => channel,
                None => store
                    .load_community(&guild)
                    .await?
                    .and_then(|c| c.bot_channel_id)
                    .unwrap_or_default(),
            };
            let handler = CommandHandler::new(
                store.clone(),
                runner(&config, store, &guild, None)?,
                &config.command_prefix,
            );
            let replies = handler
                .handle(&IncomingMessage {
                    guild_id: guild,
                    channel_id,
                    author_is_bot: author_bot,
                    content: text,
                })
                .await?;
            for reply in replies {
                println!("{reply}");
            }
            Ok(())
        }
        Commands::History { guild } => history(&config, &guild).await,
        Commands::Serve => serve(config).await,
    }
}

fn pair(participants: Vec<String>, history: Option<&str>, seed: Option<u64>) -> Result<()> {
    let participants: ParticipantSet = participants
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    let history: HistoricalPairs = match history {
        Some(path) => {
            let path = shellexpand::tilde(path).to_string();
            let content = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            serde_json::from_str(&content).with_context(|| format!("parsing {path}"))?
        }
        None => HistoricalPairs::new(),
    };

    let engine = match seed {
        Some(seed) => PairingEngine::with_seed(seed),
        None => PairingEngine::new(),
    };
    let groups = engine.compute(&participants, &history);
    tracing::info!(
        "🤝 {} groups, {} repeat pairings",
        groups.len(),
        repeat_pairings(&groups, &history)
    );
    println!("{}", serde_json::to_string_pretty(&groups)?);
    Ok(())
}

async fn history(config: &PhilotesConfig, guild: &str) -> Result<()> {
    let store = open_store(config)?;
    let local = open_guild(config, guild)?;
    let members: ParticipantSet = local
        .roster()
        .members
        .iter()
        .filter(|m| !m.bot)
        .map(|m| m.id.clone())
        .collect();

    let latest = store.latest_round(guild).await?;
    let pairs = store.historical_pairs(guild, &members).await?;
    let pairs: BTreeMap<String, Vec<String>> = pairs
        .into_iter()
        .map(|(id, met)| {
            let mut met: Vec<String> = met.into_iter().collect();
            met.sort();
            (id, met)
        })
        .collect();

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "guild": guild,
            "latest_round": latest,
            "pairs": pairs,
        }))?
    );
    Ok(())
}

async fn serve(config: PhilotesConfig) -> Result<()> {
    let config = Arc::new(config);
    let store = open_store(&config)?;
    let interval = config.scheduler.check_interval_secs.max(1);

    let engine = Arc::new(Mutex::new(MatchScheduler::new()));
    engine.lock().await.sync(&store.list_communities().await?);

    // Pick up onboarding and schedule changes made through other processes
    {
        let engine = engine.clone();
        let store = store.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval));
            loop {
                ticker.tick().await;
                match store.list_communities().await {
                    Ok(communities) => engine.lock().await.sync(&communities),
                    Err(e) => tracing::warn!("⚠️ Failed to reload communities: {e}"),
                }
            }
        });
    }

    println!("⏰ Philotes scheduler running (check every {interval}s). Ctrl+C to stop.");
    let on_due = move |guild_id: String| {
        let config = config.clone();
        let store = store.clone();
        async move { scheduled_round(&config, store, &guild_id).await }
    };

    tokio::select! {
        _ = spawn_scheduler(engine, on_due, interval) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("👋 Shutting down");
        }
    }
    Ok(())
}

async fn scheduled_round(
    config: &PhilotesConfig,
    store: Arc<SqliteStore>,
    guild_id: &str,
) -> philotes_core::Result<String> {
    let Some(community) = store.load_community(guild_id).await? else {
        return Ok("guild no longer registered".into());
    };
    if !community.is_active() {
        return Ok("guild paused".into());
    }
    let local = Arc::new(LocalGuild::open(guild_id, &config.guild.guild_dir(guild_id))?);
    let outcome = RoundRunner::new(local.clone(), store, local, config.bot.clone())
        .with_targets(targets_from_config(config))
        .run_round(&community)
        .await?;
    Ok(outcome.summary())
}

fn open_store(config: &PhilotesConfig) -> Result<Arc<SqliteStore>> {
    let path = config.storage.db_path();
    let store = SqliteStore::open(&path).with_context(|| format!("opening {}", path.display()))?;
    Ok(Arc::new(store))
}

fn open_guild(config: &PhilotesConfig, guild_id: &str) -> Result<Arc<LocalGuild>> {
    let dir = config.guild.guild_dir(guild_id);
    let guild = LocalGuild::open(guild_id, &dir).with_context(|| format!("opening guild {}", dir.display()))?;
    Ok(Arc::new(guild))
}

fn runner(
    config: &PhilotesConfig,
    store: Arc<SqliteStore>,
    guild_id: &str,
    seed: Option<u64>,
) -> Result<RoundRunner> {
    let local = open_guild(config, guild_id)?;
    Ok(RoundRunner::new(local.clone(), store, local, config.bot.clone())
        .with_targets(targets_from_config(config))
        .with_seed(seed))
}
