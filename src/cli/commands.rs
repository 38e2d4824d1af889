use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use log::warn;

use crate::models::{DEFAULT_AUTHOR, Group, MediaKind, NewComment, NewGroup};
use crate::parsers::import_legacy_file;
use crate::storage::{load_store, save_store, snapshot_path};
use crate::store::{CapsuleStore, UnlockOutcome, UnlockReason};
use crate::utils::{
    format_countdown, format_date, format_path_with_tilde, get_data_dir, get_undo_window,
    get_unlock_gate,
};

#[derive(Parser)]
#[command(name = "momento")]
#[command(version = "0.1.0")]
#[command(about = "Shared time capsules that unlock on a future date", long_about = None)]
pub struct Cli {
    /// Directory holding store.json (default: $MOMENTO_HOME or the platform data dir)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new capsule
    Create {
        #[arg(long)]
        name: String,
        /// Member name or email (repeatable)
        #[arg(long = "member")]
        members: Vec<String>,
        /// YYYY-MM-DD (midnight UTC) or an RFC3339 timestamp
        #[arg(long)]
        unlock_date: String,
        /// Photo or video to add right away (repeatable)
        #[arg(long = "media")]
        media: Vec<String>,
    },
    /// Add a photo or video to a capsule
    AddMedia {
        group: String,
        uri: String,
        #[arg(long, conflicts_with = "photo")]
        video: bool,
        #[arg(long)]
        photo: bool,
    },
    /// Undo the most recent media addition
    Undo,
    /// Remove a photo or video from a capsule
    RemoveMedia { group: String, media: String },
    /// Comment on a photo or video
    Comment {
        group: String,
        media: String,
        text: String,
        /// Reply to this comment instead of starting a new thread
        #[arg(long)]
        reply_to: Option<String>,
        #[arg(long, default_value = DEFAULT_AUTHOR)]
        author: String,
    },
    /// Unlock a capsule (early unlock needs $MOMENTO_PASSPHRASE to be set)
    Unlock {
        group: String,
        #[arg(long)]
        passphrase: Option<String>,
    },
    /// Unlock every capsule whose unlock date has been reached
    UnlockDue,
    /// List capsules
    List {
        #[arg(long, conflicts_with = "unlocked")]
        locked: bool,
        #[arg(long)]
        unlocked: bool,
    },
    /// Show a capsule with its media and comments
    Show { group: String },
    /// Show statistics about the store
    Stats,
    /// Import groups exported by the mobile app (JSON Lines)
    Import { file: PathBuf },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use --help for usage information");
        return Ok(());
    };

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => get_data_dir()?,
    };
    let path = snapshot_path(&data_dir);
    let now = Utc::now();

    let mut store = load_store(&path)?.unwrap_or_default();
    store.set_undo_window(get_undo_window()?);

    if execute(&mut store, command, &data_dir, now)? {
        save_store(&path, &store, now)?;
    }

    Ok(())
}

/// Run one command against `store`; returns whether the store changed
fn execute(
    store: &mut CapsuleStore,
    command: Commands,
    data_dir: &Path,
    now: DateTime<Utc>,
) -> Result<bool> {
    match command {
        Commands::Create { name, members, unlock_date, media } => {
            let unlock_at = parse_unlock_date(&unlock_date)?;
            let new_group = NewGroup { name, members, unlock_at, initial_media: media };
            let id = store.add_group(new_group, now)?;
            println!("Created capsule {}", id);
            println!("  {}", format_countdown(&unlock_at, &now));
            Ok(true)
        }
        Commands::AddMedia { group, uri, video, photo } => {
            let group_id = store.resolve_group(&group)?;
            let kind = match (video, photo) {
                (true, _) => Some(MediaKind::Video),
                (_, true) => Some(MediaKind::Photo),
                _ => None,
            };
            let ticket = store.add_media(group_id, &uri, kind, now)?;
            println!("Added media {}", ticket.media_id);
            println!("  Undo with `momento undo` until {}", ticket.expires_at.format("%H:%M:%S UTC"));
            Ok(true)
        }
        Commands::Undo => {
            let removed = store.undo_last_media(now)?;
            println!("Removed {} {}", removed.kind, removed.id);
            Ok(true)
        }
        Commands::RemoveMedia { group, media } => {
            let group_id = store.resolve_group(&group)?;
            let media_id = store.resolve_media(group_id, &media)?;
            let removed = store.remove_media(group_id, media_id)?;
            println!("Removed {} {}", removed.kind, removed.id);
            Ok(true)
        }
        Commands::Comment { group, media, text, reply_to, author } => {
            let group_id = store.resolve_group(&group)?;
            let media_id = store.resolve_media(group_id, &media)?;
            let parent = reply_to
                .map(|prefix| store.resolve_comment(group_id, media_id, &prefix))
                .transpose()?;
            let id =
                store.add_comment(group_id, media_id, NewComment::new(text, author), parent, now)?;
            match parent {
                Some(parent) => println!("Replied to {} with comment {}", parent, id),
                None => println!("Added comment {}", id),
            }
            Ok(true)
        }
        Commands::Unlock { group, passphrase } => {
            let group_id = store.resolve_group(&group)?;
            let gate = get_unlock_gate();
            if passphrase.is_some() && !gate.has_passphrase() {
                warn!("--passphrase given but MOMENTO_PASSPHRASE is not set; only the unlock date applies");
            }
            match store.unlock_group(group_id, &gate, passphrase.as_deref(), now)? {
                UnlockOutcome::Unlocked(UnlockReason::Scheduled) => {
                    println!("Unlocked capsule {}", group_id);
                    Ok(true)
                }
                UnlockOutcome::Unlocked(UnlockReason::Passphrase) => {
                    println!("Unlocked capsule {} early with passphrase", group_id);
                    Ok(true)
                }
                UnlockOutcome::AlreadyUnlocked => {
                    println!("Capsule {} is already unlocked", group_id);
                    Ok(false)
                }
            }
        }
        Commands::UnlockDue => {
            let unlocked = store.unlock_due(now);
            println!("Unlocked {} capsule(s)", unlocked.len());
            for id in &unlocked {
                if let Some(group) = store.group(*id) {
                    println!("  {} {}", id, group.name);
                }
            }
            Ok(!unlocked.is_empty())
        }
        Commands::List { locked, unlocked } => {
            if !unlocked {
                print_group_list("Locked capsules", store.locked_groups(), now);
            }
            if !locked {
                if !unlocked {
                    println!();
                }
                print_group_list("Unlocked capsules", store.unlocked_groups(), now);
            }
            Ok(false)
        }
        Commands::Show { group } => {
            let group_id = store.resolve_group(&group)?;
            let group = store.group(group_id).context("Capsule disappeared while resolving")?;
            print_group(group, now);
            Ok(false)
        }
        Commands::Stats => {
            show_stats(store, data_dir);
            Ok(false)
        }
        Commands::Import { file } => {
            let summary = import_legacy_file(store, &file, now)?;
            println!("Imported {} capsule(s) ({} skipped)", summary.imported.len(), summary.skipped);
            Ok(!summary.imported.is_empty())
        }
    }
}

/// Parse `YYYY-MM-DD` (midnight UTC) or an RFC3339 timestamp
fn parse_unlock_date(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .context("Invalid unlock date");
    }
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(_) => bail!("Invalid unlock date '{}': expected YYYY-MM-DD or RFC3339", value),
    }
}

fn print_group_list(title: &str, groups: &[Group], now: DateTime<Utc>) {
    println!("{} ({})", title, groups.len());
    if groups.is_empty() {
        println!("  (none)");
        return;
    }
    for group in groups {
        let status = match group.unlocked_at {
            Some(at) => format!("unlocked {}", format_date(&at, &now)),
            None => format_countdown(&group.unlock_at, &now),
        };
        println!(
            "  {}  {}  [{} photos, {} videos]  {}",
            short_id(&group.id.to_string()),
            group.name,
            group.photo_count(),
            group.video_count(),
            status
        );
    }
}

fn print_group(group: &Group, now: DateTime<Utc>) {
    println!("{} ({})", group.name, group.id);
    if group.members.is_empty() {
        println!("Members: You");
    } else {
        println!("Members: You, {}", group.members.join(", "));
    }
    println!("Unlock date: {}", format_date(&group.unlock_at, &now));
    match group.unlocked_at {
        Some(at) => println!("Status: unlocked on {}", format_date(&at, &now)),
        None => println!("Status: locked, {}", format_countdown(&group.unlock_at, &now)),
    }
    println!("Media: {} photos, {} videos", group.photo_count(), group.video_count());

    for item in &group.media {
        if item.locked {
            println!(
                "  {} {} [locked] ({} comments)",
                short_id(&item.id.to_string()),
                item.kind,
                item.comment_count()
            );
            continue;
        }
        println!("  {} {} {}", short_id(&item.id.to_string()), item.kind, item.uri);
        for comment in &item.comments {
            println!("    {} {}: {}", short_id(&comment.id.to_string()), comment.author, comment.text);
            for reply in &comment.replies {
                println!("      {} {}: {}", short_id(&reply.id.to_string()), reply.author, reply.text);
            }
        }
    }
}

fn show_stats(store: &CapsuleStore, data_dir: &Path) {
    let stats = store.stats();

    println!("Momento Statistics");
    println!("==================");
    println!("Capsules: {}", stats.locked_groups + stats.unlocked_groups);
    println!("  Locked: {}", stats.locked_groups);
    println!("  Unlocked: {}", stats.unlocked_groups);
    println!("Photos: {}", stats.photos);
    println!("Videos: {}", stats.videos);
    println!("Comments: {}", stats.comments);
    println!();
    println!("Data directory: {}", format_path_with_tilde(data_dir));
}

fn short_id(id: &str) -> &str {
    &id[..8.min(id.len())]
}
