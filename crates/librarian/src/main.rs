//! Steam ROM Librarian: entry point.
//!
//! Keeps Steam's non-Steam shortcut list (`shortcuts.vdf`) in sync with a
//! catalogue of ROMs and launchers, without disturbing shortcuts the user
//! added or play history Steam recorded.
//!
//! # Usage
//!
//! ```text
//! steam-rom-librarian [OPTIONS] <COMMAND>
//!
//! Commands:
//!   write              Reconcile the catalogue into shortcuts.vdf
//!   read               List the shortcuts currently in shortcuts.vdf
//!   dump <FILE>        Print the KeyValues tree of any binary VDF file
//!   id <KEY> <NAME>    Print the identifiers a shortcut would get
//!   init               Write a default config and example library if absent
//!
//! Options:
//!   --config <PATH>      Config file [default: platform config dir]
//!   -u, --user-id <ID>   Steam user ID (overrides config)
//!   -l, --library <PATH> Catalogue library (overrides config)
//! ```
//!
//! Steam must not be running during `write`; it rewrites `shortcuts.vdf`
//! from memory on exit.
//!
//! # Architecture overview
//!
//! ```text
//! main.rs            CLI, logging, config
//!   application/     build_entries → reconcile → sync_library
//!   infrastructure/
//!     storage/       config.toml, library.json, shortcuts.vdf
//!     steam/         Steam root and user lookup, grid artwork
//! librarian-core     binary KeyValues codec, Shortcut, AppId
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use librarian::application::sync_library::{sync_library, StoreFiles, SyncOptions};
use librarian::infrastructure::steam::artwork::install_artwork;
use librarian::infrastructure::steam::locate::{find_steam_root, select_user, SteamUser};
use librarian::infrastructure::storage::config::{
    config_file_path, load_config, write_default_config, AppConfig,
};
use librarian::infrastructure::storage::library::{load_library, save_library, write_example_library};
use librarian::infrastructure::storage::shortcut_store::FsStoreFiles;
use librarian_core::{decode, read_shortcuts, AppId};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Syncs a ROM catalogue into Steam's non-Steam shortcuts.
#[derive(Debug, Parser)]
#[command(name = "steam-rom-librarian", version)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, env = "STEAM_ROM_LIBRARIAN_CONFIG")]
    config: Option<PathBuf>,

    /// Steam user ID whose shortcuts are managed.
    #[arg(short = 'u', long, env = "STEAM_ROM_LIBRARIAN_USER_ID")]
    user_id: Option<String>,

    /// Path to the catalogue library JSON file.
    #[arg(short = 'l', long, env = "STEAM_ROM_LIBRARIAN_LIBRARY")]
    library: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Reconcile the catalogue into shortcuts.vdf and save the library.
    Write,
    /// List the shortcuts currently in shortcuts.vdf.
    Read,
    /// Print the KeyValues tree of a binary VDF file.
    Dump {
        file: PathBuf,
    },
    /// Print the shortcut and legacy IDs for an identifier key and name.
    Id {
        key: String,
        name: String,
    },
    /// Write a default config and an example library if they do not exist.
    Init,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => config_file_path().context("locating config file")?,
    };
    let mut config = load_config(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;
    if let Some(user_id) = &cli.user_id {
        config.steam.user_id = Some(user_id.clone());
    }

    // `RUST_LOG` wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let library_path = cli
        .library
        .clone()
        .or_else(|| config.general.library_path.clone())
        .unwrap_or_else(|| default_library_path(&config_path));

    match cli.command {
        Command::Write => run_write(&config, &library_path),
        Command::Read => run_read(&config),
        Command::Dump { file } => run_dump(&file),
        Command::Id { key, name } => {
            let id = AppId::derive(&key, &name);
            println!("shortcut id: {}", id.shortcut_id_string());
            println!("legacy id:   {}", id.legacy_id_string());
            Ok(())
        }
        Command::Init => {
            if write_default_config(&config_path)
                .with_context(|| format!("writing {}", config_path.display()))?
            {
                println!("wrote default config to {}", config_path.display());
            }
            if write_example_library(&library_path)
                .with_context(|| format!("writing {}", library_path.display()))?
            {
                println!("wrote example library to {}", library_path.display());
            } else {
                println!("{} already exists; left unchanged", library_path.display());
            }
            Ok(())
        }
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn run_write(config: &AppConfig, library_path: &Path) -> anyhow::Result<()> {
    let user = locate_user(config)?;
    let mut library = load_library(library_path)?;

    let options = SyncOptions {
        store_path: user.shortcuts_path(),
        backup_extension: config.store.backup_extension(),
    };
    let outcome = sync_library(&FsStoreFiles::new(), &options, &mut library)
        .context("reconciling shortcuts")?;

    save_library(library_path, &library)
        .with_context(|| format!("saving {}", library_path.display()))?;

    let report = &outcome.report;
    info!(
        created = report.created.len(),
        inherited = report.inherited.len(),
        adopted = report.adopted.len(),
        deleted = report.deleted.len(),
        "sync complete"
    );
    for pointer in &report.deleted {
        println!("forgot  ({}) {}", pointer.app_id, pointer.app_name);
    }
    for pointer in &report.adopted {
        println!("adopted ({}) {}", pointer.app_id, pointer.app_name);
    }
    println!(
        "{} shortcuts ({} new, {} updated){}",
        outcome.shortcuts.len(),
        report.created.len(),
        report.inherited.len(),
        if outcome.written { "" } else { ", store unchanged" }
    );

    if config.store.install_artwork {
        let artwork = install_artwork(&library, &user.grid_dir()).context("installing artwork")?;
        if !artwork.missing.is_empty() {
            warn!("{} artwork file(s) missing", artwork.missing.len());
        }
        info!("installed {} artwork file(s)", artwork.installed.len());
    }
    Ok(())
}

fn run_read(config: &AppConfig) -> anyhow::Result<()> {
    let user = locate_user(config)?;
    let path = user.shortcuts_path();
    let bytes = FsStoreFiles::new()
        .read(&path)
        .with_context(|| format!("reading {}", path.display()))?
        .unwrap_or_default();
    let shortcuts =
        read_shortcuts(&bytes).with_context(|| format!("decoding {}", path.display()))?;
    for shortcut in &shortcuts {
        println!("{shortcut}");
    }
    Ok(())
}

fn run_dump(file: &Path) -> anyhow::Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let tree = decode(&bytes).with_context(|| format!("decoding {}", file.display()))?;
    print!("{}", tree.dump());
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn locate_user(config: &AppConfig) -> anyhow::Result<SteamUser> {
    let root = find_steam_root(config.steam.steam_path.as_deref())?;
    let user = select_user(&root, config.steam.user_id.as_deref())?;
    info!("managing shortcuts of Steam user {}", user.user_id);
    Ok(user)
}

fn default_library_path(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|dir| dir.join("library.json"))
        .unwrap_or_else(|| PathBuf::from("library.json"))
}
