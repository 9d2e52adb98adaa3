//! Command-line interface for `geopins`, geospatial datatypes on versioned pin boards.
//!
//! This binary inspects a folder board through the [`geopins_core`] library:
//! it lists pins and their versions, shows how each stored file is classified
//! and decodes pins into tables, vector tables or raster grids.
//!
//! # Architecture
//!
//! The CLI is built using [`clap`] for argument parsing and [`tracing`] for structured logging.
//! Library crates log through the `log` facade, which is bridged into `tracing` at startup.
//!
//! # Available Commands
//!
//! - `drivers` - List the known filetypes and the datatypes each can hold
//! - `list` - List the pins on a board
//! - `versions` - List the versions of a pin
//! - `info` - Display pin metadata and its classification
//! - `show` - Read a pin and summarize its contents

mod display;

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use tabled::Table;
use tracing::{Level, debug, info};
use tracing_log::LogTracer;
use tracing_subscriber::FmtSubscriber;

use geopins_core::filetypes::get_filetypes;
use geopins_core::{GeoPinsError, IntoGeoBoard, infer_driver_info};
use geopins_core_common::{Board, PinStorage};
use geopins_folder::FolderBoard;

use crate::display::{FiletypeRow, display_object, display_pin_info, display_versions};

#[derive(Parser)]
#[command(
    name = "geopins",
    version,
    about = "Geospatial datatypes for versioned pin boards",
    long_about = "geopins stores vector tables and raster grids on pin boards.\n\
                  Pins are classified from their metadata and decoded with the matching codec."
)]
/// Command-line arguments and options for the `geopins` CLI.
struct Cli {
    /// Enable verbose (INFO level) logging output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug (DEBUG level) logging output with detailed diagnostics.
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the `geopins` CLI.
#[derive(Subcommand)]
enum Commands {
    /// Lists the known filetypes and the datatypes each can hold.
    Drivers,

    /// Lists the pins stored on a board.
    List {
        /// Root directory of the folder board.
        #[arg(short, long, env = "GEOPINS_BOARD", value_name = "DIR")]
        board: PathBuf,
    },

    /// Lists the stored versions of a pin, oldest first.
    Versions {
        /// Name of the pin.
        #[arg(value_name = "NAME")]
        name: String,

        /// Root directory of the folder board.
        #[arg(short, long, env = "GEOPINS_BOARD", value_name = "DIR")]
        board: PathBuf,
    },

    /// Displays the metadata of a pin version and how it is classified.
    Info {
        /// Name of the pin.
        #[arg(value_name = "NAME")]
        name: String,

        /// Root directory of the folder board.
        #[arg(short, long, env = "GEOPINS_BOARD", value_name = "DIR")]
        board: PathBuf,

        /// Version to inspect; the latest when omitted.
        #[arg(long, value_name = "VERSION")]
        pin_version: Option<String>,
    },

    /// Reads a pin version and summarizes its contents.
    Show {
        /// Name of the pin.
        #[arg(value_name = "NAME")]
        name: String,

        /// Root directory of the folder board.
        #[arg(short, long, env = "GEOPINS_BOARD", value_name = "DIR")]
        board: PathBuf,

        /// Version to read; the latest when omitted.
        #[arg(long, value_name = "VERSION")]
        pin_version: Option<String>,

        /// Expected pin hash; the read fails if the stored files differ.
        #[arg(long, value_name = "HASH")]
        hash: Option<String>,
    },
}

/// Entry point for the `geopins` command-line interface.
///
/// # Errors
///
/// Returns an error if command execution fails or if the logging system cannot be initialized.
fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity flags
    let log_level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    // Bridge logs from the `log` crate to the `tracing` ecosystem.
    LogTracer::init()?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Drivers => handle_drivers(),
        Commands::List { board } => handle_list(&board),
        Commands::Versions { name, board } => handle_versions(&board, &name),
        Commands::Info {
            name,
            board,
            pin_version,
        } => {
            info!("Displaying info for pin '{name}'");
            handle_info(&board, &name, pin_version.as_deref())
        },
        Commands::Show {
            name,
            board,
            pin_version,
            hash,
        } => {
            info!("Reading pin '{name}'");
            handle_show(&board, &name, pin_version.as_deref(), hash.as_deref())
        },
    }
}

/// Turns a library error into a CLI error carrying its recovery hint.
fn report(error: impl Into<GeoPinsError>) -> anyhow::Error {
    let error = error.into();
    match error.recovery_suggestion() {
        Some(suggestion) => anyhow!("{}\n\nSuggestion: {suggestion}", error.user_message()),
        None => anyhow!("{}", error.user_message()),
    }
}

fn open_board(root: &Path) -> Result<FolderBoard> {
    if !root.is_dir() {
        return Err(anyhow!("Board directory '{}' does not exist.", root.display()));
    }
    debug!("Opening folder board at {}", root.display());
    Ok(FolderBoard::new(root))
}

/// Handles the `drivers` subcommand by printing the filetype registry as a table.
#[allow(clippy::unnecessary_wraps)]
fn handle_drivers() -> Result<()> {
    let filetypes = get_filetypes();

    println!("\nKnown Filetypes ({} total):\n", filetypes.len());

    let rows: Vec<FiletypeRow> = filetypes.iter().map(FiletypeRow::from).collect();
    println!("{}", Table::new(rows));

    Ok(())
}

fn handle_list(root: &Path) -> Result<()> {
    let board = open_board(root)?;
    let names = board.pin_list().map_err(report)?;

    println!("\nPins ({} total):\n", names.len());
    for name in names {
        println!("{name}");
    }

    Ok(())
}

fn handle_versions(root: &Path, name: &str) -> Result<()> {
    let board = open_board(root)?;
    let versions = board.pin_versions(name).map_err(report)?;
    display_versions(name, &versions);
    Ok(())
}

fn handle_info(root: &Path, name: &str, version: Option<&str>) -> Result<()> {
    let board = open_board(root)?;
    let meta = board.pin_fetch(name, version).map_err(report)?;
    let driver_info = infer_driver_info(&meta, &board).map_err(report)?;
    debug!(
        "Pin '{name}' classified as {:?} ({})",
        driver_info.dtype, driver_info.filetype
    );
    display_pin_info(&meta, &driver_info);
    Ok(())
}

fn handle_show(root: &Path, name: &str, version: Option<&str>, hash: Option<&str>) -> Result<()> {
    let board = open_board(root)?.into_geo_board();
    let object = board.pin_read(name, version, hash).map_err(report)?;
    display_object(&object);
    Ok(())
}
