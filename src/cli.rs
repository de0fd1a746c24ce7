use clap::Parser;
use std::path::PathBuf;

use crate::logging::CliLogLevel;
use crate::models::TorrentOptions;
use crate::piece::PieceSize;

#[derive(Parser, Debug)]
#[command(
    name = "metaforge",
    version,
    about = "Create BitTorrent metainfo files from a directory of files",
    author = "metaforge contributors"
)]
pub struct Args {
    /// The directory to create a torrent from
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Tracker announce URL
    #[arg(short = 'a', long = "announce", value_name = "URL")]
    pub announce: String,

    /// Set the name of the torrent (defaults to basename of source)
    #[arg(short = 'n', long = "name", value_name = "NAME")]
    pub name: Option<String>,

    /// Set the output file path (defaults to <name>.torrent)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Piece size, or auto to aim for about 2000 pieces
    #[arg(short = 'l', long = "piece-size", value_enum, default_value_t = PieceSize::Auto)]
    pub piece_size: PieceSize,

    /// Overwrite output file if it exists
    #[arg(short = 'f', long = "force")]
    pub force: bool,

    /// Scan the source and report the piece layout without hashing
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Show a progress bar while hashing
    #[arg(long = "progress")]
    pub progress: bool,

    /// Verbose output (same as --log-level debug)
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Log level for diagnostics written to stderr
    #[arg(long = "log-level", value_enum, default_value_t = CliLogLevel::Warn)]
    pub log_level: CliLogLevel,
}

impl Args {
    /// Level the tracing subscriber should filter at
    pub fn effective_log_level(&self) -> CliLogLevel {
        if self.verbose {
            self.log_level.max(CliLogLevel::Debug)
        } else {
            self.log_level
        }
    }

    /// Convert CLI arguments to TorrentOptions
    pub fn into_options(self) -> TorrentOptions {
        TorrentOptions {
            name: self.name,
            announce: self.announce,
            piece_size: self.piece_size,
            creation_date: None,
        }
    }
}
