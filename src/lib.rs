//! # metaforge
//!
//! A library for creating BitTorrent metainfo files from a directory.
//!
//! Files are cataloged in a fixed order (sorted by relative path), hashed as
//! one continuous stream into SHA-1 pieces that span file boundaries, and
//! packaged with their sizes and MD5 checksums into a bencoded multi-file
//! torrent.
//!
//! ## Example
//!
//! ```no_run
//! use metaforge::{PieceSize, TorrentBuilder, TorrentOptions};
//! use std::path::PathBuf;
//!
//! let options = TorrentOptions {
//!     announce: "http://tracker.example.com/announce".to_string(),
//!     piece_size: PieceSize::Auto,
//!     ..TorrentOptions::default()
//! };
//! let builder = TorrentBuilder::new(PathBuf::from("my_files"), options);
//! let bytes = builder.create().unwrap();
//! ```

pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod hashing;
pub mod logging;
pub mod metainfo;
pub mod models;
pub mod piece;
pub mod scanner;

// Re-export main types for convenience
pub use builder::{DryRun, TorrentBuilder};
pub use error::{Error, Result};
pub use metainfo::{TorrentMetadata, assemble};
pub use models::{Torrent, TorrentOptions};
pub use piece::{PieceSize, select_piece_size};
