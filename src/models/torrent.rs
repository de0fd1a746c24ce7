use serde::Serialize;
use sha1::{Digest, Sha1};

use super::file::FileEntry;
use crate::piece::PieceSize;

/// Info dictionary for the torrent
#[derive(Debug, Serialize)]
pub struct Info {
    pub name: String,

    #[serde(rename = "piece length")]
    pub piece_length: u64,

    pub pieces: serde_bytes::ByteBuf,

    pub files: Vec<FileEntry>,
}

/// Torrent metainfo structure
#[derive(Debug, Serialize)]
pub struct Torrent {
    pub announce: String,

    #[serde(rename = "created by")]
    pub created_by: String,

    #[serde(rename = "creation date")]
    pub creation_date: i64,

    pub info: Info,
}

impl Torrent {
    /// SHA-1 over the bencoded info dictionary
    pub fn info_hash(&self) -> Result<[u8; 20], serde_bencode::Error> {
        let info = serde_bencode::to_bytes(&self.info)?;
        Ok(Sha1::digest(&info).into())
    }
}

/// Configuration options for building a torrent
#[derive(Debug, Clone, Default)]
pub struct TorrentOptions {
    /// Display name; defaults to the source directory's name
    pub name: Option<String>,
    /// Tracker announce URL
    pub announce: String,
    pub piece_size: PieceSize,
    /// Fixed creation time (UTC epoch seconds) instead of the current time
    pub creation_date: Option<i64>,
}
