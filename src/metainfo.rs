//! Assembly of the metainfo aggregate handed to the bencode encoder.

use chrono::{DateTime, Utc};
use url::Url;

use crate::config::PIECE_DIGEST_LEN;
use crate::error::{Error, Result};
use crate::hashing::PieceDigest;
use crate::models::{FileEntry, FileInfo, Info, Torrent};

/// Everything known about a torrent once hashing is done.
#[derive(Debug, Clone)]
pub struct TorrentMetadata {
    /// Tracker URL exactly as supplied
    pub announce: String,
    pub name: String,
    pub piece_length: u32,
    /// Piece digests concatenated in stream order
    pub pieces: Vec<u8>,
    pub files: Vec<FileInfo>,
    pub created_at: DateTime<Utc>,
}

/// Validate the inputs and package them into a [`TorrentMetadata`].
///
/// # Errors
/// - `Error::InvalidArgument` - tracker URL is not an absolute URL, name is
///   empty, or piece length is zero
pub fn assemble(
    tracker_url: &str,
    torrent_name: &str,
    piece_length: u32,
    digests: &[PieceDigest],
    files: Vec<FileInfo>,
    created_at: DateTime<Utc>,
) -> Result<TorrentMetadata> {
    check_tracker_url(tracker_url)?;
    check_name(torrent_name)?;
    if piece_length == 0 {
        return Err(Error::invalid("piece length must be greater than 0"));
    }

    Ok(TorrentMetadata {
        announce: tracker_url.to_string(),
        name: torrent_name.to_string(),
        piece_length,
        pieces: digests.concat(),
        files,
        created_at,
    })
}

/// Fails unless `tracker_url` is a well-formed absolute `scheme://host` URL.
///
/// The raw string is what ends up in the metainfo, so anything the URL parser
/// would silently repair (spaces, backslashes, control characters, a missing
/// `//`) is rejected instead.
pub(crate) fn check_tracker_url(tracker_url: &str) -> Result<()> {
    if tracker_url.is_empty() {
        return Err(Error::invalid("tracker URL is required"));
    }
    if tracker_url
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || c == '\\')
    {
        return Err(Error::invalid(format!(
            "tracker URL '{tracker_url}' contains whitespace, control characters or backslashes"
        )));
    }
    let parsed = Url::parse(tracker_url)
        .map_err(|e| Error::invalid(format!("tracker URL '{tracker_url}' is not valid: {e}")))?;
    let has_authority = tracker_url
        .split_once("://")
        .is_some_and(|(scheme, _)| scheme.eq_ignore_ascii_case(parsed.scheme()));
    if parsed.cannot_be_a_base() || !parsed.has_host() || !has_authority {
        return Err(Error::invalid(format!(
            "tracker URL '{tracker_url}' must have the form scheme://host"
        )));
    }
    Ok(())
}

pub(crate) fn check_name(torrent_name: &str) -> Result<()> {
    if torrent_name.is_empty() {
        return Err(Error::invalid("torrent name is required"));
    }
    Ok(())
}

impl TorrentMetadata {
    pub fn piece_count(&self) -> usize {
        self.pieces.len() / PIECE_DIGEST_LEN
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.len).sum()
    }

    /// Wire layout of the metainfo
    pub fn to_torrent(&self) -> Torrent {
        Torrent {
            announce: self.announce.clone(),
            created_by: format!("metaforge {}", env!("CARGO_PKG_VERSION")),
            creation_date: self.created_at.timestamp(),
            info: Info {
                name: self.name.clone(),
                piece_length: u64::from(self.piece_length),
                pieces: serde_bytes::ByteBuf::from(self.pieces.clone()),
                files: self.files.iter().map(FileEntry::from).collect(),
            },
        }
    }

    /// Bencoded metainfo, ready to be written as a `.torrent` file
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_bencode::to_bytes(&self.to_torrent())?)
    }

    /// SHA-1 of the bencoded info dictionary
    pub fn info_hash(&self) -> Result<[u8; 20]> {
        Ok(self.to_torrent().info_hash()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn created_at() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn file(path: &str, len: u64) -> FileInfo {
        FileInfo {
            path: PathBuf::from(path),
            full_path: PathBuf::from("/content").join(path),
            len,
            md5: Some([0xab; 16]),
        }
    }

    #[test]
    fn test_assemble_concatenates_digests() {
        let digests = [[1u8; 20], [2u8; 20], [3u8; 20]];
        let meta = assemble(
            "http://tracker.example.com:6969/announce",
            "content",
            65_536,
            &digests,
            vec![file("a.bin", 10), file("sub/b.bin", 20)],
            created_at(),
        )
        .unwrap();

        assert_eq!(meta.pieces.len(), 60);
        assert_eq!(&meta.pieces[20..40], &[2u8; 20]);
        assert_eq!(meta.piece_count(), 3);
        assert_eq!(meta.total_size(), 30);
    }

    #[test]
    fn test_assemble_rejects_bad_urls() {
        for url in [
            "",
            "not a url",
            "/relative/announce",
            "tracker.example.com/announce",
            "mailto:someone@example.com",
            "http://tracker.example.com/ann ounce",
            " http://tracker.example.com/announce",
            "http:tracker.example.com",
            "http:/tracker.example.com/announce",
            "http://tracker.example.com\\announce",
            "http://tracker.example.com/announce\n",
        ] {
            let result = assemble(url, "name", 65_536, &[], Vec::new(), created_at());
            assert!(
                matches!(result, Err(Error::InvalidArgument(_))),
                "accepted {url:?}"
            );
        }
    }

    #[test]
    fn test_assemble_accepts_tracker_urls() {
        for url in [
            "http://tracker.example.com/announce",
            "https://tracker.example.com:443/announce?passkey=abc",
            "udp://tracker.example.org:1337",
            "HTTP://tracker.example.com/announce",
        ] {
            assert!(
                assemble(url, "name", 65_536, &[], Vec::new(), created_at()).is_ok(),
                "rejected {url:?}"
            );
        }
    }

    #[test]
    fn test_assemble_rejects_empty_name() {
        let result = assemble("udp://tracker.example.com:1337", "", 65_536, &[], Vec::new(), created_at());
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_empty_torrent_is_well_formed() {
        let meta = assemble("http://t.example/announce", "empty", 65_536, &[], Vec::new(), created_at()).unwrap();
        assert_eq!(meta.piece_count(), 0);

        let bytes = meta.to_bytes().unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("5:filesle"));
        assert!(text.contains("6:pieces0:"));
    }

    #[test]
    fn test_bencoded_layout() {
        let meta = assemble(
            "http://t.example/announce",
            "content",
            65_536,
            &[[7u8; 20]],
            vec![file("sub/b.bin", 20)],
            created_at(),
        )
        .unwrap();
        let bytes = meta.to_bytes().unwrap();
        let text = String::from_utf8_lossy(&bytes);

        assert!(text.starts_with("d8:announce25:http://t.example/announce"));
        assert!(text.contains("13:creation datei1700000000e"));
        assert!(text.contains("12:piece lengthi65536e"));
        assert!(text.contains("4:pathl3:sub5:b.binee"));
        assert!(text.contains(&format!("6:md5sum32:{}", "ab".repeat(16))));
        assert!(text.contains("4:name7:content"));
    }

    #[test]
    fn test_info_hash_is_stable() {
        let meta = assemble("http://t.example/announce", "content", 65_536, &[[7u8; 20]], vec![file("a", 1)], created_at()).unwrap();
        let later = TorrentMetadata {
            created_at: DateTime::from_timestamp(1_800_000_000, 0).unwrap(),
            ..meta.clone()
        };
        // The creation date lives outside the info dictionary
        assert_eq!(meta.info_hash().unwrap(), later.info_hash().unwrap());
    }
}
