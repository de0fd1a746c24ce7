use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::Path;

use indicatif::ProgressBar;
use sha1::{Digest, Sha1};
use tracing::debug;

use super::checksum::Md5Reader;
use crate::config::PIECE_DIGEST_LEN;
use crate::error::{Error, Result};
use crate::models::FileInfo;

/// SHA-1 digest of one piece
pub type PieceDigest = [u8; PIECE_DIGEST_LEN];

/// Sliding piece buffer shared by every file of a torrent.
///
/// Bytes are appended at `fill`; a digest is emitted each time the buffer is
/// full. `fill` is not reset between sources, so a piece may take its bytes
/// from several consecutive files.
#[derive(Debug)]
pub struct PieceHasher {
    buffer: Vec<u8>,
    fill: usize,
    pieces: Vec<PieceDigest>,
}

impl PieceHasher {
    /// Allocate the piece buffer once for the whole run
    pub fn new(piece_length: u32) -> Result<Self> {
        if piece_length == 0 {
            return Err(Error::invalid("piece length must be greater than 0"));
        }
        Ok(Self {
            buffer: vec![0u8; piece_length as usize],
            fill: 0,
            pieces: Vec::new(),
        })
    }

    /// Number of bytes waiting in the buffer for the current piece
    pub fn fill(&self) -> usize {
        self.fill
    }

    /// Digests of the pieces completed so far
    pub fn pieces(&self) -> &[PieceDigest] {
        &self.pieces
    }

    /// Consume `reader` until it is exhausted, returning the bytes read.
    pub fn update<R: Read>(&mut self, mut reader: R) -> std::io::Result<u64> {
        let mut consumed = 0u64;
        loop {
            let n = match reader.read(&mut self.buffer[self.fill..]) {
                Ok(0) => return Ok(consumed),
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            self.fill += n;
            consumed += n as u64;

            if self.fill == self.buffer.len() {
                self.pieces.push(digest(&self.buffer));
                self.fill = 0;
            }
        }
    }

    /// Hash the short trailing piece, if any, and return all digests in order
    pub fn finish(mut self) -> Vec<PieceDigest> {
        if self.fill > 0 {
            self.pieces.push(digest(&self.buffer[..self.fill]));
        }
        self.pieces
    }
}

fn digest(data: &[u8]) -> PieceDigest {
    let mut hasher = Sha1::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash all pieces of the concatenated `files`, in the order given
pub fn hash_pieces<P: AsRef<Path>>(files: &[P], piece_length: u32) -> Result<Vec<PieceDigest>> {
    hash_pieces_with_progress(files, piece_length, None)
}

/// Same as [`hash_pieces`], advancing `pb` by the number of bytes read
pub fn hash_pieces_with_progress<P: AsRef<Path>>(
    files: &[P],
    piece_length: u32,
    pb: Option<&ProgressBar>,
) -> Result<Vec<PieceDigest>> {
    debug!(files = files.len(), piece_length, "Computing V1 (SHA1) piece hashes");

    let hasher = files
        .iter()
        .try_fold(PieceHasher::new(piece_length)?, |mut hasher, path| {
            let path = path.as_ref();
            let file = File::open(path).map_err(|e| Error::io(path, e))?;
            let read = hasher.update(file).map_err(|e| Error::io(path, e))?;
            if let Some(pb) = pb {
                pb.inc(read);
            }
            debug!(path = %path.display(), bytes = read, "hashed file");
            Ok::<_, Error>(hasher)
        })?;

    let pieces = hasher.finish();
    debug!(pieces = pieces.len(), "piece hashing complete");
    Ok(pieces)
}

/// Hash the pieces of a scanned catalog and fill in each file's MD5, reading
/// every file exactly once.
///
/// The bytes read from each file must match the size recorded when it was
/// scanned; a file that grew or shrank in between fails the whole run.
pub fn hash_catalog(
    files: &mut [FileInfo],
    piece_length: u32,
    pb: Option<&ProgressBar>,
) -> Result<Vec<PieceDigest>> {
    debug!(files = files.len(), piece_length, "Computing V1 (SHA1) piece hashes and MD5 sums");

    let mut hasher = PieceHasher::new(piece_length)?;
    for file in files.iter_mut() {
        let handle = File::open(&file.full_path).map_err(|e| Error::io(&file.full_path, e))?;
        let mut reader = Md5Reader::new(handle);
        let read = hasher
            .update(&mut reader)
            .map_err(|e| Error::io(&file.full_path, e))?;

        if read != file.len {
            return Err(Error::io(
                &file.full_path,
                io::Error::new(
                    ErrorKind::InvalidData,
                    format!(
                        "file changed size while hashing: expected {} bytes, read {}",
                        file.len, read
                    ),
                ),
            ));
        }

        file.md5 = Some(reader.finalize());
        if let Some(pb) = pb {
            pb.inc(read);
        }
        debug!(path = %file.path.display(), bytes = read, "hashed file");
    }

    let pieces = hasher.finish();
    debug!(pieces = pieces.len(), "piece hashing complete");
    Ok(pieces)
}
