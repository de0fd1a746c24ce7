use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use md5::{Digest, Md5};

use crate::config::MD5_CHUNK_SIZE;
use crate::error::{Error, Result};

/// MD5 of a whole file, streamed in fixed-size chunks
pub fn file_md5(path: &Path) -> Result<[u8; 16]> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    reader_md5(file).map_err(|e| Error::io(path, e))
}

/// MD5 of everything `reader` yields
pub fn reader_md5<R: Read>(mut reader: R) -> std::io::Result<[u8; 16]> {
    let mut hasher = Md5::new();
    let mut chunk = vec![0u8; MD5_CHUNK_SIZE];
    loop {
        match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => hasher.update(&chunk[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(hasher.finalize().into())
}

/// Reader adapter that feeds every byte it passes through into MD5
pub struct Md5Reader<R> {
    inner: R,
    hasher: Md5,
}

impl<R: Read> Md5Reader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Md5::new(),
        }
    }

    /// MD5 of the bytes read so far
    pub fn finalize(self) -> [u8; 16] {
        self.hasher.finalize().into()
    }
}

impl<R: Read> Read for Md5Reader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}
