use serde::Serialize;
use std::path::PathBuf;

/// Represents a file in the torrent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Relative path for the torrent metadata
    pub path: PathBuf,
    /// Absolute path for reading the file
    pub full_path: PathBuf,
    /// File size in bytes
    pub len: u64,
    /// MD5 of the whole file, once the catalog has computed it
    pub md5: Option<[u8; 16]>,
}

impl FileInfo {
    /// Path segments as written to the `path` list of the metainfo
    pub fn path_components(&self) -> Vec<String> {
        self.path
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect()
    }
}

/// File entry in multi-file mode
#[derive(Debug, Serialize)]
pub struct FileEntry {
    pub length: u64,
    pub path: Vec<String>,
    /// Whole-file MD5 as lowercase hex. Some creators write uppercase hex
    /// here; readers compare it case-insensitively.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5sum: Option<String>,
}

impl From<&FileInfo> for FileEntry {
    fn from(file: &FileInfo) -> Self {
        FileEntry {
            length: file.len,
            path: file.path_components(),
            md5sum: file.md5.map(hex::encode),
        }
    }
}
