mod file;
mod torrent;

pub use file::{FileEntry, FileInfo};
pub use torrent::{Info, Torrent, TorrentOptions};
