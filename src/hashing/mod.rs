pub mod checksum;
mod v1;

pub use checksum::file_md5;
pub use v1::{PieceDigest, PieceHasher, hash_catalog, hash_pieces, hash_pieces_with_progress};
