/// Kibibyte constant for piece length calculations
pub const KIB: u32 = 1024;

/// Mebibyte constant for piece length calculations
pub const MIB: u32 = 1024 * KIB;

/// Piece count the automatic piece size selection aims for
pub const TARGET_PIECE_COUNT: u32 = 2000;

/// Smallest piece length offered (64 KiB)
pub const MIN_PIECE_LENGTH: u32 = 64 * KIB;

/// Largest piece length offered (16 MiB)
pub const MAX_PIECE_LENGTH: u32 = 16 * MIB;

/// Chunk size used when streaming a file through MD5
pub const MD5_CHUNK_SIZE: usize = MIB as usize;

/// Length of a SHA-1 piece digest
pub const PIECE_DIGEST_LEN: usize = 20;
