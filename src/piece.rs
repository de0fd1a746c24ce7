use std::fmt;

use clap::ValueEnum;

use crate::config::{KIB, MIB, TARGET_PIECE_COUNT};
use crate::error::{Error, Result};

/// Piece length option for a torrent.
///
/// Every variant except `Auto` is a concrete power-of-two length. `Auto` is
/// resolved against the payload size before any hashing starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, ValueEnum)]
pub enum PieceSize {
    #[default]
    Auto,
    #[value(name = "64k")]
    Size64KiB,
    #[value(name = "128k")]
    Size128KiB,
    #[value(name = "256k")]
    Size256KiB,
    #[value(name = "512k")]
    Size512KiB,
    #[value(name = "1m")]
    Size1MiB,
    #[value(name = "2m")]
    Size2MiB,
    #[value(name = "4m")]
    Size4MiB,
    #[value(name = "8m")]
    Size8MiB,
    #[value(name = "16m")]
    Size16MiB,
}

impl PieceSize {
    /// Concrete piece sizes in ascending order
    pub const CANDIDATES: [PieceSize; 9] = [
        PieceSize::Size64KiB,
        PieceSize::Size128KiB,
        PieceSize::Size256KiB,
        PieceSize::Size512KiB,
        PieceSize::Size1MiB,
        PieceSize::Size2MiB,
        PieceSize::Size4MiB,
        PieceSize::Size8MiB,
        PieceSize::Size16MiB,
    ];

    /// Length in bytes, or `None` for `Auto`
    pub fn bytes(self) -> Option<u32> {
        match self {
            PieceSize::Auto => None,
            PieceSize::Size64KiB => Some(64 * KIB),
            PieceSize::Size128KiB => Some(128 * KIB),
            PieceSize::Size256KiB => Some(256 * KIB),
            PieceSize::Size512KiB => Some(512 * KIB),
            PieceSize::Size1MiB => Some(MIB),
            PieceSize::Size2MiB => Some(2 * MIB),
            PieceSize::Size4MiB => Some(4 * MIB),
            PieceSize::Size8MiB => Some(8 * MIB),
            PieceSize::Size16MiB => Some(16 * MIB),
        }
    }

    /// Look up the option matching an exact byte length
    pub fn from_bytes(len: u32) -> Option<PieceSize> {
        Self::CANDIDATES
            .into_iter()
            .find(|candidate| candidate.bytes() == Some(len))
    }

    /// Resolve to a concrete piece length in bytes.
    ///
    /// `Auto` selects against [`TARGET_PIECE_COUNT`] and therefore needs a
    /// non-zero `total_size`.
    pub fn resolve(self, total_size: u64) -> Result<u32> {
        let resolved = match self {
            PieceSize::Auto => select_piece_size(total_size, TARGET_PIECE_COUNT)?,
            concrete => concrete,
        };
        resolved
            .bytes()
            .ok_or_else(|| Error::invalid("piece size did not resolve to a concrete length"))
    }
}

impl fmt::Display for PieceSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bytes() {
            None => write!(f, "auto"),
            Some(len) if len >= MIB => write!(f, "{} MiB", len / MIB),
            Some(len) => write!(f, "{} KiB", len / KIB),
        }
    }
}

/// Pick the piece size whose piece count lands closest to `target_piece_count`.
///
/// Candidates are scanned from smallest to largest. Scanning stops on an exact
/// hit, or as soon as a larger candidate ties the best distance so far, which
/// keeps the smaller of two equidistant sizes.
pub fn select_piece_size(total_size: u64, target_piece_count: u32) -> Result<PieceSize> {
    if total_size == 0 {
        return Err(Error::invalid("total size must be greater than 0"));
    }
    if target_piece_count == 0 {
        return Err(Error::invalid("target piece count must be greater than 0"));
    }

    let target = u64::from(target_piece_count);
    let mut optimal = PieceSize::CANDIDATES[0];
    let mut smallest_difference = u64::MAX;

    for candidate in PieceSize::CANDIDATES {
        let Some(len) = candidate.bytes() else {
            continue;
        };
        let difference = calculate_num_pieces(total_size, u64::from(len)).abs_diff(target);

        if difference == smallest_difference {
            break;
        }
        if difference < smallest_difference {
            optimal = candidate;
            smallest_difference = difference;
        }
        if difference == 0 {
            break;
        }
    }

    Ok(optimal)
}

/// Calculate the number of pieces for a given total size and piece length
pub fn calculate_num_pieces(total_size: u64, piece_length: u64) -> u64 {
    total_size.div_ceil(piece_length)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = MIB as u64;

    /// Exhaustive scan keeping the smallest candidate among equal distances.
    fn brute_force(total_size: u64, target: u32) -> PieceSize {
        PieceSize::CANDIDATES
            .into_iter()
            .min_by_key(|c| {
                let len = u64::from(c.bytes().unwrap());
                calculate_num_pieces(total_size, len).abs_diff(u64::from(target))
            })
            .unwrap()
    }

    #[test]
    fn test_select_piece_size_exact_matches() {
        assert_eq!(
            select_piece_size(2000 * 64 * 1024, 2000).unwrap(),
            PieceSize::Size64KiB
        );
        assert_eq!(select_piece_size(2000 * MB, 2000).unwrap(), PieceSize::Size1MiB);
        assert_eq!(select_piece_size(10 * MB, 10).unwrap(), PieceSize::Size1MiB);
        assert_eq!(
            select_piece_size(2000 * 16 * MB, 2000).unwrap(),
            PieceSize::Size16MiB
        );
    }

    #[test]
    fn test_select_piece_size_bounds() {
        // Tiny payloads give one piece for every candidate; the tie keeps 64 KiB.
        assert_eq!(select_piece_size(1, 2000).unwrap(), PieceSize::Size64KiB);
        assert_eq!(select_piece_size(300_000, 2000).unwrap(), PieceSize::Size64KiB);
        // Huge payloads never reach the target; the largest size is closest.
        assert_eq!(select_piece_size(1 << 50, 2000).unwrap(), PieceSize::Size16MiB);
    }

    #[test]
    fn test_select_piece_size_rejects_zero() {
        assert!(matches!(
            select_piece_size(0, 2000),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            select_piece_size(1024, 0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_select_piece_size_is_closest() {
        let mut total = 1u64;
        while total < 1 << 48 {
            for target in [1, 7, 500, 2000, 4096] {
                let chosen = select_piece_size(total, target).unwrap();
                assert!(PieceSize::CANDIDATES.contains(&chosen));
                assert_eq!(chosen, brute_force(total, target), "total={total} target={target}");
                assert_eq!(chosen, select_piece_size(total, target).unwrap());
            }
            total = total * 3 + 17;
        }
    }

    #[test]
    fn test_candidates_ascending_powers_of_two() {
        use crate::config::{MAX_PIECE_LENGTH, MIN_PIECE_LENGTH};

        let lengths: Vec<u32> = PieceSize::CANDIDATES
            .iter()
            .map(|c| c.bytes().unwrap())
            .collect();
        assert_eq!(lengths.first(), Some(&MIN_PIECE_LENGTH));
        assert_eq!(lengths.last(), Some(&MAX_PIECE_LENGTH));
        assert!(lengths.iter().all(|l| l.is_power_of_two()));
        assert!(lengths.windows(2).all(|w| w[1] == w[0] * 2));
    }

    #[test]
    fn test_resolve() {
        assert_eq!(PieceSize::Size128KiB.resolve(0).unwrap(), 131_072);
        assert_eq!(PieceSize::Auto.resolve(2000 * MB).unwrap(), 1_048_576);
        assert!(matches!(
            PieceSize::Auto.resolve(0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_from_bytes_and_display() {
        assert_eq!(PieceSize::from_bytes(4 * MIB), Some(PieceSize::Size4MiB));
        assert_eq!(PieceSize::from_bytes(1000), None);
        assert_eq!(PieceSize::Size256KiB.to_string(), "256 KiB");
        assert_eq!(PieceSize::Size2MiB.to_string(), "2 MiB");
        assert_eq!(PieceSize::Auto.to_string(), "auto");
    }

    #[test]
    fn test_calculate_num_pieces() {
        assert_eq!(calculate_num_pieces(0, 1024), 0);
        assert_eq!(calculate_num_pieces(100, 100), 1);
        assert_eq!(calculate_num_pieces(101, 100), 2);
        assert_eq!(calculate_num_pieces(2049, 1024), 3);
        assert_eq!(calculate_num_pieces(300_000, 131_072), 3);
    }
}
