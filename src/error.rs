//! Error types untuk tensor codec
//!
//! Dua keluarga error:
//! - Validation: data header/payload tidak sesuai format (deterministik, tidak di-retry)
//! - I/O: stream gagal atau transfer tidak lengkap

use std::io;

use thiserror::Error;

/// Semua error yang dikembalikan oleh `nnef-tensor`.
#[derive(Debug, Error)]
pub enum TensorError {
    /// Magic bytes bukan `{'N', 0xEF}`
    #[error("invalid magic number in tensor binary: {0:02x?}")]
    BadMagic([u8; 2]),

    #[error("unknown version number {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },

    #[error("tensor rank {rank} exceeds maximum allowed rank ({max})")]
    RankOverflow { rank: usize, max: usize },

    /// `dataLength` tidak cocok dengan extents dan bits per item
    #[error("data length {declared} is not compatible with extents and bits per item (expected {expected:?})")]
    LengthMismatch {
        declared: u64,
        /// `None` jika perkalian extents overflow
        expected: Option<u64>,
    },

    #[error("invalid bits per item for {category} item type: {bits}")]
    UnsupportedBitWidth { category: &'static str, bits: u32 },

    #[error("unknown Khronos-defined item type code: {0:#x}")]
    UnknownItemType(u32),

    #[error("tensor of {items} items at {bits} bits per item does not fit the data length field")]
    LengthOverflow { items: u64, bits: u32 },

    #[error("short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    #[error("short write: expected {expected} bytes, wrote {actual}")]
    ShortWrite { expected: usize, actual: usize },

    #[error("{extra} trailing bytes after tensor payload")]
    TrailingData { extra: usize },

    #[error("tensor stream I/O failed: {0}")]
    Io(#[from] io::Error),
}

impl TensorError {
    /// True untuk error format (header/payload tidak valid).
    pub fn is_validation(&self) -> bool {
        !self.is_io()
    }

    /// True untuk error dari stream. Retry hanya masuk akal di layer I/O di atasnya.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            Self::ShortRead { .. } | Self::ShortWrite { .. } | Self::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TensorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_families() {
        assert!(TensorError::BadMagic([b'N', 0]).is_validation());
        assert!(TensorError::UnknownItemType(9).is_validation());
        assert!(TensorError::ShortRead {
            expected: 128,
            actual: 4
        }
        .is_io());
        assert!(TensorError::from(io::Error::new(io::ErrorKind::Other, "boom")).is_io());
    }

    #[test]
    fn test_error_messages() {
        let err = TensorError::UnsupportedVersion { major: 2, minor: 1 };
        assert_eq!(err.to_string(), "unknown version number 2.1");

        let err = TensorError::UnsupportedBitWidth {
            category: "float",
            bits: 24,
        };
        assert_eq!(err.to_string(), "invalid bits per item for float item type: 24");
    }
}
