//! Memory-Mapped tensor file (read-only)
//!
//! File di-mmap langsung ke virtual memory:
//! - Zero-copy read: header dan payload dibaca langsung dari page cache
//! - Kernel-managed paging: tensor besar tidak perlu di-load sekaligus

use memmap2::{Mmap, MmapOptions};
use std::fs::File;
use std::path::Path;

use crate::error::{Result, TensorError};
use crate::protocol::{TensorHeader, HEADER_SIZE};

/// Ukuran file sebagai `usize`; file yang tidak muat di address space ditolak
fn mapped_len(file_len: u64) -> Result<usize> {
    usize::try_from(file_len).map_err(|_| TensorError::LengthOverflow {
        items: file_len,
        bits: 8,
    })
}

/// Tensor file yang di-map read-only
pub struct MmapStorage {
    mmap: Mmap,
}

impl MmapStorage {
    /// Membuka dan map file tensor.
    ///
    /// File yang lebih kecil dari header langsung ditolak dengan `ShortRead`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let len = mapped_len(file.metadata()?.len())?;

        if len < HEADER_SIZE {
            return Err(TensorError::ShortRead {
                expected: HEADER_SIZE,
                actual: len,
            });
        }

        // SAFETY: mapping read-only; file tidak boleh di-truncate selama mapping hidup
        let mmap = unsafe { MmapOptions::new().len(len).map(&file)? };

        log::trace!("mapped tensor file ({} bytes)", len);
        Ok(Self { mmap })
    }

    /// Parse header tanpa validasi
    pub fn header(&self) -> Result<TensorHeader> {
        let mut bytes: &[u8] = &self.mmap;
        TensorHeader::read(&mut bytes)
    }

    /// Payload bytes sesuai `dataLength` header (zero-copy).
    pub fn payload(&self, header: &TensorHeader) -> Result<&[u8]> {
        let end = header.total_size();
        if self.mmap.len() < end {
            return Err(TensorError::ShortRead {
                expected: header.data_length as usize,
                actual: self.mmap.len() - HEADER_SIZE,
            });
        }
        Ok(&self.mmap[HEADER_SIZE..end])
    }

    /// Bytes setelah payload
    pub fn trailing_len(&self, header: &TensorHeader) -> usize {
        self.mmap.len().saturating_sub(header.total_size())
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }
}
