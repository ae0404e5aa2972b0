//! Core module: stream helpers, bit-packing, mmap file access
//!
//! Prinsip desain:
//! - Stateless: semua fungsi bekerja di atas buffer/stream milik caller
//! - Short transfer selalu jadi error eksplisit, tidak pernah partial result

pub mod bit_packer;
mod mmap_storage;
pub mod stream_io;

pub use mmap_storage::MmapStorage;
