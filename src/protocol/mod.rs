//! Protocol Layer: NNEF Tensor Binary Format
//!
//! Prinsip desain:
//! - Fixed-size header: 128 bytes, layout bit-exact little-endian
//! - Validasi eksplisit: `read()` hanya parse, `validate()` yang menolak
//! - Payload codec stateless, langsung ke/dari caller stream

mod header;
pub mod payload;

pub use header::{
    ItemType, TensorHeader, HEADER_SIZE, MAGIC, MAX_RANK, RESERVED_WORDS, VERSION,
};
pub use payload::{
    read_integer, read_logical, read_scalar, write_integer, write_logical, write_scalar,
};
