//! nnef-tensor - NNEF Tensor Binary Codec
//!
//! Arsitektur:
//! - Fixed Header: 128 bytes, bit-exact little-endian layout
//! - Explicit Validation: magic, version, rank, data length, bit width
//! - Typed Payloads: float, integer (signed/unsigned), bool (bit-packed)
//! - Zero-Copy Load: file tensor dibaca via read-only mmap
//!
//! ```no_run
//! use nnef_tensor::{Tensor, TensorData, TensorIoConfig};
//!
//! let tensor = Tensor::new(vec![2, 3], TensorData::Float(vec![0.0; 6]))?;
//! tensor.save("weights.dat", &TensorIoConfig::default())?;
//! let loaded = Tensor::load("weights.dat", &TensorIoConfig::default())?;
//! assert_eq!(loaded, tensor);
//! # Ok::<(), nnef_tensor::TensorError>(())
//! ```

pub mod core;
pub mod error;
pub mod protocol;
pub mod tensor;

pub use error::{Result, TensorError};
pub use protocol::{ItemType, TensorHeader, HEADER_SIZE, MAX_RANK};
pub use tensor::{Tensor, TensorData, TensorIoConfig};
