//! Whole-tensor read/write
//!
//! Menggabungkan header codec dan payload codec:
//! Read → Validate → decode payload sesuai item type, dan sebaliknya untuk write.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::core::MmapStorage;
use crate::error::{Result, TensorError};
use crate::protocol::{self, ItemType, TensorHeader, MAX_RANK, VERSION};

/// Konfigurasi load/save file tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TensorIoConfig {
    /// Load via read-only mmap, bukan buffered reader
    pub use_mmap: bool,
    /// Tolak file yang punya bytes setelah payload
    pub strict_length: bool,
    /// Izinkan `save` menimpa file yang sudah ada
    pub overwrite: bool,
}

impl Default for TensorIoConfig {
    fn default() -> Self {
        Self {
            use_mmap: true,
            strict_length: false,
            overwrite: true,
        }
    }
}

impl TensorIoConfig {
    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    pub fn with_strict_length(mut self, strict_length: bool) -> Self {
        self.strict_length = strict_length;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// Data tensor yang sudah di-decode
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
    Float(Vec<f32>),
    /// Int dan Qint
    Int(Vec<i64>),
    /// Uint dan Quint
    Uint(Vec<i64>),
    Bool(Vec<bool>),
}

impl TensorData {
    pub fn len(&self) -> usize {
        match self {
            Self::Float(v) => v.len(),
            Self::Int(v) | Self::Uint(v) => v.len(),
            Self::Bool(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Item type dan bits per item yang dipakai saat write
    fn wire_format(&self) -> (ItemType, u32) {
        match self {
            Self::Float(_) => (ItemType::Float, 32),
            Self::Int(_) => (ItemType::Int, 32),
            Self::Uint(_) => (ItemType::Uint, 32),
            Self::Bool(_) => (ItemType::Bool, 1),
        }
    }
}

/// Tensor lengkap: shape + data
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    extents: Vec<u32>,
    data: TensorData,
}

impl Tensor {
    /// Membuat tensor; jumlah nilai harus sama dengan produk extents.
    pub fn new(extents: Vec<u32>, data: TensorData) -> Result<Self> {
        if extents.len() > MAX_RANK {
            return Err(TensorError::RankOverflow {
                rank: extents.len(),
                max: MAX_RANK,
            });
        }
        let expected = extents
            .iter()
            .try_fold(1u64, |acc, &e| acc.checked_mul(e as u64));
        if expected != Some(data.len() as u64) {
            return Err(TensorError::LengthMismatch {
                declared: data.len() as u64,
                expected,
            });
        }
        Ok(Self { extents, data })
    }

    #[inline(always)]
    pub fn extents(&self) -> &[u32] {
        &self.extents
    }

    #[inline(always)]
    pub fn rank(&self) -> usize {
        self.extents.len()
    }

    #[inline(always)]
    pub fn data(&self) -> &TensorData {
        &self.data
    }

    pub fn into_data(self) -> TensorData {
        self.data
    }

    /// Header yang akan ditulis untuk tensor ini (sudah divalidasi)
    pub fn header(&self) -> Result<TensorHeader> {
        let (item_type, bits) = self.data.wire_format();
        let header = TensorHeader::fill(VERSION, &self.extents, bits, item_type)?;
        header.validate()?;
        Ok(header)
    }

    /// Membaca satu tensor (header + payload) dari stream.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let header = TensorHeader::read(reader)?;
        header.validate()?;
        Self::decode_payload(&header, reader)
    }

    fn decode_payload<R: Read + ?Sized>(header: &TensorHeader, reader: &mut R) -> Result<Self> {
        // Header sudah valid, item_count pasti ada
        let count = header
            .item_count()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or(TensorError::LengthMismatch {
                declared: header.data_length as u64,
                expected: None,
            })?;
        let bits = header.bits_per_item;

        let item_type = header
            .item_type()
            .ok_or(TensorError::UnknownItemType(header.item_type))?;
        let data = match item_type {
            ItemType::Float => TensorData::Float(protocol::read_scalar(reader, bits, count)?),
            integer @ (ItemType::Int | ItemType::Qint | ItemType::Uint | ItemType::Quint) => {
                let values = protocol::read_integer(reader, bits, count, integer.is_signed())?;
                if integer.is_signed() {
                    TensorData::Int(values)
                } else {
                    TensorData::Uint(values)
                }
            }
            ItemType::Bool => TensorData::Bool(protocol::read_logical(reader, bits, count)?),
        };

        Ok(Self {
            extents: header.extents().to_vec(),
            data,
        })
    }

    /// Menulis tensor (header + payload) ke stream.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        let header = self.header()?;
        self.write_with_header(&header, writer)
    }

    fn write_with_header<W: Write + ?Sized>(
        &self,
        header: &TensorHeader,
        writer: &mut W,
    ) -> Result<()> {
        header.write(writer)?;
        match &self.data {
            TensorData::Float(v) => protocol::write_scalar(writer, v),
            TensorData::Int(v) => protocol::write_integer(writer, v, true),
            TensorData::Uint(v) => protocol::write_integer(writer, v, false),
            TensorData::Bool(v) => protocol::write_logical(writer, v),
        }
    }

    /// Load tensor dari file
    pub fn load<P: AsRef<Path>>(path: P, config: &TensorIoConfig) -> Result<Self> {
        if config.use_mmap {
            return Self::load_mapped(path.as_ref(), config);
        }

        let mut reader = BufReader::new(File::open(path)?);
        let tensor = Self::read_from(&mut reader)?;

        if config.strict_length {
            let mut rest = Vec::new();
            reader.read_to_end(&mut rest)?;
            if !rest.is_empty() {
                return Err(TensorError::TrailingData { extra: rest.len() });
            }
        }
        Ok(tensor)
    }

    fn load_mapped(path: &Path, config: &TensorIoConfig) -> Result<Self> {
        let storage = MmapStorage::open(path)?;
        let header = storage.header()?;
        header.validate()?;

        let mut payload = storage.payload(&header)?;
        let tensor = Self::decode_payload(&header, &mut payload)?;

        let extra = storage.trailing_len(&header);
        if config.strict_length && extra > 0 {
            return Err(TensorError::TrailingData { extra });
        }
        Ok(tensor)
    }

    /// Simpan tensor ke file.
    ///
    /// Header dibangun dan divalidasi sebelum file dibuka, jadi file lama
    /// tidak tersentuh kalau tensor tidak bisa di-encode.
    pub fn save<P: AsRef<Path>>(&self, path: P, config: &TensorIoConfig) -> Result<()> {
        let path = path.as_ref();
        let header = self.header()?;

        let mut options = OpenOptions::new();
        options.write(true);
        if config.overwrite {
            if path.exists() {
                log::info!("File exists, replacing {}", path.display());
            }
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }

        let mut writer = BufWriter::new(options.open(path)?);
        self.write_with_header(&header, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
