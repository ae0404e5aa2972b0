//! Tensor Header (NNEF binary format)
//!
//! Layout (128 bytes, little-endian):
//! ┌──────────────────────────────────────────────────────┐
//! │ magic 'N' 0xEF (2) │ version major.minor (2)         │
//! ├──────────────────────────────────────────────────────┤
//! │ dataLength u32 │ rank u32 │ extents[8] u32           │
//! ├──────────────────────────────────────────────────────┤
//! │ bitsPerItem u32 │ itemType u32 │ reserved[19] u32    │
//! └──────────────────────────────────────────────────────┘
//! Payload (`dataLength` bytes) langsung setelah header.

use std::io::{Read, Write};

use crate::core::stream_io::{read_bytes, write_bytes};
use crate::error::{Result, TensorError};

pub const HEADER_SIZE: usize = 128;
pub const MAGIC: [u8; 2] = [b'N', 0xEF];
pub const VERSION: [u8; 2] = [1, 0];
pub const MAX_RANK: usize = 8;
pub const RESERVED_WORDS: usize = 19;

/// Item type code dengan salah satu bit atas ini = vendor-defined
const VENDOR_MASK: u32 = 0xffff_0000;

/// Kategori elemen tensor
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemType {
    Float = 0,
    Uint = 1,
    Quint = 2,
    Qint = 3,
    Int = 4,
    Bool = 5,
}

impl ItemType {
    #[inline(always)]
    pub fn from_u32(v: u32) -> Option<Self> {
        match v {
            0 => Some(Self::Float),
            1 => Some(Self::Uint),
            2 => Some(Self::Quint),
            3 => Some(Self::Qint),
            4 => Some(Self::Int),
            5 => Some(Self::Bool),
            _ => None,
        }
    }

    /// Nama kategori untuk pesan error
    pub fn category(self) -> &'static str {
        BIT_WIDTH_RULES[self as usize].0
    }

    /// Apakah `bits` legal untuk kategori ini
    #[inline]
    pub fn accepts_bits(self, bits: u32) -> bool {
        (BIT_WIDTH_RULES[self as usize].1)(bits)
    }

    /// Integer kategori yang dibaca sebagai signed
    pub fn is_signed(self) -> bool {
        matches!(self, Self::Int | Self::Qint)
    }
}

/// Tabel legalitas bit width, di-index dengan ordinal `ItemType`
static BIT_WIDTH_RULES: [(&str, fn(u32) -> bool); 6] = [
    ("float", |bits| matches!(bits, 16 | 32 | 64)),
    ("integer", |bits| bits <= 64),
    ("integer", |bits| bits <= 64),
    ("integer", |bits| bits <= 64),
    ("integer", |bits| bits <= 64),
    ("bool", |bits| matches!(bits, 1 | 8)),
];

/// Header tensor, 128 bytes fixed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TensorHeader {
    pub magic: [u8; 2],
    pub version: [u8; 2],
    /// Panjang payload dalam bytes
    pub data_length: u32,
    pub rank: u32,
    /// Hanya `rank` entry pertama yang bermakna
    pub extents: [u32; MAX_RANK],
    pub bits_per_item: u32,
    /// Raw item type code, lihat `item_type()`
    pub item_type: u32,
    /// Padding untuk ekstensi format di masa depan
    pub reserved: [u32; RESERVED_WORDS],
}

/// `ceil(items * bits / 8)`, `None` jika overflow
#[inline]
fn data_length_for(items: u64, bits: u32) -> Option<u64> {
    items
        .checked_mul(bits as u64)
        .and_then(|total| total.checked_add(7))
        .map(|total| total / 8)
}

impl TensorHeader {
    /// Membuat header baru dari shape dan tipe elemen.
    ///
    /// Tidak mengecek legalitas bit width; panggil `validate()` setelahnya.
    pub fn fill(
        version: [u8; 2],
        extents: &[u32],
        bits_per_item: u32,
        item_type: ItemType,
    ) -> Result<Self> {
        let rank = extents.len();
        if rank > MAX_RANK {
            return Err(TensorError::RankOverflow {
                rank,
                max: MAX_RANK,
            });
        }

        let items = extents
            .iter()
            .try_fold(1u64, |acc, &e| acc.checked_mul(e as u64));
        let data_length = items
            .and_then(|n| data_length_for(n, bits_per_item))
            .and_then(|len| u32::try_from(len).ok())
            .ok_or(TensorError::LengthOverflow {
                items: items.unwrap_or(u64::MAX),
                bits: bits_per_item,
            })?;

        let mut padded = [0u32; MAX_RANK];
        padded[..rank].copy_from_slice(extents);

        Ok(Self {
            magic: MAGIC,
            version,
            data_length,
            rank: rank as u32,
            extents: padded,
            bits_per_item,
            item_type: item_type as u32,
            reserved: [0; RESERVED_WORDS],
        })
    }

    /// Validasi header, error pertama yang ditemukan dikembalikan.
    ///
    /// Urutan cek: magic, version, rank, data length, bit width.
    pub fn validate(&self) -> Result<()> {
        if self.magic != MAGIC {
            log::debug!("rejecting tensor header: magic {:02x?}", self.magic);
            return Err(TensorError::BadMagic(self.magic));
        }
        if self.version != VERSION {
            log::debug!("rejecting tensor header: version {:?}", self.version);
            return Err(TensorError::UnsupportedVersion {
                major: self.version[0],
                minor: self.version[1],
            });
        }
        if self.rank as usize > MAX_RANK {
            log::debug!("rejecting tensor header: rank {}", self.rank);
            return Err(TensorError::RankOverflow {
                rank: self.rank as usize,
                max: MAX_RANK,
            });
        }

        let expected = self
            .item_count()
            .and_then(|n| data_length_for(n, self.bits_per_item));
        if expected != Some(self.data_length as u64) {
            log::debug!(
                "rejecting tensor header: data length {} for extents {:?} at {} bits",
                self.data_length,
                self.extents(),
                self.bits_per_item
            );
            return Err(TensorError::LengthMismatch {
                declared: self.data_length as u64,
                expected,
            });
        }

        if self.item_type & VENDOR_MASK != 0 {
            return Ok(());
        }
        let item_type = ItemType::from_u32(self.item_type)
            .ok_or(TensorError::UnknownItemType(self.item_type))?;
        if !item_type.accepts_bits(self.bits_per_item) {
            log::debug!(
                "rejecting tensor header: {} bits for {:?}",
                self.bits_per_item,
                item_type
            );
            return Err(TensorError::UnsupportedBitWidth {
                category: item_type.category(),
                bits: self.bits_per_item,
            });
        }
        Ok(())
    }

    /// Membaca 128 bytes header dari stream. Tidak melakukan validasi.
    pub fn read<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let mut buf = [0u8; HEADER_SIZE];
        read_bytes(reader, &mut buf)?;
        Ok(Self::from_bytes(&buf))
    }

    /// Menulis header ke stream. Reserved words selalu ditulis nol.
    ///
    /// Header tidak divalidasi di sini.
    pub fn write<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        write_bytes(writer, &self.to_bytes())?;
        log::trace!("wrote tensor header ({} byte payload follows)", self.data_length);
        Ok(())
    }

    /// Parse dari raw bytes
    pub fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Self {
        let mut words = buf[4..]
            .chunks_exact(4)
            .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]));
        let mut next = || words.next().unwrap_or(0);

        let data_length = next();
        let rank = next();
        let extents: [u32; MAX_RANK] = std::array::from_fn(|_| next());
        let bits_per_item = next();
        let item_type = next();
        let reserved: [u32; RESERVED_WORDS] = std::array::from_fn(|_| next());

        Self {
            magic: [buf[0], buf[1]],
            version: [buf[2], buf[3]],
            data_length,
            rank,
            extents,
            bits_per_item,
            item_type,
            reserved,
        }
    }

    /// Serialize ke raw bytes (wire layout)
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..2].copy_from_slice(&self.magic);
        buf[2..4].copy_from_slice(&self.version);

        let words = [self.data_length, self.rank]
            .into_iter()
            .chain(self.extents)
            .chain([self.bits_per_item, self.item_type]);
        for (slot, word) in buf[4..].chunks_exact_mut(4).zip(words) {
            slot.copy_from_slice(&word.to_le_bytes());
        }
        buf
    }

    /// Produk extents; `None` jika overflow atau rank > MAX_RANK
    pub fn item_count(&self) -> Option<u64> {
        let rank = self.rank as usize;
        if rank > MAX_RANK {
            return None;
        }
        self.extents[..rank]
            .iter()
            .try_fold(1u64, |acc, &e| acc.checked_mul(e as u64))
    }

    /// Extents yang bermakna (`rank` entry pertama)
    pub fn extents(&self) -> &[u32] {
        &self.extents[..(self.rank as usize).min(MAX_RANK)]
    }

    /// Kategori elemen, `None` untuk code vendor/tidak dikenal
    pub fn item_type(&self) -> Option<ItemType> {
        ItemType::from_u32(self.item_type)
    }

    /// Total size (header + payload)
    #[inline(always)]
    pub fn total_size(&self) -> usize {
        HEADER_SIZE + self.data_length as usize
    }
}
