//! Payload Encoder/Decoder
//!
//! Tiga encoding independen, tidak ada state bersama:
//! - Scalar: float, baca 32/64-bit, tulis selalu 32-bit
//! - Integer: baca 8/16/32/64-bit signed/unsigned, tulis selalu 32-bit
//! - Logical: baca 1-bit (packed) atau 8-bit, tulis selalu 1-bit
//!
//! Asimetri read/write width adalah bagian dari format, bukan bug.

use std::io::{Read, Write};

use crate::core::bit_packer;
use crate::core::stream_io::{read_vec, write_bytes};
use crate::error::{Result, TensorError};

/// Panjang payload dalam bytes untuk `count` item, harus muat di field `dataLength` (u32)
fn payload_len(count: usize, bits: u32) -> Result<usize> {
    (count as u64)
        .checked_mul(bits as u64)
        .map(|total| total / 8 + u64::from(total % 8 != 0))
        .filter(|&len| len <= u32::MAX as u64)
        .and_then(|len| usize::try_from(len).ok())
        .ok_or(TensorError::LengthOverflow {
            items: count as u64,
            bits,
        })
}

/// Baca `count` elemen berukuran `bits` sekaligus
fn read_items<R: Read + ?Sized>(reader: &mut R, count: usize, bits: u32) -> Result<Vec<u8>> {
    let len = payload_len(count, bits)?;
    log::trace!("reading {} payload bytes ({} items)", len, count);
    read_vec(reader, len)
}

/// Decode little-endian chunk berukuran `N` bytes
#[inline(always)]
fn le_chunks<const N: usize>(bytes: &[u8]) -> impl Iterator<Item = [u8; N]> + '_ {
    bytes.chunks_exact(N).map(|c| {
        let mut word = [0u8; N];
        word.copy_from_slice(c);
        word
    })
}

/// Membaca float payload.
///
/// 64-bit dipersempit ke `f32` (IEEE-754 narrowing biasa).
pub fn read_scalar<R: Read + ?Sized>(
    reader: &mut R,
    bits_per_item: u32,
    count: usize,
) -> Result<Vec<f32>> {
    match bits_per_item {
        32 => {
            let bytes = read_items(reader, count, 32)?;
            Ok(le_chunks::<4>(&bytes).map(f32::from_le_bytes).collect())
        }
        64 => {
            let bytes = read_items(reader, count, 64)?;
            Ok(le_chunks::<8>(&bytes)
                .map(|w| f64::from_le_bytes(w) as f32)
                .collect())
        }
        bits => Err(TensorError::UnsupportedBitWidth {
            category: "float",
            bits,
        }),
    }
}

/// Menulis float payload, selalu 32-bit little-endian.
pub fn write_scalar<W: Write + ?Sized>(writer: &mut W, values: &[f32]) -> Result<()> {
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    write_bytes(writer, &bytes)
}

/// Membaca integer payload ke `i64`.
///
/// 8-bit signed memakai koreksi two's-complement manual (`v >= 128` jadi `v - 256`).
/// Unsigned 64-bit di atas `i64::MAX` di-wrap ke negatif.
pub fn read_integer<R: Read + ?Sized>(
    reader: &mut R,
    bits_per_item: u32,
    count: usize,
    is_signed: bool,
) -> Result<Vec<i64>> {
    let values = match (bits_per_item, is_signed) {
        (8, signed) => {
            let bytes = read_items(reader, count, 8)?;
            bytes
                .into_iter()
                .map(|b| {
                    let v = b as i64;
                    if signed && v >= 128 {
                        v - 256
                    } else {
                        v
                    }
                })
                .collect()
        }
        (16, true) => {
            let bytes = read_items(reader, count, 16)?;
            le_chunks::<2>(&bytes)
                .map(|w| i16::from_le_bytes(w) as i64)
                .collect()
        }
        (16, false) => {
            let bytes = read_items(reader, count, 16)?;
            le_chunks::<2>(&bytes)
                .map(|w| u16::from_le_bytes(w) as i64)
                .collect()
        }
        (32, true) => {
            let bytes = read_items(reader, count, 32)?;
            le_chunks::<4>(&bytes)
                .map(|w| i32::from_le_bytes(w) as i64)
                .collect()
        }
        (32, false) => {
            let bytes = read_items(reader, count, 32)?;
            le_chunks::<4>(&bytes)
                .map(|w| u32::from_le_bytes(w) as i64)
                .collect()
        }
        (64, true) => {
            let bytes = read_items(reader, count, 64)?;
            le_chunks::<8>(&bytes).map(i64::from_le_bytes).collect()
        }
        (64, false) => {
            let bytes = read_items(reader, count, 64)?;
            le_chunks::<8>(&bytes)
                .map(|w| u64::from_le_bytes(w) as i64)
                .collect()
        }
        (bits, _) => {
            return Err(TensorError::UnsupportedBitWidth {
                category: "integer",
                bits,
            })
        }
    };
    Ok(values)
}

/// Menulis integer payload, selalu 32-bit (`i32` atau `u32` sesuai `as_signed`).
///
/// Nilai di luar range 32-bit dipotong (truncate), sama seperti `as` cast.
pub fn write_integer<W: Write + ?Sized>(
    writer: &mut W,
    values: &[i64],
    as_signed: bool,
) -> Result<()> {
    let bytes: Vec<u8> = if as_signed {
        values
            .iter()
            .flat_map(|&v| (v as i32).to_le_bytes())
            .collect()
    } else {
        values
            .iter()
            .flat_map(|&v| (v as u32).to_le_bytes())
            .collect()
    };
    write_bytes(writer, &bytes)
}

/// Membaca boolean payload: 1-bit packed (MSB-first) atau 8-bit per nilai.
pub fn read_logical<R: Read + ?Sized>(
    reader: &mut R,
    bits_per_item: u32,
    count: usize,
) -> Result<Vec<bool>> {
    match bits_per_item {
        1 => {
            let bytes = read_items(reader, count, 1)?;
            Ok(bit_packer::unpack(&bytes, count))
        }
        8 => {
            let bytes = read_items(reader, count, 8)?;
            Ok(bytes.into_iter().map(|b| b != 0).collect())
        }
        bits => Err(TensorError::UnsupportedBitWidth {
            category: "bool",
            bits,
        }),
    }
}

/// Menulis boolean payload, selalu 1-bit packed.
pub fn write_logical<W: Write + ?Sized>(writer: &mut W, values: &[bool]) -> Result<()> {
    write_bytes(writer, &bit_packer::pack(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_scalar_32_roundtrip() {
        let values = [0.0f32, -1.5, 3.25, f32::MAX, f32::MIN_POSITIVE];
        let mut buf = Vec::new();
        write_scalar(&mut buf, &values).unwrap();
        assert_eq!(buf.len(), 20);
        assert_eq!(&buf[4..8], &(-1.5f32).to_le_bytes());

        let decoded = read_scalar(&mut Cursor::new(buf), 32, values.len()).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_scalar_64_narrowing() {
        let wide = [1.0f64 / 3.0, -2.5, 1e300];
        let buf: Vec<u8> = wide.iter().flat_map(|v| v.to_le_bytes()).collect();

        let decoded = read_scalar(&mut Cursor::new(buf), 64, 3).unwrap();
        assert_eq!(decoded[0], (1.0f64 / 3.0) as f32);
        assert_eq!(decoded[1], -2.5);
        assert!(decoded[2].is_infinite());
    }

    #[test]
    fn test_scalar_unsupported_width() {
        for bits in [16, 24, 8] {
            let err = read_scalar(&mut Cursor::new(vec![0u8; 64]), bits, 4).unwrap_err();
            assert!(matches!(err, TensorError::UnsupportedBitWidth { bits: b, .. } if b == bits));
        }
    }

    #[test]
    fn test_scalar_short_payload() {
        let err = read_scalar(&mut Cursor::new(vec![0u8; 7]), 32, 2).unwrap_err();
        assert!(matches!(
            err,
            TensorError::ShortRead {
                expected: 8,
                actual: 7
            }
        ));
    }

    #[test]
    fn test_int8_signed_correction() {
        assert_eq!(-5i64 as u8, 251);

        let bytes = vec![251u8, 127, 128, 0];
        let signed = read_integer(&mut Cursor::new(bytes), 8, 4, true).unwrap();
        assert_eq!(signed, vec![-5, 127, -128, 0]);

        let unsigned = read_integer(&mut Cursor::new(vec![251u8]), 8, 1, false).unwrap();
        assert_eq!(unsigned, vec![251]);
    }

    #[test]
    fn test_integer_widths() {
        let buf: Vec<u8> = [-2i16, 300].iter().flat_map(|v| v.to_le_bytes()).collect();
        assert_eq!(
            read_integer(&mut Cursor::new(buf.clone()), 16, 2, true).unwrap(),
            vec![-2, 300]
        );
        assert_eq!(
            read_integer(&mut Cursor::new(buf), 16, 2, false).unwrap(),
            vec![65534, 300]
        );

        let buf = (-7i32).to_le_bytes().to_vec();
        assert_eq!(
            read_integer(&mut Cursor::new(buf.clone()), 32, 1, true).unwrap(),
            vec![-7]
        );
        assert_eq!(
            read_integer(&mut Cursor::new(buf), 32, 1, false).unwrap(),
            vec![u32::MAX as i64 - 6]
        );

        let buf = (i64::MIN + 1).to_le_bytes().to_vec();
        assert_eq!(
            read_integer(&mut Cursor::new(buf), 64, 1, true).unwrap(),
            vec![i64::MIN + 1]
        );
        let buf = 1u64.to_le_bytes().to_vec();
        assert_eq!(
            read_integer(&mut Cursor::new(buf), 64, 1, false).unwrap(),
            vec![1]
        );
    }

    #[test]
    fn test_integer_unsupported_width() {
        for bits in [0, 1, 4, 12, 24, 48, 65] {
            let err = read_integer(&mut Cursor::new(vec![0u8; 64]), bits, 1, true).unwrap_err();
            assert!(matches!(
                err,
                TensorError::UnsupportedBitWidth {
                    category: "integer",
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_write_integer_fixed_32_bit() {
        let mut buf = Vec::new();
        write_integer(&mut buf, &[-5, 1 << 40, 7], true).unwrap();
        assert_eq!(buf.len(), 12);
        assert_eq!(&buf[0..4], &(-5i32).to_le_bytes());
        assert_eq!(&buf[4..8], &0i32.to_le_bytes());

        let decoded = read_integer(&mut Cursor::new(buf), 32, 3, true).unwrap();
        assert_eq!(decoded, vec![-5, 0, 7]);

        let mut buf = Vec::new();
        write_integer(&mut buf, &[-1, 42], false).unwrap();
        assert_eq!(&buf[0..4], &u32::MAX.to_le_bytes());
        assert_eq!(
            read_integer(&mut Cursor::new(buf), 32, 2, false).unwrap(),
            vec![u32::MAX as i64, 42]
        );
    }

    #[test]
    fn test_logical_packed_roundtrip() {
        let values = [true, false, true, true, false, false, false, true, true, false];
        let mut buf = Vec::new();
        write_logical(&mut buf, &values).unwrap();
        assert_eq!(buf, vec![0b1011_0001, 0b1000_0000]);

        let decoded = read_logical(&mut Cursor::new(buf), 1, values.len()).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_logical_byte_per_value() {
        let decoded = read_logical(&mut Cursor::new(vec![0u8, 1, 255, 0, 2]), 8, 5).unwrap();
        assert_eq!(decoded, vec![false, true, true, false, true]);
    }

    #[test]
    fn test_logical_unsupported_width() {
        let err = read_logical(&mut Cursor::new(vec![0u8; 8]), 2, 4).unwrap_err();
        assert!(matches!(
            err,
            TensorError::UnsupportedBitWidth {
                category: "bool",
                bits: 2
            }
        ));
    }

    #[test]
    fn test_oversized_count_is_length_overflow() {
        for bits in [1, 8] {
            let err =
                read_logical(&mut Cursor::new(vec![0u8; 4]), bits, usize::MAX).unwrap_err();
            assert!(matches!(
                err,
                TensorError::LengthOverflow { bits: b, .. } if b == bits
            ));
        }

        let err =
            read_integer(&mut Cursor::new(vec![0u8; 4]), 8, usize::MAX, true).unwrap_err();
        assert!(matches!(err, TensorError::LengthOverflow { bits: 8, .. }));

        let err =
            read_integer(&mut Cursor::new(vec![0u8; 4]), 16, usize::MAX, true).unwrap_err();
        assert!(matches!(err, TensorError::LengthOverflow { bits: 16, .. }));

        let err = read_scalar(&mut Cursor::new(vec![0u8; 4]), 64, usize::MAX).unwrap_err();
        assert!(matches!(err, TensorError::LengthOverflow { bits: 64, .. }));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_packed_length_limit() {
        // 8 * u32::MAX bit masih muat, satu bit lagi tidak
        let count = u32::MAX as usize * 8 + 1;
        let err = read_logical(&mut Cursor::new(vec![0u8; 4]), 1, count).unwrap_err();
        assert!(matches!(err, TensorError::LengthOverflow { bits: 1, .. }));

        let err = read_logical(&mut Cursor::new(vec![0u8; 4]), 1, 40).unwrap_err();
        assert!(matches!(
            err,
            TensorError::ShortRead {
                expected: 5,
                actual: 4
            }
        ));
    }

    #[test]
    fn test_empty_payloads() {
        let mut buf = Vec::new();
        write_scalar(&mut buf, &[]).unwrap();
        write_integer(&mut buf, &[], true).unwrap();
        write_logical(&mut buf, &[]).unwrap();
        assert!(buf.is_empty());

        let mut empty = Cursor::new(Vec::<u8>::new());
        assert!(read_scalar(&mut empty, 64, 0).unwrap().is_empty());
        assert!(read_integer(&mut empty, 8, 0, true).unwrap().is_empty());
        assert!(read_logical(&mut empty, 1, 0).unwrap().is_empty());
    }
}
