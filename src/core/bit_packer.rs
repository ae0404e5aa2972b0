//! Bit-packing untuk boolean payload
//!
//! Bit `i` ditulis ke bit `(7 - i % 8)` dari byte `i / 8` (MSB-first).
//! Bit sisa di byte terakhir selalu nol.

/// Jumlah byte untuk `count` boolean yang di-pack.
#[inline(always)]
pub const fn packed_len(count: usize) -> usize {
    count / 8 + (count % 8 != 0) as usize
}

/// Pack boolean ke byte buffer baru
pub fn pack(values: &[bool]) -> Vec<u8> {
    let mut bytes = vec![0u8; packed_len(values.len())];
    pack_into(values, &mut bytes);
    bytes
}

/// Pack ke buffer milik caller. `bytes` harus minimal `packed_len(values.len())`
/// dan sudah nol.
#[inline]
pub fn pack_into(values: &[bool], bytes: &mut [u8]) {
    for (i, &v) in values.iter().enumerate() {
        bytes[i / 8] |= (v as u8) << (7 - (i % 8));
    }
}

/// Unpack `count` boolean dari `bytes`.
///
/// # Panics
/// Jika `bytes` lebih pendek dari `packed_len(count)`.
pub fn unpack(bytes: &[u8], count: usize) -> Vec<bool> {
    (0..count)
        .map(|i| (bytes[i / 8] >> (7 - (i % 8))) & 0x01 != 0)
        .collect()
}
