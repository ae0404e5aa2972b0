//! Blocking read/write helpers di atas byte stream
//!
//! Beda dengan `read_exact`/`write_all` bawaan std: transfer yang tidak
//! lengkap dilaporkan sebagai `ShortRead`/`ShortWrite` lengkap dengan jumlah
//! byte yang sempat dipindahkan.

use std::io::{self, Read, Write};

use crate::error::{Result, TensorError};

/// Mengisi seluruh `buf` dari stream.
///
/// EOF sebelum buffer penuh menghasilkan `ShortRead`.
pub fn read_bytes<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(TensorError::ShortRead {
                    expected: buf.len(),
                    actual: filled,
                })
            }
            Ok(n) => filled += n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(TensorError::Io(e)),
        }
    }
    Ok(())
}

/// Membaca tepat `len` bytes ke buffer baru.
pub fn read_vec<R: Read + ?Sized>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    read_bytes(reader, &mut buf)?;
    Ok(buf)
}

/// Menulis seluruh `buf` ke stream.
///
/// Writer yang berhenti menerima data (return 0) menghasilkan `ShortWrite`.
pub fn write_bytes<W: Write + ?Sized>(writer: &mut W, buf: &[u8]) -> Result<()> {
    let mut written = 0;
    while written < buf.len() {
        match writer.write(&buf[written..]) {
            Ok(0) => {
                return Err(TensorError::ShortWrite {
                    expected: buf.len(),
                    actual: written,
                })
            }
            Ok(n) => written += n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(TensorError::Io(e)),
        }
    }
    Ok(())
}
