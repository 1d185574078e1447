//! Portable binary layout for `Parameters`.
//!
//! ```text
//! bytes  0-3:   b"SNCK"            magic
//! bytes  4-7:   version            u32 little-endian (currently 1)
//! bytes  8-39:  4 × (rows, cols)   u32 little-endian, order W1, b1, W2, b2
//! bytes 40..:   payloads           f64 little-endian, row-major, same order
//! ```
//!
//! The file must end exactly after the last payload.

use crate::error::{Error, Result};
use crate::math::matrix::Matrix;
use crate::network::params::Parameters;

pub const MAGIC: &[u8; 4] = b"SNCK";
pub const VERSION: u32 = 1;

const HEADER_LEN: usize = 4 + 4 + 4 * 8;

pub fn encode(params: &Parameters) -> Vec<u8> {
    let tensors = params.named();
    let payload_len: usize = tensors.iter().map(|(_, m)| m.rows * m.cols * 8).sum();

    let mut out = Vec::with_capacity(HEADER_LEN + payload_len);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&VERSION.to_le_bytes());
    for (_, m) in &tensors {
        out.extend_from_slice(&(m.rows as u32).to_le_bytes());
        out.extend_from_slice(&(m.cols as u32).to_le_bytes());
    }
    for (_, m) in &tensors {
        for v in m.iter() {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }
    out
}

pub fn decode(bytes: &[u8]) -> Result<Parameters> {
    let mut reader = Reader { bytes, pos: 0 };

    if reader.take(4)? != MAGIC {
        return Err(Error::Format("checkpoint magic bytes do not match".into()));
    }
    let version = reader.u32()?;
    if version != VERSION {
        return Err(Error::Format(format!(
            "unsupported checkpoint version {} (expected {})",
            version, VERSION
        )));
    }

    let mut shapes = [(0usize, 0usize); 4];
    for shape in shapes.iter_mut() {
        *shape = (reader.u32()? as usize, reader.u32()? as usize);
    }

    // Declared sizes must match the bytes actually present before anything
    // is allocated.
    let payload_len = shapes
        .iter()
        .try_fold(0usize, |acc, &(rows, cols)| {
            rows.checked_mul(cols)?.checked_mul(8)?.checked_add(acc)
        })
        .ok_or_else(|| Error::Format("checkpoint header declares an impossible payload size".into()))?;
    let available = bytes.len() - reader.pos;
    if payload_len != available {
        return Err(Error::Format(format!(
            "checkpoint header declares {} payload bytes, file has {}",
            payload_len, available
        )));
    }

    let mut tensors = Vec::with_capacity(4);
    for &(rows, cols) in &shapes {
        let mut m = Matrix::zeros(rows, cols);
        for row in m.data.iter_mut() {
            for v in row.iter_mut() {
                *v = reader.f64()?;
            }
        }
        tensors.push(m);
    }

    if reader.pos != bytes.len() {
        return Err(Error::Format(format!(
            "{} trailing bytes after checkpoint payload",
            bytes.len() - reader.pos
        )));
    }

    let mut tensors = tensors.into_iter();
    let (w1, b1, w2, b2) = match (tensors.next(), tensors.next(), tensors.next(), tensors.next()) {
        (Some(w1), Some(b1), Some(w2), Some(b2)) => (w1, b1, w2, b2),
        _ => return Err(Error::Format("checkpoint is missing a tensor".into())),
    };
    Parameters::new(w1, b1, w2, b2)
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).filter(|&end| end <= self.bytes.len()).ok_or_else(|| {
            Error::Format(format!(
                "checkpoint truncated: needed {} bytes at offset {}, file has {}",
                n,
                self.pos,
                self.bytes.len()
            ))
        })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn f64(&mut self) -> Result<f64> {
        let b = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(b);
        Ok(f64::from_le_bytes(buf))
    }
}
