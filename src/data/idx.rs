//! Parsing of IDX binary files as used by MNIST and its derivatives.
//!
//! # IDX3 image file layout
//! ```text
//! bytes  0-1:   0x00 0x00   (reserved, must be zero)
//! byte   2:     0x08        (dtype = uint8)
//! byte   3:     0x03        (number of dimensions = 3)
//! bytes  4-7:   N           (number of images, big-endian u32)
//! bytes  8-11:  rows        (image height in pixels, big-endian u32)
//! bytes 12-15:  cols        (image width in pixels, big-endian u32)
//! bytes 16..:   N * rows * cols bytes, row-major, uint8
//! ```
//!
//! # IDX1 label file layout
//! ```text
//! bytes  0-1:   0x00 0x00   (reserved, must be zero)
//! byte   2:     0x08        (dtype = uint8)
//! byte   3:     0x01        (number of dimensions = 1)
//! bytes  4-7:   N           (number of labels, big-endian u32)
//! bytes  8..:   N bytes, each a class index
//! ```

use crate::error::{Error, Result};

fn check_header(bytes: &[u8], dims: u8, what: &str) -> Result<()> {
    let header_len = 4 + 4 * dims as usize;
    if bytes.len() < header_len {
        return Err(Error::Format(format!(
            "IDX {} file too short: expected at least {} header bytes, got {}.",
            what,
            header_len,
            bytes.len()
        )));
    }
    if bytes[0] != 0x00 || bytes[1] != 0x00 {
        return Err(Error::Format(format!(
            "IDX {} file: bytes 0-1 must be 0x00 0x00 (reserved), got 0x{:02X} 0x{:02X}.",
            what, bytes[0], bytes[1]
        )));
    }
    if bytes[2] != 0x08 {
        return Err(Error::Format(format!(
            "IDX {} file: byte 2 (dtype) must be 0x08 (uint8), got 0x{:02X}.",
            what, bytes[2]
        )));
    }
    if bytes[3] != dims {
        return Err(Error::Format(format!(
            "IDX {} file: byte 3 (dimensions) must be {}, got {}.",
            what, dims, bytes[3]
        )));
    }
    Ok(())
}

fn be_u32(bytes: &[u8], at: usize) -> usize {
    u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]) as usize
}

/// Parses an IDX3 image file into flattened feature vectors with every pixel
/// divided by 255.0, so values lie in `[0.0, 1.0]`.
///
/// Returns `(images, rows * cols)`.
pub fn parse_images(bytes: &[u8]) -> Result<(Vec<Vec<f64>>, usize)> {
    check_header(bytes, 3, "image")?;

    let n_items = be_u32(bytes, 4);
    let rows = be_u32(bytes, 8);
    let cols = be_u32(bytes, 12);

    let n_pixels = rows.checked_mul(cols).ok_or_else(|| {
        Error::Format(format!("IDX image file: rows * cols overflows (rows={}, cols={}).", rows, cols))
    })?;
    let data_len = n_items
        .checked_mul(n_pixels)
        .ok_or_else(|| Error::Format("IDX image file: data length overflows.".into()))?;

    let end = 16usize
        .checked_add(data_len)
        .ok_or_else(|| Error::Format("IDX image file: data length overflows.".into()))?;
    if n_pixels == 0 && n_items > 0 {
        return Err(Error::Format(format!(
            "IDX image file: {} items declared with zero pixels each ({}×{}).",
            n_items, rows, cols
        )));
    }
    if bytes.len() < end {
        return Err(Error::Format(format!(
            "IDX image file too short: header declares {} items of {}×{} pixels, \
             but file is only {} bytes total.",
            n_items,
            rows,
            cols,
            bytes.len()
        )));
    }
    if n_pixels == 0 {
        return Ok((Vec::new(), 0));
    }

    let images = bytes[16..end]
        .chunks_exact(n_pixels)
        .map(|chunk| chunk.iter().map(|&px| px as f64 / 255.0).collect())
        .collect();

    Ok((images, n_pixels))
}

/// Parses an IDX1 label file into class indices.
pub fn parse_labels(bytes: &[u8]) -> Result<Vec<usize>> {
    check_header(bytes, 1, "label")?;

    let n_items = be_u32(bytes, 4);
    if bytes.len() - 8 < n_items {
        return Err(Error::Format(format!(
            "IDX label file too short: header declares {} labels but file is only {} bytes.",
            n_items,
            bytes.len()
        )));
    }

    Ok(bytes[8..8 + n_items].iter().map(|&l| l as usize).collect())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn idx3(images: &[Vec<u8>], rows: u32, cols: u32) -> Vec<u8> {
        let mut out = vec![0, 0, 8, 3];
        out.extend_from_slice(&(images.len() as u32).to_be_bytes());
        out.extend_from_slice(&rows.to_be_bytes());
        out.extend_from_slice(&cols.to_be_bytes());
        for image in images {
            out.extend_from_slice(image);
        }
        out
    }

    pub(crate) fn idx1(labels: &[u8]) -> Vec<u8> {
        let mut out = vec![0, 0, 8, 1];
        out.extend_from_slice(&(labels.len() as u32).to_be_bytes());
        out.extend_from_slice(labels);
        out
    }

    #[test]
    fn images_are_flattened_and_scaled() {
        let bytes = idx3(&[vec![0, 255, 51, 102], vec![255, 255, 0, 0]], 2, 2);
        let (images, n_pixels) = parse_images(&bytes).unwrap();
        assert_eq!(n_pixels, 4);
        assert_eq!(images[0], vec![0.0, 1.0, 0.2, 0.4]);
        assert_eq!(images[1], vec![1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn labels_parse_as_indices() {
        assert_eq!(parse_labels(&idx1(&[3, 0, 9])).unwrap(), vec![3, 0, 9]);
    }

    #[test]
    fn rejects_wrong_dimension_byte() {
        let bytes = idx1(&[1, 2]);
        assert!(matches!(parse_images(&bytes), Err(Error::Format(_))));
    }

    fn idx3_header(n_items: u32, rows: u32, cols: u32) -> Vec<u8> {
        let mut out = vec![0, 0, 8, 3];
        out.extend_from_slice(&n_items.to_be_bytes());
        out.extend_from_slice(&rows.to_be_bytes());
        out.extend_from_slice(&cols.to_be_bytes());
        out
    }

    #[test]
    fn rejects_header_whose_length_wraps() {
        // n_items * rows * cols == u64::MAX on 64-bit targets.
        let bytes = idx3_header(286_331_153, 1_923, 33_502_085);
        assert!(matches!(parse_images(&bytes), Err(Error::Format(_))));
    }

    #[test]
    fn rejects_many_items_of_zero_pixels() {
        let bytes = idx3_header(u32::MAX, 0, 28);
        assert!(matches!(parse_images(&bytes), Err(Error::Format(_))));
        assert_eq!(parse_images(&idx3_header(0, 0, 28)).unwrap(), (Vec::new(), 0));
    }

    #[test]
    fn rejects_truncated_pixels() {
        let mut bytes = idx3(&[vec![1, 2, 3, 4]], 2, 2);
        bytes.pop();
        assert!(matches!(parse_images(&bytes), Err(Error::Format(_))));
    }
}
