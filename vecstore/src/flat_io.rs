//! Binary vector blob and JSON id list used by [`crate::DiskIndex`].

use std::io::{BufReader, BufWriter, Read, Write};

use crate::error::VecError;

const FVEC_MAGIC: [u8; 4] = [b'F', b'V', b'E', b'C'];
const FVEC_VERSION: u32 = 1;

/// Serializes row-major vectors in a compact binary format:
///
/// ```text
/// [4B magic "FVEC"] [4B version=1]
/// [4B dim] [4B rows]
/// [rows x dim x 4B float32]
/// ```
///
/// All multi-byte values are little-endian.
pub fn save_vectors(dim: usize, data: &[f32], w: &mut dyn Write) -> Result<(), VecError> {
    if dim == 0 {
        return Err(VecError::ZeroDimension);
    }
    let rows = data.len() / dim;
    let mut bw = BufWriter::new(w);

    bw.write_all(&FVEC_MAGIC)?;
    bw.write_all(&FVEC_VERSION.to_le_bytes())?;
    bw.write_all(&(dim as u32).to_le_bytes())?;
    bw.write_all(&(rows as u32).to_le_bytes())?;

    for &v in &data[..rows * dim] {
        bw.write_all(&v.to_le_bytes())?;
    }

    bw.flush()?;
    Ok(())
}

/// Deserializes what [`save_vectors`] wrote. Returns `(dim, data)`.
pub fn load_vectors(r: &mut dyn Read) -> Result<(usize, Vec<f32>), VecError> {
    let mut br = BufReader::new(r);
    let mut buf4 = [0u8; 4];

    br.read_exact(&mut buf4)?;
    if buf4 != FVEC_MAGIC {
        return Err(VecError::InvalidFormat(format!("invalid magic {:?}", buf4)));
    }

    br.read_exact(&mut buf4)?;
    let version = u32::from_le_bytes(buf4);
    if version != FVEC_VERSION {
        return Err(VecError::InvalidFormat(format!(
            "unsupported version {version} (want {FVEC_VERSION})"
        )));
    }

    br.read_exact(&mut buf4)?;
    let dim = u32::from_le_bytes(buf4) as usize;
    if dim == 0 {
        return Err(VecError::InvalidFormat("invalid dimension 0".into()));
    }

    br.read_exact(&mut buf4)?;
    let rows = u32::from_le_bytes(buf4) as usize;

    let mut data = Vec::with_capacity(rows.saturating_mul(dim).min(1 << 24));
    for _ in 0..rows * dim {
        br.read_exact(&mut buf4)
            .map_err(|_| VecError::InvalidFormat(format!("truncated blob: want {rows} rows")))?;
        data.push(f32::from_le_bytes(buf4));
    }

    let mut trailing = [0u8; 1];
    if br.read(&mut trailing)? != 0 {
        return Err(VecError::InvalidFormat("trailing bytes after last row".into()));
    }

    Ok((dim, data))
}

/// Serializes the ordered id list as a JSON array.
pub fn save_ids(ids: &[String], w: &mut dyn Write) -> Result<(), VecError> {
    let mut bw = BufWriter::new(w);
    serde_json::to_writer(&mut bw, ids)
        .map_err(|e| VecError::InvalidFormat(e.to_string()))?;
    bw.flush()?;
    Ok(())
}

/// Deserializes what [`save_ids`] wrote.
pub fn load_ids(r: &mut dyn Read) -> Result<Vec<String>, VecError> {
    serde_json::from_reader(BufReader::new(r)).map_err(|e| VecError::InvalidFormat(e.to_string()))
}
