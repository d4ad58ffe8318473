//! Binary fixture formats shared by the validator, the benchmark and the
//! tests.
//!
//! Two current formats plus one legacy one:
//!
//! - point data: raw `(y, x)` little-endian `u32` pairs, no header;
//! - truth labels: raw little-endian `i32` values, no header;
//! - legacy points: `u32` count header, then `count` × `(f64 x, f64 y)`,
//!   then `count` × `i32` labels.
//!
//! The `(y, x)` ordering in the point file is historical; readers return
//! separate `x`/`y` vectors so callers never see it.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::types::Point;

fn invalid_data(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

/// Read a raw `(y, x)` u32 pair file. Returns `(x, y)` coordinate vectors.
pub fn read_points_yx_u32(path: &Path) -> io::Result<(Vec<u32>, Vec<u32>)> {
    let bytes = fs::read(path)?;
    if bytes.len() % 8 != 0 {
        return Err(invalid_data(format!(
            "{}: size {} is not a whole number of (y, x) u32 pairs",
            path.display(),
            bytes.len()
        )));
    }

    let count = bytes.len() / 8;
    let mut x = Vec::with_capacity(count);
    let mut y = Vec::with_capacity(count);
    for pair in bytes.chunks_exact(8) {
        y.push(u32::from_le_bytes(pair[0..4].try_into().unwrap()));
        x.push(u32::from_le_bytes(pair[4..8].try_into().unwrap()));
    }
    Ok((x, y))
}

/// Write coordinates in the raw `(y, x)` u32 pair format.
pub fn write_points_yx_u32(path: &Path, x: &[u32], y: &[u32]) -> io::Result<()> {
    assert_eq!(x.len(), y.len(), "coordinate vectors must have equal length");

    let mut out = io::BufWriter::new(fs::File::create(path)?);
    for (&px, &py) in x.iter().zip(y) {
        out.write_all(&py.to_le_bytes())?;
        out.write_all(&px.to_le_bytes())?;
    }
    out.flush()
}

/// Read a raw i32 label file.
pub fn read_labels_i32(path: &Path) -> io::Result<Vec<i32>> {
    let bytes = fs::read(path)?;
    if bytes.len() % 4 != 0 {
        return Err(invalid_data(format!(
            "{}: size {} is not a whole number of i32 labels",
            path.display(),
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| i32::from_le_bytes(chunk.try_into().unwrap()))
        .collect())
}

/// Write labels in the raw i32 format.
pub fn write_labels_i32(path: &Path, labels: &[i32]) -> io::Result<()> {
    let mut out = io::BufWriter::new(fs::File::create(path)?);
    for &label in labels {
        out.write_all(&label.to_le_bytes())?;
    }
    out.flush()
}

/// A legacy fixture: float points with their reference labels.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyDataset {
    pub points: Vec<Point<f64>>,
    pub labels: Vec<i32>,
}

/// Read the legacy header-prefixed float format.
pub fn read_legacy_points_f64(path: &Path) -> io::Result<LegacyDataset> {
    let bytes = fs::read(path)?;
    if bytes.len() < 4 {
        return Err(invalid_data(format!(
            "{}: missing point-count header",
            path.display()
        )));
    }

    let count = u32::from_le_bytes(bytes[0..4].try_into().unwrap()) as usize;
    let expected = 4 + count * 16 + count * 4;
    if bytes.len() != expected {
        return Err(invalid_data(format!(
            "{}: expected {} bytes for {} points, got {}",
            path.display(),
            expected,
            count,
            bytes.len()
        )));
    }

    let mut points = Vec::with_capacity(count);
    let mut offset = 4;
    for _ in 0..count {
        let x = f64::from_le_bytes(bytes[offset..offset + 8].try_into().unwrap());
        let y = f64::from_le_bytes(bytes[offset + 8..offset + 16].try_into().unwrap());
        points.push(Point::new(x, y));
        offset += 16;
    }

    let mut labels = Vec::with_capacity(count);
    for _ in 0..count {
        labels.push(i32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap()));
        offset += 4;
    }

    Ok(LegacyDataset { points, labels })
}

/// Write the legacy header-prefixed float format.
pub fn write_legacy_points_f64(path: &Path, dataset: &LegacyDataset) -> io::Result<()> {
    assert_eq!(
        dataset.points.len(),
        dataset.labels.len(),
        "points and labels must have equal length"
    );

    let mut out = io::BufWriter::new(fs::File::create(path)?);
    out.write_all(&(dataset.points.len() as u32).to_le_bytes())?;
    for p in &dataset.points {
        out.write_all(&p.x.to_le_bytes())?;
        out.write_all(&p.y.to_le_bytes())?;
    }
    for &label in &dataset.labels {
        out.write_all(&label.to_le_bytes())?;
    }
    out.flush()
}
